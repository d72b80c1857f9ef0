use crate::error::SplitError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Default value functions for serde
fn default_name_marker() -> String {
    "Herr/Frau".to_string()
}

fn default_period_marker() -> String {
    "Zeitraum:".to_string()
}

fn default_continuation_marker() -> String {
    "Seite 2".to_string()
}

fn default_salutations() -> Vec<String> {
    vec!["herr".to_string(), "herrn".to_string(), "frau".to_string()]
}

fn default_output_root() -> PathBuf {
    PathBuf::from("split_schedules")
}

fn default_directory_suffix() -> String {
    " Splitted".to_string()
}

fn default_text_preview_chars() -> usize {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitterConfig {
    /// Literal markers printed by the roster system
    #[serde(default)]
    pub markers: MarkerConfig,
    /// Where split documents go when the caller gives no directory
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    /// Default tracing filter for front ends (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkerConfig {
    /// Line preceding the employee name (or the salutation line)
    #[serde(default = "default_name_marker")]
    pub name: String,
    /// Label in front of the reporting period
    #[serde(default = "default_period_marker")]
    pub period: String,
    /// Printed on follow-up pages that carry no header of their own
    #[serde(default = "default_continuation_marker")]
    pub continuation: String,
    /// Lowercase salutation tokens that may sit between marker and name
    #[serde(default = "default_salutations")]
    pub salutations: Vec<String>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            name: default_name_marker(),
            period: default_period_marker(),
            continuation: default_continuation_marker(),
            salutations: default_salutations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_root")]
    pub default_root: PathBuf,
    /// Appended to the source file stem to name the per-document directory
    #[serde(default = "default_directory_suffix")]
    pub directory_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_root: default_output_root(),
            directory_suffix: default_directory_suffix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebugConfig {
    /// Characters of page text echoed at debug level (0 disables the preview)
    #[serde(default = "default_text_preview_chars")]
    pub text_preview_chars: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            text_preview_chars: default_text_preview_chars(),
        }
    }
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            markers: MarkerConfig::default(),
            output: OutputConfig::default(),
            debug: DebugConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl SplitterConfig {
    /// Load config from file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SplitterConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}, using defaults", p, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Empty markers would match every page
    pub fn validate(&self) -> Result<(), SplitError> {
        let markers = [
            ("markers.name", &self.markers.name),
            ("markers.period", &self.markers.period),
            ("markers.continuation", &self.markers.continuation),
        ];
        for (field, value) in markers {
            if value.trim().is_empty() {
                return Err(SplitError::Config(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }

    /// Resolve the directory split documents are written to.
    ///
    /// `{caller_root}/{stem}{suffix}` when the caller picked a directory,
    /// `{default_root}/{stem}{suffix}` otherwise.
    pub fn resolve_output_dir(
        &self,
        source: &Path,
        caller_root: Option<&Path>,
    ) -> Result<PathBuf, SplitError> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SplitError::InvalidSource(source.to_path_buf()))?;
        let dir_name = format!("{stem}{}", self.output.directory_suffix);
        let root = caller_root.unwrap_or(&self.output.default_root);
        Ok(root.join(dir_name))
    }
}
