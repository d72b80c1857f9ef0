use crate::error::SplitError;
use crate::preprocessors::PdfPreprocessor;
use crate::types::ArtifactKey;
use lopdf::Document;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Characters that are not allowed in file names on at least one platform
const FORBIDDEN_FILENAME_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Strip characters that cannot appear in a file name
pub fn sanitize(component: &str) -> String {
    component
        .chars()
        .filter(|c| !FORBIDDEN_FILENAME_CHARS.contains(c))
        .collect()
}

/// `{last}_{first}_{period}.pdf`; single-name employees use the name twice
pub fn artifact_file_name(key: &ArtifactKey) -> String {
    let last_name = if key.last_name.is_empty() {
        &key.first_name
    } else {
        &key.last_name
    };
    format!(
        "{}_{}_{}.pdf",
        sanitize(last_name),
        sanitize(&key.first_name),
        key.period_key
    )
}

/// Storage abstraction for split documents
pub trait ArtifactStorage {
    /// Write `page_indices` (zero-based, ascending) as `file_name`, replacing
    /// whatever was there. Returns the written path.
    fn write_artifact(&mut self, file_name: &str, page_indices: &[usize])
        -> Result<PathBuf, SplitError>;

    fn output_dir(&self) -> &Path;
}

/// Writes page subsets of the loaded source PDF into an output directory
pub struct PdfFileStorage<'a> {
    source: &'a PdfPreprocessor,
    output_dir: PathBuf,
}

impl<'a> PdfFileStorage<'a> {
    /// Creates the output directory (and parents) if it does not exist
    pub fn new(source: &'a PdfPreprocessor, output_dir: impl Into<PathBuf>) -> Result<Self, SplitError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|e| SplitError::io(&output_dir, e))?;
        Ok(Self { source, output_dir })
    }

    fn partial_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(format!("{file_name}.part"))
    }
}

impl ArtifactStorage for PdfFileStorage<'_> {
    fn write_artifact(
        &mut self,
        file_name: &str,
        page_indices: &[usize],
    ) -> Result<PathBuf, SplitError> {
        let keep: BTreeSet<u32> = page_indices
            .iter()
            .filter_map(|&index| self.source.page_number(index))
            .collect();
        if keep.len() != page_indices.len() {
            return Err(SplitError::Pdf(format!(
                "page index out of range in {page_indices:?}"
            )));
        }

        let mut document = self.source.document().clone();
        let removed: Vec<u32> = document
            .get_pages()
            .keys()
            .copied()
            .filter(|n| !keep.contains(n))
            .collect();
        document.delete_pages(&removed);
        document.prune_objects();

        // Write next to the target and rename, so the target is either the
        // previous complete version or the new complete version
        let partial = self.partial_path(file_name);
        let target = self.output_dir.join(file_name);
        let result = save_document(&mut document, &partial)
            .and_then(|()| fs::rename(&partial, &target).map_err(|e| SplitError::io(&target, e)));
        if result.is_err() && partial.exists() {
            if let Err(e) = fs::remove_file(&partial) {
                tracing::warn!("Could not remove {}: {}", partial.display(), e);
            }
        }
        result.map(|()| target)
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn save_document(document: &mut Document, path: &Path) -> Result<(), SplitError> {
    let mut file = File::create(path).map_err(|e| SplitError::io(path, e))?;
    document
        .save_to(&mut file)
        .map_err(|e| SplitError::Pdf(e.to_string()))?;
    file.sync_all().map_err(|e| SplitError::io(path, e))?;
    // Windows refuses to rename a file that is still open
    drop(file);
    Ok(())
}
