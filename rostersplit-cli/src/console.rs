use rostersplit_core::{LogLevel, SplitEvent, SplitSummary};

/// One terminal line for an event; `None` for events not shown at the
/// current verbosity.
pub fn render_event(event: &SplitEvent, verbose: bool) -> Option<String> {
    match event {
        SplitEvent::Log { level, message } => match level {
            LogLevel::Debug if !verbose => None,
            LogLevel::Debug => Some(format!("   🔍 {message}")),
            LogLevel::Info => Some(format!("📄 {message}")),
            LogLevel::Warn => Some(format!("⚠️  {message}")),
            LogLevel::Error => Some(format!("❌ {message}")),
        },
        SplitEvent::Progress(percent) if verbose => Some(format!("   ⏳ {percent}%")),
        SplitEvent::Progress(_) => None,
        SplitEvent::Completed(summary) => Some(format!(
            "✅ Split {} pages into {} documents",
            summary.total_pages,
            summary.file_names().len()
        )),
        SplitEvent::Failed(message) => Some(format!("❌ Splitting failed: {message}")),
    }
}

/// Created files and skipped pages, for the end of a run
pub fn summary_lines(summary: &SplitSummary) -> Vec<String> {
    let mut lines = vec![format!("📁 Output directory: {}", summary.output_dir.display())];

    for artifact in &summary.artifacts {
        let pages: Vec<String> = artifact
            .page_indices
            .iter()
            .map(|i| (i + 1).to_string())
            .collect();
        let note = if !artifact.written {
            " ❌ write failed"
        } else if artifact.overwritten {
            " ⚠️  replaced by a later document"
        } else {
            ""
        };
        lines.push(format!(
            "   - {} (pages {}){}",
            artifact.file_name,
            pages.join(", "),
            note
        ));
    }

    if !summary.dropped_pages.is_empty() {
        lines.push(format!("⚠️  {} pages skipped:", summary.dropped_pages.len()));
        for page in &summary.dropped_pages {
            lines.push(format!("   - page {}: {}", page.index + 1, page.reason));
        }
    }

    lines
}
