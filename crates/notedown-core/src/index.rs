//! Metadata index persistence
//!
//! The index is rebuilt from scratch on every run and fully overwrites
//! the previous file. A page that is no longer ready disappears from the
//! index the next time the export runs.

use std::path::Path;

use tracing::{info, warn};

use crate::export::PageMetadata;

/// Accumulates index entries across an export run
///
/// Entries seeded from discovery keep their order and take precedence
/// over metadata re-derived during export; exports only attach filenames
/// to them.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    entries: Vec<PageMetadata>,
}

impl IndexBuilder {
    /// Start from metadata collected during discovery
    pub fn new(discovered: Vec<PageMetadata>) -> Self {
        Self {
            entries: discovered,
        }
    }

    /// Record a successful page export
    ///
    /// Attaches the filename to the page's existing entry, or appends the
    /// export-time metadata when discovery produced none.
    pub fn record_export(
        &mut self,
        page_id: &str,
        filename: &str,
        export_metadata: Option<PageMetadata>,
    ) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == page_id) {
            entry.filename = Some(filename.to_string());
        } else if let Some(mut metadata) = export_metadata {
            metadata.filename = Some(filename.to_string());
            self.entries.push(metadata);
        }
    }

    pub fn entries(&self) -> &[PageMetadata] {
        &self.entries
    }

    /// Write the index as pretty JSON, creating parent directories
    ///
    /// The file is always written, as `[]` when there are no entries.
    /// A write failure downgrades to a warning; the exported Markdown is
    /// already on disk and should not be thrown away over the index.
    pub fn write(&self, path: &Path) {
        if let Err(err) = self.try_write(path) {
            warn!(path = %path.display(), error = %err, "could not save metadata index");
        } else {
            info!(path = %path.display(), entries = self.entries.len(), "saved metadata index");
        }
    }

    fn try_write(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
