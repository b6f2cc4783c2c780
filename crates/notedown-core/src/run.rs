//! Export orchestration
//!
//! Ties discovery, per-page export and index persistence together.
//! Configuration problems abort before any I/O; everything downstream
//! degrades per page.

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::api::DocumentStore;
use crate::assets::AssetStore;
use crate::config::Config;
use crate::discover::PageLocator;
use crate::export::PageExporter;
use crate::index::IndexBuilder;

/// What an export run produced
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Markdown files written, in export order
    pub files_written: Vec<String>,
    /// Pages that failed to export and were skipped
    pub pages_skipped: usize,
    /// Entries persisted to the metadata index
    pub index_entries: usize,
}

/// One full export of the configured target
pub struct ExportRun<S> {
    config: Config,
    store: S,
}

impl<S: DocumentStore> ExportRun<S> {
    pub fn new(config: Config, store: S) -> Self {
        Self { config, store }
    }

    /// Discover, export and index
    ///
    /// Fails only on invalid configuration or an unusable asset store;
    /// page-level problems are logged and counted as skips.
    pub async fn execute(self) -> Result<ExportSummary> {
        self.config.validate()?;

        let locator = PageLocator::new(&self.store);
        let discovered = locator.discover(&self.config).await;

        if discovered.collection_mode {
            clear_markdown_files(&self.config.output_dir);
        }

        let token = self.config.token.clone().unwrap_or_default();
        let assets = AssetStore::new(&self.config.images_dir)?.with_token(token);

        let exporter =
            PageExporter::new(&self.store, &self.config.output_dir).with_assets(&assets);

        // Discovery normally pre-extracts collection metadata; only fall
        // back to export-time extraction when it produced none
        let extract = discovered.collection_mode && discovered.metadata.is_empty();

        let mut index = IndexBuilder::new(discovered.metadata);
        let mut summary = ExportSummary::default();

        info!(count = discovered.page_ids.len(), "exporting pages");
        for page_id in &discovered.page_ids {
            match exporter.export_page(page_id, extract).await {
                (Some(filename), metadata) => {
                    index.record_export(page_id, &filename, metadata);
                    summary.files_written.push(filename);
                }
                (None, _) => {
                    summary.pages_skipped += 1;
                }
            }
        }

        index.write(&self.config.metadata_file);
        summary.index_entries = index.entries().len();

        info!(
            written = summary.files_written.len(),
            skipped = summary.pages_skipped,
            "export complete"
        );
        Ok(summary)
    }
}

/// Delete stale `*.md` files so unready pages disappear from the output
fn clear_markdown_files(output_dir: &Path) {
    let entries = match std::fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|e| e == "md").unwrap_or(false) {
            match std::fs::remove_file(&path) {
                Ok(()) => info!(file = %path.display(), "removed stale article"),
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "could not remove stale article")
                }
            }
        }
    }
}
