//! Per-page Markdown export

mod metadata;

pub use metadata::{extract_metadata, page_title, Category, PageMetadata, UNTITLED};

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::api::{fetch_all_children, BlockKind, DocumentStore};
use crate::assets::AssetStore;
use crate::render::BlockRenderer;

/// Exports single pages to Markdown files
pub struct PageExporter<'a> {
    store: &'a dyn DocumentStore,
    output_dir: PathBuf,
    assets: Option<&'a AssetStore>,
}

impl<'a> PageExporter<'a> {
    pub fn new(store: &'a dyn DocumentStore, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            output_dir: output_dir.into(),
            assets: None,
        }
    }

    /// Download images through `assets` instead of linking remote URLs
    pub fn with_assets(mut self, assets: &'a AssetStore) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Export one page to `<output_dir>/<slug>.md`
    ///
    /// Returns the written filename and, when requested, the extracted
    /// metadata with the filename attached. Any failure is logged and
    /// yields `(None, None)` so the remaining pages still export.
    pub async fn export_page(
        &self,
        page_id: &str,
        extract: bool,
    ) -> (Option<String>, Option<PageMetadata>) {
        match self.try_export(page_id, extract).await {
            Ok(result) => result,
            Err(err) => {
                error!(page_id, error = %err, "failed to export page");
                (None, None)
            }
        }
    }

    async fn try_export(
        &self,
        page_id: &str,
        extract: bool,
    ) -> Result<(Option<String>, Option<PageMetadata>)> {
        let page = self.store.retrieve_page(page_id).await?;
        let title = page_title(&page);
        info!(%title, page_id, "exporting page");

        let mut metadata = extract.then(|| extract_metadata(&page));

        let blocks = fetch_all_children(self.store, page_id).await?;

        let mut renderer = BlockRenderer::new(self.store);
        if let Some(assets) = self.assets {
            renderer = renderer.with_assets(assets);
        }

        // Synthesize a leading H1 unless the document opens with its own heading
        let first_is_heading = matches!(
            blocks.first().map(|b| &b.kind),
            Some(BlockKind::Heading1 { .. })
                | Some(BlockKind::Heading2 { .. })
                | Some(BlockKind::Heading3 { .. })
        );
        let mut content = if !blocks.is_empty() && !first_is_heading {
            format!("# {}\n\n", title)
        } else {
            String::new()
        };

        content.push_str(&renderer.render_all(&blocks, 0).await);

        // A page must never produce an empty file
        if content.trim().is_empty() {
            content = format!("# {}\n\n", title);
        }

        let slug = {
            let s = slugify(&title);
            if s.is_empty() {
                format!("page-{}", &page_id[..page_id.len().min(8)])
            } else {
                s
            }
        };
        let filename = format!("{}.md", slug);

        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", self.output_dir))?;
        let path = self.output_dir.join(&filename);
        std::fs::write(&path, &content)
            .with_context(|| format!("Failed to write Markdown file: {:?}", path))?;

        info!(file = %path.display(), "exported page");

        if let Some(meta) = metadata.as_mut() {
            meta.filename = Some(filename.clone());
        }

        Ok((Some(filename), metadata))
    }
}

/// Filesystem-safe slug from a page title
///
/// Keeps word characters, whitespace and hyphens, then collapses every
/// separator run to a single hyphen and lowercases. May return an empty
/// string for titles with no word characters; the caller falls back to
/// an id-derived name.
pub fn slugify(title: &str) -> String {
    let filtered: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::new();
    let mut in_separator = false;
    for c in filtered.trim().chars() {
        if c == '-' || c.is_whitespace() {
            in_separator = true;
        } else {
            if in_separator {
                slug.push('-');
                in_separator = false;
            }
            slug.extend(c.to_lowercase());
        }
    }
    if in_separator {
        slug.push('-');
    }

    slug
}
