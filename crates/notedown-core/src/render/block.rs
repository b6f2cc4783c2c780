//! Block tree to Markdown
//!
//! Blocks render depth-first in API order. Children are fetched lazily
//! through the document store, so the renderer walks arbitrarily deep
//! trees without the caller preloading anything. A failure inside one
//! block (including its children fetch) drops that block's fragment and
//! leaves the rest of the page intact.

use futures_util::future::BoxFuture;
use tracing::warn;

use super::rich_text::{plain_text, render_rich_text};
use crate::api::{fetch_all_children, ApiResult, Block, BlockKind, DocumentStore, Icon};
use crate::assets::AssetStore;

/// Default callout marker when the block has no emoji icon
const DEFAULT_CALLOUT_EMOJI: &str = "💡";

/// Renders blocks and their descendants to Markdown fragments
pub struct BlockRenderer<'a> {
    store: &'a dyn DocumentStore,
    assets: Option<&'a AssetStore>,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            assets: None,
        }
    }

    /// Materialize images through `assets` instead of linking remote URLs
    pub fn with_assets(mut self, assets: &'a AssetStore) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Render a sequence of sibling blocks at the given indent level
    pub async fn render_all(&self, blocks: &[Block], indent: usize) -> String {
        let mut out = String::new();
        for block in blocks {
            out.push_str(&self.render(block, indent).await);
        }
        out
    }

    /// Render one block and its descendants
    ///
    /// Boxed because the future recurses through child blocks.
    pub fn render<'b>(&'b self, block: &'b Block, indent: usize) -> BoxFuture<'b, String> {
        Box::pin(async move {
            match self.try_render(block, indent).await {
                Ok(fragment) => fragment,
                Err(err) => {
                    warn!(block_id = %block.id, error = %err, "skipping block that failed to render");
                    String::new()
                }
            }
        })
    }

    async fn try_render(&self, block: &Block, indent: usize) -> ApiResult<String> {
        let prefix = "  ".repeat(indent);

        let mut content = match &block.kind {
            BlockKind::Paragraph { rich_text } => {
                let text = render_rich_text(rich_text);
                if text.is_empty() {
                    // A blank paragraph still contributes vertical space
                    format!("{}\n\n", prefix)
                } else {
                    format!("{}{}\n\n", prefix, text)
                }
            }
            BlockKind::Heading1 { rich_text } => {
                format!("{}# {}\n\n", prefix, render_rich_text(rich_text))
            }
            BlockKind::Heading2 { rich_text } => {
                format!("{}## {}\n\n", prefix, render_rich_text(rich_text))
            }
            BlockKind::Heading3 { rich_text } => {
                format!("{}### {}\n\n", prefix, render_rich_text(rich_text))
            }
            BlockKind::BulletedListItem { rich_text } => {
                format!("{}- {}\n", prefix, render_rich_text(rich_text))
            }
            BlockKind::NumberedListItem { rich_text } => {
                // Markdown renumbers ordered lists itself
                format!("{}1. {}\n", prefix, render_rich_text(rich_text))
            }
            BlockKind::ToDo { rich_text, checked } => {
                let checkbox = if *checked { "[x]" } else { "[ ]" };
                format!("{}- {} {}\n", prefix, checkbox, render_rich_text(rich_text))
            }
            BlockKind::Toggle { rich_text } => {
                format!(
                    "{}<details>\n{}<summary>{}</summary>\n",
                    prefix,
                    prefix,
                    render_rich_text(rich_text)
                )
            }
            BlockKind::Code {
                rich_text,
                language,
            } => {
                format!(
                    "{}```{}\n{}\n{}```\n\n",
                    prefix,
                    language,
                    plain_text(rich_text),
                    prefix
                )
            }
            BlockKind::Quote { rich_text } => {
                format!("{}> {}\n\n", prefix, render_rich_text(rich_text))
            }
            BlockKind::Callout { rich_text, icon } => {
                let emoji = match icon {
                    Some(Icon::Emoji { emoji }) => emoji.as_str(),
                    _ => DEFAULT_CALLOUT_EMOJI,
                };
                format!("{}> {} {}\n\n", prefix, emoji, render_rich_text(rich_text))
            }
            BlockKind::Divider => format!("{}---\n\n", prefix),
            BlockKind::Image { url, caption } => match url {
                Some(url) => {
                    let target = match self.assets {
                        Some(assets) => assets.materialize(url).await,
                        None => url.clone(),
                    };
                    format!("{}![{}]({})\n\n", prefix, render_rich_text(caption), target)
                }
                None => String::new(),
            },
            BlockKind::Bookmark { url, caption } => {
                let caption = render_rich_text(caption);
                let label = if caption.is_empty() { url } else { &caption };
                format!("{}[{}]({})\n\n", prefix, label, url)
            }
            // Page and database references have no inline content
            BlockKind::ChildPage { .. } | BlockKind::ChildDatabase { .. } => String::new(),
            BlockKind::Unsupported { rich_text, .. } => {
                let text = render_rich_text(rich_text);
                if text.is_empty() {
                    String::new()
                } else {
                    format!("{}{}\n\n", prefix, text)
                }
            }
        };

        if block.has_children {
            let children = fetch_all_children(self.store, &block.id).await?;
            let wraps = matches!(
                block.kind,
                BlockKind::Toggle { .. } | BlockKind::Callout { .. }
            );
            let child_indent = if wraps { indent + 1 } else { indent };

            for child in &children {
                content.push_str(&self.render(child, child_indent).await);
            }

            if matches!(block.kind, BlockKind::Toggle { .. }) {
                content.push_str(&format!("{}</details>\n\n", prefix));
            }
        }

        Ok(content)
    }
}
