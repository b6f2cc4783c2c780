//! notedown core library
//!
//! This crate provides the core functionality for notedown, a tool that
//! exports a Notion page tree or database to flat Markdown files plus a
//! JSON metadata index, materializing remote images into local storage.
//!
//! # Architecture
//!
//! - `api`: Notion document-store interface (paginated listing, page
//!   retrieval, database query, search) behind the [`DocumentStore`] trait
//! - `render`: rich-text and block rendering to Markdown
//! - `assets`: content-addressed image download cache
//! - `export`: per-page export and metadata extraction
//! - `discover`: page discovery strategy cascade
//! - `index`: metadata index persistence
//! - `run`: full export orchestration (the entry point used by the CLI)
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let client = NotionClient::new(config.token.clone().unwrap())?;
//! let summary = ExportRun::new(config, client).execute().await?;
//! ```

pub mod api;
pub mod assets;
pub mod config;
pub mod discover;
pub mod export;
pub mod index;
pub mod render;
pub mod run;

#[cfg(test)]
pub(crate) mod testutil;

pub use api::{ApiError, Block, BlockKind, DocumentStore, NotionClient, Page, RichText};
pub use assets::AssetStore;
pub use config::{parse_id_list, Config};
pub use export::{PageExporter, PageMetadata};
pub use run::{ExportRun, ExportSummary};
