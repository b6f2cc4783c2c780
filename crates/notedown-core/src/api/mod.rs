//! Notion document-store interface
//!
//! The wire model, the [`DocumentStore`] trait, its HTTP implementation,
//! and cursor-draining helpers over the paginated listing operations.

mod client;
mod error;
mod types;

pub use client::{DocumentStore, NotionClient};
pub use error::{ApiError, ApiResult};
pub use types::{
    Annotations, Block, BlockKind, DateValue, Icon, Page, Paginated, Parent, Property, RichText,
    SelectOption,
};

/// Fetch every direct child of a node, following pagination cursors
pub async fn fetch_all_children(
    store: &dyn DocumentStore,
    node_id: &str,
) -> ApiResult<Vec<Block>> {
    let mut blocks = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = store.list_children(node_id, cursor.as_deref()).await?;
        blocks.extend(page.results);

        if !page.has_more {
            break;
        }
        cursor = match page.next_cursor {
            Some(c) => Some(c),
            None => break,
        };
    }

    Ok(blocks)
}

/// Fetch every entry of a database, following pagination cursors
pub async fn query_database_all(
    store: &dyn DocumentStore,
    database_id: &str,
) -> ApiResult<Vec<Page>> {
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = store.query_database(database_id, cursor.as_deref()).await?;
        pages.extend(page.results);

        if !page.has_more {
            break;
        }
        cursor = match page.next_cursor {
            Some(c) => Some(c),
            None => break,
        };
    }

    Ok(pages)
}

/// Fetch every page visible to the integration via search
pub async fn search_all_pages(store: &dyn DocumentStore) -> ApiResult<Vec<Page>> {
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = store.search_pages(cursor.as_deref()).await?;
        pages.extend(page.results);

        if !page.has_more {
            break;
        }
        cursor = match page.next_cursor {
            Some(c) => Some(c),
            None => break,
        };
    }

    Ok(pages)
}
