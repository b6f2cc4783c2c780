//! In-memory document store for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::api::{ApiError, ApiResult, Block, DocumentStore, Page, Paginated};

/// Page size used by the fake, matching the live API maximum
const PAGE_SIZE: usize = 100;

impl Page {
    /// A minimal page fixture with fixed timestamps
    pub(crate) fn test_page(id: &str) -> Self {
        Page {
            id: id.to_string(),
            created_time: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            last_edited_time: Utc.with_ymd_and_hms(2024, 2, 1, 12, 30, 0).unwrap(),
            parent: None,
            properties: HashMap::new(),
        }
    }
}

/// An in-memory [`DocumentStore`] with cursor pagination
///
/// Cursors are stringified offsets into the backing vectors, so tests can
/// verify that callers follow `next_cursor` across page boundaries.
#[derive(Default)]
pub(crate) struct FakeStore {
    pages: HashMap<String, Page>,
    children: HashMap<String, Vec<Block>>,
    databases: HashMap<String, Vec<Page>>,
    search_results: Vec<Page>,
    children_calls: AtomicUsize,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_page(&mut self, page: Page) {
        self.pages.insert(page.id.clone(), page);
    }

    pub(crate) fn add_children(&mut self, node_id: &str, blocks: Vec<Block>) {
        self.children.insert(node_id.to_string(), blocks);
    }

    pub(crate) fn add_database(&mut self, database_id: &str, pages: Vec<Page>) {
        self.databases.insert(database_id.to_string(), pages);
    }

    pub(crate) fn add_search_results(&mut self, pages: Vec<Page>) {
        self.search_results = pages;
    }

    pub(crate) fn children_calls(&self) -> usize {
        self.children_calls.load(Ordering::SeqCst)
    }

    fn paginate<T: Clone>(items: &[T], cursor: Option<&str>) -> Paginated<T> {
        let offset: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let end = (offset + PAGE_SIZE).min(items.len());
        let has_more = end < items.len();

        Paginated {
            results: items[offset.min(items.len())..end].to_vec(),
            has_more,
            next_cursor: has_more.then(|| end.to_string()),
        }
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn retrieve_page(&self, page_id: &str) -> ApiResult<Page> {
        self.pages.get(page_id).cloned().ok_or_else(|| ApiError::Status {
            endpoint: format!("/pages/{}", page_id),
            status: 404,
            message: "object_not_found".to_string(),
        })
    }

    async fn list_children(
        &self,
        node_id: &str,
        cursor: Option<&str>,
    ) -> ApiResult<Paginated<Block>> {
        self.children_calls.fetch_add(1, Ordering::SeqCst);
        let blocks = self.children.get(node_id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(Self::paginate(blocks, cursor))
    }

    async fn query_database(
        &self,
        database_id: &str,
        cursor: Option<&str>,
    ) -> ApiResult<Paginated<Page>> {
        let pages = self
            .databases
            .get(database_id)
            .ok_or_else(|| ApiError::Status {
                endpoint: format!("/databases/{}/query", database_id),
                status: 404,
                message: "object_not_found".to_string(),
            })?;
        Ok(Self::paginate(pages, cursor))
    }

    async fn search_pages(&self, cursor: Option<&str>) -> ApiResult<Paginated<Page>> {
        Ok(Self::paginate(&self.search_results, cursor))
    }
}
