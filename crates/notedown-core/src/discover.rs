//! Page discovery
//!
//! Resolves the configured target into the concrete list of pages to
//! export. Strategies cascade: an explicitly configured database wins,
//! then a database embedded in the given page, then child pages of the
//! page, then a global search scoped to the page. Discovery never fails
//! a run; an empty result is a clean no-op export.

use tracing::{info, warn};

use crate::api::{
    fetch_all_children, query_database_all, search_all_pages, BlockKind, DocumentStore, Page,
    Parent,
};
use crate::config::Config;
use crate::export::{extract_metadata, page_title, PageMetadata};

/// Outcome of page discovery
#[derive(Debug, Default)]
pub struct DiscoveredPages {
    /// Pages to export, in discovery order
    pub page_ids: Vec<String>,
    /// Metadata extracted while filtering a collection; empty otherwise
    pub metadata: Vec<PageMetadata>,
    /// True when the pages came from a database (gated and pre-cleaned)
    pub collection_mode: bool,
}

/// Finds the pages an export run should cover
pub struct PageLocator<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> PageLocator<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Run the discovery cascade for the configured target
    pub async fn discover(&self, config: &Config) -> DiscoveredPages {
        if let Some(database_id) = &config.database_id {
            info!(database_id, "using configured database");
            return self.collect_ready(database_id).await;
        }

        let Some(first_id) = config.page_ids.first() else {
            warn!("no database or pages configured, nothing to discover");
            return DiscoveredPages::default();
        };

        info!(page_id = %first_id, "no database configured, inspecting page for one");
        if let Some(database_id) = self.find_database_in_page(first_id).await {
            info!(database_id, "found embedded database");
            return self.collect_ready(&database_id).await;
        }

        if config.page_ids.len() > 1 {
            info!(count = config.page_ids.len(), "exporting listed pages directly");
            return DiscoveredPages {
                page_ids: config.page_ids.clone(),
                ..DiscoveredPages::default()
            };
        }

        info!(parent = %first_id, "looking for child pages");
        let page_ids = self.find_child_pages(first_id).await;
        if page_ids.is_empty() {
            warn!(parent = %first_id, "no child pages found, nothing to export");
        }
        DiscoveredPages {
            page_ids,
            ..DiscoveredPages::default()
        }
    }

    /// Query a collection and keep only entries gated ready
    async fn collect_ready(&self, database_id: &str) -> DiscoveredPages {
        let mut discovered = DiscoveredPages {
            collection_mode: true,
            ..DiscoveredPages::default()
        };

        for page in self.collection_pages(database_id).await {
            let metadata = extract_metadata(&page);
            if metadata.ready {
                info!(title = %metadata.title, "including ready page");
                discovered.page_ids.push(metadata.id.clone());
                discovered.metadata.push(metadata);
            } else {
                info!(title = %metadata.title, "skipping unready page");
            }
        }

        info!(count = discovered.page_ids.len(), "collection discovery complete");
        discovered
    }

    /// All entries of a database, falling back to search on query failure
    async fn collection_pages(&self, database_id: &str) -> Vec<Page> {
        match query_database_all(self.store, database_id).await {
            Ok(pages) => pages,
            Err(err) => {
                warn!(database_id, error = %err, "database query failed, falling back to search");
                match search_all_pages(self.store).await {
                    Ok(pages) => pages
                        .into_iter()
                        .filter(|page| {
                            matches!(
                                &page.parent,
                                Some(Parent::DatabaseId { database_id: id }) if id == database_id
                            )
                        })
                        .collect(),
                    Err(err) => {
                        warn!(error = %err, "search fallback failed");
                        Vec::new()
                    }
                }
            }
        }
    }

    /// First embedded database block inside a page, if any
    async fn find_database_in_page(&self, page_id: &str) -> Option<String> {
        let blocks = match fetch_all_children(self.store, page_id).await {
            Ok(blocks) => blocks,
            Err(err) => {
                warn!(page_id, error = %err, "failed to scan page for a database");
                return None;
            }
        };

        blocks.into_iter().find_map(|block| match block.kind {
            BlockKind::ChildDatabase { title } => {
                info!(%title, database_id = %block.id, "found database block");
                Some(block.id)
            }
            _ => None,
        })
    }

    /// Child pages of a parent, by block scan then by global search
    async fn find_child_pages(&self, parent_page_id: &str) -> Vec<String> {
        let mut page_ids = Vec::new();

        match fetch_all_children(self.store, parent_page_id).await {
            Ok(blocks) => {
                for block in blocks {
                    if let BlockKind::ChildPage { title } = &block.kind {
                        info!(%title, page_id = %block.id, "found child page block");
                        page_ids.push(block.id);
                    }
                }
            }
            Err(err) => {
                warn!(parent_page_id, error = %err, "failed to list child blocks");
            }
        }

        if !page_ids.is_empty() {
            return page_ids;
        }

        // Pages moved under a parent without a linking block only show up
        // in search results
        match search_all_pages(self.store).await {
            Ok(pages) => {
                for page in pages {
                    let is_child = matches!(
                        &page.parent,
                        Some(Parent::PageId { page_id }) if page_id == parent_page_id
                    );
                    if is_child && !page_ids.contains(&page.id) {
                        info!(title = %page_title(&page), page_id = %page.id, "found child page via search");
                        page_ids.push(page.id);
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "child page search failed");
            }
        }

        page_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Block, Property, RichText};
    use crate::testutil::FakeStore;

    fn config_with_database(id: &str) -> Config {
        Config {
            database_id: Some(id.to_string()),
            ..Config::default()
        }
    }

    fn config_with_pages(ids: &[&str]) -> Config {
        Config {
            page_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..Config::default()
        }
    }

    fn ready_page(id: &str, title: &str, ready: bool) -> Page {
        let mut page = Page::test_page(id);
        page.properties.insert(
            "Name".to_string(),
            Property::Title {
                title: vec![RichText::plain(title)],
            },
        );
        page.properties.insert(
            "Ready".to_string(),
            Property::Checkbox { checkbox: ready },
        );
        page
    }

    fn child_page_block(id: &str, title: &str) -> Block {
        Block {
            id: id.to_string(),
            has_children: false,
            kind: BlockKind::ChildPage {
                title: title.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_configured_database_filters_ready() {
        let mut store = FakeStore::new();
        store.add_database(
            "db1",
            vec![
                ready_page("p1", "Ready Post", true),
                ready_page("p2", "Draft", false),
                ready_page("p3", "Another Ready", true),
            ],
        );

        let locator = PageLocator::new(&store);
        let discovered = locator.discover(&config_with_database("db1")).await;

        assert!(discovered.collection_mode);
        assert_eq!(discovered.page_ids, vec!["p1", "p3"]);
        assert_eq!(discovered.metadata.len(), 2);
        assert_eq!(discovered.metadata[0].title, "Ready Post");
    }

    #[tokio::test]
    async fn test_query_failure_falls_back_to_search() {
        let mut store = FakeStore::new();
        // No database registered, so query_database returns 404
        let mut in_db = ready_page("p1", "In Collection", true);
        in_db.parent = Some(Parent::DatabaseId {
            database_id: "db1".to_string(),
        });
        let mut other = ready_page("p2", "Elsewhere", true);
        other.parent = Some(Parent::DatabaseId {
            database_id: "db2".to_string(),
        });
        store.add_search_results(vec![in_db, other]);

        let locator = PageLocator::new(&store);
        let discovered = locator.discover(&config_with_database("db1")).await;

        assert_eq!(discovered.page_ids, vec!["p1"]);
    }

    #[tokio::test]
    async fn test_embedded_database_discovered_from_page() {
        let mut store = FakeStore::new();
        store.add_children(
            "parent",
            vec![Block {
                id: "db-block".to_string(),
                has_children: false,
                kind: BlockKind::ChildDatabase {
                    title: "Articles".to_string(),
                },
            }],
        );
        store.add_database("db-block", vec![ready_page("p1", "Post", true)]);

        let locator = PageLocator::new(&store);
        let discovered = locator.discover(&config_with_pages(&["parent"])).await;

        assert!(discovered.collection_mode);
        assert_eq!(discovered.page_ids, vec!["p1"]);
    }

    #[tokio::test]
    async fn test_multiple_page_ids_export_directly() {
        let store = FakeStore::new();

        let locator = PageLocator::new(&store);
        let discovered = locator.discover(&config_with_pages(&["a", "b", "c"])).await;

        assert!(!discovered.collection_mode);
        assert_eq!(discovered.page_ids, vec!["a", "b", "c"]);
        assert!(discovered.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_single_page_finds_child_blocks() {
        let mut store = FakeStore::new();
        store.add_children(
            "parent",
            vec![
                child_page_block("c1", "First"),
                Block {
                    id: "x".to_string(),
                    has_children: false,
                    kind: BlockKind::Divider,
                },
                child_page_block("c2", "Second"),
            ],
        );

        let locator = PageLocator::new(&store);
        let discovered = locator.discover(&config_with_pages(&["parent"])).await;

        assert_eq!(discovered.page_ids, vec!["c1", "c2"]);
    }

    #[tokio::test]
    async fn test_single_page_falls_back_to_search() {
        let mut store = FakeStore::new();
        let mut child = ready_page("c1", "Found via search", true);
        child.parent = Some(Parent::PageId {
            page_id: "parent".to_string(),
        });
        let mut unrelated = ready_page("c2", "Other", true);
        unrelated.parent = Some(Parent::PageId {
            page_id: "someone-else".to_string(),
        });
        store.add_search_results(vec![child, unrelated]);

        let locator = PageLocator::new(&store);
        let discovered = locator.discover(&config_with_pages(&["parent"])).await;

        assert_eq!(discovered.page_ids, vec!["c1"]);
    }

    #[tokio::test]
    async fn test_nothing_configured_is_clean_empty() {
        let store = FakeStore::new();

        let locator = PageLocator::new(&store);
        let discovered = locator.discover(&Config::default()).await;

        assert!(discovered.page_ids.is_empty());
        assert!(!discovered.collection_mode);
    }
}
