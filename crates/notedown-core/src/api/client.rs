//! Notion HTTP client
//!
//! [`NotionClient`] implements [`DocumentStore`] against the live Notion
//! API. The trait exists so exporters and renderers can be driven by an
//! in-memory store in tests.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::types::{Block, Page, Paginated};

/// Notion API version header value
const NOTION_VERSION: &str = "2022-06-28";

/// Request timeout for API calls
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Read access to a paginated document store
///
/// All listing operations take an optional cursor and return one page of
/// results; callers loop until `has_more` is false. See
/// [`fetch_all_children`](super::fetch_all_children) for the draining helper.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Retrieve a single page with its properties
    async fn retrieve_page(&self, page_id: &str) -> ApiResult<Page>;

    /// List one page of direct children of a page or block
    async fn list_children(
        &self,
        node_id: &str,
        cursor: Option<&str>,
    ) -> ApiResult<Paginated<Block>>;

    /// Query one page of entries from a database
    async fn query_database(
        &self,
        database_id: &str,
        cursor: Option<&str>,
    ) -> ApiResult<Paginated<Page>>;

    /// Search one page of pages visible to the integration
    async fn search_pages(&self, cursor: Option<&str>) -> ApiResult<Paginated<Page>>;
}

/// HTTP client for the Notion API
pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl NotionClient {
    /// Create a client authenticated with an integration token
    pub fn new(token: impl Into<String>) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("Mozilla/5.0 (compatible; notedown/1.0)")
            .build()?;

        Ok(Self {
            client,
            base_url: crate::config::DEFAULT_API_BASE_URL.to_string(),
            token: token.into(),
        })
    }

    /// Override the API base URL (used to point at a test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Access token for authenticated asset downloads
    pub fn token(&self) -> &str {
        &self.token
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, endpoint))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    /// Check status, then decode the body
    ///
    /// Decoding from the body text rather than `Response::json` keeps the
    /// endpoint name attached to both failure modes.
    async fn decode<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait]
impl DocumentStore for NotionClient {
    async fn retrieve_page(&self, page_id: &str) -> ApiResult<Page> {
        let endpoint = format!("/pages/{}", page_id);
        debug!(page_id, "retrieving page");

        let response = self
            .request(reqwest::Method::GET, &endpoint)
            .send()
            .await?;
        Self::decode(&endpoint, response).await
    }

    async fn list_children(
        &self,
        node_id: &str,
        cursor: Option<&str>,
    ) -> ApiResult<Paginated<Block>> {
        let endpoint = format!("/blocks/{}/children", node_id);
        debug!(node_id, ?cursor, "listing children");

        let mut request = self
            .request(reqwest::Method::GET, &endpoint)
            .query(&[("page_size", "100")]);
        if let Some(cursor) = cursor {
            request = request.query(&[("start_cursor", cursor)]);
        }

        let response = request.send().await?;
        Self::decode(&endpoint, response).await
    }

    async fn query_database(
        &self,
        database_id: &str,
        cursor: Option<&str>,
    ) -> ApiResult<Paginated<Page>> {
        let endpoint = format!("/databases/{}/query", database_id);
        debug!(database_id, ?cursor, "querying database");

        let mut body = json!({ "page_size": 100 });
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }

        let response = self
            .request(reqwest::Method::POST, &endpoint)
            .json(&body)
            .send()
            .await?;
        Self::decode(&endpoint, response).await
    }

    async fn search_pages(&self, cursor: Option<&str>) -> ApiResult<Paginated<Page>> {
        let endpoint = "/search";
        debug!(?cursor, "searching pages");

        let mut body = json!({
            "filter": { "property": "object", "value": "page" },
            "page_size": 100,
        });
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }

        let response = self
            .request(reqwest::Method::POST, endpoint)
            .json(&body)
            .send()
            .await?;
        Self::decode(endpoint, response).await
    }
}
