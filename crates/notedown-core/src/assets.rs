//! Content-addressed image download cache
//!
//! Remote images are materialized into a local directory under a name
//! derived from the URL, so re-running an export never downloads the same
//! image twice. Failures degrade to the original remote URL; an export is
//! never aborted by a broken image.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

/// Extensions kept as-is; anything else becomes `.png`
const KNOWN_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

/// Download timeout per image
const DOWNLOAD_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Local image store keyed by URL content address
pub struct AssetStore {
    dir: PathBuf,
    token: Option<String>,
    client: reqwest::Client,
    // URLs resolved during this run, saving repeat filesystem checks
    resolved: Mutex<HashMap<String, String>>,
}

impl AssetStore {
    /// Create a store writing into `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .context("Failed to build image download client")?;

        Ok(Self {
            dir: dir.into(),
            token: None,
            client,
            resolved: Mutex::new(HashMap::new()),
        })
    }

    /// Attach a token for Notion-hosted images
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Resolve a remote image URL to a local `images/<name>` path
    ///
    /// Returns the local relative path on success (downloading at most
    /// once per unique URL), or the original URL when the download fails
    /// or the response is not an image.
    pub async fn materialize(&self, url: &str) -> String {
        if let Some(hit) = self.resolved.lock().unwrap().get(url) {
            return hit.clone();
        }

        let result = match self.fetch(url).await {
            Ok(local) => local,
            Err(err) => {
                warn!(url, error = %err, "image download failed, keeping remote URL");
                url.to_string()
            }
        };

        self.resolved
            .lock()
            .unwrap()
            .insert(url.to_string(), result.clone());
        result
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let filename = format!("{}{}", content_address(url), extension_for(url));
        let local_path = self.dir.join(&filename);
        let relative = format!("images/{}", filename);

        if local_path.exists() {
            debug!(filename, "image already materialized");
            return Ok(relative);
        }

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create images directory: {:?}", self.dir))?;

        let mut request = self.client.get(url);
        if let (Some(token), true) = (&self.token, is_notion_hosted(url)) {
            request = request
                .bearer_auth(token)
                .header("Cookie", format!("token_v2={}", token));
        }

        let response = request.send().await?.error_for_status()?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !content_type.starts_with("image/") {
            anyhow::bail!("URL did not return an image (content-type: {})", content_type);
        }

        let bytes = response.bytes().await?;
        std::fs::write(&local_path, &bytes)
            .with_context(|| format!("Failed to write image: {:?}", local_path))?;

        debug!(filename, bytes = bytes.len(), "downloaded image");
        Ok(relative)
    }
}

/// First 12 hex chars of the URL hash; stable across runs
fn content_address(url: &str) -> String {
    blake3::hash(url.as_bytes()).to_hex()[..12].to_string()
}

/// Extension from the percent-decoded URL path, normalized to the allowlist
fn extension_for(url: &str) -> &'static str {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => percent_decode_str(parsed.path()).decode_utf8_lossy().into_owned(),
        Err(_) => return ".png",
    };

    let ext = match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => path[dot..].to_lowercase(),
        _ => return ".png",
    };

    KNOWN_EXTENSIONS
        .iter()
        .find(|&&known| known == ext)
        .copied()
        .unwrap_or(".png")
}

/// Notion-hosted images need token auth to download
fn is_notion_hosted(url: &str) -> bool {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
        .map(|host| {
            host == "notion.so"
                || host.ends_with(".notion.so")
                || host == "notion-static.com"
                || host.ends_with(".notion-static.com")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_address_is_stable() {
        let a = content_address("https://example.com/pic.png");
        let b = content_address("https://example.com/pic.png");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_content_address_differs_per_url() {
        assert_ne!(
            content_address("https://example.com/a.png"),
            content_address("https://example.com/b.png")
        );
    }

    #[test]
    fn test_extension_from_path() {
        assert_eq!(extension_for("https://x.com/photo.jpg"), ".jpg");
        assert_eq!(extension_for("https://x.com/photo.JPEG"), ".jpeg");
        assert_eq!(extension_for("https://x.com/image.webp?w=100"), ".webp");
    }

    #[test]
    fn test_extension_percent_decoded() {
        assert_eq!(extension_for("https://x.com/my%20pic.gif"), ".gif");
    }

    #[test]
    fn test_unknown_extension_defaults_to_png() {
        assert_eq!(extension_for("https://x.com/archive.tar.gz"), ".png");
        assert_eq!(extension_for("https://x.com/noext"), ".png");
        assert_eq!(extension_for("not a url"), ".png");
    }

    #[test]
    fn test_notion_hosted_detection() {
        assert!(is_notion_hosted("https://www.notion.so/image/abc"));
        assert!(is_notion_hosted("https://s3.us-west-2.notion-static.com/x.png"));
        assert!(!is_notion_hosted("https://example.com/notion.so/x.png"));
        assert!(!is_notion_hosted("https://example.com/pic.png"));
    }

    #[tokio::test]
    async fn test_materialize_reuses_existing_file() {
        let tmp = TempDir::new().unwrap();
        let store = AssetStore::new(tmp.path()).unwrap();

        let url = "https://example.com/cached.png";
        let filename = format!("{}.png", content_address(url));
        std::fs::write(tmp.path().join(&filename), b"fake image data").unwrap();

        // Resolves to the local path without any network access
        let local = store.materialize(url).await;
        assert_eq!(local, format!("images/{}", filename));

        // Second call hits the in-run cache
        let again = store.materialize(url).await;
        assert_eq!(again, local);
    }

    #[tokio::test]
    async fn test_materialize_failure_returns_original_url() {
        let tmp = TempDir::new().unwrap();
        let store = AssetStore::new(tmp.path()).unwrap();

        // Unroutable address, download fails fast
        let url = "http://127.0.0.1:1/missing.png";
        let result = store.materialize(url).await;
        assert_eq!(result, url);
    }
}
