//! HTTP blob store client
//!
//! Talks to an S3-compatible HTTP gateway: objects live at
//! `{base_url}/{key}` and listing uses the ListObjectsV2 query shape.
//! Authentication (signing, credentials) is the gateway's concern; this
//! client only carries an optional bearer token.

use super::{BlobError, BlobResult, BlobStore};
use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Configuration for [`HttpBlobStore`].
#[derive(Debug, Clone)]
pub struct HttpBlobStoreConfig {
    /// Bucket base URL, e.g. `https://store.example.com/my-bucket`
    pub base_url: String,
    /// Optional bearer token sent with every request
    pub token: Option<String>,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
}

impl HttpBlobStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_secs: 30,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Blob store over an S3-compatible HTTP gateway.
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for HttpBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBlobStore")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpBlobStore {
    /// Create a store from the given configuration.
    pub fn new(config: HttpBlobStoreConfig) -> BlobResult<Self> {
        if config.base_url.is_empty() {
            return Err(BlobError::Other("base URL must be provided".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BlobError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn classify_status(key: &str, status: StatusCode) -> BlobError {
        match status {
            StatusCode::NOT_FOUND => BlobError::NotFound(key.to_string()),
            StatusCode::FORBIDDEN => BlobError::AccessDenied(key.to_string()),
            _ => BlobError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            },
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn get(&self, key: &str) -> BlobResult<Vec<u8>> {
        let response = self
            .request(self.client.get(self.object_url(key)))
            .send()
            .await
            .map_err(|e| BlobError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::classify_status(key, status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BlobError::Request(e.to_string()))?;
        debug!(key, bytes = body.len(), "fetched object");
        Ok(body.to_vec())
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> BlobResult<()> {
        let response = self
            .request(self.client.put(self.object_url(key)).body(body))
            .send()
            .await
            .map_err(|e| BlobError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::classify_status(key, status));
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        let response = self
            .request(self.client.head(self.object_url(key)))
            .send()
            .await
            .map_err(|e| BlobError::Request(e.to_string()))?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(Self::classify_status(key, s)),
        }
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        let response = self
            .request(self.client.delete(self.object_url(key)))
            .send()
            .await
            .map_err(|e| BlobError::Request(e.to_string()))?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            s => Err(Self::classify_status(key, s)),
        }
    }

    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>> {
        let url = format!(
            "{}?list-type=2&prefix={}",
            self.base_url,
            urlencode(prefix)
        );
        let response = self
            .request(self.client.get(url))
            .send()
            .await
            .map_err(|e| BlobError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::classify_status(prefix, status));
        }

        let page = response
            .text()
            .await
            .map_err(|e| BlobError::Request(e.to_string()))?;
        Ok(extract_keys(&page))
    }
}

/// Pull `<Key>` values out of a ListObjectsV2 result page.
fn extract_keys(page: &str) -> Vec<String> {
    // The listing schema is stable enough that a pattern match beats a
    // full XML dependency for this one field.
    let re = Regex::new(r"<Key>([^<]+)</Key>").expect("static pattern");
    re.captures_iter(page)
        .map(|c| c[1].to_string())
        .collect()
}

/// Minimal percent-encoding for key prefixes in query strings.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_joins_cleanly() {
        let store = HttpBlobStore::new(HttpBlobStoreConfig::new("https://s.example.com/bucket/"))
            .unwrap();
        assert_eq!(
            store.object_url("/centroids/databases.json"),
            "https://s.example.com/bucket/centroids/databases.json"
        );
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let err = HttpBlobStore::new(HttpBlobStoreConfig::new("")).unwrap_err();
        assert!(matches!(err, BlobError::Other(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let store = HttpBlobStore::new(
            HttpBlobStoreConfig::new("https://s.example.com/bucket").with_token("secret-token"),
        )
        .unwrap();
        let rendered = format!("{store:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn test_extract_keys_from_listing() {
        let page = r#"<?xml version="1.0"?><ListBucketResult>
            <Contents><Key>centroids/databases.json</Key><Size>120</Size></Contents>
            <Contents><Key>centroids/archive.json</Key><Size>98</Size></Contents>
        </ListBucketResult>"#;
        let keys = extract_keys(page);
        assert_eq!(
            keys,
            vec!["centroids/databases.json", "centroids/archive.json"]
        );
    }

    #[test]
    fn test_urlencode_keeps_path_chars() {
        assert_eq!(urlencode("centroids/a b"), "centroids/a%20b");
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            HttpBlobStore::classify_status("k", StatusCode::NOT_FOUND),
            BlobError::NotFound(_)
        ));
        assert!(matches!(
            HttpBlobStore::classify_status("k", StatusCode::FORBIDDEN),
            BlobError::AccessDenied(_)
        ));
        assert!(matches!(
            HttpBlobStore::classify_status("k", StatusCode::INTERNAL_SERVER_ERROR),
            BlobError::Status { status: 500, .. }
        ));
    }
}
