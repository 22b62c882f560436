//! Document fetching: shared-document URL → plain text.
//!
//! The document id is the path segment following `/d/`. The plain-text export
//! of that id is requested with a single GET; nothing is sent upstream when
//! the URL has no id.

use super::DocumentSource;
use crate::config::AppConfig;
use crate::error::SlideDeckError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use tracing::{debug, info};

static DOC_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/d/([A-Za-z0-9_-]+)").unwrap());

/// Extract the document identifier from a shared-document URL.
pub fn extract_document_id(document_url: &str) -> Result<&str, SlideDeckError> {
    if document_url.trim().is_empty() {
        return Err(SlideDeckError::InvalidInput(
            "A document URL is required".into(),
        ));
    }
    DOC_ID
        .captures(document_url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            SlideDeckError::InvalidInput(format!(
                "'{document_url}' is not a valid shared document URL"
            ))
        })
}

/// Plain-text export URL for a document id.
pub fn export_url(docs_base_url: &str, document_id: &str) -> String {
    format!("{docs_base_url}/document/d/{document_id}/export?format=txt")
}

/// Fetches documents through the host's plain-text export endpoint.
#[derive(Clone)]
pub struct ExportFetcher {
    http: reqwest::Client,
    docs_base_url: String,
}

impl ExportFetcher {
    pub fn new(config: &AppConfig) -> Result<Self, SlideDeckError> {
        Ok(Self {
            http: config.http_client()?,
            docs_base_url: config.docs_base_url.clone(),
        })
    }

    /// Download the plain-text export of `document_url`.
    pub async fn fetch(&self, document_url: &str) -> Result<String, SlideDeckError> {
        let id = extract_document_id(document_url)?;
        let url = export_url(&self.docs_base_url, id);
        info!("Fetching document {}", id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SlideDeckError::transport(&url, &e))?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(SlideDeckError::NotFound),
            StatusCode::FORBIDDEN => return Err(SlideDeckError::Forbidden),
            s => {
                return Err(SlideDeckError::upstream(
                    Some(s.as_u16()),
                    format!("Failed to fetch the document: {}", s.as_u16()),
                ))
            }
        }

        let content = response
            .text()
            .await
            .map_err(|e| SlideDeckError::transport(&url, &e))?;

        if content.trim().is_empty() {
            return Err(SlideDeckError::EmptyContent);
        }

        debug!("Fetched {} bytes of text", content.len());
        Ok(content)
    }
}

#[async_trait]
impl DocumentSource for ExportFetcher {
    async fn fetch_text(&self, document_url: &str) -> Result<String, SlideDeckError> {
        self.fetch(document_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_edit_url() {
        let id = extract_document_id(
            "https://docs.google.com/document/d/1AbC-d_E9/edit?usp=sharing",
        )
        .unwrap();
        assert_eq!(id, "1AbC-d_E9");
    }

    #[test]
    fn extracts_first_matching_segment() {
        let id = extract_document_id("https://host/d/first/d/second").unwrap();
        assert_eq!(id, "first");
    }

    #[test]
    fn export_url_is_deterministic() {
        assert_eq!(
            export_url("https://docs.google.com", "abc123"),
            "https://docs.google.com/document/d/abc123/export?format=txt"
        );
    }

    #[test]
    fn rejects_urls_without_id() {
        for bad in [
            "",
            "   ",
            "https://docs.google.com/document/",
            "https://example.com/doc?id=42",
            "not a url",
        ] {
            assert!(
                matches!(extract_document_id(bad), Err(SlideDeckError::InvalidInput(_))),
                "expected InvalidInput for {bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn invalid_url_never_hits_the_network() {
        // An unroutable base would surface as Transport if a request were sent.
        let config = AppConfig::builder()
            .docs_base_url("http://127.0.0.1:1")
            .build()
            .unwrap();
        let fetcher = ExportFetcher::new(&config).unwrap();
        let err = fetcher.fetch("https://example.com/nothing").await.unwrap_err();
        assert!(matches!(err, SlideDeckError::InvalidInput(_)));
    }
}
