//! Error types for the edgequake-minutes2slides library.
//!
//! Two types reflect two distinct failure modes:
//!
//! * [`SlideDeckError`]: a single stage failed (bad URL, upstream refused,
//!   model reply unusable). Every stage returns it directly.
//!
//! * [`JobFailure`]: the orchestrator halted. It wraps the first
//!   [`SlideDeckError`] together with the slides that were already rendered
//!   before the failure, so callers never lose partial results.

use crate::agenda::AgendaItem;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pipeline stages.
#[derive(Debug, Error)]
pub enum SlideDeckError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The caller supplied a malformed or missing field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required setting (the API key) is absent.
    #[error("{var} is not set.\nExport it or add it to a .env file.")]
    MissingConfiguration { var: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The export endpoint answered 404.
    #[error("Document not found")]
    NotFound,

    /// The export endpoint answered 403.
    #[error(
        "Access denied. Set the document's sharing to \"Anyone with the link can view\" and try again."
    )]
    Forbidden,

    /// Any other non-success status, or an error reported by the generative API.
    #[error("{message}")]
    UpstreamError {
        status: Option<u16>,
        message: String,
    },

    /// The request never received a status (DNS, TLS, connection reset).
    #[error("Request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The document exported to an empty or whitespace-only body.
    #[error("The document is empty")]
    EmptyContent,

    // ── Model reply errors ────────────────────────────────────────────────
    /// The summarizer reply held no parseable `{ agendas: [...] }` object.
    #[error("The model did not return valid JSON: {detail}")]
    MalformedResponse { detail: String },

    /// The generative API returned no candidates.
    #[error("No image was generated (the response had no candidates)")]
    NoCandidates,

    /// The first candidate carried no content parts.
    #[error("The response contains no content parts")]
    NoParts,

    /// None of the content parts was an image.
    #[error("No image data found in the response")]
    NoImagePart,

    // ── Export errors ─────────────────────────────────────────────────────
    /// No agenda item carried a slide image.
    #[error("There are no rendered slides to export")]
    NothingToExport,

    /// A slide image could not be decoded.
    #[error("Slide {index} has an unreadable image: {detail}")]
    InvalidImage { index: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium for your platform or pass --pdfium-lib /path/to/libpdfium.\n\
Prebuilt binaries: https://github.com/bblanchon/pdfium-binaries\n"
    )]
    PdfiumBindingFailed(String),

    /// pdfium rejected a page or the document while assembling it.
    #[error("PDF assembly failed: {0}")]
    ExportFailed(String),

    /// Could not create or write the output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SlideDeckError {
    /// HTTP status tier for this error: 400 for caller mistakes, 500 otherwise.
    pub fn status_code(&self) -> u16 {
        match self {
            SlideDeckError::InvalidInput(_) => 400,
            _ => 500,
        }
    }

    pub(crate) fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        SlideDeckError::UpstreamError {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn transport(url: &str, err: &reqwest::Error) -> Self {
        SlideDeckError::Transport {
            url: redact_key(url),
            reason: redact_reqwest(err),
        }
    }
}

/// The orchestrator stopped on its first failing stage.
///
/// `completed` holds every slide published before the failure, in order.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct JobFailure {
    #[source]
    pub error: SlideDeckError,
    pub completed: Vec<AgendaItem>,
}

static KEY_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"([?&]key=)[^&\s)]*").unwrap());

/// Mask every `key=` query value in `text` (a URL or a rendered error that
/// embeds one) so API keys never reach logs or messages.
pub(crate) fn redact_key(text: &str) -> String {
    KEY_PARAM.replace_all(text, "${1}***").into_owned()
}

/// Render a reqwest error without the API key it may carry in its URL.
pub(crate) fn redact_reqwest(err: &reqwest::Error) -> String {
    redact_key(&err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_mentions_link_sharing() {
        let msg = SlideDeckError::Forbidden.to_string();
        assert!(msg.contains("Anyone with the link"), "got: {msg}");
    }

    #[test]
    fn upstream_display_is_the_upstream_message() {
        let e = SlideDeckError::upstream(Some(502), "Failed to fetch the document: 502");
        assert_eq!(e.to_string(), "Failed to fetch the document: 502");
    }

    #[test]
    fn only_invalid_input_is_a_client_error() {
        assert_eq!(SlideDeckError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(SlideDeckError::NotFound.status_code(), 500);
        assert_eq!(
            SlideDeckError::MissingConfiguration {
                var: "GEMINI_API_KEY".into()
            }
            .status_code(),
            500
        );
        assert_eq!(SlideDeckError::NoImagePart.status_code(), 500);
    }

    #[test]
    fn job_failure_displays_inner_error() {
        let f = JobFailure {
            error: SlideDeckError::NoCandidates,
            completed: vec![],
        };
        assert!(f.to_string().contains("no candidates"));
    }

    #[test]
    fn redact_key_hides_api_key() {
        assert_eq!(
            redact_key("https://x/v1beta/models/m:generateContent?key=secret"),
            "https://x/v1beta/models/m:generateContent?key=***"
        );
        assert_eq!(redact_key("https://x/?key=secret&alt=json"), "https://x/?key=***&alt=json");
        assert_eq!(redact_key("https://x/plain"), "https://x/plain");
    }

    #[test]
    fn redact_key_masks_url_embedded_in_message() {
        let msg = "error sending request for url \
                   (http://127.0.0.1:1/v1beta/models/m:generateContent?key=SUPERSECRETKEY)";
        let redacted = redact_key(msg);
        assert!(!redacted.contains("SUPERSECRETKEY"), "{redacted}");
        assert!(redacted.ends_with("?key=***)"), "{redacted}");
    }
}
