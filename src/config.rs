//! Configuration for the minutes-to-slides pipeline.
//!
//! Every knob lives in [`AppConfig`], built via [`AppConfigBuilder`]. The only
//! value read from the environment is the generative API key
//! (`GEMINI_API_KEY`); everything else has a fixed default that a deployment
//! may override.

use crate::error::SlideDeckError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the generative API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default document host; the export path is appended to it.
pub const DEFAULT_DOCS_BASE_URL: &str = "https://docs.google.com";

/// Default generative-language API host.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration shared by every stage.
///
/// # Example
/// ```rust
/// use edgequake_minutes2slides::{AppConfig, SlideStyle};
///
/// let config = AppConfig::builder()
///     .api_key("test-key")
///     .slide_style(SlideStyle::GraphicRecording)
///     .build()
///     .unwrap();
/// assert_eq!(config.text_model, "gemini-2.0-flash");
/// ```
#[derive(Clone)]
pub struct AppConfig {
    /// Generative API key. `None` makes every model call fail with
    /// [`SlideDeckError::MissingConfiguration`].
    pub api_key: Option<String>,

    /// Model used to summarise the minutes. Default: `gemini-2.0-flash`.
    pub text_model: String,

    /// Model used to draw slides. Default: `gemini-3-pro-image-preview`.
    pub image_model: String,

    /// Which summary prompt to send. Default: [`SummaryStyle::Verbose`].
    pub summary_style: SummaryStyle,

    /// Which slide prompt to send. Default: [`SlideStyle::Structured`].
    pub slide_style: SlideStyle,

    /// Base URL of the document host. Default: `https://docs.google.com`.
    pub docs_base_url: String,

    /// Base URL of the generative API. Default: `https://generativelanguage.googleapis.com`.
    pub gemini_base_url: String,

    /// Per-request timeout. Default: none, a hung upstream call blocks the job.
    pub request_timeout_secs: Option<u64>,

    /// Explicit pdfium shared library. `None` binds to the system library.
    pub pdfium_library_path: Option<PathBuf>,

    /// Receives a [`crate::progress::JobEvent`] on every orchestrator transition.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            text_model: "gemini-2.0-flash".to_string(),
            image_model: "gemini-3-pro-image-preview".to_string(),
            summary_style: SummaryStyle::default(),
            slide_style: SlideStyle::default(),
            docs_base_url: DEFAULT_DOCS_BASE_URL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout_secs: None,
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("summary_style", &self.summary_style)
            .field("slide_style", &self.slide_style)
            .field("docs_base_url", &self.docs_base_url)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn JobProgressCallback>"),
            )
            .finish()
    }
}

impl AppConfig {
    /// Create a new builder for `AppConfig`.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults plus the API key from `GEMINI_API_KEY`, if set and non-empty.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()),
            ..Self::default()
        }
    }

    /// Build the HTTP client every stage uses.
    pub(crate) fn http_client(&self) -> Result<reqwest::Client, SlideDeckError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
            .build()
            .map_err(|e| SlideDeckError::Internal(format!("Failed to build HTTP client: {e}")))
    }
}

/// Builder for [`AppConfig`].
#[derive(Debug)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Replace the key wholesale; `None` clears it.
    pub fn maybe_api_key(mut self, key: Option<String>) -> Self {
        self.config.api_key = key;
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.config.text_model = model.into();
        self
    }

    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.config.image_model = model.into();
        self
    }

    pub fn summary_style(mut self, style: SummaryStyle) -> Self {
        self.config.summary_style = style;
        self
    }

    pub fn slide_style(mut self, style: SlideStyle) -> Self {
        self.config.slide_style = style;
        self
    }

    pub fn docs_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.docs_base_url = url.into();
        self
    }

    pub fn gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gemini_base_url = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<AppConfig, SlideDeckError> {
        let c = &mut self.config;
        for (name, url) in [
            ("docs_base_url", &mut c.docs_base_url),
            ("gemini_base_url", &mut c.gemini_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SlideDeckError::InvalidConfig(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
            while url.ends_with('/') {
                url.pop();
            }
        }
        if c.text_model.trim().is_empty() || c.image_model.trim().is_empty() {
            return Err(SlideDeckError::InvalidConfig(
                "Model names must not be empty".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(SlideDeckError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Summary prompt variant, fixed per deployment.
///
/// | Variant | Titles | Summary | Item cap |
/// |---------|--------|---------|----------|
/// | Verbose | free | 3–5 bullet points | none |
/// | Compact | ≤10 chars | ≤3 points of ≤20 chars | 5 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryStyle {
    #[default]
    Verbose,
    Compact,
}

/// Slide prompt variant, fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideStyle {
    /// Business slide: bullet text on one side, a diagram on the other.
    #[default]
    Structured,
    /// Single-pane hand-drawn visual summary.
    GraphicRecording,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = AppConfig::default();
        assert_eq!(c.image_model, "gemini-3-pro-image-preview");
        assert_eq!(c.summary_style, SummaryStyle::Verbose);
        assert_eq!(c.slide_style, SlideStyle::Structured);
        assert!(c.request_timeout_secs.is_none());
    }

    #[test]
    fn build_trims_trailing_slashes() {
        let c = AppConfig::builder()
            .docs_base_url("http://127.0.0.1:9000//")
            .build()
            .unwrap();
        assert_eq!(c.docs_base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn build_rejects_non_http_base_url() {
        let err = AppConfig::builder()
            .gemini_base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, SlideDeckError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_key() {
        let c = AppConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
