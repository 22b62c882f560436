//! Pipeline stages for turning minutes into a slide deck.
//!
//! Each submodule implements exactly one step. The three network-bound steps
//! sit behind traits so the orchestrator can run against the real HTTP
//! clients or against test doubles.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ summarize ──▶ slide × N ──▶ export
//! (export   (text model)  (image model)  (pdfium)
//!  endpoint)
//! ```
//!
//! 1. [`fetch`]     extract the document id and download its plain-text export
//! 2. [`summarize`] ask the text model for `{ agendas: [...] }` and parse it
//! 3. [`slide`]     ask the image model for one slide per agenda item
//! 4. [`export`]    place every slide on its own 1920×1080 PDF page;
//!    runs in `spawn_blocking` because pdfium is not async-safe
//!
//! [`gemini`] holds the request/response types shared by steps 2 and 3.

pub mod export;
pub mod fetch;
pub mod gemini;
pub mod slide;
pub mod summarize;

use crate::agenda::AgendaItem;
use crate::error::SlideDeckError;
use async_trait::async_trait;

/// Retrieves the plain text of a shared document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_text(&self, document_url: &str) -> Result<String, SlideDeckError>;
}

/// Splits document text into ordered agenda items.
#[async_trait]
pub trait AgendaSummarizer: Send + Sync {
    async fn summarize(&self, content: &str) -> Result<Vec<AgendaItem>, SlideDeckError>;
}

/// Draws one slide and returns it as a `data:` URI.
#[async_trait]
pub trait SlideRenderer: Send + Sync {
    async fn render(&self, title: &str, summary: &str) -> Result<String, SlideDeckError>;
}
