//! # edgequake-minutes2slides
//!
//! Turn a shared document of meeting minutes into a generated slide deck.
//!
//! Summarisation and image synthesis are delegated to a generative-language
//! API; this crate orchestrates the calls, reports progress as it goes and
//! assembles the returned images into one PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! shared document URL
//!  │
//!  ├─ 1. Fetch      extract the document id, download the plain-text export
//!  ├─ 2. Summarize  text model → { agendas: [{ title, summary }] }
//!  ├─ 3. Render     image model, one 1920×1080 slide per agenda item, in order
//!  └─ 4. Export     one PDF page per rendered slide (pdfium)
//! ```
//!
//! Steps 1–3 are driven by the [`Orchestrator`], which publishes a
//! [`JobEvent`] (phase, percentage, status line, slides so far) after every
//! transition so partial results are visible before the deck is complete.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_minutes2slides::{generate_deck_to_file, AppConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY
//!     let config = AppConfig::from_env();
//!     let deck = generate_deck_to_file(
//!         "https://docs.google.com/document/d/1AbC/edit",
//!         "meeting-slides.pdf",
//!         &config,
//!     )
//!     .await?;
//!     eprintln!("{} pages", deck.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | The axum HTTP surface in [`server`] |
//! | `cli`    | on      | The `minutes2slides` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod agenda;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod progress;
pub mod prompts;
#[cfg(feature = "server")]
pub mod server;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use agenda::{AgendaItem, JobPhase, JobState};
pub use config::{AppConfig, AppConfigBuilder, SlideStyle, SummaryStyle};
pub use error::{JobFailure, SlideDeckError};
pub use orchestrator::{generate_deck, generate_deck_to_file, Orchestrator};
pub use pipeline::export::{export_pdf, export_to_file, ExportedDeck, DECK_FILE_NAME};
pub use pipeline::{AgendaSummarizer, DocumentSource, SlideRenderer};
pub use progress::{ChannelProgress, JobEvent, JobProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{generate_stream, JobStream};
