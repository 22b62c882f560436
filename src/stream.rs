//! Streaming job API: observe a job as a `Stream` of [`JobEvent`]s.
//!
//! The job runs on its own Tokio task and reports through a
//! [`ChannelProgress`]; the returned stream ends right after the terminal
//! event (`Done` or `Failed`). Dropping the stream does not cancel the job,
//! it only stops observation.

use crate::config::AppConfig;
use crate::error::SlideDeckError;
use crate::orchestrator::Orchestrator;
use crate::progress::{ChannelProgress, JobEvent};
use std::pin::Pin;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of job events.
pub type JobStream = Pin<Box<dyn Stream<Item = JobEvent> + Send>>;

/// Start a job for `document_url` and stream its events.
///
/// The stream replaces any callback set on `config`.
///
/// # Errors
/// Only when the HTTP clients cannot be built; every job failure arrives as
/// a `Failed` event instead.
///
/// # Example
/// ```rust,no_run
/// use edgequake_minutes2slides::{generate_stream, AppConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AppConfig::from_env();
/// let mut events = generate_stream("https://docs.google.com/document/d/abc/edit", &config)?;
/// while let Some(ev) = events.next().await {
///     println!("{:>3}% {} ({} slides)", ev.progress, ev.status, ev.items.len());
/// }
/// # Ok(())
/// # }
/// ```
pub fn generate_stream(
    document_url: impl Into<String>,
    config: &AppConfig,
) -> Result<JobStream, SlideDeckError> {
    let orchestrator = Orchestrator::from_config(config)?;
    Ok(run_stream(orchestrator, document_url.into()))
}

/// Stream the events of an already-wired orchestrator.
pub fn run_stream(orchestrator: Orchestrator, document_url: String) -> JobStream {
    let (progress, rx) = ChannelProgress::new();
    let mut orchestrator = orchestrator.with_progress_callback(progress);

    tokio::spawn(async move {
        // The outcome is already reported as the terminal event.
        let outcome = orchestrator.run(&document_url).await;
        info!("Streamed job finished (ok = {})", outcome.is_ok());
    });

    Box::pin(UnboundedReceiverStream::new(rx))
}
