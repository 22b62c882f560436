//! Progress events emitted by the orchestrator.
//!
//! Inject an [`Arc<dyn JobProgressCallback>`] via
//! [`crate::config::AppConfigBuilder::progress_callback`] to observe a job as
//! it runs. Each transition produces one [`JobEvent`] carrying the phase, the
//! percentage, the status line and a snapshot of the slides rendered so far,
//! so a viewer can show partial results before the whole deck is ready.
//!
//! [`ChannelProgress`] forwards events into a Tokio channel; the streaming API
//! and the HTTP server are built on it.
//!
//! # Example
//!
//! ```rust
//! use edgequake_minutes2slides::{AppConfig, JobEvent, JobProgressCallback};
//! use std::sync::{Arc, Mutex};
//!
//! struct Recorder(Mutex<Vec<u8>>);
//!
//! impl JobProgressCallback for Recorder {
//!     fn on_event(&self, event: &JobEvent) {
//!         self.0.lock().unwrap().push(event.progress);
//!     }
//! }
//!
//! let config = AppConfig::builder()
//!     .progress_callback(Arc::new(Recorder(Mutex::new(Vec::new()))))
//!     .build()
//!     .unwrap();
//! ```

use crate::agenda::{AgendaItem, JobPhase, JobState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One observable orchestrator transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEvent {
    #[serde(flatten)]
    pub phase: JobPhase,
    pub progress: u8,
    pub status: String,
    /// Accumulated slides at the moment of the event.
    pub items: Vec<AgendaItem>,
}

impl From<&JobState> for JobEvent {
    fn from(state: &JobState) -> Self {
        Self {
            phase: state.phase.clone(),
            progress: state.progress,
            status: state.current_step.clone(),
            items: state.items.clone(),
        }
    }
}

/// Receives orchestrator events.
///
/// The orchestrator is single-threaded, so events arrive strictly in order.
/// Implementations must still be `Send + Sync` because jobs may run on any
/// Tokio worker.
pub trait JobProgressCallback: Send + Sync {
    /// Called after every state transition, including the terminal one.
    fn on_event(&self, event: &JobEvent);
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {
    fn on_event(&self, _event: &JobEvent) {}
}

/// Convenience alias matching the type stored in [`crate::config::AppConfig`].
pub type ProgressCallback = Arc<dyn JobProgressCallback>;

/// Forwards every event into an unbounded Tokio channel.
///
/// Sending never blocks the job; events are dropped silently once the
/// receiver is gone (the viewer disconnected).
pub struct ChannelProgress {
    tx: mpsc::UnboundedSender<JobEvent>,
}

impl ChannelProgress {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<JobEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl JobProgressCallback for ChannelProgress {
    fn on_event(&self, event: &JobEvent) {
        let _ = self.tx.send(event.clone());
    }
}
