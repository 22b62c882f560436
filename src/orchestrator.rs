//! The job orchestrator: fetch → summarize → render each slide, in order.
//!
//! The orchestrator is an explicit state machine over [`JobPhase`]. Each
//! stage is awaited to completion before the next starts and slides are
//! rendered one at a time, so progress and partial results are published in
//! a simple, total order. After each slide succeeds the accumulated list is
//! published through the [`JobProgressCallback`]; a failure stops the job
//! without discarding what was already rendered.
//!
//! Progress milestones: 15 after the fetch, 30 after summarization, then
//! `30 + round(70·k/N)` after the k-th of N slides; `Done` is always 100.

use crate::agenda::{slide_progress, AgendaItem, JobPhase, JobState, PROGRESS_FETCHED, PROGRESS_SUMMARIZED};
use crate::config::AppConfig;
use crate::error::{JobFailure, SlideDeckError};
use crate::pipeline::export::{export_to_file, ExportedDeck};
use crate::pipeline::fetch::ExportFetcher;
use crate::pipeline::slide::GeminiSlideRenderer;
use crate::pipeline::summarize::GeminiSummarizer;
use crate::pipeline::{AgendaSummarizer, DocumentSource, SlideRenderer};
use crate::progress::{JobEvent, ProgressCallback};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Drives one job at a time through the three network stages.
pub struct Orchestrator {
    source: Arc<dyn DocumentSource>,
    summarizer: Arc<dyn AgendaSummarizer>,
    renderer: Arc<dyn SlideRenderer>,
    callback: Option<ProgressCallback>,
    state: JobState,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        summarizer: Arc<dyn AgendaSummarizer>,
        renderer: Arc<dyn SlideRenderer>,
    ) -> Self {
        Self {
            source,
            summarizer,
            renderer,
            callback: None,
            state: JobState::default(),
        }
    }

    /// Wire the real HTTP stages and the configured progress callback.
    pub fn from_config(config: &AppConfig) -> Result<Self, SlideDeckError> {
        let mut orchestrator = Self::new(
            Arc::new(ExportFetcher::new(config)?),
            Arc::new(GeminiSummarizer::new(config)?),
            Arc::new(GeminiSlideRenderer::new(config)?),
        );
        orchestrator.callback = config.progress_callback.clone();
        Ok(orchestrator)
    }

    pub fn with_progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.callback = Some(cb);
        self
    }

    /// Current phase, progress and accumulated slides.
    pub fn state(&self) -> &JobState {
        &self.state
    }

    fn publish(&self) {
        if let Some(ref cb) = self.callback {
            cb.on_event(&JobEvent::from(&self.state));
        }
    }

    fn advance(&mut self, phase: JobPhase, progress: u8) {
        self.state.current_step = phase.status();
        self.state.phase = phase;
        self.state.progress = self.state.progress.max(progress);
        self.publish();
    }

    fn fail(&mut self, error: SlideDeckError) -> JobFailure {
        error!("Job failed during {:?}: {}", self.state.phase, error);
        let message = error.to_string();
        self.state.current_step = message.clone();
        self.state.phase = JobPhase::Failed { message };
        self.publish();
        JobFailure {
            error,
            completed: self.state.items.clone(),
        }
    }

    /// Run a full job for `document_url`.
    ///
    /// Any previous job's state is discarded first. On success returns every
    /// agenda item with its slide attached, in agenda order.
    pub async fn run(&mut self, document_url: &str) -> Result<Vec<AgendaItem>, JobFailure> {
        let start = Instant::now();
        self.state = JobState::default();
        info!("Starting job for {}", document_url);

        self.advance(JobPhase::FetchingDocument, 0);
        let content = match self.source.fetch_text(document_url).await {
            Ok(c) => c,
            Err(e) => return Err(self.fail(e)),
        };

        self.advance(JobPhase::Summarizing, PROGRESS_FETCHED);
        let agendas = match self.summarizer.summarize(&content).await {
            Ok(a) => a,
            Err(e) => return Err(self.fail(e)),
        };

        let total = agendas.len();
        for (i, agenda) in agendas.into_iter().enumerate() {
            let progress = if i == 0 {
                PROGRESS_SUMMARIZED
            } else {
                slide_progress(i, total)
            };
            self.advance(
                JobPhase::RenderingSlide {
                    index: i + 1,
                    total,
                    title: agenda.title.clone(),
                },
                progress,
            );

            let image = match self.renderer.render(&agenda.title, &agenda.summary).await {
                Ok(img) => img,
                Err(e) => return Err(self.fail(e)),
            };
            self.state.items.push(agenda.with_slide(image));
            self.state.progress = slide_progress(i + 1, total);
            info!("Slide {}/{} done ({}%)", i + 1, total, self.state.progress);
        }

        self.advance(JobPhase::Done, 100);
        info!(
            "Job complete: {} slides in {}ms",
            total,
            start.elapsed().as_millis()
        );
        Ok(self.state.items.clone())
    }
}

/// Run a job with the real HTTP stages built from `config`.
pub async fn generate_deck(
    document_url: impl AsRef<str>,
    config: &AppConfig,
) -> Result<Vec<AgendaItem>, JobFailure> {
    let mut orchestrator = Orchestrator::from_config(config).map_err(|error| JobFailure {
        error,
        completed: Vec::new(),
    })?;
    orchestrator.run(document_url.as_ref()).await
}

/// Run a job and write the finished deck to `output_path`.
pub async fn generate_deck_to_file(
    document_url: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &AppConfig,
) -> Result<ExportedDeck, JobFailure> {
    let items = generate_deck(document_url, config).await?;
    match export_to_file(&items, output_path, config).await {
        Ok(deck) => Ok(deck),
        Err(error) => Err(JobFailure {
            error,
            completed: items,
        }),
    }
}
