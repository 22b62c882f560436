//! Data model shared by every stage: agenda items and job state.

use serde::{Deserialize, Serialize};

/// One discrete topic extracted from the minutes.
///
/// Created by the summarizer with `slide_image = None`; the orchestrator
/// attaches the rendered slide as a data URI once the renderer returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    pub title: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_image: Option<String>,
}

impl AgendaItem {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            slide_image: None,
        }
    }

    /// Return a copy of this item carrying the rendered slide.
    pub fn with_slide(mut self, data_uri: impl Into<String>) -> Self {
        self.slide_image = Some(data_uri.into());
        self
    }
}

/// Where the orchestrator currently is.
///
/// The order is strictly linear; `Failed` is reachable from any
/// non-terminal phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum JobPhase {
    Idle,
    FetchingDocument,
    Summarizing,
    RenderingSlide {
        /// 1-based position of the slide being rendered.
        index: usize,
        total: usize,
        title: String,
    },
    Done,
    Failed {
        message: String,
    },
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Done | JobPhase::Failed { .. })
    }

    /// Human-readable status line for this phase.
    pub fn status(&self) -> String {
        match self {
            JobPhase::Idle => String::new(),
            JobPhase::FetchingDocument => "Fetching document...".to_string(),
            JobPhase::Summarizing => "Extracting and summarizing agenda items...".to_string(),
            JobPhase::RenderingSlide {
                index,
                total,
                title,
            } => format!("Generating slide ({index}/{total}): {title}"),
            JobPhase::Done => "Done!".to_string(),
            JobPhase::Failed { message } => message.clone(),
        }
    }
}

/// Progress state owned by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobState {
    pub phase: JobPhase,
    pub current_step: String,
    /// 0–100, never decreases within a job.
    pub progress: u8,
    /// Slides rendered so far, in agenda order.
    pub items: Vec<AgendaItem>,
}

impl Default for JobState {
    fn default() -> Self {
        Self {
            phase: JobPhase::Idle,
            current_step: String::new(),
            progress: 0,
            items: Vec::new(),
        }
    }
}

/// Percentage after the document fetch.
pub const PROGRESS_FETCHED: u8 = 15;
/// Percentage after summarization.
pub const PROGRESS_SUMMARIZED: u8 = 30;

/// Percentage after `completed` of `total` slides are rendered.
///
/// The remaining 70 points are split evenly and rounded half-up.
pub fn slide_progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total);
    let share = (140 * completed + total) / (2 * total);
    PROGRESS_SUMMARIZED + share as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_progress_for_three_items() {
        assert_eq!(slide_progress(1, 3), 53);
        assert_eq!(slide_progress(2, 3), 77);
        assert_eq!(slide_progress(3, 3), 100);
    }

    #[test]
    fn slide_progress_rounds_half_up() {
        // 70 / 4 = 17.5 → 18
        assert_eq!(slide_progress(1, 4), 48);
        assert_eq!(slide_progress(4, 4), 100);
    }

    #[test]
    fn slide_progress_single_and_empty() {
        assert_eq!(slide_progress(1, 1), 100);
        assert_eq!(slide_progress(0, 0), 100);
    }

    #[test]
    fn agenda_item_serializes_camel_case() {
        let item = AgendaItem::new("Budget", "- approve").with_slide("data:image/png;base64,AA==");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["slideImage"], "data:image/png;base64,AA==");

        let bare = serde_json::to_value(AgendaItem::new("a", "b")).unwrap();
        assert!(bare.get("slideImage").is_none());
    }

    #[test]
    fn rendering_status_names_slide() {
        let phase = JobPhase::RenderingSlide {
            index: 2,
            total: 5,
            title: "Timeline".into(),
        };
        assert_eq!(phase.status(), "Generating slide (2/5): Timeline");
        assert!(!phase.is_terminal());
        assert!(JobPhase::Done.is_terminal());
    }
}
