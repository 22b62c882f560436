//! Summarization: minutes text → ordered agenda items.
//!
//! The model is told to answer with a bare `{ "agendas": [...] }` object, but
//! replies often arrive wrapped in prose or code fences. The object is taken
//! greedily from the first `{` to the last `}` and parsed as JSON; a reply
//! with no such span, or one that does not parse, is a
//! [`SlideDeckError::MalformedResponse`]. There is no retry.

use super::gemini::{GeminiClient, GenerateContentRequest};
use super::AgendaSummarizer;
use crate::agenda::AgendaItem;
use crate::config::{AppConfig, SummaryStyle};
use crate::error::SlideDeckError;
use crate::prompts::summary_prompt;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

static JSON_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

#[derive(Debug, Deserialize)]
struct AgendaReply {
    agendas: Vec<AgendaEntry>,
}

#[derive(Debug, Deserialize)]
struct AgendaEntry {
    title: String,
    summary: String,
}

/// Parse agenda items out of a free-form model reply.
pub fn parse_agendas(reply: &str) -> Result<Vec<AgendaItem>, SlideDeckError> {
    let span = JSON_SPAN
        .find(reply)
        .ok_or_else(|| SlideDeckError::MalformedResponse {
            detail: "no JSON object in the reply".into(),
        })?;

    let parsed: AgendaReply =
        serde_json::from_str(span.as_str()).map_err(|e| SlideDeckError::MalformedResponse {
            detail: e.to_string(),
        })?;

    Ok(parsed
        .agendas
        .into_iter()
        .map(|a| AgendaItem::new(a.title, a.summary))
        .collect())
}

/// Summarizer backed by the generative text model.
#[derive(Clone)]
pub struct GeminiSummarizer {
    client: GeminiClient,
    model: String,
    style: SummaryStyle,
}

impl GeminiSummarizer {
    pub fn new(config: &AppConfig) -> Result<Self, SlideDeckError> {
        Ok(Self {
            client: GeminiClient::new(config)?,
            model: config.text_model.clone(),
            style: config.summary_style,
        })
    }
}

#[async_trait]
impl AgendaSummarizer for GeminiSummarizer {
    async fn summarize(&self, content: &str) -> Result<Vec<AgendaItem>, SlideDeckError> {
        self.client.ensure_configured()?;
        if content.trim().is_empty() {
            return Err(SlideDeckError::InvalidInput(
                "The minutes content is required".into(),
            ));
        }

        let request = GenerateContentRequest::prompt(summary_prompt(self.style, content));
        let response = self
            .client
            .generate(&self.model, &request, "Summarization failed")
            .await?;
        let reply = response.text()?;
        debug!("Summarizer reply: {} chars", reply.len());

        let agendas = parse_agendas(&reply)?;
        info!("Extracted {} agenda items", agendas.len());
        for (i, a) in agendas.iter().enumerate() {
            debug!("Agenda {}: {} | {}", i + 1, a.title, a.summary);
        }
        Ok(agendas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_object() {
        let items = parse_agendas(
            r#"{"agendas":[{"title":"Budget","summary":"..."},{"title":"Timeline","summary":"..."}]}"#,
        )
        .unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Budget", "Timeline"]);
        assert!(items.iter().all(|i| i.slide_image.is_none()));
    }

    #[test]
    fn parses_object_surrounded_by_prose() {
        let reply = "Sure! Here is the result:\n```json\n{\"agendas\":[{\"title\":\"A\",\"summary\":\"- x\\n- y\"}]}\n```\nLet me know.";
        let items = parse_agendas(reply).unwrap();
        assert_eq!(items, vec![AgendaItem::new("A", "- x\n- y")]);
    }

    #[test]
    fn no_brace_span_is_malformed() {
        assert!(matches!(
            parse_agendas("I could not find any agenda items."),
            Err(SlideDeckError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn unparseable_span_is_malformed() {
        assert!(matches!(
            parse_agendas("{ agendas: not json }"),
            Err(SlideDeckError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn braces_in_trailing_prose_break_greedy_span() {
        // Greedy matching runs to the last `}` in the reply.
        let reply = r#"{"agendas":[]} and {also this}"#;
        assert!(matches!(
            parse_agendas(reply),
            Err(SlideDeckError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn missing_agendas_key_is_malformed() {
        assert!(matches!(
            parse_agendas(r#"{"items":[]}"#),
            Err(SlideDeckError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn missing_key_checked_before_content() {
        let s = GeminiSummarizer::new(&AppConfig::default()).unwrap();
        assert!(matches!(
            s.summarize("").await,
            Err(SlideDeckError::MissingConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn empty_content_is_invalid_input() {
        let config = AppConfig::builder().api_key("k").build().unwrap();
        let s = GeminiSummarizer::new(&config).unwrap();
        assert!(matches!(
            s.summarize("  \n").await,
            Err(SlideDeckError::InvalidInput(_))
        ));
    }
}
