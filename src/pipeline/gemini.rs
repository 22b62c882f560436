//! Minimal client for the generative-language `generateContent` endpoint.
//!
//! Both the summarizer and the slide renderer send a single text prompt and
//! read back the first candidate, so one small client covers both. The API
//! key travels as the `key` query parameter and is redacted from every error
//! message and log line.

use crate::config::AppConfig;
use crate::error::{redact_key, redact_reqwest, SlideDeckError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
pub struct RequestPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

impl GenerateContentRequest {
    /// A request carrying one text prompt.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: text.into() }],
            }],
            generation_config: None,
        }
    }

    /// Ask for both text and image parts in the reply.
    pub fn with_image_output(mut self) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
        });
        self
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate.
    pub fn first_parts(&self) -> Result<&[Part], SlideDeckError> {
        let candidate = self.candidates.first().ok_or(SlideDeckError::NoCandidates)?;
        match candidate.content.as_ref() {
            Some(content) if !content.parts.is_empty() => Ok(&content.parts),
            _ => Err(SlideDeckError::NoParts),
        }
    }

    /// Concatenated text of the first candidate's parts.
    pub fn text(&self) -> Result<String, SlideDeckError> {
        Ok(self
            .first_parts()?
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect())
    }

    /// First part whose media type is an image.
    pub fn first_image(&self) -> Result<&InlineData, SlideDeckError> {
        self.first_parts()?
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| d.mime_type.starts_with("image/"))
            .ok_or(SlideDeckError::NoImagePart)
    }
}

/// Shared `generateContent` caller.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Result<Self, SlideDeckError> {
        Ok(Self {
            http: config.http_client()?,
            base_url: config.gemini_base_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    fn key(&self) -> Result<&str, SlideDeckError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| SlideDeckError::MissingConfiguration {
                var: crate::config::API_KEY_ENV.to_string(),
            })
    }

    /// Fail early when no key is configured, before any input is validated.
    pub fn ensure_configured(&self) -> Result<(), SlideDeckError> {
        self.key().map(|_| ())
    }

    fn endpoint(&self, model: &str, key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, key
        )
    }

    /// POST one request and decode the reply.
    ///
    /// Non-success statuses become [`SlideDeckError::UpstreamError`] carrying
    /// the API's own `error.message` when the body has one.
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        fallback_message: &str,
    ) -> Result<GenerateContentResponse, SlideDeckError> {
        let key = self.key()?;
        let url = self.endpoint(model, key);
        debug!("POST {}", redact_key(&url));

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| SlideDeckError::transport(&url, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|env| env.error)
                .and_then(|err| err.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("{fallback_message} (HTTP {})", status.as_u16()));
            warn!("Generative API error {}: {}", status.as_u16(), message);
            return Err(SlideDeckError::upstream(Some(status.as_u16()), message));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                SlideDeckError::upstream(None, format!("{fallback_message}: {}", redact_reqwest(&e)))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).expect("valid response json")
    }

    #[test]
    fn blank_key_is_missing_configuration() {
        let config = AppConfig::builder().api_key("  ").build().unwrap();
        let client = GeminiClient::new(&config).unwrap();
        match client.ensure_configured() {
            Err(SlideDeckError::MissingConfiguration { var }) => {
                assert_eq!(var, crate::config::API_KEY_ENV)
            }
            other => panic!("expected MissingConfiguration, got {other:?}"),
        }
        assert!(GeminiClient::new(&AppConfig::default())
            .unwrap()
            .ensure_configured()
            .is_err());
    }

    #[test]
    fn request_serializes_modalities() {
        let req = GenerateContentRequest::prompt("hi").with_image_output();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["TEXT", "IMAGE"])
        );

        let plain = serde_json::to_value(GenerateContentRequest::prompt("hi")).unwrap();
        assert!(plain.get("generationConfig").is_none());
    }

    #[test]
    fn no_candidates() {
        assert!(matches!(
            parse(r#"{}"#).first_image(),
            Err(SlideDeckError::NoCandidates)
        ));
        assert!(matches!(
            parse(r#"{"candidates":[]}"#).text(),
            Err(SlideDeckError::NoCandidates)
        ));
    }

    #[test]
    fn no_parts() {
        assert!(matches!(
            parse(r#"{"candidates":[{}]}"#).first_image(),
            Err(SlideDeckError::NoParts)
        ));
        assert!(matches!(
            parse(r#"{"candidates":[{"content":{"parts":[]}}]}"#).first_image(),
            Err(SlideDeckError::NoParts)
        ));
    }

    #[test]
    fn no_image_part() {
        let r = parse(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"here you go"},
                {"inlineData":{"mimeType":"application/pdf","data":"AA=="}}
            ]}}]}"#,
        );
        assert!(matches!(r.first_image(), Err(SlideDeckError::NoImagePart)));
    }

    #[test]
    fn first_image_skips_text_parts() {
        let r = parse(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"caption"},
                {"inlineData":{"mimeType":"image/png","data":"AAA"}},
                {"inlineData":{"mimeType":"image/jpeg","data":"BBB"}}
            ]}}]}"#,
        );
        let img = r.first_image().unwrap();
        assert_eq!(img.mime_type, "image/png");
        assert_eq!(img.data, "AAA");
    }

    #[test]
    fn text_concatenates_parts() {
        let r = parse(r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#);
        assert_eq!(r.text().unwrap(), "{\"a\":1}");
    }

    #[test]
    fn unconfigured_client_reports_missing_key() {
        let client = GeminiClient::new(&AppConfig::default()).unwrap();
        assert!(matches!(
            client.ensure_configured(),
            Err(SlideDeckError::MissingConfiguration { .. })
        ));
    }
}
