//! Slide rendering: one agenda item → one generated image as a data URI.

use super::gemini::{GeminiClient, GenerateContentRequest};
use super::SlideRenderer;
use crate::config::{AppConfig, SlideStyle};
use crate::error::SlideDeckError;
use crate::prompts::slide_prompt;
use async_trait::async_trait;
use tracing::{debug, info};

/// Slide renderer backed by the generative image model.
#[derive(Clone)]
pub struct GeminiSlideRenderer {
    client: GeminiClient,
    model: String,
    style: SlideStyle,
}

impl GeminiSlideRenderer {
    pub fn new(config: &AppConfig) -> Result<Self, SlideDeckError> {
        Ok(Self {
            client: GeminiClient::new(config)?,
            model: config.image_model.clone(),
            style: config.slide_style,
        })
    }
}

#[async_trait]
impl SlideRenderer for GeminiSlideRenderer {
    async fn render(&self, title: &str, summary: &str) -> Result<String, SlideDeckError> {
        self.client.ensure_configured()?;
        if title.trim().is_empty() || summary.trim().is_empty() {
            return Err(SlideDeckError::InvalidInput(
                "Both a title and a summary are required".into(),
            ));
        }

        info!("Rendering slide: {}", title);
        debug!("Slide summary: {}", summary);

        let request =
            GenerateContentRequest::prompt(slide_prompt(self.style, title, summary)).with_image_output();
        let response = self
            .client
            .generate(&self.model, &request, "Slide generation failed")
            .await?;

        let image = response.first_image()?;
        debug!(
            "Slide '{}' → {} ({} bytes base64)",
            title,
            image.mime_type,
            image.data.len()
        );
        Ok(format!("data:{};base64,{}", image.mime_type, image.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_checked_first() {
        let r = GeminiSlideRenderer::new(&AppConfig::default()).unwrap();
        assert!(matches!(
            r.render("", "").await,
            Err(SlideDeckError::MissingConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn blank_fields_are_invalid_input() {
        let config = AppConfig::builder().api_key("k").build().unwrap();
        let r = GeminiSlideRenderer::new(&config).unwrap();
        assert!(matches!(
            r.render("Budget", " ").await,
            Err(SlideDeckError::InvalidInput(_))
        ));
        assert!(matches!(
            r.render("", "- x").await,
            Err(SlideDeckError::InvalidInput(_))
        ));
    }
}
