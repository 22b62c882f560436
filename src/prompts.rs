//! Prompt templates for the summarizer and the slide renderer.
//!
//! Each stage has two variants, chosen once per deployment through
//! [`crate::config::SummaryStyle`] and [`crate::config::SlideStyle`]. Keeping
//! them here lets tests inspect the exact text without a network call.

use crate::config::{SlideStyle, SummaryStyle};

/// Output contract shared by both summary prompts.
const AGENDA_JSON_SHAPE: &str = r#"{
  "agendas": [
    {
      "title": "Agenda item title",
      "summary": "Summary including the key points"
    }
  ]
}"#;

const VERBOSE_SUMMARY_INSTRUCTIONS: &str = r#"You are an assistant that analyses meeting minutes.
Extract every agenda item from the minutes below and summarise each one concisely.

For each agenda item provide:
- The title of the agenda item
- Its key points (3-5 bullet points)
- Any decisions or action items, if present"#;

const COMPACT_SUMMARY_INSTRUCTIONS: &str = r#"You are an assistant that analyses meeting minutes.
Extract the agenda items from the minutes below and summarise them very briefly.

Rules:
- At most 5 agenda items
- Each title is at most 10 characters
- Each summary has at most 3 points, each point at most 20 characters"#;

/// Build the summarizer prompt for the given minutes.
pub fn summary_prompt(style: SummaryStyle, content: &str) -> String {
    let instructions = match style {
        SummaryStyle::Verbose => VERBOSE_SUMMARY_INSTRUCTIONS,
        SummaryStyle::Compact => COMPACT_SUMMARY_INSTRUCTIONS,
    };
    format!(
        "{instructions}\n\n\
         Reply with JSON in exactly this shape and nothing else:\n\
         {AGENDA_JSON_SHAPE}\n\n\
         Minutes:\n\
         {content}"
    )
}

/// Build the image-generation prompt for one agenda item.
pub fn slide_prompt(style: SlideStyle, title: &str, summary: &str) -> String {
    match style {
        SlideStyle::Structured => format!(
            r#"Create a business presentation slide.

Title: {title}

Content: {summary}

Requirements:
- Size: 1920x1080 (landscape)
- Left or top area: textual explanation as bullet points
- Right or bottom area: a diagram visualising the content
- Large title placed at the top
- Clear, highly legible font in the language of the content
- Use arrows, shapes and icons in the diagram
- Professional palette based on blue, white and grey
- Generous margins, tidy layout"#
        ),
        SlideStyle::GraphicRecording => format!(
            r#"Create a single graphic-recording style illustration that summarises this agenda item visually.

Title: {title}

Content: {summary}

Requirements:
- Size: 1920x1080 (landscape), one single pane
- Hand-drawn look: marker lines, speech bubbles, simple characters and icons
- The title written large at the top
- Key points as short handwritten-style phrases connected by arrows
- Warm, friendly colours on a white background
- Text must be legible and in the language of the content"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompts_embed_content_and_shape() {
        for style in [SummaryStyle::Verbose, SummaryStyle::Compact] {
            let p = summary_prompt(style, "Topic A: discuss budget.");
            assert!(p.ends_with("Topic A: discuss budget."));
            assert!(p.contains("\"agendas\""));
        }
    }

    #[test]
    fn compact_summary_caps_items() {
        let p = summary_prompt(SummaryStyle::Compact, "x");
        assert!(p.contains("At most 5 agenda items"));
        assert!(!summary_prompt(SummaryStyle::Verbose, "x").contains("At most 5"));
    }

    #[test]
    fn slide_prompts_request_canvas_size() {
        for style in [SlideStyle::Structured, SlideStyle::GraphicRecording] {
            let p = slide_prompt(style, "Budget", "- approve Q3");
            assert!(p.contains("1920x1080"));
            assert!(p.contains("Title: Budget"));
            assert!(p.contains("- approve Q3"));
        }
    }
}
