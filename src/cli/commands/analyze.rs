//! Single-story analysis command.

use crate::config::Settings;
use crate::pipeline::StoryProcessor;

use super::helpers::{print_outcome, raw_text_from_input, read_input};

/// Analyze OCR output for one story.
pub async fn cmd_analyze(
    settings: &Settings,
    input: &str,
    story_id: Option<String>,
    confidence: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let contents = read_input(input).await?;
    let raw = raw_text_from_input(input, contents, story_id, confidence)?;

    let processor = StoryProcessor::from_settings(settings);
    let outcome = tokio::task::spawn_blocking(move || processor.process(&raw)).await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}
