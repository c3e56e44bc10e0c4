//! Shared helper functions for CLI commands.

use std::path::Path;

use anyhow::Context;
use console::style;
use tokio::io::AsyncReadExt;

use crate::models::{QualityReport, QualityTier, RawText, StatisticsRecord};
use crate::pipeline::{StoryOutcome, StoryReport};

/// Default OCR confidence for plain text input.
const PLAIN_TEXT_CONFIDENCE: f64 = 1.0;

/// Truncate a string to `max` characters, adding an ellipsis if cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Read a file, or stdin when `input` is "-".
pub async fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read {}", input))
    }
}

/// Build a [`RawText`] from command input.
///
/// `.json` input is parsed as a `RawText` document; flags override its
/// fields. Anything else is plain OCR text.
pub fn raw_text_from_input(
    input: &str,
    contents: String,
    story_id: Option<String>,
    confidence: Option<f64>,
) -> anyhow::Result<RawText> {
    if input.ends_with(".json") {
        let mut raw: RawText = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {} as OCR JSON", input))?;
        if let Some(id) = story_id {
            raw.story_id = id;
        }
        if let Some(c) = confidence {
            raw.confidence = c;
        }
        return Ok(raw);
    }

    let story_id = story_id
        .or_else(|| {
            Path::new(input)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .filter(|s| s != "-")
        })
        .unwrap_or_else(|| "stdin".to_string());

    Ok(RawText {
        story_id,
        text: contents,
        confidence: confidence.unwrap_or(PLAIN_TEXT_CONFIDENCE),
    })
}

fn styled_tier(tier: QualityTier) -> String {
    match tier {
        QualityTier::High => style(tier.as_str()).green().to_string(),
        QualityTier::Medium => style(tier.as_str()).yellow().to_string(),
        QualityTier::Low => style(tier.as_str()).red().to_string(),
    }
}

pub fn print_quality(quality: &QualityReport) {
    println!(
        "{:<20} {} ({:.2})",
        "Quality:",
        styled_tier(quality.tier),
        quality.confidence
    );
    for issue in &quality.issues {
        println!("  {} {}", style("!").yellow(), issue);
    }
}

pub fn print_top_answers(statistics: &StatisticsRecord) {
    println!("\n{}", style("Top Answers").bold());
    println!("{}", "-".repeat(50));
    println!("{:<32} {:>6} {:>9}", "Answer", "Count", "Share");
    println!("{}", "-".repeat(50));
    for entry in &statistics.top_answers {
        println!(
            "{:<32} {:>6} {:>8.2}%",
            truncate(&entry.answer, 31),
            entry.count,
            entry.percentage
        );
    }
}

pub fn print_report(report: &StoryReport) {
    println!("\n{} {}", style("Story").bold(), report.story_id);
    println!("{}", "-".repeat(50));
    println!("{:<20} {}", "Answers:", report.statistics.total_answers);
    println!("{:<20} {}", "Unique:", report.statistics.unique_answers);
    print_quality(&report.quality);
    println!(
        "{:<20} {:.2}",
        "Uniqueness:", report.diversity.uniqueness_ratio
    );
    if let Some(ref slot) = report.trends.most_popular_time {
        println!("{:<20} {}", "Busiest hour:", slot);
    }
    let s = &report.trends.sentiment;
    println!(
        "{:<20} +{} / -{} / ={}",
        "Sentiment:", s.positive, s.negative, s.neutral
    );

    print_top_answers(&report.statistics);

    println!("\n{}", style("Answers").bold());
    println!("{}", "-".repeat(50));
    for answer in &report.answers.answers {
        println!("{:<20} {}", truncate(&answer.username, 19), answer.answer);
    }

    println!("\n{} {}", style("✓").green(), report.summary);
}

pub fn print_outcome(outcome: &StoryOutcome) {
    match outcome {
        StoryOutcome::Processed(report) => print_report(report),
        StoryOutcome::EmptyText { story_id } => {
            println!(
                "{} No text found for story {}",
                style("!").yellow(),
                story_id
            );
        }
        StoryOutcome::NoAnswers { story_id, quality } => {
            println!(
                "{} No user answers found in story {}",
                style("!").yellow(),
                story_id
            );
            print_quality(quality);
        }
    }
}
