//! Batch analysis over a JSON-lines file of OCR records.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::pipeline::{process_batch, OcrRecord, StoryProcessor};

use super::helpers::truncate;

fn parse_records(contents: &str) -> anyhow::Result<Vec<OcrRecord>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid OCR record on line {}", n + 1))
        })
        .collect()
}

/// Process every record in `input` and print a summary.
pub async fn cmd_batch(
    settings: &Settings,
    input: &Path,
    concurrency: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let contents = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let records = parse_records(&contents)?;

    if records.is_empty() {
        println!("{} No OCR records in {}", style("!").yellow(), input.display());
        return Ok(());
    }

    let concurrency = concurrency
        .filter(|&n| n > 0)
        .unwrap_or(settings.batch_concurrency);
    let processor = Arc::new(StoryProcessor::from_settings(settings));

    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(records.len() as u64)
    };
    pb.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} stories")?
            .progress_chars("=> "),
    );

    let summary = process_batch(processor, records, concurrency, || pb.inc(1)).await;
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n{}", style("Batch Results").bold());
    println!("{}", "-".repeat(70));
    println!("{:<20} {:>8} {:>8} {:<8} Top Answer", "Story", "Answers", "Unique", "Quality");
    println!("{}", "-".repeat(70));

    for report in &summary.reports {
        let top = report
            .statistics
            .top_answers
            .first()
            .map(|t| format!("{} ({}%)", truncate(&t.answer, 20), t.percentage))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:>8} {:>8} {:<8} {}",
            truncate(&report.story_id, 19),
            report.statistics.total_answers,
            report.statistics.unique_answers,
            report.quality.tier.as_str(),
            top
        );
    }

    println!("{}", "-".repeat(70));
    println!(
        "{} {} processed, {} without answers, {} empty, {} skipped, {} failed",
        style("✓").green(),
        summary.processed,
        summary.no_answers,
        summary.empty_text,
        summary.skipped,
        summary.failed
    );
    for (story_id, error) in &summary.failures {
        println!("  {} {}: {}", style("✗").red(), story_id, error);
    }

    Ok(())
}
