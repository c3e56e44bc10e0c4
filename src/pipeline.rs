//! Per-story processing: extraction, statistics and quality in one pass.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::extraction::{ExtractionError, Extractor, ExtractorConfig};
use crate::keys::{is_image_key, story_id_from_key};
use crate::models::{
    DiversityMetrics, ParsedAnswers, QualityReport, RawText, StatisticsRecord, TrendAnalysis,
};
use crate::quality::QualityAnalyzer;
use crate::statistics::{
    analyze_trends, create_summary, diversity_metrics, StatisticsEngine, StatisticsError,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Statistics(#[from] StatisticsError),
    #[error("story task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything derived from one story's OCR text.
#[derive(Debug, Clone, Serialize)]
pub struct StoryReport {
    pub story_id: String,
    pub answers: ParsedAnswers,
    pub statistics: StatisticsRecord,
    pub quality: QualityReport,
    pub diversity: DiversityMetrics,
    pub trends: TrendAnalysis,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StoryOutcome {
    /// OCR produced no text.
    EmptyText { story_id: String },
    /// Text was present but no answers survived extraction.
    NoAnswers {
        story_id: String,
        quality: QualityReport,
    },
    Processed(Box<StoryReport>),
}

impl StoryOutcome {
    pub fn story_id(&self) -> &str {
        match self {
            StoryOutcome::EmptyText { story_id } => story_id,
            StoryOutcome::NoAnswers { story_id, .. } => story_id,
            StoryOutcome::Processed(report) => &report.story_id,
        }
    }
}

/// Runs extraction, statistics and quality analysis for a story.
#[derive(Debug)]
pub struct StoryProcessor {
    extractor: Extractor,
    analyzer: QualityAnalyzer,
    engine: StatisticsEngine,
}

impl Default for StoryProcessor {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl StoryProcessor {
    pub fn new(extractor: Extractor, analyzer: QualityAnalyzer, engine: StatisticsEngine) -> Self {
        Self {
            extractor,
            analyzer,
            engine,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Extractor::new(ExtractorConfig {
                max_text_chars: settings.max_text_chars,
            }),
            QualityAnalyzer::new(settings.low_confidence_threshold),
            StatisticsEngine::new(settings.top_answers_limit),
        )
    }

    /// Process one story's OCR output.
    pub fn process(&self, raw: &RawText) -> Result<StoryOutcome, PipelineError> {
        let story_id = raw.story_id.as_str();
        info!("Processing story: {}", story_id);

        if raw.text.trim().is_empty() {
            warn!("No text found in image for story {}", story_id);
            return Ok(StoryOutcome::EmptyText {
                story_id: story_id.to_string(),
            });
        }

        let parsed = self.extractor.extract_raw(raw)?;
        let quality = self.analyzer.analyze(&parsed, raw.confidence);

        if parsed.is_empty() {
            warn!("No user answers found in story {}", story_id);
            return Ok(StoryOutcome::NoAnswers {
                story_id: story_id.to_string(),
                quality,
            });
        }

        let statistics = self.engine.compute(&parsed)?;

        info!(
            "Extraction quality for {}: {} ({:.2})",
            story_id, quality.tier, quality.confidence
        );
        if !quality.issues.is_empty() {
            warn!("Quality issues: {}", quality.issues.join(", "));
        }

        let summary = create_summary(&statistics);
        info!("Processing completed for {}: {}", story_id, summary);

        Ok(StoryOutcome::Processed(Box::new(StoryReport {
            story_id: story_id.to_string(),
            diversity: diversity_metrics(&parsed.answers),
            trends: analyze_trends(&parsed.answers),
            answers: parsed,
            statistics,
            quality,
            summary,
        })))
    }
}

/// One line of batch input: OCR output plus where it came from.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrRecord {
    /// Object key of the source image, `story_id/filename`.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub story_id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
}

impl OcrRecord {
    /// Resolve into [`RawText`], or `None` if the record should be skipped.
    ///
    /// Records whose key is not an image are skipped. A missing story id is
    /// taken from the key.
    pub fn into_raw_text(self) -> Option<RawText> {
        if let Some(key) = &self.key {
            if !is_image_key(key) {
                debug!("Skipping non-image file: {}", key);
                return None;
            }
        }

        let story_id = match self.story_id.filter(|s| !s.trim().is_empty()) {
            Some(id) => id,
            None => {
                let derived = self.key.as_deref().and_then(story_id_from_key);
                match derived {
                    Some(id) => id.to_string(),
                    None => {
                        warn!("Could not extract story_id from key: {:?}", self.key);
                        return None;
                    }
                }
            }
        };

        Some(RawText {
            story_id,
            text: self.text,
            confidence: self.confidence,
        })
    }
}

/// Result of processing a batch of stories.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub empty_text: usize,
    pub no_answers: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Processed stories, in input order.
    pub reports: Vec<StoryReport>,
    /// `(story_id, error)` for every failed story.
    pub failures: Vec<(String, String)>,
}

/// Process records concurrently on the blocking pool.
///
/// A failing story is logged and counted; the remaining stories still run.
/// `on_done` is called once per record as it finishes.
pub async fn process_batch<F>(
    processor: Arc<StoryProcessor>,
    records: Vec<OcrRecord>,
    concurrency: usize,
    mut on_done: F,
) -> BatchSummary
where
    F: FnMut(),
{
    let mut summary = BatchSummary::default();
    let mut inputs = Vec::with_capacity(records.len());
    for record in records {
        match record.into_raw_text() {
            Some(raw) => inputs.push(raw),
            None => {
                summary.skipped += 1;
                on_done();
            }
        }
    }

    let mut results: Vec<(usize, String, Result<StoryOutcome, PipelineError>)> =
        stream::iter(inputs.into_iter().enumerate())
            .map(|(index, raw)| {
                let processor = Arc::clone(&processor);
                async move {
                    let story_id = raw.story_id.clone();
                    let result = tokio::task::spawn_blocking(move || processor.process(&raw))
                        .await
                        .map_err(PipelineError::from)
                        .and_then(|r| r);
                    (index, story_id, result)
                }
            })
            .buffer_unordered(concurrency.max(1))
            .inspect(|_| on_done())
            .collect()
            .await;

    results.sort_by_key(|(index, _, _)| *index);

    for (_, story_id, result) in results {
        match result {
            Ok(StoryOutcome::Processed(report)) => {
                summary.processed += 1;
                summary.reports.push(*report);
            }
            Ok(StoryOutcome::NoAnswers { .. }) => summary.no_answers += 1,
            Ok(StoryOutcome::EmptyText { .. }) => summary.empty_text += 1,
            Err(e) => {
                warn!("Error processing story {}: {}", story_id, e);
                summary.failed += 1;
                summary.failures.push((story_id, e.to_string()));
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QualityTier;

    fn record(key: Option<&str>, story_id: Option<&str>, text: &str) -> OcrRecord {
        OcrRecord {
            key: key.map(String::from),
            story_id: story_id.map(String::from),
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_process_full_story() {
        let processor = StoryProcessor::default();
        let raw = RawText::new(
            "story-1",
            "@john replied \"Blue\"\n@mary replied \"blue!\"\n@anna replied \"Red\"",
            0.95,
        );

        let StoryOutcome::Processed(report) = processor.process(&raw).unwrap() else {
            panic!("expected processed outcome");
        };
        assert_eq!(report.story_id, "story-1");
        assert_eq!(report.answers.count, 3);
        assert_eq!(report.statistics.unique_answers, 2);
        assert_eq!(report.statistics.top_answers[0].answer, "blue");
        assert_eq!(report.quality.tier, QualityTier::High);
        assert_eq!(
            report.summary,
            "Processed 3 answers. Unique: 2. Popular answer: \"blue\" (66.67%)"
        );
        assert_eq!(report.trends.sentiment.neutral, 3);
    }

    #[test]
    fn test_process_empty_text() {
        let outcome = StoryProcessor::default()
            .process(&RawText::new("story-2", "   \n", 0.2))
            .unwrap();
        assert!(matches!(outcome, StoryOutcome::EmptyText { .. }));
        assert_eq!(outcome.story_id(), "story-2");
    }

    #[test]
    fn test_process_no_answers_reports_low_quality() {
        let outcome = StoryProcessor::default()
            .process(&RawText::new("story-3", "tap to reply", 0.9))
            .unwrap();
        let StoryOutcome::NoAnswers { quality, .. } = outcome else {
            panic!("expected no-answers outcome");
        };
        assert_eq!(quality.tier, QualityTier::Low);
        assert!(quality.issues.contains(&"No answers extracted".to_string()));
    }

    #[test]
    fn test_process_propagates_parsing_failure() {
        let settings = Settings {
            max_text_chars: 5,
            ..Default::default()
        };
        let err = StoryProcessor::from_settings(&settings)
            .process(&RawText::new("story-4", "alice: a long answer", 0.9))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Extraction(_)));
    }

    #[test]
    fn test_configured_top_limit_stays_within_ten() {
        let mut settings = Settings::default();
        crate::config::Config {
            top_answers_limit: Some(20),
            ..Default::default()
        }
        .apply_to_settings(&mut settings);

        let text: Vec<String> = (0..15).map(|i| format!("user{}: answer {}", i, i)).collect();
        let raw = RawText::new("story-5", text.join("\n"), 0.9);

        let StoryOutcome::Processed(report) = StoryProcessor::from_settings(&settings)
            .process(&raw)
            .unwrap()
        else {
            panic!("expected processed outcome");
        };
        assert_eq!(report.statistics.total_answers, 15);
        assert_eq!(report.statistics.top_answers.len(), 10);
    }

    #[test]
    fn test_record_resolution() {
        let raw = record(Some("story-9/frame.png"), None, "x").into_raw_text().unwrap();
        assert_eq!(raw.story_id, "story-9");

        let raw = record(Some("story-9/frame.png"), Some("explicit"), "x")
            .into_raw_text()
            .unwrap();
        assert_eq!(raw.story_id, "explicit");

        assert!(record(Some("story-9/story.json"), None, "x").into_raw_text().is_none());
        assert!(record(Some("frame.png"), None, "x").into_raw_text().is_none());
        assert!(record(None, None, "x").into_raw_text().is_none());
        assert!(record(None, Some("s"), "x").into_raw_text().is_some());
    }

    #[tokio::test]
    async fn test_process_batch_continues_after_failure() {
        let settings = Settings {
            max_text_chars: 40,
            ..Default::default()
        };
        let processor = Arc::new(StoryProcessor::from_settings(&settings));
        let records = vec![
            record(None, Some("a"), "alice: Blue\nbob: Blue\ncarol: Red"),
            record(None, Some("b"), &"x".repeat(100)),
            record(None, Some("c"), ""),
            record(Some("d/notes.txt"), None, "dave: Green"),
            record(None, Some("e"), "tap to reply"),
            record(Some("f/img.jpg"), None, "erin: Green"),
        ];

        let mut done = 0;
        let summary = process_batch(processor, records, 3, || done += 1).await;

        assert_eq!(done, 6);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.empty_text, 1);
        assert_eq!(summary.no_answers, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failures[0].0, "b");
        let ids: Vec<&str> = summary.reports.iter().map(|r| r.story_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "f"]);
    }
}
