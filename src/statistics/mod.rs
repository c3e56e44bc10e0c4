//! Per-story answer statistics.
//!
//! Answers are grouped by their canonical form (see
//! [`canonicalize_answer`]). Ranking is a stable sort on count, so answers
//! with equal counts keep the order in which they were first seen.

mod metrics;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use crate::models::{AnswerCandidate, AnswerDistribution, ParsedAnswers, StatisticsRecord, TopAnswerEntry};
use crate::text::{canonicalize_answer, round2};

pub use metrics::{analyze_sentiment, analyze_trends, diversity_metrics, most_popular_time};

/// Default, and largest, length of the ranked answer list.
pub const DEFAULT_TOP_ANSWERS_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error("malformed answers for story '{story_id}': {reason}")]
    MalformedInput { story_id: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsEngine {
    top_answers_limit: usize,
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self {
            top_answers_limit: DEFAULT_TOP_ANSWERS_LIMIT,
        }
    }
}

impl StatisticsEngine {
    /// The limit is clamped to `1..=DEFAULT_TOP_ANSWERS_LIMIT`.
    pub fn new(top_answers_limit: usize) -> Self {
        Self {
            top_answers_limit: clamp_top_answers_limit(top_answers_limit),
        }
    }

    pub fn top_answers_limit(&self) -> usize {
        self.top_answers_limit
    }

    /// Aggregate a story's answers. An empty answer list gives a zeroed record.
    pub fn compute(&self, parsed: &ParsedAnswers) -> Result<StatisticsRecord, StatisticsError> {
        check_input(parsed)?;
        debug!("Calculating statistics for story {}", parsed.story_id);

        let distribution = answer_distribution(&parsed.answers);
        let total = parsed.answers.len();
        let top_answers = top_answers(&distribution, total, self.top_answers_limit);
        let now = Utc::now();

        let record = StatisticsRecord {
            story_id: parsed.story_id.clone(),
            total_answers: total,
            unique_answers: distribution.len(),
            answer_distribution: distribution,
            top_answers,
            created_at: now,
            updated_at: now,
        };

        debug!(
            "Statistics calculated: {} total, {} unique",
            record.total_answers, record.unique_answers
        );
        Ok(record)
    }
}

/// Keep a configured limit within `1..=DEFAULT_TOP_ANSWERS_LIMIT`.
pub fn clamp_top_answers_limit(limit: usize) -> usize {
    limit.clamp(1, DEFAULT_TOP_ANSWERS_LIMIT)
}

fn check_input(parsed: &ParsedAnswers) -> Result<(), StatisticsError> {
    let malformed = |reason: String| StatisticsError::MalformedInput {
        story_id: parsed.story_id.clone(),
        reason,
    };

    if parsed.story_id.trim().is_empty() {
        return Err(malformed("story id is blank".to_string()));
    }
    if parsed.count != parsed.answers.len() {
        return Err(malformed(format!(
            "count is {} but {} answers are present",
            parsed.count,
            parsed.answers.len()
        )));
    }
    Ok(())
}

/// Compute statistics with the default top-answer limit.
pub fn compute_statistics(parsed: &ParsedAnswers) -> Result<StatisticsRecord, StatisticsError> {
    StatisticsEngine::default().compute(parsed)
}

/// Count answers by canonical form, in first-seen order.
pub fn answer_distribution(answers: &[AnswerCandidate]) -> AnswerDistribution {
    answers
        .iter()
        .map(|a| canonicalize_answer(&a.answer))
        .collect()
}

/// The `limit` most frequent answers with their share of `total`, never
/// more than [`DEFAULT_TOP_ANSWERS_LIMIT`].
pub fn top_answers(
    distribution: &AnswerDistribution,
    total: usize,
    limit: usize,
) -> Vec<TopAnswerEntry> {
    if total == 0 {
        return Vec::new();
    }

    let mut entries: Vec<(&str, usize)> = distribution.iter().collect();
    // Stable: equal counts stay in first-seen order.
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    entries
        .into_iter()
        .take(limit.min(DEFAULT_TOP_ANSWERS_LIMIT))
        .map(|(answer, count)| TopAnswerEntry {
            answer: answer.to_string(),
            count,
            percentage: round2(count as f64 / total as f64 * 100.0),
        })
        .collect()
}

/// One-line human summary of a statistics record.
pub fn create_summary(statistics: &StatisticsRecord) -> String {
    let head = format!(
        "Processed {} answers. Unique: {}",
        statistics.total_answers, statistics.unique_answers
    );
    match statistics.top_answers.first() {
        Some(top) => format!(
            "{}. Popular answer: \"{}\" ({}%)",
            head, top.answer, top.percentage
        ),
        None => format!("{}. No popular answer data", head),
    }
}
