//! Extraction quality scoring.
//!
//! The score starts at 1.0 and each triggered condition applies a
//! multiplicative penalty and records an issue tag. Extracting nothing
//! forces the score to exactly 0.

use std::collections::HashSet;

use crate::models::{ParsedAnswers, QualityReport, QualityTier};
use crate::text::canonicalize_answer;

/// Default OCR confidence below which the low-confidence penalty applies.
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f64 = 0.7;

pub const ISSUE_LOW_OCR_CONFIDENCE: &str = "Low OCR confidence";
pub const ISSUE_NO_ANSWERS: &str = "No answers extracted";
pub const ISSUE_FEW_ANSWERS: &str = "Very few answers extracted";
pub const ISSUE_MANY_DUPLICATES: &str = "Many duplicate answers";

const LOW_CONFIDENCE_PENALTY: f64 = 0.7;
const FEW_ANSWERS_PENALTY: f64 = 0.8;
const DUPLICATES_PENALTY: f64 = 0.9;
const FEW_ANSWERS_LIMIT: usize = 3;
const MIN_UNIQUE_SHARE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityAnalyzer {
    pub low_confidence_threshold: f64,
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self {
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
        }
    }
}

impl QualityAnalyzer {
    pub fn new(low_confidence_threshold: f64) -> Self {
        Self {
            low_confidence_threshold,
        }
    }

    /// Score how far an extraction can be trusted.
    pub fn analyze(&self, parsed: &ParsedAnswers, ocr_confidence: f64) -> QualityReport {
        let mut issues = Vec::new();
        let mut score = 1.0;
        let total = parsed.answers.len();

        if ocr_confidence < self.low_confidence_threshold {
            issues.push(ISSUE_LOW_OCR_CONFIDENCE.to_string());
            score *= LOW_CONFIDENCE_PENALTY;
        }

        if total == 0 {
            issues.push(ISSUE_NO_ANSWERS.to_string());
        } else if total < FEW_ANSWERS_LIMIT {
            issues.push(ISSUE_FEW_ANSWERS.to_string());
            score *= FEW_ANSWERS_PENALTY;
        }

        let unique = parsed
            .answers
            .iter()
            .map(|a| canonicalize_answer(&a.answer))
            .collect::<HashSet<_>>()
            .len();
        if (unique as f64) < total as f64 * MIN_UNIQUE_SHARE {
            issues.push(ISSUE_MANY_DUPLICATES.to_string());
            score *= DUPLICATES_PENALTY;
        }

        if total == 0 {
            score = 0.0;
        }

        QualityReport {
            tier: QualityTier::from_score(score),
            issues,
            confidence: score,
        }
    }
}

/// Score with the default thresholds.
pub fn analyze_quality(parsed: &ParsedAnswers, ocr_confidence: f64) -> QualityReport {
    QualityAnalyzer::default().analyze(parsed, ocr_confidence)
}
