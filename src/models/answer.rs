//! Extraction input and output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OCR output for a single story image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawText {
    /// Story the image belongs to.
    pub story_id: String,
    /// Full transcribed text.
    pub text: String,
    /// OCR engine confidence in [0, 1].
    #[serde(default)]
    pub confidence: f64,
}

impl RawText {
    pub fn new(story_id: impl Into<String>, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            story_id: story_id.into(),
            text: text.into(),
            confidence,
        }
    }
}

/// A validated username/answer pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerCandidate {
    pub username: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl AnswerCandidate {
    pub fn new(username: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            answer: answer.into(),
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Result of one extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAnswers {
    pub story_id: String,
    pub answers: Vec<AnswerCandidate>,
    /// Number of entries in `answers`.
    pub count: usize,
    pub extracted_at: DateTime<Utc>,
}

impl ParsedAnswers {
    /// Build a result whose `count` matches its answers.
    pub fn new(story_id: impl Into<String>, answers: Vec<AnswerCandidate>) -> Self {
        Self {
            story_id: story_id.into(),
            count: answers.len(),
            answers,
            extracted_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Rows for the answer store, keyed by (story_id, username).
    pub fn to_answer_records(&self) -> Vec<AnswerRecord> {
        self.answers
            .iter()
            .map(|a| AnswerRecord {
                story_id: self.story_id.clone(),
                username: a.username.clone(),
                answer: a.answer.clone(),
                extracted_at: self.extracted_at,
            })
            .collect()
    }
}

/// Persisted form of a single answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub story_id: String,
    pub username: String,
    pub answer: String,
    pub extracted_at: DateTime<Utc>,
}
