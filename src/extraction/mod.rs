//! Answer extraction from OCR text.
//!
//! Extraction runs in two stages:
//! - Primary: every [`PairMatcher`] in [`primary_matchers`] scans the full
//!   text. Pairs are cleaned and validated, and the first accepted pair per
//!   case-insensitive username is kept.
//! - Fallback: only when the primary stage accepted nothing, adjacent lines
//!   are paired by [`LineFallbackMatcher`].
//!
//! The surviving candidates are then deduplicated on the composite
//! (username, answer) key, keeping the first occurrence.
//!
//! # Example
//!
//! ```
//! use storyreplies::extraction::extract;
//!
//! let parsed = extract("@john replied \"Blue\"\n@mary replied \"Red\"", "story-1").unwrap();
//! assert_eq!(parsed.count, 2);
//! assert_eq!(parsed.answers[0].answer, "Blue");
//! ```

mod matchers;
mod validation;

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, trace};

use crate::models::{AnswerCandidate, ParsedAnswers, RawText};
use crate::text::{char_len, clean_answer, dedup_key};

pub use matchers::{
    fallback_matcher, primary_matchers, BareTokenMatcher, LabelColonMatcher, LineFallbackMatcher,
    MentionDashMatcher, MentionVerbMatcher, PairMatcher, RawPair,
};
pub use validation::{check_answer, check_username, is_valid_answer, is_valid_username, Rejection};

/// Default upper bound on OCR text length, in characters.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 100_000;

static DEFAULT_EXTRACTOR: LazyLock<Extractor> = LazyLock::new(Extractor::default);

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to parse answers for story '{story_id}': {reason}")]
    ParsingFailure { story_id: String, reason: String },
}

impl ExtractionError {
    fn parsing(story_id: &str, reason: impl Into<String>) -> Self {
        ExtractionError::ParsingFailure {
            story_id: story_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Story the failure belongs to.
    pub fn story_id(&self) -> &str {
        match self {
            ExtractionError::ParsingFailure { story_id, .. } => story_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Texts longer than this are treated as malformed input.
    pub max_text_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

/// Turns OCR text into validated, deduplicated answer candidates.
pub struct Extractor {
    config: ExtractorConfig,
    primary: Vec<Box<dyn PairMatcher>>,
    fallback: Box<dyn PairMatcher>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .field(
                "primary",
                &self.primary.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

impl Extractor {
    /// Create an extractor with the built-in strategies.
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_matchers(config, primary_matchers(), fallback_matcher())
    }

    /// Create an extractor with custom strategies.
    pub fn with_matchers(
        config: ExtractorConfig,
        primary: Vec<Box<dyn PairMatcher>>,
        fallback: Box<dyn PairMatcher>,
    ) -> Self {
        Self {
            config,
            primary,
            fallback,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract answers from a [`RawText`].
    pub fn extract_raw(&self, raw: &RawText) -> Result<ParsedAnswers, ExtractionError> {
        self.extract(&raw.text, &raw.story_id)
    }

    /// Extract answers from OCR text for a story.
    ///
    /// Finding nothing is not an error; it yields an empty result.
    pub fn extract(&self, text: &str, story_id: &str) -> Result<ParsedAnswers, ExtractionError> {
        if story_id.trim().is_empty() {
            return Err(ExtractionError::parsing(story_id, "story id is blank"));
        }
        let len = char_len(text);
        if len > self.config.max_text_chars {
            return Err(ExtractionError::parsing(
                story_id,
                format!(
                    "text is {} characters, limit is {}",
                    len, self.config.max_text_chars
                ),
            ));
        }

        debug!("Parsing answers from OCR text for story {}", story_id);

        let text = normalize_line_endings(text);
        let extracted_at = Utc::now();

        let mut candidates = self.run_primary(&text, extracted_at);
        if candidates.is_empty() {
            candidates = self.run_fallback(&text, extracted_at);
            if !candidates.is_empty() {
                debug!(
                    "Fallback matched {} answers for story {}",
                    candidates.len(),
                    story_id
                );
            }
        }

        let answers = dedup_candidates(candidates);
        debug!("Extracted {} answers for story {}", answers.len(), story_id);

        Ok(ParsedAnswers {
            story_id: story_id.to_string(),
            count: answers.len(),
            answers,
            extracted_at,
        })
    }

    fn run_primary(&self, text: &str, extracted_at: DateTime<Utc>) -> Vec<AnswerCandidate> {
        let mut seen_usernames = HashSet::new();
        let mut accepted = Vec::new();

        for matcher in &self.primary {
            let pairs = matcher.find_pairs(text);
            trace!(matcher = matcher.name(), pairs = pairs.len(), "matcher scanned text");

            for pair in pairs {
                let Some(candidate) = accept_pair(matcher.name(), &pair, extracted_at) else {
                    continue;
                };
                if seen_usernames.insert(candidate.username.to_ascii_lowercase()) {
                    accepted.push(candidate);
                } else {
                    trace!(
                        matcher = matcher.name(),
                        username = %candidate.username,
                        "username already answered"
                    );
                }
            }
        }

        accepted
    }

    fn run_fallback(&self, text: &str, extracted_at: DateTime<Utc>) -> Vec<AnswerCandidate> {
        let name = self.fallback.name();
        self.fallback
            .find_pairs(text)
            .iter()
            .filter_map(|pair| accept_pair(name, pair, extracted_at))
            .collect()
    }
}

/// Extract with the default extractor.
pub fn extract(text: &str, story_id: &str) -> Result<ParsedAnswers, ExtractionError> {
    DEFAULT_EXTRACTOR.extract(text, story_id)
}

/// Clean and validate a raw pair.
fn accept_pair(
    matcher: &str,
    pair: &RawPair,
    extracted_at: DateTime<Utc>,
) -> Option<AnswerCandidate> {
    let username = pair.username.trim();
    let answer = clean_answer(&pair.answer);

    if let Err(reason) = check_username(username).and_then(|_| check_answer(&answer)) {
        trace!(
            matcher,
            username,
            answer = %answer,
            reason = reason.as_str(),
            "rejected candidate"
        );
        return None;
    }

    Some(AnswerCandidate::new(username, answer).with_timestamp(extracted_at))
}

fn dedup_candidates(candidates: Vec<AnswerCandidate>) -> Vec<AnswerCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(dedup_key(&c.username, &c.answer)))
        .collect()
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(parsed: &ParsedAnswers) -> Vec<(&str, &str)> {
        parsed
            .answers
            .iter()
            .map(|a| (a.username.as_str(), a.answer.as_str()))
            .collect()
    }

    #[test]
    fn test_mention_reply_scenario() {
        let parsed = extract("@john replied \"Blue\"\n@mary replied \"Red\"", "story").unwrap();
        assert_eq!(pairs(&parsed), vec![("john", "Blue"), ("mary", "Red")]);
        assert_eq!(parsed.count, 2);
        assert_eq!(parsed.story_id, "story");
    }

    #[test]
    fn test_same_user_keeps_first_answer() {
        let parsed = extract("@john replied \"A\"\n@john replied \"B\"", "story").unwrap();
        assert_eq!(pairs(&parsed), vec![("john", "A")]);
    }

    #[test]
    fn test_username_dedup_is_case_insensitive_across_matchers() {
        let parsed = extract("@John replied \"Blue\"\njohn: Green\n@JOHN - Red", "story").unwrap();
        assert_eq!(pairs(&parsed), vec![("John", "Blue")]);
    }

    #[test]
    fn test_all_primary_matchers_run() {
        let text = "@anna ответил \"Синий\"\nboris: Зеленый\n@vera - Желтый\ngleb\nКрасный";
        let parsed = extract(text, "story").unwrap();
        assert_eq!(
            pairs(&parsed),
            vec![
                ("anna", "Синий"),
                ("boris", "Зеленый"),
                ("vera", "Желтый"),
                ("gleb", "Красный"),
            ]
        );
    }

    #[test]
    fn test_empty_text_yields_empty_result() {
        let parsed = extract("", "story").unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parsed.count, 0);
    }

    #[test]
    fn test_filters_invalid_candidates() {
        let text = "@instagram replied \"system message\"\n@validuser replied \"real answer\"\ntap to reply\n@x - too short";
        let parsed = extract(text, "story").unwrap();
        assert_eq!(pairs(&parsed), vec![("validuser", "real answer")]);
    }

    #[test]
    fn test_fallback_runs_only_when_primary_is_empty() {
        let parsed = extract("@user1\nfirst answer\n@user2\nsecond answer", "story").unwrap();
        assert_eq!(
            pairs(&parsed),
            vec![("user1", "first answer"), ("user2", "second answer")]
        );

        // Primary finds john, so the mention-only lines are left alone.
        let parsed = extract("@john replied \"Blue\"\n@user1\nfirst answer", "story").unwrap();
        assert_eq!(pairs(&parsed), vec![("john", "Blue")]);
    }

    #[test]
    fn test_fallback_dedups_composite_key() {
        let text = "@user1\nsame answer\n@USER1\nSame Answer\n@user1\nother answer";
        let parsed = extract(text, "story").unwrap();
        assert_eq!(
            pairs(&parsed),
            vec![("user1", "same answer"), ("user1", "other answer")]
        );
    }

    #[test]
    fn test_bare_token_answered_by_mention_line() {
        // "Same" pairs with "@USER1", so the primary stage finds it and the
        // fallback never runs.
        let parsed = extract("@user1\nSame\n@USER1\nsame\n@user1", "story").unwrap();
        assert_eq!(pairs(&parsed), vec![("Same", "@USER1")]);
    }

    #[test]
    fn test_mention_line_answers_bare_token() {
        let parsed = extract("alpha\n@beta", "story").unwrap();
        assert_eq!(pairs(&parsed), vec![("alpha", "@beta")]);

        // No bare token here, so the fallback pairs every adjacent line.
        let parsed = extract("@alpha\n@beta\ngamma", "story").unwrap();
        assert_eq!(pairs(&parsed), vec![("alpha", "@beta"), ("beta", "gamma")]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let parsed = extract("alice: Blue\r\nbob: Red\r\n", "story").unwrap();
        assert_eq!(pairs(&parsed), vec![("alice", "Blue"), ("bob", "Red")]);
    }

    #[test]
    fn test_candidates_stamped_with_extraction_time() {
        let parsed = extract("alice: Blue", "story").unwrap();
        assert_eq!(parsed.answers[0].timestamp, Some(parsed.extracted_at));
    }

    #[test]
    fn test_blank_story_id_is_parsing_failure() {
        let err = extract("alice: Blue", "  ").unwrap_err();
        assert!(matches!(err, ExtractionError::ParsingFailure { .. }));
        assert_eq!(err.story_id(), "  ");
    }

    #[test]
    fn test_oversized_text_is_parsing_failure() {
        let extractor = Extractor::new(ExtractorConfig { max_text_chars: 10 });
        let err = extractor.extract("alice: a long answer", "story-9").unwrap_err();
        assert_eq!(err.story_id(), "story-9");
        assert!(err.to_string().contains("story-9"));
    }

    #[test]
    fn test_custom_matchers_all_run() {
        struct Fixed(&'static str, &'static str, &'static str);
        impl PairMatcher for Fixed {
            fn name(&self) -> &'static str {
                self.0
            }
            fn find_pairs(&self, _text: &str) -> Vec<RawPair> {
                vec![RawPair::new(self.1, self.2)]
            }
        }

        let extractor = Extractor::with_matchers(
            ExtractorConfig::default(),
            vec![
                Box::new(Fixed("first", "alice", "one")),
                Box::new(Fixed("second", "bob", "two")),
            ],
            Box::new(Fixed("fallback", "carol", "three")),
        );
        let parsed = extractor.extract("ignored", "story").unwrap();
        assert_eq!(pairs(&parsed), vec![("alice", "one"), ("bob", "two")]);
    }

    #[test]
    fn test_every_candidate_passes_validation() {
        let text = "@ok_user replied \"fine\"\n@a - b\nstory: nope\nswipe\nup here\n@good - see translation";
        let parsed = extract(text, "story").unwrap();
        for candidate in &parsed.answers {
            assert!(is_valid_username(&candidate.username));
            assert!(is_valid_answer(&candidate.answer));
        }
        assert_eq!(pairs(&parsed), vec![("ok_user", "fine")]);
    }
}
