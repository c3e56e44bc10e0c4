//! Matching strategies that pull raw username/answer pairs out of OCR text.
//!
//! Each matcher scans the whole text independently. Matchers do not clean or
//! validate what they return, except where validation decides how lines pair
//! up; the extractor applies cleaning and validation uniformly afterwards.

use std::sync::LazyLock;

use regex::Regex;

use super::validation::is_valid_answer;
use crate::text::clean_answer;

/// `@user replied "answer"`, `@user says: answer`, `@user ответил «ответ»`.
static MENTION_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)@([A-Za-z0-9_]+)[ \t]+(?:replied|answered|says|say|ответила|ответил)[ \t]*[":«“][ \t]*([^\n@]+)"#,
    )
    .expect("valid mention/verb regex")
});

/// `user: answer` at the start of a line.
static LABEL_COLON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([A-Za-z0-9_]+):[ \t]*([^\n]+)").expect("valid label/colon regex")
});

/// `@user - answer`.
static MENTION_DASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([A-Za-z0-9_]+)[ \t]*[-–—][ \t]*([^\n@]+)").expect("valid mention/dash regex")
});

static BARE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid bare token regex"));

static MENTION_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@?([A-Za-z0-9_]+)$").expect("valid mention token regex"));

fn is_answer_line(line: &str) -> bool {
    is_valid_answer(&clean_answer(line))
}

/// An unvalidated username/answer pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPair {
    pub username: String,
    pub answer: String,
}

impl RawPair {
    pub fn new(username: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            answer: answer.into(),
        }
    }
}

/// A strategy for finding candidate pairs in text.
pub trait PairMatcher: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Scan `text` and return every pair found, in text order.
    fn find_pairs(&self, text: &str) -> Vec<RawPair>;
}

fn pairs_from_captures(re: &Regex, text: &str) -> Vec<RawPair> {
    re.captures_iter(text)
        .filter_map(|caps| {
            let username = caps.get(1)?.as_str();
            let answer = caps.get(2)?.as_str();
            Some(RawPair::new(username, answer))
        })
        .collect()
}

/// Mention, response verb, then quoted or colon-delimited text.
#[derive(Debug, Default, Clone, Copy)]
pub struct MentionVerbMatcher;

impl PairMatcher for MentionVerbMatcher {
    fn name(&self) -> &'static str {
        "mention_verb"
    }

    fn find_pairs(&self, text: &str) -> Vec<RawPair> {
        pairs_from_captures(&MENTION_VERB_RE, text)
    }
}

/// Bare token at line start, a colon, then the rest of the line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LabelColonMatcher;

impl PairMatcher for LabelColonMatcher {
    fn name(&self) -> &'static str {
        "label_colon"
    }

    fn find_pairs(&self, text: &str) -> Vec<RawPair> {
        pairs_from_captures(&LABEL_COLON_RE, text)
    }
}

/// Mention, a dash, then text up to the line end or next mention.
#[derive(Debug, Default, Clone, Copy)]
pub struct MentionDashMatcher;

impl PairMatcher for MentionDashMatcher {
    fn name(&self) -> &'static str {
        "mention_dash"
    }

    fn find_pairs(&self, text: &str) -> Vec<RawPair> {
        pairs_from_captures(&MENTION_DASH_RE, text)
    }
}

/// A line holding a single token, answered by the next non-empty line.
///
/// Pairing is non-overlapping: once a line is used as an answer it is not
/// considered as a username.
#[derive(Debug, Default, Clone, Copy)]
pub struct BareTokenMatcher;

impl PairMatcher for BareTokenMatcher {
    fn name(&self) -> &'static str {
        "bare_token"
    }

    fn find_pairs(&self, text: &str) -> Vec<RawPair> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let mut pairs = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            if BARE_TOKEN_RE.is_match(line) {
                let next = (i + 1..lines.len()).find(|&j| !lines[j].is_empty());
                if let Some(j) = next {
                    if is_answer_line(lines[j]) {
                        pairs.push(RawPair::new(line, lines[j]));
                        i = j + 1;
                        continue;
                    }
                }
            }
            i += 1;
        }

        pairs
    }
}

/// Last-resort pairing of adjacent non-empty lines.
///
/// Every adjacent pair is considered, so a line can be an answer for the
/// line above it and a username for the line below it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineFallbackMatcher;

impl PairMatcher for LineFallbackMatcher {
    fn name(&self) -> &'static str {
        "line_fallback"
    }

    fn find_pairs(&self, text: &str) -> Vec<RawPair> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        lines
            .windows(2)
            .filter_map(|pair| {
                let caps = MENTION_TOKEN_RE.captures(pair[0])?;
                let username = caps.get(1)?.as_str();
                Some(RawPair::new(username, pair[1]))
            })
            .collect()
    }
}

/// Primary strategies in application order.
pub fn primary_matchers() -> Vec<Box<dyn PairMatcher>> {
    vec![
        Box::new(MentionVerbMatcher),
        Box::new(LabelColonMatcher),
        Box::new(MentionDashMatcher),
        Box::new(BareTokenMatcher),
    ]
}

pub fn fallback_matcher() -> Box<dyn PairMatcher> {
    Box::new(LineFallbackMatcher)
}
