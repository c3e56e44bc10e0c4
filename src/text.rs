//! Text normalization shared by extraction and statistics.

/// Quote-like characters stripped from the ends of an answer.
const QUOTE_CHARS: &[char] = &['"', '\'', '«', '»', '“', '”', '„', '‘', '’'];

/// Punctuation removed when grouping answers.
const GROUPING_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

/// Separator between username and answer in dedup keys.
const KEY_SEPARATOR: char = '\u{1f}';

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean an extracted answer: strip surrounding quotes, collapse whitespace.
pub fn clean_answer(raw: &str) -> String {
    let unquoted = raw.trim().trim_matches(QUOTE_CHARS);
    collapse_whitespace(unquoted)
}

/// Canonical grouping form: lowercase, no punctuation, single spaces.
pub fn canonicalize_answer(answer: &str) -> String {
    let stripped: String = answer
        .to_lowercase()
        .chars()
        .filter(|c| !GROUPING_PUNCTUATION.contains(c))
        .collect();
    collapse_whitespace(&stripped)
}

/// Uniqueness key for an extracted pair.
pub fn dedup_key(username: &str, answer: &str) -> String {
    format!(
        "{}{}{}",
        username.to_lowercase(),
        KEY_SEPARATOR,
        answer.to_lowercase()
    )
}

/// Length in characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
