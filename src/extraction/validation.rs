//! Username and answer validation.

use crate::text::char_len;

const USERNAME_MIN_LEN: usize = 2;
const USERNAME_MAX_LEN: usize = 30;
const ANSWER_MIN_LEN: usize = 1;
const ANSWER_MAX_LEN: usize = 500;

/// Platform and UI words that OCR picks up as usernames.
const RESERVED_USERNAMES: &[&str] = &[
    "instagram",
    "story",
    "stories",
    "post",
    "reply",
    "answer",
    "question",
    "poll",
    "vote",
    "tap",
    "click",
    "swipe",
];

/// Story UI chrome that is never a real answer.
const SYSTEM_PHRASES: &[&str] = &[
    "tap to reply",
    "swipe up",
    "see translation",
    "view replies",
    "нажмите",
    "проведите",
    "посмотреть",
    "ответить",
];

/// Why a username or answer was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UsernameLength,
    UsernameCharacters,
    ReservedUsername,
    AnswerLength,
    SystemPhrase,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::UsernameLength => "username length",
            Rejection::UsernameCharacters => "username characters",
            Rejection::ReservedUsername => "reserved username",
            Rejection::AnswerLength => "answer length",
            Rejection::SystemPhrase => "system phrase",
        }
    }
}

pub fn check_username(username: &str) -> Result<(), Rejection> {
    let len = char_len(username);
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(Rejection::UsernameLength);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Rejection::UsernameCharacters);
    }
    let lower = username.to_ascii_lowercase();
    if RESERVED_USERNAMES.contains(&lower.as_str()) {
        return Err(Rejection::ReservedUsername);
    }
    Ok(())
}

pub fn check_answer(answer: &str) -> Result<(), Rejection> {
    let len = char_len(answer);
    if !(ANSWER_MIN_LEN..=ANSWER_MAX_LEN).contains(&len) {
        return Err(Rejection::AnswerLength);
    }
    let lower = answer.to_lowercase();
    if SYSTEM_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return Err(Rejection::SystemPhrase);
    }
    Ok(())
}

pub fn is_valid_username(username: &str) -> bool {
    check_username(username).is_ok()
}

pub fn is_valid_answer(answer: &str) -> bool {
    check_answer(answer).is_ok()
}
