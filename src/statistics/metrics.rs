//! Derived answer metrics: diversity, timing and sentiment.

use std::collections::HashSet;

use chrono::Timelike;

use crate::models::{AnswerCandidate, DiversityMetrics, SentimentDistribution, TrendAnalysis};
use crate::text::{canonicalize_answer, char_len, round2};

const POSITIVE_WORDS: &[&str] = &[
    "хорошо", "отлично", "супер", "класс", "amazing", "great", "good", "love", "awesome",
];

const NEGATIVE_WORDS: &[&str] = &["плохо", "ужасно", "terrible", "bad", "hate", "awful", "horrible"];

/// Uniqueness and length spread of canonical answers.
pub fn diversity_metrics(answers: &[AnswerCandidate]) -> DiversityMetrics {
    if answers.is_empty() {
        return DiversityMetrics::default();
    }

    let canonical: Vec<String> = answers
        .iter()
        .map(|a| canonicalize_answer(&a.answer))
        .collect();
    let unique = canonical.iter().collect::<HashSet<_>>().len();
    let n = canonical.len() as f64;

    let lengths: Vec<f64> = canonical.iter().map(|a| char_len(a) as f64).collect();
    let mean = lengths.iter().sum::<f64>() / n;
    let variance = lengths.iter().map(|len| (len - mean).powi(2)).sum::<f64>() / n;

    DiversityMetrics {
        uniqueness_ratio: round2(unique as f64 / n),
        average_length: mean.round() as usize,
        length_variance: variance.round() as usize,
    }
}

/// Busiest hour, raw answer length and sentiment split.
pub fn analyze_trends(answers: &[AnswerCandidate]) -> TrendAnalysis {
    let answer_length_average = if answers.is_empty() {
        0
    } else {
        let total: usize = answers.iter().map(|a| char_len(&a.answer)).sum();
        (total as f64 / answers.len() as f64).round() as usize
    };

    TrendAnalysis {
        most_popular_time: most_popular_time(answers),
        answer_length_average,
        sentiment: analyze_sentiment(answers),
    }
}

/// Hour-of-day slot (UTC) with the most timestamped answers.
///
/// Slots are compared in the order they were first seen, so the earliest
/// seen slot wins a tie. Returns `None` when no answer has a timestamp.
pub fn most_popular_time(answers: &[AnswerCandidate]) -> Option<String> {
    let mut slots: Vec<(u32, usize)> = Vec::new();

    for ts in answers.iter().filter_map(|a| a.timestamp) {
        let hour = ts.hour();
        match slots.iter_mut().find(|(h, _)| *h == hour) {
            Some((_, count)) => *count += 1,
            None => slots.push((hour, 1)),
        }
    }

    let mut best: Option<(u32, usize)> = None;
    for &(hour, count) in &slots {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((hour, count));
        }
    }

    best.map(|(hour, _)| format!("{}:00-{}:00", hour, hour + 1))
}

/// Lexicon sentiment. Positive words are checked first, then negative;
/// anything else counts as neutral.
pub fn analyze_sentiment(answers: &[AnswerCandidate]) -> SentimentDistribution {
    let mut dist = SentimentDistribution::default();

    for answer in answers {
        let lower = answer.answer.to_lowercase();
        if POSITIVE_WORDS.iter().any(|w| lower.contains(w)) {
            dist.positive += 1;
        } else if NEGATIVE_WORDS.iter().any(|w| lower.contains(w)) {
            dist.negative += 1;
        } else {
            dist.neutral += 1;
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn answer(text: &str) -> AnswerCandidate {
        AnswerCandidate::new("user", text)
    }

    fn at(text: &str, ts: &str) -> AnswerCandidate {
        let ts: DateTime<Utc> = ts.parse().unwrap();
        answer(text).with_timestamp(ts)
    }

    #[test]
    fn test_diversity_metrics() {
        let metrics = diversity_metrics(&[answer("Ответ 1"), answer("Ответ 2"), answer("Ответ 1")]);
        assert_eq!(metrics.uniqueness_ratio, 0.67);
        assert_eq!(metrics.average_length, 7);
        assert_eq!(metrics.length_variance, 0);
    }

    #[test]
    fn test_diversity_uses_canonical_lengths() {
        // "Hi!!!" canonicalizes to "hi".
        let metrics = diversity_metrics(&[answer("Hi!!!"), answer("hello")]);
        assert_eq!(metrics.uniqueness_ratio, 1.0);
        // mean 3.5 rounds to 4; variance 2.25 rounds to 2
        assert_eq!(metrics.average_length, 4);
        assert_eq!(metrics.length_variance, 2);
    }

    #[test]
    fn test_diversity_empty() {
        assert_eq!(diversity_metrics(&[]), DiversityMetrics::default());
    }

    #[test]
    fn test_trends() {
        let answers = [
            at("Короткий", "2024-01-01T10:00:00Z"),
            at("Средний ответ", "2024-01-01T10:30:00Z"),
            at("Очень длинный ответ пользователя", "2024-01-01T11:00:00Z"),
        ];
        let trends = analyze_trends(&answers);

        assert_eq!(trends.most_popular_time.as_deref(), Some("10:00-11:00"));
        // (8 + 13 + 32) / 3 = 17.67
        assert_eq!(trends.answer_length_average, 18);
        assert_eq!(trends.sentiment.neutral, 3);
    }

    #[test]
    fn test_trends_empty() {
        let trends = analyze_trends(&[]);
        assert_eq!(trends.answer_length_average, 0);
        assert!(trends.most_popular_time.is_none());
        assert_eq!(trends.sentiment, SentimentDistribution::default());
    }

    #[test]
    fn test_popular_time_tie_goes_to_first_seen() {
        let answers = [
            at("a", "2024-01-01T15:10:00Z"),
            at("b", "2024-01-01T09:00:00Z"),
            at("c", "2024-01-01T09:59:00Z"),
            at("d", "2024-01-01T15:45:00Z"),
        ];
        assert_eq!(most_popular_time(&answers).as_deref(), Some("15:00-16:00"));
    }

    #[test]
    fn test_popular_time_ignores_missing_timestamps() {
        let answers = [answer("a"), at("b", "2024-01-01T23:05:00Z"), answer("c")];
        assert_eq!(most_popular_time(&answers).as_deref(), Some("23:00-24:00"));
        assert!(most_popular_time(&[answer("a")]).is_none());
    }

    #[test]
    fn test_sentiment_buckets() {
        let dist = analyze_sentiment(&[
            answer("отлично хорошо"),
            answer("плохо ужасно"),
            answer("нормально"),
        ]);
        assert_eq!(
            dist,
            SentimentDistribution {
                positive: 1,
                negative: 1,
                neutral: 1,
            }
        );
    }

    #[test]
    fn test_sentiment_positive_checked_first() {
        let dist = analyze_sentiment(&[answer("Love it, hate the price")]);
        assert_eq!(dist.positive, 1);
        assert_eq!(dist.negative, 0);
    }
}
