//! Aggregate statistics types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Canonical answer → count, iterated in first-seen order.
///
/// Ranking ties are broken by this order, so it is kept explicitly
/// rather than relying on map iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerDistribution {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl AnswerDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `key`, appending it if unseen.
    pub fn increment(&mut self, key: String) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.index.get(key).map(|&pos| self.entries[pos].1)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }
}

impl FromIterator<String> for AnswerDistribution {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut distribution = Self::new();
        for key in iter {
            distribution.increment(key);
        }
        distribution
    }
}

impl Serialize for AnswerDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// One row of the ranked answer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopAnswerEntry {
    /// Canonical answer.
    pub answer: String,
    pub count: usize,
    /// Share of all answers, 0-100, two decimal places.
    pub percentage: f64,
}

/// Per-story aggregate, keyed by story id in the statistics store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsRecord {
    pub story_id: String,
    pub total_answers: usize,
    pub unique_answers: usize,
    pub answer_distribution: AnswerDistribution,
    pub top_answers: Vec<TopAnswerEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DiversityMetrics {
    pub uniqueness_ratio: f64,
    pub average_length: usize,
    pub length_variance: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// Busiest hour-of-day slot, e.g. `"10:00-11:00"`.
    pub most_popular_time: Option<String>,
    pub answer_length_average: usize,
    pub sentiment: SentimentDistribution,
}
