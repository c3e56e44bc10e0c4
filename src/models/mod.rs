//! Data models for story reply extraction and aggregation.

mod answer;
mod quality;
mod statistics;

pub use answer::{AnswerCandidate, AnswerRecord, ParsedAnswers, RawText};
pub use quality::{QualityReport, QualityTier};
pub use statistics::{
    AnswerDistribution, DiversityMetrics, SentimentDistribution, StatisticsRecord, TopAnswerEntry,
    TrendAnalysis,
};
