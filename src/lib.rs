//! storyreplies: turn OCR'd story reply screenshots into per-story answer statistics.
//!
//! The flow is one-way and pure:
//! raw OCR text → [`extraction`] → candidate list → [`statistics`] and [`quality`].
//! [`pipeline`] ties the three together for one story or a batch.

pub mod cli;
pub mod config;
pub mod extraction;
pub mod keys;
pub mod models;
pub mod pipeline;
pub mod quality;
pub mod statistics;
pub mod text;

pub use extraction::{extract, ExtractionError, Extractor, ExtractorConfig};
pub use models::{
    AnswerCandidate, AnswerDistribution, DiversityMetrics, ParsedAnswers, QualityReport,
    QualityTier, RawText, StatisticsRecord, TopAnswerEntry, TrendAnalysis,
};
pub use pipeline::{PipelineError, StoryOutcome, StoryProcessor, StoryReport};
pub use quality::{analyze_quality, QualityAnalyzer};
pub use statistics::{
    analyze_trends, compute_statistics, create_summary, diversity_metrics, StatisticsEngine,
    StatisticsError,
};
