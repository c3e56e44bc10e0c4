//! Extraction quality report.

use serde::{Deserialize, Serialize};

/// Coarse trust label for an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    High,
    Medium,
    Low,
}

impl QualityTier {
    /// Map a score in [0, 1] to a tier.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            QualityTier::High
        } else if score >= 0.5 {
            QualityTier::Medium
        } else {
            QualityTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::High => "high",
            QualityTier::Medium => "medium",
            QualityTier::Low => "low",
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    #[serde(rename = "quality")]
    pub tier: QualityTier,
    /// Issue tags in the order their penalties triggered.
    pub issues: Vec<String>,
    /// Final score in [0, 1].
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(QualityTier::from_score(1.0), QualityTier::High);
        assert_eq!(QualityTier::from_score(0.8), QualityTier::High);
        assert_eq!(QualityTier::from_score(0.79), QualityTier::Medium);
        assert_eq!(QualityTier::from_score(0.5), QualityTier::Medium);
        assert_eq!(QualityTier::from_score(0.49), QualityTier::Low);
        assert_eq!(QualityTier::from_score(0.0), QualityTier::Low);
    }

    #[test]
    fn test_tier_serializes_lowercase() {
        let json = serde_json::to_string(&QualityTier::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
