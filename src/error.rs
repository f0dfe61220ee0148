//! Error types for the edges of the crate: configuration and opt-in snapshot
//! validation. Recording and resetting never fail.

use thiserror::Error;

/// Raised when an [`AdapterConfig`](crate::AdapterConfig) violates its invariants.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("window_size must be at least 1")]
    ZeroWindow,
    #[error("ema_alpha must be in (0, 1] (got {0})")]
    AlphaOutOfRange(f64),
    #[error("reference_score_per_second must be positive and finite (got {0})")]
    ReferenceRate(f64),
    #[error("merge_weight must be in [0, 1] (got {0})")]
    MergeWeight(f64),
    #[error("struggle_merge_ratio must be in [0, 1] (got {0})")]
    StruggleRatio(f64),
    #[error("struggle_streak must be at least 1")]
    ZeroStreak,
    #[error("{field} anchors inverted (low {low} > high {high})")]
    InvertedAnchor {
        field: &'static str,
        low: f64,
        high: f64,
    },
    #[error("failed to parse adapter config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raised by [`PerformanceSnapshot::try_new`](crate::PerformanceSnapshot::try_new).
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("merge count {merges} exceeds drop count {drops}")]
    MergesExceedDrops { merges: u32, drops: u32 },
    #[error("survival time must not be negative (got {0})")]
    NegativeSurvival(f64),
    #[error("survival time must be finite (got {0})")]
    NonFiniteSurvival(f64),
}
