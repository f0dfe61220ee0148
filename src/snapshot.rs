//! Per-session performance record handed over by the game loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;

/// Outcome of one completed play session.
///
/// The plain constructors do not validate. In particular `merge_count` may
/// exceed `drop_count`, in which case [`merge_ratio`](Self::merge_ratio)
/// reports a value above 1. Use [`try_new`](Self::try_new) to reject such
/// input at the edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub score: u64,
    pub merge_count: u32,
    pub drop_count: u32,
    pub survival_time_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceSnapshot {
    /// Snapshot stamped with the current time.
    pub fn new(score: u64, merge_count: u32, drop_count: u32, survival_time_seconds: f64) -> Self {
        Self::at(score, merge_count, drop_count, survival_time_seconds, Utc::now())
    }

    pub fn at(
        score: u64,
        merge_count: u32,
        drop_count: u32,
        survival_time_seconds: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            score,
            merge_count,
            drop_count,
            survival_time_seconds,
            timestamp,
        }
    }

    /// Validating constructor.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when merges exceed drops or the survival time
    /// is negative or not finite.
    pub fn try_new(
        score: u64,
        merge_count: u32,
        drop_count: u32,
        survival_time_seconds: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, SnapshotError> {
        let snapshot = Self::at(score, merge_count, drop_count, survival_time_seconds, timestamp);
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check the invariants the derived metrics assume.
    ///
    /// # Errors
    ///
    /// See [`try_new`](Self::try_new).
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if !self.survival_time_seconds.is_finite() {
            return Err(SnapshotError::NonFiniteSurvival(self.survival_time_seconds));
        }
        if self.survival_time_seconds < 0.0 {
            return Err(SnapshotError::NegativeSurvival(self.survival_time_seconds));
        }
        if !self.is_consistent() {
            return Err(SnapshotError::MergesExceedDrops {
                merges: self.merge_count,
                drops: self.drop_count,
            });
        }
        Ok(())
    }

    /// `merge_count <= drop_count`.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.merge_count <= self.drop_count
    }

    /// Merges per drop; 0 when nothing was dropped.
    #[inline]
    pub fn merge_ratio(&self) -> f64 {
        if self.drop_count == 0 {
            return 0.0;
        }
        f64::from(self.merge_count) / f64::from(self.drop_count)
    }

    /// Score per second of survival; 0 for zero or non-finite durations.
    #[inline]
    pub fn score_per_second(&self) -> f64 {
        let secs = self.survival_time_seconds;
        if !(secs > 0.0 && secs.is_finite()) {
            return 0.0;
        }
        self.score as f64 / secs
    }
}

/// Derived per-session metric the adapter can smooth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MergeRatio,
    ScorePerSecond,
}

impl Metric {
    #[inline]
    pub fn of(self, snapshot: &PerformanceSnapshot) -> f64 {
        match self {
            Self::MergeRatio => snapshot.merge_ratio(),
            Self::ScorePerSecond => snapshot.score_per_second(),
        }
    }
}
