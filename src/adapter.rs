//! Adaptive difficulty engine.
//!
//! Observes completed sessions, keeps a bounded history, folds it into a
//! smoothed skill estimate and maps that estimate onto [`DifficultyParams`]
//! by linear interpolation between two anchors.

use log::{debug, info, warn};

use crate::config::{AdapterConfig, DifficultyAnchors};
use crate::error::ConfigError;
use crate::mechanics::{control, smoothing};
use crate::params::DifficultyParams;
use crate::snapshot::{Metric, PerformanceSnapshot};

/// Skill reported before any session has been recorded.
pub const INITIAL_SKILL: f64 = 0.5;

/// Stateful skill estimator owned by the session controller.
#[derive(Clone, Debug)]
pub struct DifficultyAdapter {
    cfg: AdapterConfig,
    history: Vec<PerformanceSnapshot>,
    current_params: DifficultyParams,
    player_skill_estimate: f64,
}

impl DifficultyAdapter {
    /// Adapter with default settings (window 20, alpha 0.3).
    pub fn new() -> Self {
        Self::from_valid(AdapterConfig::default())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if `cfg` fails validation.
    pub fn with_config(cfg: AdapterConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::from_valid(cfg))
    }

    /// Shorthand for [`with_config`](Self::with_config) with default calibration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero window or alpha outside (0, 1].
    pub fn with_window(window_size: usize, ema_alpha: f64) -> Result<Self, ConfigError> {
        Self::with_config(AdapterConfig::with_window(window_size, ema_alpha))
    }

    /// Rebuild an adapter by recording previously persisted sessions in order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `cfg` fails validation.
    pub fn replay<I>(cfg: AdapterConfig, sessions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = PerformanceSnapshot>,
    {
        let mut adapter = Self::with_config(cfg)?;
        for s in sessions {
            adapter.record_session(s);
        }
        Ok(adapter)
    }

    fn from_valid(cfg: AdapterConfig) -> Self {
        Self {
            history: Vec::new(),
            cfg,
            current_params: DifficultyParams::NORMAL,
            player_skill_estimate: INITIAL_SKILL,
        }
    }

    /// Record a completed session and return the params for the next one.
    pub fn record_session(&mut self, snapshot: PerformanceSnapshot) -> DifficultyParams {
        if !snapshot.is_consistent() {
            warn!(
                "inconsistent session: {} merges from {} drops; merge signal will be clamped",
                snapshot.merge_count, snapshot.drop_count
            );
        }
        self.history.push(snapshot);

        let window = self.cfg.window_size;
        if self.history.len() > window.saturating_mul(2) {
            let excess = self.history.len() - window;
            self.history.drain(..excess);
            debug!("history trimmed to the newest {window} sessions");
        }

        self.player_skill_estimate = self.estimate_skill();
        self.current_params = interpolate(&self.cfg.anchors, self.player_skill_estimate);
        debug!(
            "session {} recorded: skill {:.3} -> {:?}",
            self.history.len(),
            self.player_skill_estimate,
            self.current_params
        );
        self.current_params
    }

    /// EMA of `metric` over the retained history, oldest first. 0 when empty.
    pub fn ema(&self, metric: Metric) -> f64 {
        smoothing::ema(
            self.history.iter().map(|s| metric.of(s)),
            self.cfg.ema_alpha,
        )
    }

    fn estimate_skill(&self) -> f64 {
        let cal = &self.cfg.calibration;
        let merge_signal = control::clamp01(self.ema(Metric::MergeRatio));
        let sps_signal =
            control::clamp01(self.ema(Metric::ScorePerSecond) / cal.reference_score_per_second);
        cal.merge_weight * merge_signal + cal.score_rate_weight() * sps_signal
    }

    /// True once the most recent `struggle_streak` sessions all fall below the
    /// struggle merge ratio. Ignores the smoothed estimate.
    pub fn is_player_struggling(&self) -> bool {
        let cal = &self.cfg.calibration;
        let n = cal.struggle_streak;
        if self.history.len() < n {
            return false;
        }
        self.history[self.history.len() - n..]
            .iter()
            .all(|s| s.merge_ratio() < cal.struggle_merge_ratio)
    }

    /// Clear history and restore the initial params and skill.
    pub fn reset(&mut self) {
        info!("difficulty reset ({} sessions discarded)", self.history.len());
        self.history.clear();
        self.current_params = DifficultyParams::NORMAL;
        self.player_skill_estimate = INITIAL_SKILL;
    }

    pub fn current_params(&self) -> DifficultyParams {
        self.current_params
    }

    /// 0 = beginner, 1 = expert.
    pub fn player_skill_estimate(&self) -> f64 {
        self.player_skill_estimate
    }

    /// Retained sessions, oldest first.
    pub fn history(&self) -> &[PerformanceSnapshot] {
        &self.history
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.cfg
    }
}

impl Default for DifficultyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a skill scalar onto params. Integer fields truncate toward zero.
pub fn interpolate(anchors: &DifficultyAnchors, skill: f64) -> DifficultyParams {
    let (lo, hi) = (&anchors.low, &anchors.high);
    let t = control::clamp01(skill);
    DifficultyParams {
        drop_speed_multiplier: control::lerp(lo.drop_speed_multiplier, hi.drop_speed_multiplier, t),
        max_fruit_tier: control::lerp(f64::from(lo.max_fruit_tier), f64::from(hi.max_fruit_tier), t)
            as u32,
        gravity_multiplier: control::lerp(lo.gravity_multiplier, hi.gravity_multiplier, t),
        spawn_variety: control::lerp(f64::from(lo.spawn_variety), f64::from(hi.spawn_variety), t)
            as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(score: u64, merges: u32, drops: u32, secs: f64) -> PerformanceSnapshot {
        PerformanceSnapshot::new(score, merges, drops, secs)
    }

    #[test]
    fn fresh_adapter_reports_defaults() {
        let a = DifficultyAdapter::new();
        assert_eq!(a.current_params(), DifficultyParams::NORMAL);
        assert_eq!(a.player_skill_estimate(), 0.5);
        assert!(a.history().is_empty());
        assert_eq!(a.ema(Metric::MergeRatio), 0.0);
    }

    #[test]
    fn zero_session_collapses_to_low_anchor() {
        let mut a = DifficultyAdapter::with_window(20, 0.3).unwrap();
        let p = a.record_session(session(0, 0, 0, 0.0));
        assert_eq!(a.player_skill_estimate(), 0.0);
        assert_eq!(p.drop_speed_multiplier, 0.6);
        assert_eq!(p, DifficultyParams::EASY);
    }

    #[test]
    fn skill_combines_weighted_signals() {
        let mut a = DifficultyAdapter::new();
        // merge ratio 0.5, 25 sps → 0.6*0.5 + 0.4*0.5
        a.record_session(session(250, 5, 10, 10.0));
        assert!((a.player_skill_estimate() - 0.5).abs() < 1e-12);
        let p = a.current_params();
        assert!((p.drop_speed_multiplier - 1.1).abs() < 1e-12);
        assert!((p.gravity_multiplier - 1.05).abs() < 1e-12);
        // 3 + 5*0.5 = 5.5 → 5 ; 3 + 4*0.5 = 5.0 → 5
        assert_eq!(p.max_fruit_tier, 5);
        assert_eq!(p.spawn_variety, 5);
    }

    #[test]
    fn integer_params_truncate() {
        let anchors = DifficultyAnchors::default();
        let p = interpolate(&anchors, 0.99);
        // 3 + 5*0.99 = 7.95, 3 + 4*0.99 = 6.96
        assert_eq!(p.max_fruit_tier, 7);
        assert_eq!(p.spawn_variety, 6);
        let top = interpolate(&anchors, 1.0);
        assert_eq!((top.max_fruit_tier, top.spawn_variety), (8, 7));
    }

    #[test]
    fn interpolate_clamps_out_of_range_skill() {
        let anchors = DifficultyAnchors::default();
        assert_eq!(interpolate(&anchors, -3.0), anchors.low);
        assert_eq!(interpolate(&anchors, 4.0), anchors.high);
    }

    #[test]
    fn sps_signal_saturates() {
        let mut a = DifficultyAdapter::new();
        // merge ratio 0, 1000 sps → 0.4
        a.record_session(session(10_000, 0, 10, 10.0));
        assert!((a.player_skill_estimate() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn inconsistent_snapshot_stays_in_range() {
        let mut a = DifficultyAdapter::new();
        a.record_session(session(0, 50, 1, 1.0));
        assert!((a.player_skill_estimate() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn struggling_needs_three_recent_low_sessions() {
        let mut a = DifficultyAdapter::new();
        a.record_session(session(0, 0, 10, 5.0));
        a.record_session(session(0, 1, 10, 5.0));
        assert!(!a.is_player_struggling());
        a.record_session(session(0, 1, 20, 5.0));
        assert!(a.is_player_struggling());
        a.record_session(session(0, 2, 10, 5.0)); // exactly 0.2 is not a struggle
        assert!(!a.is_player_struggling());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut a = DifficultyAdapter::new();
        for _ in 0..5 {
            a.record_session(session(5_000, 9, 10, 60.0));
        }
        a.reset();
        assert!(a.history().is_empty());
        assert_eq!(a.current_params(), DifficultyParams::NORMAL);
        assert_eq!(a.player_skill_estimate(), INITIAL_SKILL);
        assert!(!a.is_player_struggling());
    }

    #[test]
    fn trim_keeps_newest_window() {
        let mut a = DifficultyAdapter::with_window(4, 0.3).unwrap();
        for i in 0..9u64 {
            a.record_session(session(i, 0, 1, 1.0));
        }
        // 9 > 8 → trimmed to the newest 4
        let scores: Vec<u64> = a.history().iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![5, 6, 7, 8]);
    }

    #[test]
    fn replay_matches_live_recording() {
        let sessions: Vec<_> = (0..30u32)
            .map(|i| session(u64::from(i) * 40, i % 7, 10, 20.0 + f64::from(i)))
            .collect();
        let mut live = DifficultyAdapter::with_window(8, 0.4).unwrap();
        for s in sessions.iter().cloned() {
            live.record_session(s);
        }
        let replayed = DifficultyAdapter::replay(AdapterConfig::with_window(8, 0.4), sessions).unwrap();
        assert_eq!(replayed.history(), live.history());
        assert_eq!(replayed.player_skill_estimate(), live.player_skill_estimate());
        assert_eq!(replayed.current_params(), live.current_params());
    }

    #[test]
    fn with_window_rejects_invalid() {
        assert!(DifficultyAdapter::with_window(0, 0.3).is_err());
        assert!(DifficultyAdapter::with_window(10, 1.5).is_err());
    }
}
