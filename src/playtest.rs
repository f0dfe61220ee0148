//! # Playtest harness
//!
//! Closed-loop evaluation of an adapter against a synthetic player:
//!
//! 1) **simulate**: the player plays one session under the current params and
//!    produces a `PerformanceSnapshot`. Harder params lower both the merge
//!    ratio and the scoring pace; a stronger player raises them.
//! 2) **measure**: the snapshot is what the game loop would hand over.
//! 3) **update**: `DifficultyAdapter::record_session` returns the next params.
//! 4) **converged**: params stayed within tolerance for `settle_sessions`
//!    consecutive sessions.
//!
//! Runs are deterministic for a fixed seed. The player may improve over time
//! (`learning_rate`), which lets tests check that difficulty follows skill.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};
use log::debug;

use crate::adapter::DifficultyAdapter;
use crate::config::DifficultyAnchors;
use crate::mechanics::{control, stoch};
use crate::params::DifficultyParams;
use crate::snapshot::PerformanceSnapshot;
use crate::refine_det;

/// Expert scoring pace of the synthetic player at zero difficulty.
const PEAK_SCORE_PER_SECOND: f64 = 50.0;

/// Simulated player with a true skill the adapter tries to discover.
#[derive(Clone, Copy, Debug)]
pub struct SyntheticPlayer {
    /// True skill in [0, 1].
    pub skill: f64,
    /// Fraction of the gap to 1.0 closed after each session.
    pub learning_rate: f64,
    /// Multiplicative jitter on merge accuracy, pace and survival.
    pub noise: f64,
}

impl SyntheticPlayer {
    pub fn steady(skill: f64) -> Self {
        Self {
            skill: control::clamp01(skill),
            learning_rate: 0.0,
            noise: 0.0,
        }
    }

    /// Play one session; the snapshot is stamped with `timestamp`.
    pub fn play(
        &self,
        params: &DifficultyParams,
        anchors: &DifficultyAnchors,
        rng: &RefCell<bevy_prng::WyRand>,
        timestamp: DateTime<Utc>,
    ) -> PerformanceSnapshot {
        let difficulty = difficulty_index(anchors, params);
        let margin = self.skill - difficulty;

        let merge_ratio =
            control::clamp01(control::clamp01(0.5 + 0.5 * margin) * stoch::jitter(rng, self.noise));
        let pace = PEAK_SCORE_PER_SECOND
            * control::clamp01(self.skill * (1.0 - 0.5 * difficulty))
            * stoch::jitter(rng, self.noise);
        let survival = (60.0 + 240.0 * control::clamp01(0.5 + margin)) * stoch::jitter(rng, self.noise);
        let survival = survival.max(1.0);

        let drops = (40.0 + 40.0 * self.skill).round() as u32;
        let merges = ((merge_ratio * f64::from(drops)).round() as u32).min(drops);
        let score = (pace * survival).round() as u64;

        PerformanceSnapshot::at(score, merges, drops, survival, timestamp)
    }

    fn learn(&mut self) {
        self.skill = control::approach(self.skill, 1.0, self.learning_rate, 0.0, 1.0);
    }
}

/// Where `params` sit between the anchors, averaged over all four fields, in [0, 1].
pub fn difficulty_index(anchors: &DifficultyAnchors, params: &DifficultyParams) -> f64 {
    fn norm(v: f64, lo: f64, hi: f64) -> f64 {
        if hi > lo { control::clamp01((v - lo) / (hi - lo)) } else { 0.0 }
    }
    let (lo, hi) = (&anchors.low, &anchors.high);
    let parts = [
        norm(params.drop_speed_multiplier, lo.drop_speed_multiplier, hi.drop_speed_multiplier),
        norm(params.gravity_multiplier, lo.gravity_multiplier, hi.gravity_multiplier),
        norm(
            f64::from(params.max_fruit_tier),
            f64::from(lo.max_fruit_tier),
            f64::from(hi.max_fruit_tier),
        ),
        norm(
            f64::from(params.spawn_variety),
            f64::from(lo.spawn_variety),
            f64::from(hi.spawn_variety),
        ),
    ];
    parts.iter().sum::<f64>() / parts.len() as f64
}

#[derive(Clone, Copy, Debug)]
pub struct PlaytestConfig {
    pub max_sessions: usize,
    pub seed: u64,
    /// Max change in the real-valued params still counted as settled.
    pub tolerance: f64,
    /// Consecutive settled sessions required to stop.
    pub settle_sessions: usize,
    /// Clock at which the first session starts.
    pub start: DateTime<Utc>,
}

impl Default for PlaytestConfig {
    fn default() -> Self {
        Self {
            max_sessions: 200,
            seed: 0x5EED,
            tolerance: 1e-3,
            settle_sessions: 5,
            start: Utc::now(),
        }
    }
}

/// Result of one playtest run.
#[derive(Clone, Debug)]
pub struct PlaytestOutcome {
    pub params: DifficultyParams,
    pub skill_estimate: f64,
    /// The player's true skill after the run.
    pub player_skill: f64,
    pub sessions: usize,
    pub converged: bool,
    /// Sessions after which the adapter flagged the player as struggling.
    pub struggling_sessions: usize,
    /// Params returned after each session.
    pub trace: Vec<DifficultyParams>,
}

fn settled(a: &DifficultyParams, b: &DifficultyParams, tol: f64) -> bool {
    (a.drop_speed_multiplier - b.drop_speed_multiplier).abs() <= tol
        && (a.gravity_multiplier - b.gravity_multiplier).abs() <= tol
        && a.max_fruit_tier == b.max_fruit_tier
        && a.spawn_variety == b.spawn_variety
}

/// Drive `adapter` with `player` until params settle or `max_sessions` pass.
pub fn run_playtest(
    adapter: &mut DifficultyAdapter,
    player: SyntheticPlayer,
    cfg: PlaytestConfig,
) -> PlaytestOutcome {
    let anchors = adapter.config().anchors.clone();
    let rng = stoch::seeded(cfg.seed);
    let player = Rc::new(Cell::new(player));
    let clock = Rc::new(Cell::new(cfg.start));
    let trace = Rc::new(RefCell::new(Vec::with_capacity(cfg.max_sessions)));
    let struggling = Rc::new(Cell::new(0usize));
    let streak = Rc::new(Cell::new(0usize));
    let done = Rc::new(Cell::new(false));
    let theta0 = adapter.current_params();

    let simulate = {
        let player = Rc::clone(&player);
        let clock = Rc::clone(&clock);
        move |th: &DifficultyParams| -> PerformanceSnapshot {
            let mut p = player.get();
            let started = clock.get();
            let mut s = p.play(th, &anchors, &rng, started);
            let end = started + TimeDelta::milliseconds((s.survival_time_seconds * 1_000.0) as i64);
            s.timestamp = end;
            clock.set(end);
            p.learn();
            player.set(p);
            s
        }
    };

    let measure = |s: &PerformanceSnapshot| s.clone();

    let update = {
        let adapter = &mut *adapter;
        let trace = Rc::clone(&trace);
        let struggling = Rc::clone(&struggling);
        move |_th: &DifficultyParams, s: &PerformanceSnapshot| -> DifficultyParams {
            let next = adapter.record_session(s.clone());
            if adapter.is_player_struggling() {
                struggling.set(struggling.get() + 1);
            }
            trace.borrow_mut().push(next);
            next
        }
    };

    let converged = {
        let streak = Rc::clone(&streak);
        let done = Rc::clone(&done);
        move |a: &DifficultyParams, b: &DifficultyParams| -> bool {
            if settled(a, b, cfg.tolerance) {
                streak.set(streak.get() + 1);
            } else {
                streak.set(0);
            }
            let ok = streak.get() >= cfg.settle_sessions.max(1);
            if ok {
                done.set(true);
            }
            ok
        }
    };

    let params = refine_det(theta0, simulate, measure, update, converged, cfg.max_sessions);
    let trace = trace.take();
    debug!(
        "playtest finished after {} sessions (converged: {})",
        trace.len(),
        done.get()
    );

    PlaytestOutcome {
        params,
        skill_estimate: adapter.player_skill_estimate(),
        player_skill: player.get().skill,
        sessions: trace.len(),
        converged: done.get(),
        struggling_sessions: struggling.get(),
        trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_index_spans_anchors() {
        let anchors = DifficultyAnchors::default();
        assert_eq!(difficulty_index(&anchors, &anchors.low), 0.0);
        assert_eq!(difficulty_index(&anchors, &anchors.high), 1.0);
        let n = difficulty_index(&anchors, &DifficultyParams::NORMAL);
        assert!((n - 0.425).abs() < 1e-9, "{n}");
    }

    #[test]
    fn harder_params_hurt_the_same_player() {
        let anchors = DifficultyAnchors::default();
        let player = SyntheticPlayer::steady(0.5);
        let rng = stoch::seeded(3);
        let now = Utc::now();
        let easy = player.play(&anchors.low, &anchors, &rng, now);
        let hard = player.play(&anchors.high, &anchors, &rng, now);
        assert!(easy.merge_ratio() > hard.merge_ratio());
        assert!(easy.score_per_second() > hard.score_per_second());
        assert!(easy.is_consistent() && hard.is_consistent());
    }

    #[test]
    fn session_timestamps_advance() {
        let mut adapter = DifficultyAdapter::new();
        let cfg = PlaytestConfig {
            max_sessions: 6,
            settle_sessions: 100,
            ..PlaytestConfig::default()
        };
        let out = run_playtest(&mut adapter, SyntheticPlayer::steady(0.4), cfg);
        assert_eq!(out.sessions, 6);
        assert!(!out.converged);
        let ts: Vec<_> = adapter.history().iter().map(|s| s.timestamp).collect();
        assert!(ts.windows(2).all(|w| w[0] < w[1]));
        assert!(ts[0] > cfg.start);
    }
}
