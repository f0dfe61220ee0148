/*!
`suika_difficulty` — adaptive difficulty for a drop-and-merge puzzle game.

What it does
- Observes one `PerformanceSnapshot` per completed session (score, merges,
  drops, survival time).
- Keeps a bounded history and folds it into a skill estimate in [0, 1]
  using an exponential moving average of merge accuracy and scoring pace.
- Maps the estimate onto `DifficultyParams` (drop speed, max tier, gravity,
  spawn variety) by linear interpolation between two anchors.
- Flags short losing streaks (`is_player_struggling`) independently of the
  smoothed estimate.

How to use (call surface only)
- Build one `DifficultyAdapter` per game-session controller and own it.
- After each session: `let params = adapter.record_session(snapshot);`
  then apply `params` to spawn logic, physics scale and drop timing.
- `adapter.reset()` on profile reset.
- Wrap in `SharedDifficultyAdapter` if several threads record sessions.

What it does NOT do
- No rendering, input or physics. No persistence: snapshots and params are
  serde types so the host can store them.
- No learning beyond weighted averages; nothing survives the process.

The closed loop `params → play → measure → update` is also exposed as
`refine_det`, which the `playtest` module drives with a synthetic player.
*/

pub mod adapter;
pub mod config;
pub mod error;
pub mod mechanics;
pub mod params;
pub mod playtest;
pub mod shared;
pub mod snapshot;

pub use adapter::{DifficultyAdapter, INITIAL_SKILL, interpolate};
pub use config::{AdapterConfig, DifficultyAnchors, SkillCalibration};
pub use error::{ConfigError, SnapshotError};
pub use params::DifficultyParams;
pub use shared::SharedDifficultyAdapter;
pub use snapshot::{Metric, PerformanceSnapshot};

/// Deterministic refinement: θ_{t+1} = update(θ_t, measure(simulate(θ_t))).
///
/// Stops early when `converged(θ_t, θ_{t+1})` holds and returns θ_{t+1};
/// otherwise returns θ after `max_iters` steps.
pub fn refine_det<P, D, M, Sim, Meas, Upd, Conv>(
    mut theta: P,
    mut simulate: Sim,
    mut measure: Meas,
    mut update: Upd,
    mut converged: Conv,
    max_iters: usize,
) -> P
where
    Sim: FnMut(&P) -> D,
    Meas: FnMut(&D) -> M,
    Upd: FnMut(&P, &M) -> P,
    Conv: FnMut(&P, &P) -> bool,
{
    for _ in 0..max_iters {
        let data = simulate(&theta);
        let pi = measure(&data);
        let theta_next = update(&theta, &pi);
        if converged(&theta, &theta_next) {
            return theta_next;
        }
        theta = theta_next;
    }
    theta
}
