// demos/playtest.rs
// Run with:
//   RUST_LOG=debug cargo run --example playtest

use suika_difficulty::playtest::{PlaytestConfig, SyntheticPlayer, run_playtest};
use suika_difficulty::{AdapterConfig, DifficultyAdapter, PerformanceSnapshot};

fn main() {
    env_logger::init();

    // A host would read this from its settings bundle.
    let cfg = AdapterConfig::from_json(r#"{ "window_size": 20, "ema_alpha": 0.3 }"#)
        .unwrap_or_default();

    // Direct use: the game loop hands over one snapshot per session.
    let mut adapter = DifficultyAdapter::with_config(cfg.clone()).unwrap_or_default();
    for (score, merges, drops, secs) in [(1_800, 14, 40, 95.0), (2_600, 21, 44, 120.0), (400, 3, 30, 40.0)] {
        let params = adapter.record_session(PerformanceSnapshot::new(score, merges, drops, secs));
        println!(
            "skill {:.3} -> {:?} (struggling: {})",
            adapter.player_skill_estimate(),
            params,
            adapter.is_player_struggling()
        );
    }

    // Closed loop against synthetic players.
    for (label, player) in [
        ("beginner", SyntheticPlayer::steady(0.1)),
        ("expert", SyntheticPlayer::steady(0.95)),
        (
            "learner",
            SyntheticPlayer {
                skill: 0.2,
                learning_rate: 0.05,
                noise: 0.15,
            },
        ),
    ] {
        let mut adapter = DifficultyAdapter::with_config(cfg.clone()).unwrap_or_default();
        let out = run_playtest(
            &mut adapter,
            player,
            PlaytestConfig {
                max_sessions: 80,
                ..PlaytestConfig::default()
            },
        );
        println!("== {label} ==");
        println!("sessions   -> {} (converged: {})", out.sessions, out.converged);
        println!("estimate   -> {:.3} (true skill {:.3})", out.skill_estimate, out.player_skill);
        println!("params     -> {:?}", out.params);
        println!("struggling -> {} sessions", out.struggling_sessions);
    }
}
