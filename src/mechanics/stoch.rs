/// Stochastic mechanics: RNG helpers for synthetic play.
/// Note: uses `bevy_prng::WyRand` behind a `RefCell` so callers
/// can keep closures `Fn` while mutating RNG state.
use bevy_prng::WyRand;
use rand_core::{RngCore, SeedableRng};
use std::cell::RefCell;

/// Seeded generator for reproducible sessions.
pub fn seeded(seed: u64) -> RefCell<WyRand> {
    RefCell::new(WyRand::from_seed(seed.to_le_bytes()))
}

/// Uniform [0, 1) with 53 bits of precision.
#[inline]
pub fn uniform01(rng: &RefCell<WyRand>) -> f64 {
    let mut r = rng.borrow_mut();
    ((r.next_u64() >> 11) as f64) / ((1u64 << 53) as f64)
}

/// Gaussian(0,1) via Box–Muller.
#[inline]
pub fn gaussian01(rng: &RefCell<WyRand>) -> f64 {
    // 1 - u keeps the log argument in (0, 1]
    let u1 = 1.0 - uniform01(rng);
    let u2 = uniform01(rng);
    let r = (-2.0 * u1.ln()).sqrt();
    let t = 2.0 * std::f64::consts::PI * u2;
    r * t.cos()
}

/// Bernoulli(p).
#[inline]
pub fn bernoulli(rng: &RefCell<WyRand>, p: f64) -> bool {
    uniform01(rng) < p.clamp(0.0, 1.0)
}

/// Multiplicative jitter: max(0, 1 + N(0,1)*jitter).
#[inline]
pub fn jitter(rng: &RefCell<WyRand>, amount: f64) -> f64 {
    (1.0 + gaussian01(rng) * amount).max(0.0)
}
