/// Control mechanics: clamped interpolation and proportional updates.

/// Clamp to the unit interval. NaN collapses to 0.
#[inline]
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Linear interpolation a → b with t clamped to [0, 1]. Exact at both ends.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let t = clamp01(t);
    let v = a * (1.0 - t) + b * t;
    if a <= b { v.max(a).min(b) } else { v.max(b).min(a) }
}

/// Proportional approach: x' = clamp(x + k * (target - x)).
#[inline]
pub fn approach(x: f64, target: f64, k: f64, lo: f64, hi: f64) -> f64 {
    (x + k * (target - x)).clamp(lo, hi)
}
