/// Smoothing mechanics: recursive exponential moving average.

/// EMA seeded with the first (oldest) value, folded forward:
/// acc = alpha * v + (1 - alpha) * acc. Empty input yields 0.
#[inline]
pub fn ema<I>(values: I, alpha: f64) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut it = values.into_iter();
    let Some(first) = it.next() else {
        return 0.0;
    };
    it.fold(first, |acc, v| alpha * v + (1.0 - alpha) * acc)
}
