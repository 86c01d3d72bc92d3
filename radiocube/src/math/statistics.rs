//! Statistical functions: RMS and quantiles.

/// Root mean square of the finite values, `sqrt(mean(x²))`.
///
/// NaN and infinite samples are ignored. Returns 0.0 when nothing is finite.
pub fn rms<'a>(values: impl IntoIterator<Item = &'a f32>) -> f32 {
    let mut sum_sq = 0.0f64;
    let mut count = 0usize;
    for &v in values {
        if v.is_finite() {
            sum_sq += (v as f64) * (v as f64);
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    (sum_sq / count as f64).sqrt() as f32
}

/// Quantile `q` in `[0, 1]` with linear interpolation between order statistics
/// (the numpy default).
///
/// Mutates the input buffer (partial sort via quickselect). The buffer must
/// not contain NaN.
pub fn quantile_f32_mut(data: &mut [f32], q: f32) -> f32 {
    debug_assert!(!data.is_empty());
    debug_assert!(data.iter().all(|v| !v.is_nan()));

    let q = q.clamp(0.0, 1.0);
    let position = q as f64 * (data.len() - 1) as f64;
    let lower = position.floor() as usize;
    let fraction = (position - lower as f64) as f32;

    let (_, lower_value, upper_part) =
        data.select_nth_unstable_by(lower, |a, b| a.total_cmp(b));
    let lower_value = *lower_value;

    if fraction == 0.0 || upper_part.is_empty() {
        return lower_value;
    }

    let upper_value = upper_part.iter().copied().fold(f32::INFINITY, f32::min);
    lower_value + fraction * (upper_value - lower_value)
}
