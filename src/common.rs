use float_cmp::ApproxEqRatio as _;

/// Ratio-based approximate equality for `f64` values.
///
/// The smaller value may not deviate from the larger by more than one part in 10^8.
/// Two NaN values compare equal so that sentinel fields survive comparison.
pub(crate) fn float_eq(l_value: f64, r_value: f64) -> bool {
    const RATIO_ERROR: f64 = 0.00000001;

    (l_value.is_nan() && r_value.is_nan()) || l_value.approx_eq_ratio(&r_value, RATIO_ERROR)
}
