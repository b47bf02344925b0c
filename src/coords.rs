//! Coordinate mapping helpers
//!
//! Screen space has Y growing downward, so a normalized level of 0
//! (silence) lands on the bottom edge and 1 (full scale) on the top edge.

/// Linearly map `value` from `[in_min, in_max]` to `[out_min, out_max]`
///
/// Precondition: `in_min != in_max`. A degenerate input range yields
/// infinities or NaN; callers get distinct bounds from a validated
/// [`PlotConfiguration`](crate::PlotConfiguration).
#[inline]
pub fn scale(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (out_max - out_min) * (value - in_min) / (in_max - in_min) + out_min
}

/// Convert a normalized `[0, 1]` value into a Y coordinate on a surface
/// of the given height
#[inline]
pub fn to_vertical_coordinate(normalized: f64, height: f64) -> f64 {
    height - normalized * height
}
