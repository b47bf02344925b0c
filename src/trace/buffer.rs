//! Decimating scroll buffer
//!
//! A [`ScrollingTrace`] turns a per-sample signal into a fixed number of
//! plotted Y coordinates:
//! - every `decimation` raw samples are averaged into one value
//! - the value is mapped from the dB window into surface pixels
//! - the point sequence scrolls left by one slot and the new point is
//!   appended on the right
//!
//! The trace itself is single-threaded. Crossing from the audio thread to
//! the UI thread is the job of [`super::handoff`].

use crate::coords::{scale, to_vertical_coordinate};

/// Numeric layout of a trace
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceLayout {
    /// Number of plotted points (always at least 1)
    pub point_count: usize,
    /// Raw samples averaged per plotted point (always at least 1)
    pub decimation: usize,
    /// dB value mapped to the bottom edge
    pub db_floor: f64,
    /// dB value mapped to the top edge
    pub headroom_db: f64,
    /// Physical surface height in pixels
    pub height: f64,
}

impl TraceLayout {
    /// Y coordinate for an averaged dB value
    #[inline]
    pub fn to_coordinate(&self, value: f64) -> f32 {
        let normalized = scale(value, self.db_floor, self.headroom_db, 0.0, 1.0);
        to_vertical_coordinate(normalized, self.height) as f32
    }

    /// Replace non-finite values with the nearest end of the dB window
    #[inline]
    pub fn sanitize(&self, value: f64) -> f64 {
        if value.is_finite() {
            value
        } else if value == f64::INFINITY {
            self.headroom_db
        } else {
            self.db_floor
        }
    }
}

/// Fixed-length scrolling trace fed one sample at a time
///
/// ## Example
///
/// ```
/// use levelplot::{ScrollingTrace, TraceLayout};
///
/// let layout = TraceLayout {
///     point_count: 4,
///     decimation: 2,
///     db_floor: -32.0,
///     headroom_db: 2.0,
///     height: 100.0,
/// };
/// let mut trace = ScrollingTrace::new(layout, 102.0);
///
/// assert!(!trace.process(-10.0));
/// assert!(trace.process(-10.0)); // second sample completes the block
/// assert_eq!(trace.points().len(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct ScrollingTrace {
    layout: TraceLayout,
    /// Plotted Y coordinates, oldest first
    points: Vec<f32>,
    /// Sum of the samples in the current block
    accumulator: f64,
    /// Samples in the current block
    pending: usize,
}

impl ScrollingTrace {
    /// Create a trace whose points all start at `fill`
    ///
    /// `fill` is normally an off-screen sentinel (just below the bottom
    /// edge, or just above the top edge for top-anchored traces) so a fresh
    /// trace draws nothing visible.
    pub fn new(layout: TraceLayout, fill: f32) -> Self {
        let layout = TraceLayout {
            point_count: layout.point_count.max(1),
            decimation: layout.decimation.max(1),
            ..layout
        };
        Self {
            points: vec![fill; layout.point_count],
            layout,
            accumulator: 0.0,
            pending: 0,
        }
    }

    /// Push one raw sample
    ///
    /// Never allocates. Returns `true` when the sample completed a block and
    /// a new point was appended.
    pub fn process(&mut self, sample: f64) -> bool {
        self.accumulator += self.layout.sanitize(sample);
        self.pending += 1;

        if self.pending < self.layout.decimation {
            return false;
        }

        let average = self.layout.sanitize(self.accumulator / self.layout.decimation as f64);
        self.accumulator = 0.0;
        self.pending = 0;

        let y = self.layout.to_coordinate(average);
        self.points.copy_within(1.., 0);
        // `points` is never empty (point_count >= 1)
        if let Some(last) = self.points.last_mut() {
            *last = y;
        }
        true
    }

    /// Reallocate to `point_count` points all equal to `fill`
    ///
    /// History and the partial block are discarded.
    pub fn resize(&mut self, point_count: usize, fill: f32) {
        let point_count = point_count.max(1);
        self.layout.point_count = point_count;
        self.points = vec![fill; point_count];
        self.accumulator = 0.0;
        self.pending = 0;
    }

    /// Switch to a new layout, discarding history
    pub fn relayout(&mut self, layout: TraceLayout, fill: f32) {
        *self = Self::new(layout, fill);
    }

    pub fn points(&self) -> &[f32] {
        &self.points
    }

    pub fn layout(&self) -> &TraceLayout {
        &self.layout
    }

    pub fn pending_count(&self) -> usize {
        self.pending
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(point_count: usize, decimation: usize) -> TraceLayout {
        TraceLayout {
            point_count,
            decimation,
            db_floor: -32.0,
            headroom_db: 2.0,
            height: 100.0,
        }
    }

    #[test]
    fn test_length_is_stable() {
        let mut trace = ScrollingTrace::new(layout(7, 3), 102.0);
        for i in 0..1000 {
            trace.process((i % 40) as f64 - 30.0);
            assert_eq!(trace.points().len(), 7);
        }
    }

    #[test]
    fn test_decimation_emits_one_point() {
        let mut trace = ScrollingTrace::new(layout(4, 5), 102.0);
        for _ in 0..4 {
            assert!(!trace.process(-15.0));
        }
        assert_eq!(trace.pending_count(), 4);
        assert!(trace.process(-15.0));

        let expected = to_vertical_coordinate(scale(-15.0, -32.0, 2.0, 0.0, 1.0), 100.0) as f32;
        assert!((trace.points()[3] - expected).abs() < 1e-4);
        assert_eq!(&trace.points()[..3], &[102.0, 102.0, 102.0]);
        assert_eq!(trace.pending_count(), 0);
        assert_eq!(trace.accumulator(), 0.0);
    }

    #[test]
    fn test_block_average() {
        let mut trace = ScrollingTrace::new(layout(2, 2), 102.0);
        trace.process(-32.0);
        trace.process(2.0);
        // average -15 dB sits halfway up
        assert!((trace.points()[1] - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_scrolls_oldest_out() {
        let mut trace = ScrollingTrace::new(layout(3, 1), 102.0);
        trace.process(-32.0); // y = 100
        trace.process(2.0); // y = 0
        trace.process(-15.0); // y = 50
        trace.process(2.0); // y = 0, pushes the first point out
        let points = trace.points();
        assert!((points[0] - 0.0).abs() < 1e-4);
        assert!((points[1] - 50.0).abs() < 1e-4);
        assert!((points[2] - 0.0).abs() < 1e-4);
    }

    #[test]
    fn test_resize_discards_history() {
        let mut trace = ScrollingTrace::new(layout(4, 2), 102.0);
        for _ in 0..9 {
            trace.process(-3.0);
        }
        assert_eq!(trace.pending_count(), 1);

        trace.resize(6, -2.0);
        assert_eq!(trace.points(), &[-2.0; 6]);
        assert_eq!(trace.pending_count(), 0);
        assert_eq!(trace.accumulator(), 0.0);
    }

    #[test]
    fn test_non_finite_input_is_clamped() {
        let mut trace = ScrollingTrace::new(layout(3, 1), 102.0);
        trace.process(f64::NAN);
        trace.process(f64::INFINITY);
        trace.process(f64::NEG_INFINITY);
        let points = trace.points();
        assert!(points.iter().all(|p| p.is_finite()));
        assert!((points[0] - 100.0).abs() < 1e-4);
        assert!((points[1] - 0.0).abs() < 1e-4);
        assert!((points[2] - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_overflowing_average_is_clamped() {
        let mut trace = ScrollingTrace::new(layout(1, 2), 102.0);
        trace.process(f64::MAX);
        trace.process(f64::MAX);
        assert!(trace.points()[0].is_finite());
    }

    #[test]
    fn test_zero_sizes_are_raised_to_one() {
        let trace = ScrollingTrace::new(layout(0, 0), 5.0);
        assert_eq!(trace.points().len(), 1);
        assert_eq!(trace.layout().decimation, 1);
    }

    #[test]
    fn test_scenario_48db_window() {
        // 44.1 kHz, 5 s, High resolution on a 400 px surface
        let point_count = 400 / 2;
        let decimation = (5.0_f64 * 44_100.0 / point_count as f64).round() as usize;
        let mut trace = ScrollingTrace::new(
            TraceLayout {
                point_count,
                decimation,
                db_floor: -48.0,
                headroom_db: 2.0,
                height: 200.0,
            },
            202.0,
        );
        for _ in 0..decimation {
            trace.process(0.0);
        }
        let expected = to_vertical_coordinate(scale(0.0, -48.0, 2.0, 0.0, 1.0), 200.0) as f32;
        assert!((trace.points()[point_count - 1] - expected).abs() < 1e-3);
        assert_eq!(trace.points()[point_count - 2], 202.0);
    }
}
