#![forbid(unsafe_code)]

//! Axis graduation helper.
//!
//! Places roughly `count` equally spaced ticks inside a range, at "nice"
//! positions: the spacing is a power of the base (ten, or two for
//! π-scaled axes) multiplied by 5, 1, or ½, whichever lands closest to the
//! ideal `span / count`.

use std::f64::consts::PI;

/// Tick placement parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSpec {
    /// Desired number of intervals.
    pub count: usize,
    /// Unit the ticks are multiples of (`1.0`, or `PI` for angle axes).
    pub scale: f64,
    /// Keep ticks that fall on the range edges.
    pub inclusive: bool,
}

impl Default for TickSpec {
    fn default() -> Self {
        Self {
            count: 10,
            scale: 1.0,
            inclusive: false,
        }
    }
}

impl TickSpec {
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn inclusive(mut self, inclusive: bool) -> Self {
        self.inclusive = inclusive;
        self
    }
}

/// Tick positions in `[min, max]`.
///
/// Exclusive mode drops one step at each edge so ticks never sit on the
/// range boundary. Degenerate input (empty or non-finite range, zero count,
/// non-positive scale) yields no ticks.
#[must_use]
pub fn ticks(min: f64, max: f64, spec: &TickSpec) -> Vec<f64> {
    let span = max - min;
    if !span.is_finite() || span <= 0.0 || spec.count == 0 || !(spec.scale > 0.0) {
        return Vec::new();
    }

    let ideal = span / spec.count as f64;
    let scale = spec.scale;
    let pi_scaled = scale == PI;
    let exponent = if pi_scaled {
        (ideal / scale).log2().floor()
    } else {
        (ideal / scale).log10().floor()
    };
    let base: f64 = if pi_scaled { 2.0 } else { 10.0 };
    let reference = scale * base.powf(exponent);

    let step = [5.0, 1.0, 0.5]
        .iter()
        .map(|factor| reference * factor)
        .fold(reference, |best, candidate| {
            if (candidate - ideal).abs() < (best - ideal).abs() {
                candidate
            } else {
                best
            }
        });

    let edge = if spec.inclusive { 0.0 } else { 1.0 };
    let first = ((min / step).ceil() + edge) * step;
    let last = ((max / step).floor() - edge) * step;
    if last < first {
        return Vec::new();
    }
    let n = ((last - first) / step).round() as usize + 1;

    (0..n).map(|i| first + i as f64 * step).collect()
}
