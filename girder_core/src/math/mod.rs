//! # Numerical Helpers
//!
//! - [`piecewise`] - Piecewise-linear functions and their intersections

pub mod piecewise;

pub use piecewise::{PiecewiseFunction, Point2d, Range};

/// Round `value` to the nearest multiple of `increment`
#[inline]
pub fn round_to(value: f64, increment: f64) -> f64 {
    (value / increment).round() * increment
}

/// Treat magnitudes below `tolerance` as zero
#[inline]
pub fn zero_if_small(value: f64, tolerance: f64) -> f64 {
    if value.abs() < tolerance {
        0.0
    } else {
        value
    }
}
