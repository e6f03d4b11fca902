//! # Piecewise-Linear Functions
//!
//! Sampled functions y(x) with linear interpolation between breakpoints,
//! used to intersect the shear depth curve with the 45° support intercept.
//!
//! ```rust
//! use girder_core::math::PiecewiseFunction;
//!
//! let mut dv = PiecewiseFunction::new();
//! dv.add_point(0.0, 5.0);
//! dv.add_point(10.0, 5.0);
//!
//! let unity = PiecewiseFunction::line(0.0, 10.0, 1.0, 0.0);
//! let hits = dv.intersect(&unity, dv.range().unwrap()).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert!((hits[0].x - 5.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Breakpoints closer than this are the same location
const X_TOLERANCE: f64 = 1.0e-9;

/// Function values closer than this are equal
const Y_TOLERANCE: f64 = 1.0e-9;

/// Closed interval of x
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub left: f64,
    pub right: f64,
}

impl Range {
    pub fn new(left: f64, right: f64) -> Self {
        Range { left, right }
    }

    pub fn is_in_range(&self, x: f64) -> bool {
        self.left - X_TOLERANCE <= x && x <= self.right + X_TOLERANCE
    }

    pub fn intersection(&self, other: &Range) -> Option<Range> {
        let left = self.left.max(other.left);
        let right = self.right.min(other.right);
        if left <= right + X_TOLERANCE {
            Some(Range::new(left, right.max(left)))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

/// y(x) defined by breakpoints sorted on x
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseFunction {
    points: Vec<Point2d>,
}

impl PiecewiseFunction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Straight line y = slope·x + intercept sampled at `x0` and `x1`
    pub fn line(x0: f64, x1: f64, slope: f64, intercept: f64) -> Self {
        let mut f = Self::new();
        f.add_point(x0, slope * x0 + intercept);
        f.add_point(x1, slope * x1 + intercept);
        f
    }

    /// Add a breakpoint. Points may arrive in any order; a second point at an
    /// existing x is ignored.
    pub fn add_point(&mut self, x: f64, y: f64) {
        match self
            .points
            .binary_search_by(|p| p.x.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Less))
        {
            Ok(_) => {}
            Err(index) => {
                let duplicate = (index > 0 && (self.points[index - 1].x - x).abs() < X_TOLERANCE)
                    || (index < self.points.len() && (self.points[index].x - x).abs() < X_TOLERANCE);
                if !duplicate {
                    self.points.insert(index, Point2d { x, y });
                }
            }
        }
    }

    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn range(&self) -> Option<Range> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some(Range::new(first.x, last.x)),
            _ => None,
        }
    }

    /// Interpolated value at `x`. Fails outside the defined range.
    pub fn evaluate(&self, x: f64) -> CalcResult<f64> {
        let range = self
            .range()
            .ok_or_else(|| CalcError::numeric_degeneracy("piecewise evaluation", "function has no points"))?;
        if !range.is_in_range(x) {
            return Err(CalcError::numeric_degeneracy(
                "piecewise evaluation",
                format!("x = {:.6} is outside [{:.6}, {:.6}]", x, range.left, range.right),
            ));
        }

        if self.points.len() == 1 {
            return Ok(self.points[0].y);
        }

        let x = x.clamp(range.left, range.right);
        let upper = self.points.iter().position(|p| p.x >= x).unwrap_or(self.points.len() - 1);
        if upper == 0 {
            return Ok(self.points[0].y);
        }
        let p0 = self.points[upper - 1];
        let p1 = self.points[upper];
        Ok(p0.y + (p1.y - p0.y) * (x - p0.x) / (p1.x - p0.x))
    }

    /// All points where this function meets `other` within `range`.
    ///
    /// Both functions are evaluated on the union of their breakpoints inside
    /// the common range. A sign change of the difference between breakpoints
    /// yields one linearly interpolated intersection. Segments where the two
    /// functions coincide report both ends, so callers that require a single
    /// crossing see the overlap as a degenerate result.
    pub fn intersect(&self, other: &PiecewiseFunction, range: Range) -> CalcResult<Vec<Point2d>> {
        let (mine, theirs) = match (self.range(), other.range()) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(CalcError::numeric_degeneracy(
                    "piecewise intersection",
                    "cannot intersect an empty function",
                ))
            }
        };

        let common = mine
            .intersection(&theirs)
            .and_then(|r| r.intersection(&range))
            .ok_or_else(|| {
                CalcError::numeric_degeneracy("piecewise intersection", "functions do not share a common range")
            })?;

        let mut xs: Vec<f64> = self
            .points
            .iter()
            .chain(other.points.iter())
            .map(|p| p.x)
            .filter(|x| common.is_in_range(*x))
            .map(|x| x.clamp(common.left, common.right))
            .chain([common.left, common.right])
            .collect();
        xs.sort_by(|a, b| a.total_cmp(b));
        xs.dedup_by(|a, b| (*a - *b).abs() < X_TOLERANCE);

        let mut hits: Vec<Point2d> = Vec::new();
        let mut push = |x: f64, y: f64| {
            if hits.last().map_or(true, |last: &Point2d| (last.x - x).abs() > X_TOLERANCE) {
                hits.push(Point2d { x, y });
            }
        };

        let mut previous: Option<(f64, f64)> = None;
        for &x in &xs {
            let diff = self.evaluate(x)? - other.evaluate(x)?;
            if diff.abs() < Y_TOLERANCE {
                push(x, self.evaluate(x)?);
            } else if let Some((x0, d0)) = previous {
                if d0.abs() >= Y_TOLERANCE && d0.signum() != diff.signum() {
                    let xi = x0 + (x - x0) * d0 / (d0 - diff);
                    push(xi, self.evaluate(xi)?);
                }
            }
            previous = Some((x, diff));
        }

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> PiecewiseFunction {
        let mut f = PiecewiseFunction::new();
        f.add_point(0.0, 0.0);
        f.add_point(10.0, 10.0);
        f
    }

    #[test]
    fn test_points_sorted_and_deduplicated() {
        let mut f = PiecewiseFunction::new();
        f.add_point(3.0, 1.0);
        f.add_point(1.0, 2.0);
        f.add_point(2.0, 3.0);
        f.add_point(2.0, 99.0);
        let xs: Vec<f64> = f.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(f.evaluate(2.0).unwrap(), 3.0);
    }

    #[test]
    fn test_evaluate_interpolates() {
        let mut f = PiecewiseFunction::new();
        f.add_point(0.0, 4.0);
        f.add_point(2.0, 8.0);
        assert!((f.evaluate(0.5).unwrap() - 5.0).abs() < 1e-12);
        assert!(f.evaluate(2.5).is_err());
    }

    #[test]
    fn test_single_crossing() {
        let mut dv = PiecewiseFunction::new();
        dv.add_point(0.0, 4.5);
        dv.add_point(3.0, 4.8);
        dv.add_point(6.0, 5.1);
        let hits = dv.intersect(&ramp(), Range::new(0.0, 6.0)).unwrap();
        assert_eq!(hits.len(), 1);
        // 4.5 + 0.1x = x  ->  x = 5.0
        assert!((hits[0].x - 5.0).abs() < 1e-9);
        assert!((hits[0].y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_crossing() {
        let mut flat = PiecewiseFunction::new();
        flat.add_point(0.0, 20.0);
        flat.add_point(10.0, 20.0);
        let hits = flat.intersect(&ramp(), Range::new(0.0, 10.0)).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_two_crossings() {
        let mut tent = PiecewiseFunction::new();
        tent.add_point(0.0, -1.0);
        tent.add_point(5.0, 9.0);
        tent.add_point(10.0, 1.0);
        let hits = tent.intersect(&ramp(), Range::new(0.0, 10.0)).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_disjoint_ranges_fail() {
        let mut f = PiecewiseFunction::new();
        f.add_point(20.0, 1.0);
        f.add_point(30.0, 1.0);
        assert!(f.intersect(&ramp(), Range::new(0.0, 30.0)).is_err());
    }
}
