//! Simple-Span Load Effects
//!
//! Statics of a simply supported span under point and uniform loads, and the
//! moving-load envelopes of the HL-93 design truck and lane load for one
//! design lane. Superposition handles any number of loads.
//!
//! ## Sign Convention
//! - Positive moment: tension on bottom fiber (sagging)
//! - Positive shear: left side up, right side down
//!
//! ## Example
//! ```rust
//! use girder_core::model::loads::{SpanLoad, LiveLoad};
//!
//! // 100 ft span, 1.2 klf uniform load
//! let w = SpanLoad::uniform_full(1.2);
//! assert!((w.moment_at(50.0, 100.0) - 1500.0).abs() < 1e-9);
//!
//! let hl93 = LiveLoad::default();
//! let (_, max) = hl93.moment_envelope(50.0, 100.0);
//! assert!(max > 0.0);
//! ```

use serde::{Deserialize, Serialize};

/// A single load on a simple span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpanLoad {
    /// Point load (kip) at position (ft from left support)
    Point { magnitude_kip: f64, position_ft: f64 },

    /// Uniform load (klf) over the entire span
    UniformFull { magnitude_klf: f64 },
}

impl SpanLoad {
    pub fn point(magnitude_kip: f64, position_ft: f64) -> Self {
        SpanLoad::Point {
            magnitude_kip,
            position_ft,
        }
    }

    pub fn uniform_full(magnitude_klf: f64) -> Self {
        SpanLoad::UniformFull { magnitude_klf }
    }

    /// Left reaction R1
    pub fn reaction_left(&self, span_ft: f64) -> f64 {
        match self {
            // R1 = P(L-a)/L
            SpanLoad::Point {
                magnitude_kip,
                position_ft,
            } => magnitude_kip * (span_ft - position_ft) / span_ft,
            // R1 = wL/2
            SpanLoad::UniformFull { magnitude_klf } => magnitude_klf * span_ft / 2.0,
        }
    }

    /// Right reaction R2
    pub fn reaction_right(&self, span_ft: f64) -> f64 {
        match self {
            // R2 = Pa/L
            SpanLoad::Point {
                magnitude_kip,
                position_ft,
            } => magnitude_kip * position_ft / span_ft,
            SpanLoad::UniformFull { magnitude_klf } => magnitude_klf * span_ft / 2.0,
        }
    }

    /// Shear just right of `x_ft`
    pub fn shear_at(&self, x_ft: f64, span_ft: f64) -> f64 {
        let r1 = self.reaction_left(span_ft);
        match self {
            SpanLoad::Point {
                magnitude_kip,
                position_ft,
            } => {
                if x_ft < *position_ft {
                    r1
                } else {
                    r1 - magnitude_kip
                }
            }
            // V(x) = R1 - wx
            SpanLoad::UniformFull { magnitude_klf } => r1 - magnitude_klf * x_ft,
        }
    }

    /// Moment at `x_ft` (kip-ft)
    pub fn moment_at(&self, x_ft: f64, span_ft: f64) -> f64 {
        let r1 = self.reaction_left(span_ft);
        match self {
            SpanLoad::Point {
                magnitude_kip,
                position_ft,
            } => {
                if x_ft < *position_ft {
                    r1 * x_ft
                } else {
                    r1 * x_ft - magnitude_kip * (x_ft - position_ft)
                }
            }
            // M(x) = wx(L-x)/2
            SpanLoad::UniformFull { magnitude_klf } => magnitude_klf * x_ft * (span_ft - x_ft) / 2.0,
        }
    }
}

/// One axle of a design vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axle {
    pub weight_kip: f64,
    /// Distance from the front axle
    pub offset_ft: f64,
}

/// Live load for one design lane: a design truck plus a uniform lane load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveLoad {
    pub name: String,
    pub axles: Vec<Axle>,
    /// Dynamic load allowance applied to the truck only
    pub impact: f64,
    pub lane_load_klf: f64,
}

impl Default for LiveLoad {
    /// HL-93: 8, 32, 32 kip axles at 14 ft, 33% impact, 0.64 klf lane
    fn default() -> Self {
        LiveLoad {
            name: "HL-93".to_string(),
            axles: vec![
                Axle {
                    weight_kip: 8.0,
                    offset_ft: 0.0,
                },
                Axle {
                    weight_kip: 32.0,
                    offset_ft: 14.0,
                },
                Axle {
                    weight_kip: 32.0,
                    offset_ft: 28.0,
                },
            ],
            impact: 0.33,
            lane_load_klf: 0.64,
        }
    }
}

/// Nudge that puts an axle just right of a section so it counts on the
/// positive shear side
const SECTION_OFFSET_FT: f64 = 1.0e-6;

impl LiveLoad {
    /// Truck placements worth checking for a section at `x_ft`: each axle at
    /// the section, on both sides, in both directions of travel
    fn placements(&self, x_ft: f64) -> Vec<Vec<SpanLoad>> {
        let mut placements = Vec::new();
        for reversed in [false, true] {
            for pivot in &self.axles {
                for nudge in [SECTION_OFFSET_FT, -SECTION_OFFSET_FT] {
                    let loads = self
                        .axles
                        .iter()
                        .map(|axle| {
                            let offset = axle.offset_ft - pivot.offset_ft;
                            let position = if reversed { x_ft - offset } else { x_ft + offset };
                            (axle.weight_kip, position + nudge)
                        })
                        .map(|(weight, position)| SpanLoad::point(weight * (1.0 + self.impact), position))
                        .collect();
                    placements.push(loads);
                }
            }
        }
        placements
    }

    /// Sum of effects of the axles that are on the span
    fn truck_effect(loads: &[SpanLoad], span_ft: f64, effect: impl Fn(&SpanLoad) -> f64) -> f64 {
        loads
            .iter()
            .filter(|load| match load {
                SpanLoad::Point { position_ft, .. } => *position_ft >= 0.0 && *position_ft <= span_ft,
                SpanLoad::UniformFull { .. } => true,
            })
            .map(effect)
            .sum()
    }

    /// (min, max) moment at `x_ft`, truck with impact plus lane
    pub fn moment_envelope(&self, x_ft: f64, span_ft: f64) -> (f64, f64) {
        if span_ft <= 0.0 {
            return (0.0, 0.0);
        }
        let x = x_ft.clamp(0.0, span_ft);
        let truck = self
            .placements(x)
            .iter()
            .map(|loads| Self::truck_effect(loads, span_ft, |l| l.moment_at(x, span_ft)))
            .fold(0.0, f64::max);
        let lane = SpanLoad::uniform_full(self.lane_load_klf).moment_at(x, span_ft);
        (0.0, truck + lane)
    }

    /// (min, max) shear at `x_ft`, truck with impact plus partial lane loading
    pub fn shear_envelope(&self, x_ft: f64, span_ft: f64) -> (f64, f64) {
        if span_ft <= 0.0 {
            return (0.0, 0.0);
        }
        let x = x_ft.clamp(0.0, span_ft);
        let (truck_min, truck_max) = self
            .placements(x)
            .iter()
            .map(|loads| Self::truck_effect(loads, span_ft, |l| l.shear_at(x, span_ft)))
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        // Lane load on the longer segment only
        let w = self.lane_load_klf;
        let lane_max = w * (span_ft - x).powi(2) / (2.0 * span_ft);
        let lane_min = -w * x.powi(2) / (2.0 * span_ft);
        (truck_min + lane_min, truck_max + lane_max)
    }

    /// (min, max) end reaction of a simple span
    pub fn reaction_envelope(&self, span_ft: f64) -> (f64, f64) {
        let (_, max) = self.shear_envelope(0.0, span_ft);
        (0.0, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_load_statics() {
        let p = SpanLoad::point(10.0, 4.0);
        assert_relative_eq!(p.reaction_left(10.0), 6.0);
        assert_relative_eq!(p.reaction_right(10.0), 4.0);
        assert_relative_eq!(p.moment_at(4.0, 10.0), 24.0);
        assert_relative_eq!(p.shear_at(5.0, 10.0), -4.0);
    }

    #[test]
    fn test_uniform_load_statics() {
        let w = SpanLoad::uniform_full(2.0);
        assert_relative_eq!(w.reaction_left(20.0), 20.0);
        assert_relative_eq!(w.moment_at(10.0, 20.0), 100.0);
        assert_relative_eq!(w.shear_at(10.0, 20.0), 0.0);
    }

    #[test]
    fn test_hl93_midspan_moment_100ft() {
        // Truck: middle axle at midspan governs for a 100 ft span.
        // 8(36)/2 + 32(50)/2 + 32(36)/2 = 144 + 800 + 576 = 1520 kip-ft
        let hl93 = LiveLoad::default();
        let (_, max) = hl93.moment_envelope(50.0, 100.0);
        let expected = 1520.0 * 1.33 + 0.64 * 100.0 * 100.0 / 8.0;
        assert!((max - expected).abs() < 1e-3, "got {}", max);
    }

    #[test]
    fn test_hl93_end_shear_100ft() {
        // Rear axle at the support: 32 + 32(86/100) + 8(72/100) = 65.28 kip
        let hl93 = LiveLoad::default();
        let (_, max) = hl93.shear_envelope(0.0, 100.0);
        let expected = 65.28 * 1.33 + 0.64 * 100.0 / 2.0;
        assert!((max - expected).abs() < 1e-3, "got {}", max);
        let (_, reaction) = hl93.reaction_envelope(100.0);
        assert_relative_eq!(reaction, max);
    }

    #[test]
    fn test_shear_envelope_sign() {
        let hl93 = LiveLoad::default();
        let (min, max) = hl93.shear_envelope(30.0, 100.0);
        assert!(min < 0.0);
        assert!(max > 0.0);
    }
}
