//! # Statical Distribution Methods
//!
//! The lever rule and the rigid cross-section method, evaluated on a
//! transverse deck layout measured from the left curb face.
//!
//! ```text
//!   curb                                                   curb
//!    |<-2'->o<--6'-->o<-4'->o<--6'-->o                      |
//!    |      P/2      P/2    P/2      P/2                    |
//!    |  ======================================================
//!    |      ^           ^           ^           ^
//!    |      G0          G1          G2          G3
//! ```
//!
//! ## Lever Rule
//!
//! The deck is treated as hinged over every girder. The reaction influence
//! line of a girder is 1.0 at the girder and 0.0 at its neighbours; for an
//! exterior girder it extends linearly over the overhang. Design trucks (two
//! wheels of P/2, 6 ft apart, 4 ft between adjacent trucks) are placed no
//! closer than 2 ft to the curb and moved transversely to maximize
//! `Σ P/2 · IL`. The result is multiplied by the multiple presence factor.
//!
//! ## Rigid Method
//!
//! ```text
//! R = NL/Nb + X_ext · Σe / Σx²
//! ```
//!
//! Trucks are centered in design lanes packed against the curb nearest the
//! exterior girder.

use crate::errors::{CalcError, CalcResult};

use super::equations::multiple_presence_factor;
use super::method::{LaneLoading, LeverRuleDetail, RigidMethodDetail};

/// Transverse distance between the wheels of one truck
pub const WHEEL_SPACING_FT: f64 = 6.0;

/// Distance from a wheel of one truck to the same wheel of the next
pub const TRUCK_PITCH_FT: f64 = 10.0;

/// Minimum distance from the curb face to the nearest wheel
pub const WHEEL_TO_CURB_FT: f64 = 2.0;

/// Girder lines across the roadway, measured from the left curb face
#[derive(Debug, Clone, PartialEq)]
pub struct DeckLayout {
    pub girder_positions_ft: Vec<f64>,
    pub curb_to_curb_ft: f64,
}

impl DeckLayout {
    /// Build from the left curb offset, bay spacings and right curb offset.
    ///
    /// Curb offsets are measured from the CL of the exterior girder to the
    /// curb face, positive when the curb lies outboard of the girder.
    pub fn new(left_curb_offset_ft: f64, spacings_ft: &[f64], right_curb_offset_ft: f64) -> Self {
        let mut positions = Vec::with_capacity(spacings_ft.len() + 1);
        let mut x = left_curb_offset_ft;
        positions.push(x);
        for spacing in spacings_ft {
            x += spacing;
            positions.push(x);
        }
        DeckLayout {
            curb_to_curb_ft: x + right_curb_offset_ft,
            girder_positions_ft: positions,
        }
    }

    pub fn girder_count(&self) -> usize {
        self.girder_positions_ft.len()
    }

    /// Reaction influence line ordinate of `girder` for a unit load at `x_ft`
    pub fn influence(&self, girder: usize, x_ft: f64) -> f64 {
        let p = &self.girder_positions_ft;
        let n = p.len();
        if n < 2 {
            return 1.0;
        }
        let xg = p[girder];
        if x_ft <= xg {
            if girder == 0 {
                1.0 + (xg - x_ft) / (p[1] - xg)
            } else {
                let xl = p[girder - 1];
                if x_ft <= xl {
                    0.0
                } else {
                    (x_ft - xl) / (xg - xl)
                }
            }
        } else if girder == n - 1 {
            1.0 + (x_ft - xg) / (xg - p[n - 2])
        } else {
            let xr = p[girder + 1];
            if x_ft >= xr {
                0.0
            } else {
                (xr - x_ft) / (xr - xg)
            }
        }
    }

    /// Centroid of the girder group
    pub fn centroid_ft(&self) -> f64 {
        let n = self.girder_count().max(1) as f64;
        self.girder_positions_ft.iter().sum::<f64>() / n
    }
}

/// Wheel offsets from the leftmost wheel for `trucks` side-by-side trucks
fn wheel_offsets(trucks: usize) -> Vec<f64> {
    (0..trucks)
        .flat_map(|t| {
            let base = t as f64 * TRUCK_PITCH_FT;
            [base, base + WHEEL_SPACING_FT]
        })
        .collect()
}

/// Lever rule with exactly `trucks` trucks on the deck.
///
/// Returns `None` when the trucks do not fit between the curbs.
pub fn lever_rule(layout: &DeckLayout, girder: usize, trucks: usize) -> Option<LeverRuleDetail> {
    if trucks == 0 || girder >= layout.girder_count() {
        return None;
    }
    let offsets = wheel_offsets(trucks);
    let group_width = offsets.last().copied().unwrap_or(0.0);
    let first = WHEEL_TO_CURB_FT;
    let last = layout.curb_to_curb_ft - WHEEL_TO_CURB_FT - group_width;
    if last < first - 1.0e-9 {
        return None;
    }

    // Σ(P/2)·IL is piecewise linear in the truck position, so the maximum
    // occurs at a limit or where a wheel sits over a girder.
    let mut candidates = vec![first, last.max(first)];
    for xg in &layout.girder_positions_ft {
        for offset in &offsets {
            let p = xg - offset;
            if p >= first && p <= last {
                candidates.push(p);
            }
        }
    }

    let sum_at = |p: f64| -> f64 { offsets.iter().map(|o| 0.5 * layout.influence(girder, p + o)).sum() };

    let mut best_position = first;
    let mut best_sum = f64::NEG_INFINITY;
    for p in candidates {
        let sum = sum_at(p);
        if sum > best_sum + 1.0e-12 {
            best_sum = sum;
            best_position = p;
        }
    }

    let m = multiple_presence_factor(trucks);
    Some(LeverRuleDetail {
        lanes_loaded: trucks,
        multiple_presence: m,
        wheel_positions_ft: offsets.iter().map(|o| best_position + o).collect(),
        girder_position_ft: layout.girder_positions_ft[girder],
        sum_reactions: best_sum,
        mg: m * best_sum,
    })
}

/// Governing lever rule result for a lane-count class
pub fn lever_rule_for(
    layout: &DeckLayout,
    girder: usize,
    loading: LaneLoading,
    design_lanes: usize,
) -> CalcResult<LeverRuleDetail> {
    let governing = match loading {
        LaneLoading::OneLane => lever_rule(layout, girder, 1),
        LaneLoading::MultipleLanes => (2..=design_lanes.max(2))
            .filter_map(|trucks| lever_rule(layout, girder, trucks))
            .fold(None, |best: Option<LeverRuleDetail>, detail| match best {
                Some(b) if b.mg >= detail.mg => Some(b),
                _ => Some(detail),
            }),
    };
    governing.ok_or_else(|| {
        CalcError::numeric_degeneracy(
            "lever rule",
            format!(
                "{} do not fit on a {:.2} ft roadway",
                loading.display_name(),
                layout.curb_to_curb_ft
            ),
        )
    })
}

/// Rigid method reaction on an exterior girder with `lanes` loaded lanes
pub fn rigid_method(layout: &DeckLayout, exterior: usize, lanes: usize, lane_width_ft: f64) -> Option<RigidMethodDetail> {
    let nb = layout.girder_count();
    if nb < 2 || lanes == 0 || exterior >= nb {
        return None;
    }
    let cg = layout.centroid_ft();
    let sum_x_squared: f64 = layout.girder_positions_ft.iter().map(|x| (x - cg).powi(2)).sum();
    if sum_x_squared <= 0.0 {
        return None;
    }
    let x_exterior_ft = layout.girder_positions_ft[exterior] - cg;

    let first_center = WHEEL_TO_CURB_FT + WHEEL_SPACING_FT / 2.0;
    let from_left = x_exterior_ft <= 0.0;
    let eccentricities_ft: Vec<f64> = (0..lanes)
        .map(|k| {
            let offset = first_center + k as f64 * lane_width_ft;
            let center = if from_left {
                offset
            } else {
                layout.curb_to_curb_ft - offset
            };
            center - cg
        })
        .collect();

    let m = multiple_presence_factor(lanes);
    let reaction = lanes as f64 / nb as f64 + x_exterior_ft * eccentricities_ft.iter().sum::<f64>() / sum_x_squared;
    Some(RigidMethodDetail {
        lanes_loaded: lanes,
        girder_count: nb,
        multiple_presence: m,
        x_exterior_ft,
        eccentricities_ft,
        sum_x_squared,
        mg: m * reaction,
    })
}

/// Governing rigid method result for a lane-count class
pub fn rigid_method_for(
    layout: &DeckLayout,
    exterior: usize,
    loading: LaneLoading,
    design_lanes: usize,
    lane_width_ft: f64,
) -> Option<RigidMethodDetail> {
    match loading {
        LaneLoading::OneLane => rigid_method(layout, exterior, 1, lane_width_ft),
        LaneLoading::MultipleLanes => (2..=design_lanes)
            .filter_map(|lanes| rigid_method(layout, exterior, lanes, lane_width_ft))
            .fold(None, |best: Option<RigidMethodDetail>, detail| match best {
                Some(b) if b.mg >= detail.mg => Some(b),
                _ => Some(detail),
            }),
    }
}
