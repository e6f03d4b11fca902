//! # Distribution Factor Results
//!
//! Every lane-class result names the sub-method that produced it with a
//! [`DfMethod`] variant carrying only that method's data. The numeric path
//! picks the governing variant and the narrative renders the same variant,
//! so the two cannot disagree.

use serde::{Deserialize, Serialize};

/// Which code equation produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DfEquation {
    /// Types a, e, k (and i, j connected as a unit), interior moment
    SlabOnGirderMoment,
    /// Types a, e, k, interior shear
    SlabOnGirderShear,
    /// Types b, c, interior moment
    SpreadBoxMoment,
    /// Types b, c, interior shear
    SpreadBoxShear,
    /// Types f, g connected as a unit, interior moment
    AdjacentBoxMoment,
    /// Types f, g, interior shear
    AdjacentBoxShear,
    /// Types g, i, j minimally connected, S/D
    SOverD,
    /// Exterior girder: e times the interior equation
    ExteriorRangeFactor,
}

impl DfEquation {
    pub fn display_name(&self) -> &'static str {
        match self {
            DfEquation::SlabOnGirderMoment => "AASHTO Equations (Types a, e, k)",
            DfEquation::SlabOnGirderShear => "AASHTO Equations (Types a, e, k)",
            DfEquation::SpreadBoxMoment => "AASHTO Equations (Types b, c)",
            DfEquation::SpreadBoxShear => "AASHTO Equations (Types b, c)",
            DfEquation::AdjacentBoxMoment => "AASHTO Equations (Types f, g)",
            DfEquation::AdjacentBoxShear => "AASHTO Equations (Types f, g)",
            DfEquation::SOverD => "S/D Method",
            DfEquation::ExteriorRangeFactor => "AASHTO Equations (mg = e·mg interior)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationDetail {
    pub equation: DfEquation,
    /// Article reference
    pub reference: String,
    /// Interior value the exterior factor multiplies (exterior only)
    pub mg_interior: Option<f64>,
    /// Exterior correction factor e (exterior only)
    pub e: Option<f64>,
    pub mg: f64,
}

/// Lever rule: deck hinged over the interior girders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverRuleDetail {
    pub lanes_loaded: usize,
    pub multiple_presence: f64,
    /// Wheel positions measured from the left curb
    pub wheel_positions_ft: Vec<f64>,
    /// Girder position measured from the left curb
    pub girder_position_ft: f64,
    /// Σ P·IL for half-lane wheel loads, before the multiple presence factor
    pub sum_reactions: f64,
    pub mg: f64,
}

/// Rigid method: the cross section deflects and rotates as a rigid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidMethodDetail {
    pub lanes_loaded: usize,
    pub girder_count: usize,
    pub multiple_presence: f64,
    /// Horizontal distance from the girder group centroid to the exterior girder
    pub x_exterior_ft: f64,
    /// Truck eccentricities from the girder group centroid
    pub eccentricities_ft: Vec<f64>,
    /// Σx² over all girders
    pub sum_x_squared: f64,
    pub mg: f64,
}

/// Floor value of NL/Nb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanesBeamsDetail {
    pub lanes: usize,
    pub beams: usize,
    pub multiple_presence: f64,
    pub mg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideReason {
    /// User entered value
    DirectInput,
    /// WSDOT: overhang not greater than S/2, exterior uses the interior factor
    InteriorGirderFactor,
    /// TxDOT: exterior factor may not be less than the interior factor
    ExteriorNotLessThanInterior,
}

impl OverrideReason {
    pub fn display_name(&self) -> &'static str {
        match self {
            OverrideReason::DirectInput => "Directly input",
            OverrideReason::InteriorGirderFactor => {
                "Slab overhang does not exceed half the girder spacing, use interior girder factor"
            }
            OverrideReason::ExteriorNotLessThanInterior => {
                "For TxDOT method, exterior mg cannot be less than interior - Interior mg Controls"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideDetail {
    pub reason: OverrideReason,
    pub mg: f64,
}

/// One distribution factor sub-method and its data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum DfMethod {
    Equation(EquationDetail),
    LeverRule(LeverRuleDetail),
    RigidMethod(RigidMethodDetail),
    LanesOverBeams(LanesBeamsDetail),
    Override(OverrideDetail),
}

impl DfMethod {
    pub fn mg(&self) -> f64 {
        match self {
            DfMethod::Equation(d) => d.mg,
            DfMethod::LeverRule(d) => d.mg,
            DfMethod::RigidMethod(d) => d.mg,
            DfMethod::LanesOverBeams(d) => d.mg,
            DfMethod::Override(d) => d.mg,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DfMethod::Equation(_) => "AASHTO Equations",
            DfMethod::LeverRule(_) => "Lever Rule",
            DfMethod::RigidMethod(_) => "Rigid Method",
            DfMethod::LanesOverBeams(_) => "Number of Lanes over Number of Beams",
            DfMethod::Override(_) => "Override",
        }
    }

    pub fn is_lever_rule(&self) -> bool {
        matches!(self, DfMethod::LeverRule(_))
    }
}

/// Lane-count class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneLoading {
    OneLane,
    MultipleLanes,
}

impl LaneLoading {
    pub fn display_name(&self) -> &'static str {
        match self {
            LaneLoading::OneLane => "1 Loaded Lane",
            LaneLoading::MultipleLanes => "2+ Loaded Lanes",
        }
    }
}

/// Result for one lane-count class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneResult {
    pub loading: LaneLoading,
    /// Final value: governing method × skew correction, floored, fatigue-adjusted
    pub mg: f64,
    pub controlling: DfMethod,
    /// Every sub-method evaluated for this class
    pub evaluated: Vec<DfMethod>,
    /// Skew correction applied, `None` when not applicable
    pub skew_correction: Option<f64>,
    /// True when the lanes-over-beams floor replaced the computed value
    pub floor_applied: bool,
    /// True when the value was divided by 1.2 for the fatigue limit state
    pub fatigue_adjusted: bool,
}

/// 1-lane and 2+-lane results for one force effect with the controlling value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSet {
    pub one_lane: LaneResult,
    /// `None` with fewer than two design lanes or for fatigue
    pub multiple_lanes: Option<LaneResult>,
    pub controlling: f64,
}

impl FactorSet {
    pub fn new(one_lane: LaneResult, multiple_lanes: Option<LaneResult>) -> Self {
        let controlling = multiple_lanes
            .as_ref()
            .map_or(one_lane.mg, |multi| one_lane.mg.max(multi.mg));
        FactorSet {
            one_lane,
            multiple_lanes,
            controlling,
        }
    }

    /// A single directly input value
    pub fn direct(mg: f64) -> Self {
        let method = DfMethod::Override(OverrideDetail {
            reason: OverrideReason::DirectInput,
            mg,
        });
        FactorSet::new(
            LaneResult {
                loading: LaneLoading::OneLane,
                mg,
                controlling: method.clone(),
                evaluated: vec![method],
                skew_correction: None,
                floor_applied: false,
                fatigue_adjusted: false,
            },
            None,
        )
    }

    /// The lane result that produced the controlling value
    pub fn controlling_result(&self) -> &LaneResult {
        match &self.multiple_lanes {
            Some(multi) if multi.mg > self.one_lane.mg => multi,
            _ => &self.one_lane,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(loading: LaneLoading, mg: f64) -> LaneResult {
        let method = DfMethod::LanesOverBeams(LanesBeamsDetail {
            lanes: 1,
            beams: 4,
            multiple_presence: 1.2,
            mg,
        });
        LaneResult {
            loading,
            mg,
            controlling: method.clone(),
            evaluated: vec![method],
            skew_correction: None,
            floor_applied: false,
            fatigue_adjusted: false,
        }
    }

    #[test]
    fn test_controlling_is_larger_lane_class() {
        let set = FactorSet::new(lane(LaneLoading::OneLane, 0.45), Some(lane(LaneLoading::MultipleLanes, 0.62)));
        assert_eq!(set.controlling, 0.62);
        assert_eq!(set.controlling_result().loading, LaneLoading::MultipleLanes);
    }

    #[test]
    fn test_single_lane_controls_without_multi() {
        let set = FactorSet::new(lane(LaneLoading::OneLane, 0.45), None);
        assert_eq!(set.controlling, 0.45);
    }

    #[test]
    fn test_method_serialization_is_tagged() {
        let method = DfMethod::Override(OverrideDetail {
            reason: OverrideReason::DirectInput,
            mg: 0.5,
        });
        let json = serde_json::to_string(&method).unwrap();
        assert!(json.contains("\"method\":\"Override\""));
    }
}
