//! # Specification Criteria
//!
//! Settings that select how distribution factors and shear critical sections
//! are computed: specification edition, DF method, range-of-applicability
//! action, agency variants and prerequisite tolerances. Rating criteria, load
//! modifiers and environment live here too because each has its own
//! invalidation event.
//!
//! All settings are serde structs with sensible defaults so a scenario file
//! only needs to name what differs.
//!
//! ## Example
//!
//! ```rust
//! use girder_core::config::{SpecificationCriteria, SpecificationEdition, RangeOfApplicabilityAction};
//!
//! let criteria: SpecificationCriteria = serde_json::from_str(
//!     r#"{ "edition": "SeventhEdition2014", "roa_action": "IgnoreUseLeverRule" }"#,
//! ).unwrap();
//!
//! assert_eq!(criteria.edition, SpecificationEdition::SeventhEdition2014);
//! assert_eq!(criteria.roa_action, RangeOfApplicabilityAction::IgnoreUseLeverRule);
//! assert!(criteria.uses_dv_only_critical_section());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// AASHTO LRFD Article References
// ============================================================================

/// AASHTO LRFD Bridge Design Specifications article references
pub mod aashto_ref {
    /// Multiple presence factors
    pub const MULTIPLE_PRESENCE: &str = "AASHTO LRFD 3.6.1.1.2";
    /// Number of design lanes
    pub const DESIGN_LANES: &str = "AASHTO LRFD 3.6.1.1.1";
    /// Moment distribution, interior beams
    pub const MOMENT_INTERIOR: &str = "AASHTO LRFD 4.6.2.2.2b";
    /// Moment distribution, exterior beams
    pub const MOMENT_EXTERIOR: &str = "AASHTO LRFD 4.6.2.2.2d";
    /// Skew reduction for moment
    pub const MOMENT_SKEW: &str = "AASHTO LRFD 4.6.2.2.2e";
    /// Shear distribution, interior beams
    pub const SHEAR_INTERIOR: &str = "AASHTO LRFD 4.6.2.2.3a";
    /// Shear distribution, exterior beams
    pub const SHEAR_EXTERIOR: &str = "AASHTO LRFD 4.6.2.2.3b";
    /// Skew correction for shear
    pub const SHEAR_SKEW: &str = "AASHTO LRFD 4.6.2.2.3c";
    /// Rigid cross-section analysis for exterior beams
    pub const RIGID_METHOD: &str = "AASHTO LRFD C4.6.2.2.2d";
    /// Critical section for shear
    pub const CRITICAL_SECTION: &str = "AASHTO LRFD 5.7.3.2";
    /// Effective shear depth
    pub const SHEAR_DEPTH: &str = "AASHTO LRFD 5.7.2.8";
    /// Modulus of elasticity of concrete
    pub const CONCRETE_MODULUS: &str = "AASHTO LRFD 5.4.2.4";
    /// Curvature limits for straight-girder analysis
    pub const CURVATURE: &str = "AASHTO LRFD 4.6.1.2.1";
}

// ============================================================================
// Specification Edition
// ============================================================================

/// AASHTO LRFD edition (with interim revisions), ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum SpecificationEdition {
    FirstEdition1994,
    SecondEdition1998,
    SecondEditionWith2003Interims,
    ThirdEdition2004,
    ThirdEditionWith2005Interims,
    FourthEdition2007,
    FifthEdition2010,
    SixthEdition2012,
    SixthEditionWith2013Interims,
    SeventhEdition2014,
    SeventhEditionWith2016Interims,
    EighthEdition2017,
    #[default]
    NinthEdition2020,
}

impl SpecificationEdition {
    /// First edition that locates the shear critical section at dv alone
    pub const DV_ONLY_CRITICAL_SECTION: SpecificationEdition = SpecificationEdition::ThirdEdition2004;

    /// First edition that restricts shear skew correction to obtuse corners
    pub const OBTUSE_CORNER_SHEAR_SKEW: SpecificationEdition = SpecificationEdition::SeventhEdition2014;

    /// First edition without the plan curvature prerequisite for LLDF equations
    pub const CURVATURE_CHECK_REMOVED: SpecificationEdition = SpecificationEdition::ThirdEditionWith2005Interims;

    pub const ALL: [SpecificationEdition; 13] = [
        SpecificationEdition::FirstEdition1994,
        SpecificationEdition::SecondEdition1998,
        SpecificationEdition::SecondEditionWith2003Interims,
        SpecificationEdition::ThirdEdition2004,
        SpecificationEdition::ThirdEditionWith2005Interims,
        SpecificationEdition::FourthEdition2007,
        SpecificationEdition::FifthEdition2010,
        SpecificationEdition::SixthEdition2012,
        SpecificationEdition::SixthEditionWith2013Interims,
        SpecificationEdition::SeventhEdition2014,
        SpecificationEdition::SeventhEditionWith2016Interims,
        SpecificationEdition::EighthEdition2017,
        SpecificationEdition::NinthEdition2020,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            SpecificationEdition::FirstEdition1994 => "1st Edition, 1994",
            SpecificationEdition::SecondEdition1998 => "2nd Edition, 1998",
            SpecificationEdition::SecondEditionWith2003Interims => "2nd Edition, 1998 with 2003 interim provisions",
            SpecificationEdition::ThirdEdition2004 => "3rd Edition, 2004",
            SpecificationEdition::ThirdEditionWith2005Interims => "3rd Edition, 2004 with 2005 interim provisions",
            SpecificationEdition::FourthEdition2007 => "4th Edition, 2007",
            SpecificationEdition::FifthEdition2010 => "5th Edition, 2010",
            SpecificationEdition::SixthEdition2012 => "6th Edition, 2012",
            SpecificationEdition::SixthEditionWith2013Interims => "6th Edition, 2012 with 2013 interim provisions",
            SpecificationEdition::SeventhEdition2014 => "7th Edition, 2014",
            SpecificationEdition::SeventhEditionWith2016Interims => "7th Edition, 2014 with 2016 interim provisions",
            SpecificationEdition::EighthEdition2017 => "8th Edition, 2017",
            SpecificationEdition::NinthEdition2020 => "9th Edition, 2020",
        }
    }
}

impl fmt::Display for SpecificationEdition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AASHTO LRFD {}", self.display_name())
    }
}

// ============================================================================
// Method Selectors
// ============================================================================

/// How live load distribution factors are obtained for the whole bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DistributionFactorMethod {
    /// Code equations, lever rule and rigid method as the code directs
    #[default]
    Calculated,
    /// Lever rule for every girder and force effect
    LeverRule,
    /// Factors entered by the user
    DirectlyInput,
}

impl DistributionFactorMethod {
    pub const ALL: [DistributionFactorMethod; 3] = [
        DistributionFactorMethod::Calculated,
        DistributionFactorMethod::LeverRule,
        DistributionFactorMethod::DirectlyInput,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            DistributionFactorMethod::Calculated => "Computed by code equations",
            DistributionFactorMethod::LeverRule => "Lever rule for all cases",
            DistributionFactorMethod::DirectlyInput => "Directly input",
        }
    }
}

/// Action taken when an empirical equation is outside its range of applicability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RangeOfApplicabilityAction {
    /// Out-of-range parameters are a validation failure
    #[default]
    Enforce,
    /// Use the equations regardless of range
    Ignore,
    /// Use the lever rule wherever the range is exceeded
    IgnoreUseLeverRule,
}

impl RangeOfApplicabilityAction {
    pub const ALL: [RangeOfApplicabilityAction; 3] = [
        RangeOfApplicabilityAction::Enforce,
        RangeOfApplicabilityAction::Ignore,
        RangeOfApplicabilityAction::IgnoreUseLeverRule,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            RangeOfApplicabilityAction::Enforce => "Enforce ranges of applicability",
            RangeOfApplicabilityAction::Ignore => "Ignore ranges of applicability",
            RangeOfApplicabilityAction::IgnoreUseLeverRule => "Use lever rule when ranges are exceeded",
        }
    }
}

/// Owner-agency variant of the distribution factor provisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AgencyMethod {
    #[default]
    Aashto,
    /// WSDOT: exterior I-girders with short overhangs use the interior factor
    Wsdot,
    /// TxDOT: adjacent beams as type (f) with fixed k and no skew correction
    Txdot,
}

impl AgencyMethod {
    pub const ALL: [AgencyMethod; 3] = [AgencyMethod::Aashto, AgencyMethod::Wsdot, AgencyMethod::Txdot];

    pub fn display_name(&self) -> &'static str {
        match self {
            AgencyMethod::Aashto => "AASHTO LRFD",
            AgencyMethod::Wsdot => "WSDOT Bridge Design Manual",
            AgencyMethod::Txdot => "TxDOT Bridge Design Manual",
        }
    }
}

/// Shear capacity method used for θ in the critical section search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShearCapacityMethod {
    /// General procedure: θ = 29 + 3500·εs
    #[default]
    General,
    /// Simplified procedure for prestressed members: cot θ from fpc
    VciVcw,
}

// ============================================================================
// Criteria
// ============================================================================

/// Design specification criteria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecificationCriteria {
    /// Library entry name
    pub name: String,

    pub edition: SpecificationEdition,

    pub df_method: DistributionFactorMethod,

    pub roa_action: RangeOfApplicabilityAction,

    pub agency: AgencyMethod,

    /// Span fraction where girder spacing and curb-to-curb width are sampled
    pub girder_spacing_location: f64,

    /// Floor every factor at m·NL/Nb
    pub limit_to_lanes_over_beams: bool,

    /// Minimum Imin/Imax among girders in a span
    pub min_girder_stiffness_ratio: f64,

    /// Maximum angular deviation between girders in a span (degrees)
    pub max_girder_angle_deviation_deg: f64,

    pub shear_capacity_method: ShearCapacityMethod,
}

impl Default for SpecificationCriteria {
    fn default() -> Self {
        SpecificationCriteria {
            name: "AASHTO LRFD".to_string(),
            edition: SpecificationEdition::default(),
            df_method: DistributionFactorMethod::default(),
            roa_action: RangeOfApplicabilityAction::default(),
            agency: AgencyMethod::default(),
            girder_spacing_location: 0.5,
            limit_to_lanes_over_beams: false,
            min_girder_stiffness_ratio: 0.9,
            max_girder_angle_deviation_deg: 3.0,
            shear_capacity_method: ShearCapacityMethod::default(),
        }
    }
}

impl SpecificationCriteria {
    pub fn uses_dv_only_critical_section(&self) -> bool {
        self.edition >= SpecificationEdition::DV_ONLY_CRITICAL_SECTION
    }

    pub fn uses_obtuse_corner_shear_skew(&self) -> bool {
        self.edition >= SpecificationEdition::OBTUSE_CORNER_SHEAR_SKEW
    }

    /// True when the distribution factor ranges of applicability are not
    /// binding: lever rule for all cases, or a non-enforcing range action
    pub fn ignores_range_of_applicability(&self) -> bool {
        self.df_method == DistributionFactorMethod::LeverRule
            || self.roa_action != RangeOfApplicabilityAction::Enforce
    }

    /// Plan curvature is checked only while ranges are enforced and the
    /// edition still carries the limit
    pub fn checks_curvature(&self) -> bool {
        !self.ignores_range_of_applicability() && self.edition < SpecificationEdition::CURVATURE_CHECK_REMOVED
    }
}

/// Load rating criteria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingCriteria {
    pub name: String,
    pub rate_for_shear: bool,
    pub include_legal_loads: bool,
    pub include_permit_loads: bool,
}

impl Default for RatingCriteria {
    fn default() -> Self {
        RatingCriteria {
            name: "MBE".to_string(),
            rate_for_shear: true,
            include_legal_loads: true,
            include_permit_loads: false,
        }
    }
}

/// Load modifiers (AASHTO 1.3.2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadModifiers {
    pub ductility: f64,
    pub redundancy: f64,
    pub importance: f64,
}

impl Default for LoadModifiers {
    fn default() -> Self {
        LoadModifiers {
            ductility: 1.0,
            redundancy: 1.0,
            importance: 1.0,
        }
    }
}

impl LoadModifiers {
    /// η for maximum load factors, not less than 0.95
    pub fn eta(&self) -> f64 {
        (self.ductility * self.redundancy * self.importance).max(0.95)
    }
}

/// Exposure condition for losses and crack control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExposureCondition {
    #[default]
    Normal,
    Severe,
}

/// Site environment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub relative_humidity_pct: f64,
    pub exposure: ExposureCondition,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            relative_humidity_pct: 70.0,
            exposure: ExposureCondition::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edition_ordering() {
        assert!(SpecificationEdition::SecondEditionWith2003Interims < SpecificationEdition::DV_ONLY_CRITICAL_SECTION);
        assert!(SpecificationEdition::EighthEdition2017 > SpecificationEdition::OBTUSE_CORNER_SHEAR_SKEW);
        let mut sorted = SpecificationEdition::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, SpecificationEdition::ALL.to_vec());
    }

    #[test]
    fn test_curvature_check_gate() {
        let mut criteria = SpecificationCriteria {
            edition: SpecificationEdition::SecondEdition1998,
            ..Default::default()
        };
        assert!(criteria.checks_curvature());
        criteria.roa_action = RangeOfApplicabilityAction::Ignore;
        assert!(!criteria.checks_curvature());
        criteria.roa_action = RangeOfApplicabilityAction::Enforce;
        criteria.df_method = DistributionFactorMethod::LeverRule;
        assert!(!criteria.checks_curvature());
        criteria.df_method = DistributionFactorMethod::Calculated;
        criteria.edition = SpecificationEdition::FourthEdition2007;
        assert!(!criteria.checks_curvature());
    }

    #[test]
    fn test_ignores_range_of_applicability() {
        let mut criteria = SpecificationCriteria::default();
        assert!(!criteria.ignores_range_of_applicability());
        criteria.roa_action = RangeOfApplicabilityAction::Ignore;
        assert!(criteria.ignores_range_of_applicability());
        criteria.roa_action = RangeOfApplicabilityAction::IgnoreUseLeverRule;
        assert!(criteria.ignores_range_of_applicability());
        criteria.roa_action = RangeOfApplicabilityAction::Enforce;
        criteria.df_method = DistributionFactorMethod::LeverRule;
        assert!(criteria.ignores_range_of_applicability());
        criteria.df_method = DistributionFactorMethod::DirectlyInput;
        assert!(!criteria.ignores_range_of_applicability());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let criteria: SpecificationCriteria = serde_json::from_str(r#"{ "agency": "Wsdot" }"#).unwrap();
        assert_eq!(criteria.agency, AgencyMethod::Wsdot);
        assert_eq!(criteria.girder_spacing_location, 0.5);
        assert_eq!(criteria.df_method, DistributionFactorMethod::Calculated);
    }

    #[test]
    fn test_load_modifier_floor() {
        let eta = LoadModifiers {
            ductility: 0.95,
            redundancy: 0.95,
            importance: 1.0,
        };
        assert_eq!(eta.eta(), 0.95);
    }
}
