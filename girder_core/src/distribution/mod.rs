//! # Live Load Distribution Factors
//!
//! AASHTO LRFD approximate live load distribution factors (LLDF) for
//! precast girder bridges, with the WSDOT and TxDOT agency variants.
//!
//! ## Modules
//!
//! - [`inputs`] - Gathering raw geometry and stiffness values from the providers
//! - [`equations`] - Closed-form AASHTO equations
//! - [`statics`] - Lever rule and rigid method
//! - [`torsion`] - St. Venant torsional constant strategies
//! - [`applicability`] - Ranges of applicability and span prerequisites
//! - [`strategy`] - Beam family strategies and the factory selecting them
//! - [`method`] - Result types tagged with the method that produced them
//! - [`engine`] - Evaluation of a strategy into factor sets
//! - [`narrative`] - Text description of a computed factor
//! - [`conformance`] - Replay of the embedded reference cases
//!
//! ## Controlling Value
//!
//! For each lane-count class the largest applicable sub-method governs, the
//! skew correction multiplies it, and the lanes-over-beams floor applies
//! last. The controlling factor is the larger of the one-lane and the
//! multiple-lane results.
//!
//! ```rust,ignore
//! let details = engine::compute_span_factors(&model, SpanKey::new(0, 1), LimitStateClass::StrengthService, None)?;
//! println!("{}", narrative::describe_span(&details));
//! ```

pub mod applicability;
pub mod conformance;
pub mod engine;
pub mod equations;
pub mod inputs;
pub mod method;
pub mod narrative;
pub mod statics;
pub mod strategy;
pub mod torsion;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use engine::{
    compute_pier_factors, compute_reaction_factors, compute_span_factors, PierFactorDetails, ReactionFactorDetails,
    SpanFactorDetails,
};
pub use inputs::{DfLocator, DistributionFactorInputs};
pub use method::{DfMethod, FactorSet, LaneLoading, LaneResult};
pub use strategy::{create_strategy, DistributionFactorStrategy};

/// Precast beam families with distinct distribution factor rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BeamFamily {
    /// I-beams and bulb tees (types a, e, k)
    #[default]
    IBeam,
    /// Open-top U-beams and spread boxes (types b, c)
    UBeam,
    /// Adjacent box beams (types f, g)
    AdjacentBox,
    /// Voided slabs (types f, g)
    VoidedSlab,
    /// Double tees and other multi-web sections (types i, j)
    MultiWeb,
}

impl BeamFamily {
    pub const ALL: [BeamFamily; 5] = [
        BeamFamily::IBeam,
        BeamFamily::UBeam,
        BeamFamily::AdjacentBox,
        BeamFamily::VoidedSlab,
        BeamFamily::MultiWeb,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            BeamFamily::IBeam => "I-Beam",
            BeamFamily::UBeam => "U-Beam",
            BeamFamily::AdjacentBox => "Adjacent Box Beam",
            BeamFamily::VoidedSlab => "Voided Slab",
            BeamFamily::MultiWeb => "Multi-Web Beam",
        }
    }

    /// True for families that sit side by side without a cast-in-place slab gap
    pub fn is_adjacent(&self) -> bool {
        matches!(self, BeamFamily::AdjacentBox | BeamFamily::VoidedSlab)
    }
}

impl fmt::Display for BeamFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Force effect a factor distributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceEffect {
    Moment,
    Shear,
    /// Reactions use the shear equations
    Reaction,
}

impl ForceEffect {
    pub fn uses_shear_equations(&self) -> bool {
        matches!(self, ForceEffect::Shear | ForceEffect::Reaction)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ForceEffect::Moment => "Moment",
            ForceEffect::Shear => "Shear",
            ForceEffect::Reaction => "Reaction",
        }
    }
}

/// Position of a girder in the cross section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GirderLocation {
    Interior,
    Exterior,
}

impl GirderLocation {
    pub fn display_name(&self) -> &'static str {
        match self {
            GirderLocation::Interior => "Interior Girder",
            GirderLocation::Exterior => "Exterior Girder",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beam_family_names() {
        for family in BeamFamily::ALL {
            assert!(!family.display_name().is_empty());
        }
        assert!(BeamFamily::VoidedSlab.is_adjacent());
        assert!(!BeamFamily::UBeam.is_adjacent());
    }

    #[test]
    fn test_reaction_uses_shear_equations() {
        assert!(ForceEffect::Reaction.uses_shear_equations());
        assert!(ForceEffect::Shear.uses_shear_equations());
        assert!(!ForceEffect::Moment.uses_shear_equations());
    }
}
