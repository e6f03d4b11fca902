//! # External Providers
//!
//! The analysis core does not own the bridge model. Everything it needs is
//! read through the traits in this module: geometry, section properties,
//! materials, specification criteria and unfactored force effects.
//!
//! `BridgeServices` bundles the five traits so a query can carry a single
//! `&dyn BridgeServices`. Any type implementing all five gets it for free.
//! [`crate::model::BridgeModel`] is the in-memory implementation used by the
//! CLI and the tests.

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateConfiguration;
use crate::config::{Environment, LoadModifiers, RatingCriteria, SpecificationCriteria};
use crate::distribution::BeamFamily;
use crate::keys::{
    AnalysisStage, EndType, GirderKey, LimitStateClass, PierFace, PierKey, PointOfInterest, SegmentKey, SpanKey,
};

// ============================================================================
// Shared Value Types
// ============================================================================

/// Gross section properties at a location
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionProperties {
    pub area_in2: f64,
    /// Strong-axis moment of inertia
    pub ix_in4: f64,
    /// Weak-axis moment of inertia
    pub iy_in4: f64,
    /// Centroid to top of girder
    pub yt_in: f64,
    /// Centroid to bottom of girder
    pub yb_in: f64,
    pub height_in: f64,
    /// Minimum web width for shear
    pub web_width_in: f64,
}

impl SectionProperties {
    /// Polar moment of inertia Ip = Ix + Iy
    pub fn polar_moment_in4(&self) -> f64 {
        self.ix_in4 + self.iy_in4
    }

    pub fn section_modulus_bottom_in3(&self) -> f64 {
        self.ix_in4 / self.yb_in
    }
}

/// Thin-walled closed cell of a box or voided section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosedCell {
    /// Area enclosed by the wall centerlines (Ao)
    pub enclosed_area_in2: f64,
    /// Σ s/t around the cell walls
    pub sum_length_over_thickness: f64,
}

/// A face of support POI together with the pier face it bears on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportFace {
    pub poi: PointOfInterest,
    pub pier: usize,
    pub face: PierFace,
}

/// Directly input distribution factors for a girder in a span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectSpanFactors {
    pub positive_moment: f64,
    pub negative_moment: f64,
    pub shear: f64,
}

/// Directly input distribution factors for a girder at a pier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectPierFactors {
    pub negative_moment: f64,
    pub reaction: f64,
}

/// Left/right pair, looking ahead along the alignment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeftRight {
    pub left: f64,
    pub right: f64,
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Bridge framing, deck geometry and points of interest
pub trait GeometryProvider {
    fn span_count(&self) -> usize;

    fn pier_count(&self) -> usize {
        self.span_count() + 1
    }

    /// CL bearing to CL bearing
    fn span_length_ft(&self, span: usize) -> f64;

    fn girder_count(&self, span: usize) -> usize;

    /// Spacing between adjacent girder lines at `x_ft` from the start of the span
    fn girder_spacing_ft(&self, span: usize, x_ft: f64) -> Vec<f64>;

    /// CL exterior girder to edge of deck
    fn slab_overhang_ft(&self, span: usize, x_ft: f64) -> LeftRight;

    /// Edge of deck to face of barrier
    fn barrier_interface_width_ft(&self) -> LeftRight;

    fn curb_to_curb_width_ft(&self, span: usize, x_ft: f64) -> f64;

    /// Edge to edge width of the deck
    fn deck_width_ft(&self, span: usize, x_ft: f64) -> f64;

    fn pier_skew_deg(&self, pier: usize) -> f64;

    /// True when girders are made continuous (or integral) over the pier
    fn is_continuous_pier(&self, pier: usize) -> bool;

    fn is_interior_pier(&self, pier: usize) -> bool {
        pier > 0 && pier < self.pier_count() - 1
    }

    /// True when the girder end sits at an obtuse corner of the deck
    fn has_obtuse_corner(&self, span: SpanKey, end: EndType) -> bool;

    /// Central angle subtended by the span on a curved alignment
    fn span_curvature_deg(&self, span: usize) -> f64;

    /// Plan angle of a girder line relative to the span chord
    fn girder_plan_angle_deg(&self, span: SpanKey) -> f64;

    fn segment_length_ft(&self, segment: SegmentKey) -> f64;

    /// Distance from each segment end to the CL bearing
    fn end_distance_ft(&self, segment: SegmentKey) -> LeftRight;

    fn girder_height_in(&self, segment: SegmentKey, x_ft: f64) -> f64;

    fn face_of_support_pois(&self, girder: GirderKey) -> Vec<SupportFace>;

    /// POIs on the segment of `poi` within `left_ft` before and `right_ft` after it
    fn pois_in_range(&self, poi: &PointOfInterest, left_ft: f64, right_ft: f64) -> Vec<PointOfInterest>;

    fn segment_pois(&self, segment: SegmentKey) -> Vec<PointOfInterest>;

    fn is_symmetric(&self, girder: GirderKey) -> bool;

    /// The managed POI at the mirrored location, if one exists
    fn mirror_poi(&self, poi: &PointOfInterest) -> Option<PointOfInterest>;
}

/// Section properties and beam family data
pub trait SectionProvider {
    fn section_properties(&self, poi: &PointOfInterest, stage: AnalysisStage) -> SectionProperties;

    /// First moment of area about the centroid of the area above `elevation_in`
    /// (measured from the girder top)
    fn first_moment_of_area_in3(&self, poi: &PointOfInterest, stage: AnalysisStage, elevation_in: f64) -> f64;

    fn beam_family(&self, segment: SegmentKey) -> BeamFamily;

    /// True when adjacent units are connected to act as a unit
    fn connected_as_unit(&self, span: usize) -> bool;

    /// Longitudinal top flange thickening at midspan (in), zero at the segment ends
    fn top_flange_thickening_in(&self, segment: SegmentKey) -> f64;

    fn closed_cell(&self, segment: SegmentKey) -> Option<ClosedCell>;

    /// Overall top width of the girder (b for adjacent beams)
    fn girder_width_in(&self, segment: SegmentKey) -> f64;

    /// Offset from girder CL to CL of the exterior web (0 for single-web sections)
    fn exterior_web_offset_in(&self, segment: SegmentKey) -> f64;

    /// Structural deck thickness
    fn deck_thickness_in(&self) -> f64;

    fn effective_flange_width_in(&self, girder: GirderKey) -> f64;

    /// The configuration the model currently describes
    fn built_configuration(&self, segment: SegmentKey) -> CandidateConfiguration;
}

/// Concrete properties
pub trait MaterialProvider {
    fn girder_modulus_ksi(&self, segment: SegmentKey) -> f64;

    fn girder_density_kcf(&self, segment: SegmentKey) -> f64;

    /// Aggregate correction factor K1
    fn girder_k1(&self, segment: SegmentKey) -> f64 {
        let _ = segment;
        1.0
    }

    fn deck_modulus_ksi(&self) -> f64;

    fn deck_fc_ksi(&self) -> f64;

    /// Girder modulus for a hypothetical strength, Ec = 33000·K1·wc^1.5·√f'c
    fn girder_modulus_for_strength_ksi(&self, segment: SegmentKey, fc_ksi: f64) -> f64 {
        concrete_modulus_ksi(fc_ksi, self.girder_density_kcf(segment), self.girder_k1(segment))
    }
}

/// Specification, rating, load modifier and environment settings
pub trait SpecificationProvider {
    fn specification(&self) -> &SpecificationCriteria;

    fn rating_criteria(&self) -> &RatingCriteria;

    fn load_modifiers(&self) -> LoadModifiers;

    fn environment(&self) -> Environment;

    fn direct_span_factors(&self, span: SpanKey, class: LimitStateClass) -> Option<DirectSpanFactors>;

    fn direct_pier_factors(&self, pier: PierKey, class: LimitStateClass) -> Option<DirectPierFactors>;
}

/// Unfactored force effects per girder
pub trait ForceProvider {
    fn dead_load_moment_kip_ft(&self, poi: &PointOfInterest) -> f64;

    fn dead_load_shear_kip(&self, poi: &PointOfInterest) -> f64;

    /// Live load moment envelope for one design lane, impact included (min, max)
    fn lane_live_load_moment_kip_ft(&self, poi: &PointOfInterest) -> (f64, f64);

    /// Live load shear envelope for one design lane, impact included (min, max)
    fn lane_live_load_shear_kip(&self, poi: &PointOfInterest) -> (f64, f64);

    fn dead_load_reaction_kip(&self, pier: PierKey) -> f64;

    /// Live load reaction envelope for one design lane (min, max)
    fn lane_live_load_reaction_kip(&self, pier: PierKey) -> (f64, f64);
}

/// Everything the analysis core reads from the bridge model
pub trait BridgeServices:
    GeometryProvider + SectionProvider + MaterialProvider + SpecificationProvider + ForceProvider
{
}

impl<T> BridgeServices for T where
    T: GeometryProvider + SectionProvider + MaterialProvider + SpecificationProvider + ForceProvider
{
}

/// AASHTO 5.4.2.4 modulus of elasticity (ksi) from f'c (ksi) and unit weight (kcf)
pub fn concrete_modulus_ksi(fc_ksi: f64, density_kcf: f64, k1: f64) -> f64 {
    33000.0 * k1 * density_kcf.powf(1.5) * fc_ksi.max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concrete_modulus() {
        // 0.150 kcf, f'c = 5 ksi -> about 4287 ksi
        let ec = concrete_modulus_ksi(5.0, 0.150, 1.0);
        assert!((ec - 4286.8).abs() < 1.0);
    }

    #[test]
    fn test_polar_moment() {
        let props = SectionProperties {
            area_in2: 100.0,
            ix_in4: 800.0,
            iy_in4: 200.0,
            yt_in: 5.0,
            yb_in: 5.0,
            height_in: 10.0,
            web_width_in: 10.0,
        };
        assert_eq!(props.polar_moment_in4(), 1000.0);
        assert_eq!(props.section_modulus_bottom_in3(), 160.0);
    }
}
