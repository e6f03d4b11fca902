//! # Bridge Model
//!
//! In-memory precast girder bridge implementing every provider trait the
//! analysis core reads from. The whole model is plain serde data, so a
//! scenario is one JSON document:
//!
//! ```text
//! BridgeModel
//! ├── spans: Vec<SpanData>        (length, spacing, girders, family)
//! ├── piers: Vec<PierData>        (skew, continuity, bearing framing)
//! ├── deck: DeckData              (thickness, overhangs, barriers)
//! ├── materials, loads
//! ├── specification, rating, load_modifiers, environment
//! └── direct_factors, reaction_overrides
//! ```
//!
//! One girder group per span and one segment per girder. Girder spacing is
//! constant along a span; overhangs may taper linearly.
//!
//! ## Modules
//!
//! - [`loads`] - Simple-span statics and HL-93 envelopes
//! - [`poi`] - POI layout
//! - [`capacity`] - [`SimpleCapacityEngine`]
//!
//! ## Example
//!
//! ```rust
//! use girder_core::model::BridgeModel;
//! use girder_core::providers::GeometryProvider;
//!
//! let model = BridgeModel::demo();
//! let json = model.to_json().unwrap();
//! let restored = BridgeModel::from_json(&json).unwrap();
//! assert_eq!(restored.span_count(), model.span_count());
//! ```

pub mod capacity;
pub mod loads;
pub mod poi;

#[cfg(test)]
pub(crate) mod fixtures;

use serde::{Deserialize, Serialize};

use crate::candidate::{CandidateConfiguration, StirrupLayout, StrandLayout};
use crate::config::{Environment, LoadModifiers, RatingCriteria, SpecificationCriteria};
use crate::distribution::engine::FATIGUE_PRESENCE_DIVISOR;
use crate::distribution::BeamFamily;
use crate::errors::{CalcError, CalcResult};
use crate::keys::{
    AnalysisStage, EndType, GirderKey, LimitStateClass, PierFace, PierKey, PointOfInterest, SegmentKey, SpanKey,
};
use crate::providers::{
    concrete_modulus_ksi, ClosedCell, DirectPierFactors, DirectSpanFactors, ForceProvider, GeometryProvider,
    LeftRight, MaterialProvider, SectionProperties, SectionProvider, SpecificationProvider, SupportFace,
};

pub use capacity::SimpleCapacityEngine;
use loads::{LiveLoad, SpanLoad};
use poi::SegmentFraming;

fn default_true() -> bool {
    true
}

// ============================================================================
// Model Data
// ============================================================================

/// Precast girder cross section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderSection {
    pub name: String,
    pub area_in2: f64,
    pub ix_in4: f64,
    pub iy_in4: f64,
    /// Centroid to top of girder
    pub yt_in: f64,
    pub height_in: f64,
    /// Minimum web width (sum of webs for multi-web sections)
    pub web_width_in: f64,
    pub top_width_in: f64,
    pub bottom_width_in: f64,
    /// Girder CL to CL of the exterior web
    #[serde(default)]
    pub exterior_web_offset_in: f64,
    #[serde(default)]
    pub closed_cell: Option<ClosedCell>,
    /// Top flange thickening at midspan, tapering to zero at the segment ends
    #[serde(default)]
    pub top_flange_thickening_in: f64,
}

impl GirderSection {
    /// Thickening at `x_ft` along a segment of `length_ft`
    pub fn thickening_at(&self, x_ft: f64, length_ft: f64) -> f64 {
        if self.top_flange_thickening_in <= 0.0 || length_ft <= 0.0 {
            return 0.0;
        }
        let r = (2.0 * x_ft / length_ft - 1.0).abs().min(1.0);
        self.top_flange_thickening_in * (1.0 - r)
    }

    /// Girder properties with `t_in` of flange thickening added on top
    pub fn properties(&self, t_in: f64) -> SectionProperties {
        if t_in <= 0.0 {
            return SectionProperties {
                area_in2: self.area_in2,
                ix_in4: self.ix_in4,
                iy_in4: self.iy_in4,
                yt_in: self.yt_in,
                yb_in: self.height_in - self.yt_in,
                height_in: self.height_in,
                web_width_in: self.web_width_in,
            };
        }
        let added = t_in * self.top_width_in;
        let area = self.area_in2 + added;
        let yt = (self.area_in2 * (self.yt_in + t_in) + added * t_in / 2.0) / area;
        let ix = self.ix_in4
            + self.area_in2 * (self.yt_in + t_in - yt).powi(2)
            + self.top_width_in * t_in.powi(3) / 12.0
            + added * (yt - t_in / 2.0).powi(2);
        let height = self.height_in + t_in;
        SectionProperties {
            area_in2: area,
            ix_in4: ix,
            iy_in4: self.iy_in4 + t_in * self.top_width_in.powi(3) / 12.0,
            yt_in: yt,
            yb_in: height - yt,
            height_in: height,
            web_width_in: self.web_width_in,
        }
    }
}

/// Composite section: girder plus the transformed deck.
///
/// `yt_in` and `height_in` are measured from the top of the deck.
pub fn composite_properties(girder: &SectionProperties, flange_width_in: f64, ts_in: f64, n_deck: f64) -> SectionProperties {
    let deck_area = flange_width_in * ts_in * n_deck;
    let area = girder.area_in2 + deck_area;
    let yt = (deck_area * ts_in / 2.0 + girder.area_in2 * (ts_in + girder.yt_in)) / area;
    let ix = girder.ix_in4
        + girder.area_in2 * (ts_in + girder.yt_in - yt).powi(2)
        + n_deck * flange_width_in * ts_in.powi(3) / 12.0
        + deck_area * (yt - ts_in / 2.0).powi(2);
    let height = girder.height_in + ts_in;
    SectionProperties {
        area_in2: area,
        ix_in4: ix,
        iy_in4: girder.iy_in4 + n_deck * ts_in * flange_width_in.powi(3) / 12.0,
        yt_in: yt,
        yb_in: height - yt,
        height_in: height,
        web_width_in: girder.web_width_in,
    }
}

/// One girder line in a span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderData {
    pub section: GirderSection,
    /// Plan angle relative to the span chord
    #[serde(default)]
    pub plan_angle_deg: f64,
    pub strands: StrandLayout,
    pub fc_ksi: f64,
    pub fci_ksi: f64,
    #[serde(default)]
    pub ec_ksi: Option<f64>,
    pub slab_offset_in: f64,
    pub stirrups: StirrupLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    /// CL bearing to CL bearing
    pub length_ft: f64,
    /// Bay spacings from left to right, one less than the girder count
    pub spacings_ft: Vec<f64>,
    pub girders: Vec<GirderData>,
    #[serde(default)]
    pub beam_family: BeamFamily,
    #[serde(default = "default_true")]
    pub connected_as_unit: bool,
    /// Central angle for a curved alignment
    #[serde(default)]
    pub curvature_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PierData {
    #[serde(default)]
    pub skew_deg: f64,
    /// Girders continuous over the pier
    #[serde(default)]
    pub continuous: bool,
    /// Girder end to CL bearing
    #[serde(default = "PierData::default_end_distance")]
    pub end_distance_ft: f64,
    /// CL bearing to face of support
    #[serde(default = "PierData::default_bearing_to_face")]
    pub bearing_to_face_ft: f64,
}

impl PierData {
    fn default_end_distance() -> f64 {
        0.75
    }

    fn default_bearing_to_face() -> f64 {
        0.5
    }

    pub fn new(skew_deg: f64, continuous: bool) -> Self {
        PierData {
            skew_deg,
            continuous,
            end_distance_ft: Self::default_end_distance(),
            bearing_to_face_ft: Self::default_bearing_to_face(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckData {
    pub thickness_in: f64,
    pub fc_ksi: f64,
    #[serde(default = "DeckData::default_density")]
    pub density_kcf: f64,
    pub left_overhang_ft: f64,
    pub right_overhang_ft: f64,
    /// Edge of deck to face of barrier
    pub left_barrier_ft: f64,
    pub right_barrier_ft: f64,
    /// Change in each overhang from the start to the end of a span
    #[serde(default)]
    pub overhang_taper_ft: f64,
    /// Haunch fillet over the girder top
    #[serde(default = "DeckData::default_fillet")]
    pub fillet_in: f64,
    /// Longitudinal top mat over the piers
    #[serde(default = "DeckData::default_top_rebar")]
    pub top_rebar_in2_per_ft: f64,
}

impl DeckData {
    fn default_density() -> f64 {
        0.150
    }

    fn default_fillet() -> f64 {
        0.75
    }

    fn default_top_rebar() -> f64 {
        0.62
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialData {
    pub girder_density_kcf: f64,
    pub girder_k1: f64,
    /// Strand modulus (ksi)
    pub strand_modulus_ksi: f64,
    pub rebar_fy_ksi: f64,
}

impl Default for MaterialData {
    fn default() -> Self {
        MaterialData {
            girder_density_kcf: 0.155,
            girder_k1: 1.0,
            strand_modulus_ksi: 28_500.0,
            rebar_fy_ksi: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadData {
    pub live: LiveLoad,
    /// Barriers, overlay and utilities per girder (klf)
    pub superimposed_dead_klf: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectSpanEntry {
    pub span: SpanKey,
    pub factors: DirectSpanFactors,
    /// Fatigue values; without them the strength values are divided by 1.2
    #[serde(default)]
    pub fatigue: Option<DirectSpanFactors>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectPierEntry {
    pub pier: PierKey,
    pub factors: DirectPierFactors,
    #[serde(default)]
    pub fatigue: Option<DirectPierFactors>,
}

/// Directly input distribution factors
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectFactorTable {
    pub spans: Vec<DirectSpanEntry>,
    pub piers: Vec<DirectPierEntry>,
}

/// Dead load reaction replacing the computed value at one bearing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionOverride {
    pub pier: PierKey,
    pub dead_load_kip: f64,
}

// ============================================================================
// Bridge Model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeModel {
    pub name: String,
    pub spans: Vec<SpanData>,
    pub piers: Vec<PierData>,
    pub deck: DeckData,
    #[serde(default)]
    pub materials: MaterialData,
    #[serde(default)]
    pub loads: LoadData,
    #[serde(default)]
    pub specification: SpecificationCriteria,
    #[serde(default)]
    pub rating: RatingCriteria,
    #[serde(default)]
    pub load_modifiers: LoadModifiers,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub direct_factors: DirectFactorTable,
    #[serde(default)]
    pub reaction_overrides: Vec<ReactionOverride>,
}

impl BridgeModel {
    /// Parse and validate a scenario
    pub fn from_json(json: &str) -> CalcResult<Self> {
        let model: BridgeModel = serde_json::from_str(json).map_err(|e| CalcError::serialization(&e))?;
        model.validate()?;
        Ok(model)
    }

    pub fn to_json(&self) -> CalcResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CalcError::serialization(&e))
    }

    /// Structural consistency of the framing data
    pub fn validate(&self) -> CalcResult<()> {
        if self.spans.is_empty() {
            return Err(CalcError::invalid_input("spans", "[]", "a bridge needs at least one span"));
        }
        if self.piers.len() != self.spans.len() + 1 {
            return Err(CalcError::invalid_input(
                "piers",
                self.piers.len().to_string(),
                format!("{} spans need {} piers", self.spans.len(), self.spans.len() + 1),
            ));
        }
        for (index, span) in self.spans.iter().enumerate() {
            if span.length_ft <= 0.0 {
                return Err(CalcError::invalid_input(
                    format!("spans[{}].length_ft", index),
                    span.length_ft.to_string(),
                    "must be positive",
                ));
            }
            if span.girders.is_empty() || span.girders.len() != span.spacings_ft.len() + 1 {
                return Err(CalcError::invalid_input(
                    format!("spans[{}].girders", index),
                    span.girders.len().to_string(),
                    format!("expected one more girder than the {} spacings", span.spacings_ft.len()),
                ));
            }
            if span.spacings_ft.iter().any(|s| *s <= 0.0) {
                return Err(CalcError::invalid_input(
                    format!("spans[{}].spacings_ft", index),
                    format!("{:?}", span.spacings_ft),
                    "spacings must be positive",
                ));
            }
        }
        if self.deck.fc_ksi <= 0.0 || self.deck.thickness_in < 0.0 {
            return Err(CalcError::invalid_input(
                "deck",
                format!("f'c = {}, ts = {}", self.deck.fc_ksi, self.deck.thickness_in),
                "deck strength must be positive and thickness non-negative",
            ));
        }
        Ok(())
    }

    fn span(&self, span: usize) -> Option<&SpanData> {
        self.spans.get(span)
    }

    fn pier(&self, pier: usize) -> Option<&PierData> {
        self.piers.get(pier)
    }

    fn girder(&self, segment: SegmentKey) -> Option<&GirderData> {
        self.span(segment.group).and_then(|s| s.girders.get(segment.girder))
    }

    fn framing(&self, segment: SegmentKey) -> Option<SegmentFraming> {
        let span = self.span(segment.group)?;
        let start = self.pier(segment.group)?;
        let end = self.pier(segment.group + 1)?;
        let girder = self.girder(segment)?;
        Some(SegmentFraming {
            segment_length_ft: start.end_distance_ft + span.length_ft + end.end_distance_ft,
            start_bearing_ft: start.end_distance_ft,
            end_bearing_ft: end.end_distance_ft,
            start_support_ft: start.bearing_to_face_ft,
            end_support_ft: end.bearing_to_face_ft,
            girder_height_ft: girder.section.height_in / 12.0,
        })
    }

    /// Distance along the span (CL bearing origin) for a POI, clamped to the span
    fn span_location_ft(&self, poi: &PointOfInterest) -> (f64, f64) {
        let length = self.span_length_ft(poi.segment.group);
        let start = self.pier(poi.segment.group).map_or(0.0, |p| p.end_distance_ft);
        ((poi.distance_from_start_ft - start).clamp(0.0, length), length)
    }

    /// Uniform dead load carried by one girder (klf)
    pub fn dead_load_klf(&self, segment: SegmentKey) -> f64 {
        let girder = self
            .girder(segment)
            .map_or(0.0, |g| g.section.area_in2 / 144.0 * self.materials.girder_density_kcf);
        let tributary_ft = self.effective_flange_width_in(segment.girder_key()) / 12.0;
        let deck = self.deck.thickness_in / 12.0 * tributary_ft * self.deck.density_kcf;
        girder + deck + self.loads.superimposed_dead_klf
    }

    /// Built-in two-span WF54G demonstration bridge
    pub fn demo() -> Self {
        demo::bridge()
    }
}

// ============================================================================
// Provider Implementations
// ============================================================================

impl GeometryProvider for BridgeModel {
    fn span_count(&self) -> usize {
        self.spans.len()
    }

    fn span_length_ft(&self, span: usize) -> f64 {
        self.span(span).map_or(0.0, |s| s.length_ft)
    }

    fn girder_count(&self, span: usize) -> usize {
        self.span(span).map_or(0, |s| s.girders.len())
    }

    fn girder_spacing_ft(&self, span: usize, _x_ft: f64) -> Vec<f64> {
        self.span(span).map_or_else(Vec::new, |s| s.spacings_ft.clone())
    }

    fn slab_overhang_ft(&self, span: usize, x_ft: f64) -> LeftRight {
        let length = self.span_length_ft(span);
        let fraction = if length > 0.0 { (x_ft / length).clamp(0.0, 1.0) } else { 0.0 };
        let taper = self.deck.overhang_taper_ft * fraction;
        LeftRight {
            left: self.deck.left_overhang_ft + taper,
            right: self.deck.right_overhang_ft + taper,
        }
    }

    fn barrier_interface_width_ft(&self) -> LeftRight {
        LeftRight {
            left: self.deck.left_barrier_ft,
            right: self.deck.right_barrier_ft,
        }
    }

    fn curb_to_curb_width_ft(&self, span: usize, x_ft: f64) -> f64 {
        let barrier = self.barrier_interface_width_ft();
        self.deck_width_ft(span, x_ft) - barrier.left - barrier.right
    }

    fn deck_width_ft(&self, span: usize, x_ft: f64) -> f64 {
        let overhang = self.slab_overhang_ft(span, x_ft);
        self.girder_spacing_ft(span, x_ft).iter().sum::<f64>() + overhang.left + overhang.right
    }

    fn pier_skew_deg(&self, pier: usize) -> f64 {
        self.pier(pier).map_or(0.0, |p| p.skew_deg)
    }

    fn is_continuous_pier(&self, pier: usize) -> bool {
        self.pier(pier).is_some_and(|p| p.continuous)
    }

    fn has_obtuse_corner(&self, span: SpanKey, end: EndType) -> bool {
        let pier = match end {
            EndType::Start => span.span,
            EndType::End => span.span + 1,
        };
        let skew = self.pier_skew_deg(pier);
        if skew == 0.0 {
            return false;
        }
        let nb = self.girder_count(span.span);
        let last = nb.saturating_sub(1);
        if span.girder != 0 && span.girder != last {
            return true;
        }
        // Positive skew puts the obtuse corner at the right of the start and
        // the left of the end
        let obtuse_girder = match (end, skew > 0.0) {
            (EndType::Start, true) | (EndType::End, false) => last,
            (EndType::Start, false) | (EndType::End, true) => 0,
        };
        span.girder == obtuse_girder
    }

    fn span_curvature_deg(&self, span: usize) -> f64 {
        self.span(span).map_or(0.0, |s| s.curvature_deg)
    }

    fn girder_plan_angle_deg(&self, span: SpanKey) -> f64 {
        self.girder(SegmentKey::new(span.span, span.girder, 0))
            .map_or(0.0, |g| g.plan_angle_deg)
    }

    fn segment_length_ft(&self, segment: SegmentKey) -> f64 {
        self.framing(segment).map_or(0.0, |f| f.segment_length_ft)
    }

    fn end_distance_ft(&self, segment: SegmentKey) -> LeftRight {
        LeftRight {
            left: self.pier(segment.group).map_or(0.0, |p| p.end_distance_ft),
            right: self.pier(segment.group + 1).map_or(0.0, |p| p.end_distance_ft),
        }
    }

    fn girder_height_in(&self, segment: SegmentKey, x_ft: f64) -> f64 {
        self.section_properties(&PointOfInterest::synthetic(segment, x_ft), AnalysisStage::NonComposite)
            .height_in
    }

    fn face_of_support_pois(&self, girder: GirderKey) -> Vec<SupportFace> {
        let segment = SegmentKey::from(girder);
        let faces: Vec<PointOfInterest> = self
            .segment_pois(segment)
            .into_iter()
            .filter(|p| p.has_attribute(crate::keys::poi_attr::FACE_OF_SUPPORT))
            .collect();
        match (faces.first(), faces.last()) {
            (Some(start), Some(end)) if faces.len() >= 2 => vec![
                SupportFace {
                    poi: *start,
                    pier: girder.group,
                    face: PierFace::Ahead,
                },
                SupportFace {
                    poi: *end,
                    pier: girder.group + 1,
                    face: PierFace::Back,
                },
            ],
            _ => Vec::new(),
        }
    }

    fn pois_in_range(&self, poi: &PointOfInterest, left_ft: f64, right_ft: f64) -> Vec<PointOfInterest> {
        let lo = poi.distance_from_start_ft - left_ft - 1.0e-9;
        let hi = poi.distance_from_start_ft + right_ft + 1.0e-9;
        self.segment_pois(poi.segment)
            .into_iter()
            .filter(|p| p.distance_from_start_ft >= lo && p.distance_from_start_ft <= hi)
            .collect()
    }

    fn segment_pois(&self, segment: SegmentKey) -> Vec<PointOfInterest> {
        self.framing(segment)
            .map_or_else(Vec::new, |framing| poi::layout(segment, &framing))
    }

    fn is_symmetric(&self, girder: GirderKey) -> bool {
        match (self.pier(girder.group), self.pier(girder.group + 1)) {
            (Some(start), Some(end)) => {
                start.end_distance_ft == end.end_distance_ft && start.bearing_to_face_ft == end.bearing_to_face_ft
            }
            _ => false,
        }
    }

    fn mirror_poi(&self, poi: &PointOfInterest) -> Option<PointOfInterest> {
        let mirrored = self.segment_length_ft(poi.segment) - poi.distance_from_start_ft;
        self.segment_pois(poi.segment)
            .into_iter()
            .find(|p| (p.distance_from_start_ft - mirrored).abs() < 1.0e-6)
    }
}

impl SectionProvider for BridgeModel {
    fn section_properties(&self, poi: &PointOfInterest, stage: AnalysisStage) -> SectionProperties {
        let Some(girder) = self.girder(poi.segment) else {
            return SectionProperties::default();
        };
        let length = self.segment_length_ft(poi.segment);
        let t = girder.section.thickening_at(poi.distance_from_start_ft, length);
        let props = girder.section.properties(t);
        match stage {
            AnalysisStage::NonComposite => props,
            AnalysisStage::Composite => {
                let eg = self.girder_modulus_ksi(poi.segment);
                let n_deck = if eg > 0.0 { self.deck_modulus_ksi() / eg } else { 1.0 };
                composite_properties(
                    &props,
                    self.effective_flange_width_in(poi.segment.girder_key()),
                    self.deck.thickness_in,
                    n_deck,
                )
            }
        }
    }

    /// Equivalent-rectangle approximation, b = A/h
    fn first_moment_of_area_in3(&self, poi: &PointOfInterest, stage: AnalysisStage, elevation_in: f64) -> f64 {
        let props = self.section_properties(poi, stage);
        if props.height_in <= 0.0 {
            return 0.0;
        }
        let width = props.area_in2 / props.height_in;
        let e = elevation_in.clamp(0.0, props.height_in);
        width * e * (props.yt_in - e / 2.0)
    }

    fn beam_family(&self, segment: SegmentKey) -> BeamFamily {
        self.span(segment.group).map(|s| s.beam_family).unwrap_or_default()
    }

    fn connected_as_unit(&self, span: usize) -> bool {
        self.span(span).is_some_and(|s| s.connected_as_unit)
    }

    fn top_flange_thickening_in(&self, segment: SegmentKey) -> f64 {
        self.girder(segment).map_or(0.0, |g| g.section.top_flange_thickening_in)
    }

    fn closed_cell(&self, segment: SegmentKey) -> Option<ClosedCell> {
        self.girder(segment).and_then(|g| g.section.closed_cell)
    }

    fn girder_width_in(&self, segment: SegmentKey) -> f64 {
        self.girder(segment).map_or(0.0, |g| g.section.top_width_in)
    }

    fn exterior_web_offset_in(&self, segment: SegmentKey) -> f64 {
        self.girder(segment).map_or(0.0, |g| g.section.exterior_web_offset_in)
    }

    fn deck_thickness_in(&self) -> f64 {
        self.deck.thickness_in
    }

    /// Tributary width at midspan
    fn effective_flange_width_in(&self, girder: GirderKey) -> f64 {
        let Some(span) = self.span(girder.group) else {
            return 0.0;
        };
        let spacings = &span.spacings_ft;
        let overhang = self.slab_overhang_ft(girder.group, span.length_ft / 2.0);
        let nb = span.girders.len();
        let width_ft = match (girder.girder, nb) {
            (_, 1) => overhang.left + overhang.right,
            (0, _) => overhang.left + spacings[0] / 2.0,
            (g, n) if g + 1 >= n => overhang.right + spacings[n - 2] / 2.0,
            (g, _) => (spacings[g - 1] + spacings[g]) / 2.0,
        };
        width_ft * 12.0
    }

    fn built_configuration(&self, segment: SegmentKey) -> CandidateConfiguration {
        match self.girder(segment) {
            Some(girder) => CandidateConfiguration {
                segment,
                strands: girder.strands.clone(),
                fc_ksi: girder.fc_ksi,
                fci_ksi: girder.fci_ksi,
                ec_ksi: girder.ec_ksi,
                slab_offset_in: girder.slab_offset_in,
                stirrups: girder.stirrups.clone(),
            },
            None => CandidateConfiguration {
                segment,
                strands: StrandLayout {
                    straight_count: 0,
                    harped_count: 0,
                    temporary_count: 0,
                    strand_area_in2: 0.0,
                    fpu_ksi: 0.0,
                    fpj_ksi: 0.0,
                    depth_to_centroid_in: 0.0,
                    debonded_count: 0,
                },
                fc_ksi: 0.0,
                fci_ksi: 0.0,
                ec_ksi: None,
                slab_offset_in: 0.0,
                stirrups: StirrupLayout {
                    bar_area_in2: 0.0,
                    spacing_in: 0.0,
                    fy_ksi: 0.0,
                },
            },
        }
    }
}

impl MaterialProvider for BridgeModel {
    fn girder_modulus_ksi(&self, segment: SegmentKey) -> f64 {
        match self.girder(segment) {
            Some(girder) => girder
                .ec_ksi
                .unwrap_or_else(|| self.girder_modulus_for_strength_ksi(segment, girder.fc_ksi)),
            None => 0.0,
        }
    }

    fn girder_density_kcf(&self, _segment: SegmentKey) -> f64 {
        self.materials.girder_density_kcf
    }

    fn girder_k1(&self, _segment: SegmentKey) -> f64 {
        self.materials.girder_k1
    }

    fn deck_modulus_ksi(&self) -> f64 {
        concrete_modulus_ksi(self.deck.fc_ksi, self.deck.density_kcf, 1.0)
    }

    fn deck_fc_ksi(&self) -> f64 {
        self.deck.fc_ksi
    }
}

impl SpecificationProvider for BridgeModel {
    fn specification(&self) -> &SpecificationCriteria {
        &self.specification
    }

    fn rating_criteria(&self) -> &RatingCriteria {
        &self.rating
    }

    fn load_modifiers(&self) -> LoadModifiers {
        self.load_modifiers
    }

    fn environment(&self) -> Environment {
        self.environment
    }

    fn direct_span_factors(&self, span: SpanKey, class: LimitStateClass) -> Option<DirectSpanFactors> {
        let entry = self.direct_factors.spans.iter().find(|e| e.span == span)?;
        Some(match (class, entry.fatigue) {
            (LimitStateClass::StrengthService, _) => entry.factors,
            (LimitStateClass::Fatigue, Some(fatigue)) => fatigue,
            (LimitStateClass::Fatigue, None) => DirectSpanFactors {
                positive_moment: entry.factors.positive_moment / FATIGUE_PRESENCE_DIVISOR,
                negative_moment: entry.factors.negative_moment / FATIGUE_PRESENCE_DIVISOR,
                shear: entry.factors.shear / FATIGUE_PRESENCE_DIVISOR,
            },
        })
    }

    fn direct_pier_factors(&self, pier: PierKey, class: LimitStateClass) -> Option<DirectPierFactors> {
        let entry = self.direct_factors.piers.iter().find(|e| e.pier == pier)?;
        Some(match (class, entry.fatigue) {
            (LimitStateClass::StrengthService, _) => entry.factors,
            (LimitStateClass::Fatigue, Some(fatigue)) => fatigue,
            (LimitStateClass::Fatigue, None) => DirectPierFactors {
                negative_moment: entry.factors.negative_moment / FATIGUE_PRESENCE_DIVISOR,
                reaction: entry.factors.reaction / FATIGUE_PRESENCE_DIVISOR,
            },
        })
    }
}

/// Girders are analyzed as simple spans for all loads
impl ForceProvider for BridgeModel {
    fn dead_load_moment_kip_ft(&self, poi: &PointOfInterest) -> f64 {
        let (x, length) = self.span_location_ft(poi);
        SpanLoad::uniform_full(self.dead_load_klf(poi.segment)).moment_at(x, length)
    }

    fn dead_load_shear_kip(&self, poi: &PointOfInterest) -> f64 {
        let (x, length) = self.span_location_ft(poi);
        SpanLoad::uniform_full(self.dead_load_klf(poi.segment)).shear_at(x, length)
    }

    fn lane_live_load_moment_kip_ft(&self, poi: &PointOfInterest) -> (f64, f64) {
        let (x, length) = self.span_location_ft(poi);
        self.loads.live.moment_envelope(x, length)
    }

    fn lane_live_load_shear_kip(&self, poi: &PointOfInterest) -> (f64, f64) {
        let (x, length) = self.span_location_ft(poi);
        self.loads.live.shear_envelope(x, length)
    }

    fn dead_load_reaction_kip(&self, pier: PierKey) -> f64 {
        if let Some(o) = self.reaction_overrides.iter().find(|o| o.pier == pier) {
            return o.dead_load_kip;
        }
        adjacent_spans(self, pier.pier)
            .filter(|span| pier.girder < self.girder_count(*span))
            .map(|span| {
                let segment = SegmentKey::new(span, pier.girder, 0);
                SpanLoad::uniform_full(self.dead_load_klf(segment)).reaction_left(self.span_length_ft(span))
            })
            .sum()
    }

    fn lane_live_load_reaction_kip(&self, pier: PierKey) -> (f64, f64) {
        adjacent_spans(self, pier.pier)
            .map(|span| self.loads.live.reaction_envelope(self.span_length_ft(span)))
            .fold((0.0, 0.0), |(lo, hi), (min, max)| (lo + min, hi + max))
    }
}

/// Spans on either side of a pier
fn adjacent_spans(model: &BridgeModel, pier: usize) -> impl Iterator<Item = usize> {
    let previous = pier.checked_sub(1).filter(|s| *s < model.span_count());
    let next = Some(pier).filter(|s| *s < model.span_count());
    previous.into_iter().chain(next)
}

// ============================================================================
// Demo Bridge
// ============================================================================

mod demo {
    use super::*;

    pub(super) fn wf_girder() -> GirderData {
        GirderData {
            section: GirderSection {
                name: "WF54G".to_string(),
                area_in2: 789.0,
                ix_in4: 260_741.0,
                iy_in4: 32_000.0,
                yt_in: 29.27,
                height_in: 54.0,
                web_width_in: 6.125,
                top_width_in: 49.0,
                bottom_width_in: 38.375,
                exterior_web_offset_in: 0.0,
                closed_cell: None,
                top_flange_thickening_in: 0.0,
            },
            plan_angle_deg: 0.0,
            strands: StrandLayout {
                straight_count: 30,
                harped_count: 8,
                temporary_count: 0,
                strand_area_in2: 0.217,
                fpu_ksi: 270.0,
                fpj_ksi: 202.5,
                depth_to_centroid_in: 49.5,
                debonded_count: 4,
            },
            fc_ksi: 8.0,
            fci_ksi: 6.0,
            ec_ksi: None,
            slab_offset_in: 10.0,
            stirrups: StirrupLayout {
                bar_area_in2: 0.40,
                spacing_in: 12.0,
                fy_ksi: 60.0,
            },
        }
    }

    pub(super) fn bridge() -> BridgeModel {
        BridgeModel {
            name: "Demo two-span WF54G bridge".to_string(),
            spans: vec![
                SpanData {
                    length_ft: 100.0,
                    spacings_ft: vec![8.0; 4],
                    girders: vec![wf_girder(); 5],
                    beam_family: BeamFamily::IBeam,
                    connected_as_unit: true,
                    curvature_deg: 0.0,
                },
                SpanData {
                    length_ft: 100.0,
                    spacings_ft: vec![8.0; 4],
                    girders: vec![wf_girder(); 5],
                    beam_family: BeamFamily::IBeam,
                    connected_as_unit: true,
                    curvature_deg: 0.0,
                },
            ],
            piers: vec![
                PierData::new(20.0, false),
                PierData::new(20.0, true),
                PierData::new(20.0, false),
            ],
            deck: DeckData {
                thickness_in: 8.0,
                fc_ksi: 4.0,
                density_kcf: 0.150,
                left_overhang_ft: 3.0,
                right_overhang_ft: 3.0,
                left_barrier_ft: 1.5,
                right_barrier_ft: 1.5,
                overhang_taper_ft: 0.0,
                fillet_in: 0.75,
                top_rebar_in2_per_ft: 0.62,
            },
            materials: MaterialData::default(),
            loads: LoadData {
                live: LiveLoad::default(),
                superimposed_dead_klf: 0.3,
            },
            specification: SpecificationCriteria::default(),
            rating: RatingCriteria::default(),
            load_modifiers: LoadModifiers::default(),
            environment: Environment::default(),
            direct_factors: DirectFactorTable::default(),
            reaction_overrides: Vec::new(),
        }
    }
}
