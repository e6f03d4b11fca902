//! # Distribution Factor Inputs
//!
//! Gathers every raw value the equations need in one pass over the
//! providers: deck geometry at the controlling section, lane count, section
//! and stiffness parameters, skews. The strategies never call back into the
//! providers.

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateConfiguration;
use crate::errors::{CalcError, CalcResult};
use crate::keys::{girder_label, AnalysisStage, PierFace, PierKey, PointOfInterest, SegmentKey, SpanKey};
use crate::math::round_to;
use crate::providers::BridgeServices;
use crate::units::Degrees;

use super::equations::{design_lane_count, design_lane_width_ft, eccentricity_eg, longitudinal_stiffness};
use super::statics::DeckLayout;
use super::torsion;
use super::{BeamFamily, GirderLocation};

/// Spacing and overhang rounding increment (ft)
pub const GEOMETRY_ROUNDING_FT: f64 = 0.0001;

/// What a distribution factor is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DfLocator {
    /// Positive moment and shear in a span
    Span(SpanKey),
    /// Negative moment on one face of a pier
    PierFace { pier: PierKey, face: PierFace },
    /// Reaction at a pier
    Reaction(PierKey),
}

impl DfLocator {
    pub fn girder(&self) -> usize {
        match self {
            DfLocator::Span(key) => key.girder,
            DfLocator::PierFace { pier, .. } => pier.girder,
            DfLocator::Reaction(pier) => pier.girder,
        }
    }

    pub fn description(&self) -> String {
        match self {
            DfLocator::Span(key) => key.to_string(),
            DfLocator::PierFace { pier, face } => format!(
                "{} face of Pier {}, Girder {}",
                face.display_name(),
                pier.pier + 1,
                girder_label(pier.girder)
            ),
            DfLocator::Reaction(pier) => {
                format!("Reaction at Pier {}, Girder {}", pier.pier + 1, girder_label(pier.girder))
            }
        }
    }
}

/// Raw values gathered once per distribution factor query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionFactorInputs {
    pub locator: DfLocator,
    pub family: BeamFamily,
    pub connected_as_unit: bool,
    pub location: GirderLocation,
    pub girder_index: usize,
    /// Nb
    pub girder_count: usize,
    /// NL
    pub design_lanes: usize,
    pub lane_width_ft: f64,
    /// Distance from the start of the span where the deck was sampled
    pub controlling_location_ft: f64,
    pub curb_to_curb_ft: f64,
    /// Edge-to-edge deck width (W for the S/D method)
    pub deck_width_ft: f64,
    /// L, averaged over adjacent spans for continuous piers and reactions
    pub span_length_ft: f64,
    /// Bay spacings from left to right
    pub spacings_ft: Vec<f64>,
    /// S used in the equations
    pub spacing_ft: f64,
    pub left_overhang_ft: f64,
    pub right_overhang_ft: f64,
    /// CL of left exterior girder to the left curb face
    pub left_curb_offset_ft: f64,
    /// CL of right exterior girder to the right curb face
    pub right_curb_offset_ft: f64,
    /// CL exterior web to curb face (zero for interior girders)
    pub de_ft: f64,
    pub skew_start_deg: f64,
    pub skew_end_deg: f64,
    /// ts
    pub deck_thickness_in: f64,
    /// d
    pub girder_depth_in: f64,
    /// b
    pub girder_width_in: f64,
    pub ix_in4: f64,
    pub area_in2: f64,
    pub yt_in: f64,
    /// n = Eg/Ed
    pub modular_ratio: f64,
    pub eg_in: f64,
    pub kg_in4: f64,
    pub j_in4: f64,
    pub torsion_method: String,
}

impl DistributionFactorInputs {
    /// Transverse layout for the statical methods
    pub fn layout(&self) -> DeckLayout {
        DeckLayout::new(self.left_curb_offset_ft, &self.spacings_ft, self.right_curb_offset_ft)
    }

    pub fn is_exterior(&self) -> bool {
        self.location == GirderLocation::Exterior
    }

    /// True when either end is skewed
    pub fn is_skewed(&self) -> bool {
        self.skew_start_deg.abs() > 0.0 || self.skew_end_deg.abs() > 0.0
    }

    /// Skew for the moment reduction: the end with the smaller magnitude
    pub fn moment_skew(&self) -> Degrees {
        Degrees(self.skew_start_deg.abs().min(self.skew_end_deg.abs()))
    }

    /// Skew for the shear correction: the end with the larger magnitude
    pub fn shear_skew(&self) -> Degrees {
        Degrees(self.skew_start_deg.abs().max(self.skew_end_deg.abs()))
    }

    /// Slab overhang on this girder's side of the deck
    pub fn overhang_ft(&self) -> f64 {
        if self.girder_index == 0 {
            self.left_overhang_ft
        } else {
            self.right_overhang_ft
        }
    }

    /// Girder to load with the lever rule when a result for `location` is
    /// wanted. An exterior girder asked for its interior value uses its
    /// nearest interior neighbour.
    pub fn lever_girder(&self, location: GirderLocation) -> usize {
        if location == GirderLocation::Interior && self.is_exterior() && self.girder_count > 2 {
            if self.girder_index == 0 {
                1
            } else {
                self.girder_count - 2
            }
        } else {
            self.girder_index
        }
    }

    /// S for an interior girder: average of the bays on both sides
    pub fn interior_spacing_ft(&self) -> f64 {
        interior_spacing(&self.spacings_ft, self.girder_index)
    }
}

/// Average of the two bays adjacent to `girder`; end girders take their one bay
fn interior_spacing(spacings: &[f64], girder: usize) -> f64 {
    let nb = spacings.len() + 1;
    match (girder, nb) {
        (_, 1) => 0.0,
        (0, _) => spacings[0],
        (g, n) if g >= n - 1 => spacings[n - 2],
        (g, _) => (spacings[g - 1] + spacings[g]) / 2.0,
    }
}

/// Span carrying the deck geometry for a locator, its effective length and
/// the skews at its ends
struct ResolvedSpan {
    span: usize,
    length_ft: f64,
    skew_start_deg: f64,
    skew_end_deg: f64,
}

fn check_span(model: &dyn BridgeServices, span: usize, girder: usize) -> CalcResult<()> {
    if span >= model.span_count() {
        return Err(CalcError::invalid_input("span", span.to_string(), "span does not exist"));
    }
    if girder >= model.girder_count(span) {
        return Err(CalcError::invalid_input(
            "girder",
            girder.to_string(),
            format!("span {} has {} girders", span + 1, model.girder_count(span)),
        ));
    }
    Ok(())
}

fn resolve_span(model: &dyn BridgeServices, locator: DfLocator) -> CalcResult<ResolvedSpan> {
    match locator {
        DfLocator::Span(key) => {
            check_span(model, key.span, key.girder)?;
            Ok(ResolvedSpan {
                span: key.span,
                length_ft: model.span_length_ft(key.span),
                skew_start_deg: model.pier_skew_deg(key.span),
                skew_end_deg: model.pier_skew_deg(key.span + 1),
            })
        }
        DfLocator::PierFace { pier, face } => {
            let span = match face {
                PierFace::Back if pier.pier > 0 => pier.pier - 1,
                PierFace::Ahead if pier.pier < model.span_count() => pier.pier,
                _ => {
                    return Err(CalcError::invalid_input(
                        "pier_face",
                        format!("{:?}", face),
                        format!("pier {} has no span on its {} side", pier.pier + 1, face.display_name()),
                    ))
                }
            };
            check_span(model, span, pier.girder)?;
            let length_ft = if model.is_continuous_pier(pier.pier) && model.is_interior_pier(pier.pier) {
                (model.span_length_ft(pier.pier - 1) + model.span_length_ft(pier.pier)) / 2.0
            } else {
                model.span_length_ft(span)
            };
            let skew = model.pier_skew_deg(pier.pier);
            Ok(ResolvedSpan {
                span,
                length_ft,
                skew_start_deg: skew,
                skew_end_deg: skew,
            })
        }
        DfLocator::Reaction(pier) => {
            if pier.pier >= model.pier_count() {
                return Err(CalcError::invalid_input("pier", pier.pier.to_string(), "pier does not exist"));
            }
            let previous = pier.pier.checked_sub(1);
            let next = (pier.pier < model.span_count()).then_some(pier.pier);
            let span = next.or(previous).ok_or_else(|| {
                CalcError::invalid_input("pier", pier.pier.to_string(), "pier has no adjacent span")
            })?;
            check_span(model, span, pier.girder)?;
            let length_ft = match (previous, next) {
                (Some(p), Some(n)) => (model.span_length_ft(p) + model.span_length_ft(n)) / 2.0,
                _ => model.span_length_ft(span),
            };
            let skew = model.pier_skew_deg(pier.pier);
            Ok(ResolvedSpan {
                span,
                length_ft,
                skew_start_deg: skew,
                skew_end_deg: skew,
            })
        }
    }
}

/// Location in the span where the roadway is narrowest of the two samples
/// at `f·L` and `(1-f)·L`
fn controlling_location(model: &dyn BridgeServices, span: usize, fraction: f64) -> (f64, f64) {
    let length = model.span_length_ft(span);
    let f = fraction.clamp(0.0, 1.0);
    let x1 = f * length;
    let x2 = (1.0 - f) * length;
    let w1 = model.curb_to_curb_width_ft(span, x1);
    let w2 = model.curb_to_curb_width_ft(span, x2);
    if w2 < w1 {
        (x2, w2)
    } else {
        (x1, w1)
    }
}

/// Gather the inputs for `locator`, using `config` for the girder modulus
/// when a candidate is in play.
pub fn gather_inputs(
    model: &dyn BridgeServices,
    locator: DfLocator,
    config: Option<&CandidateConfiguration>,
) -> CalcResult<DistributionFactorInputs> {
    let resolved = resolve_span(model, locator)?;
    let span = resolved.span;
    let girder = locator.girder();
    let criteria = model.specification();

    let (x_ft, curb_to_curb_ft) = controlling_location(model, span, criteria.girder_spacing_location);
    let design_lanes = design_lane_count(curb_to_curb_ft);
    let lane_width_ft = design_lane_width_ft(curb_to_curb_ft, design_lanes);

    let spacings_ft: Vec<f64> = model
        .girder_spacing_ft(span, x_ft)
        .into_iter()
        .map(|s| round_to(s, GEOMETRY_ROUNDING_FT))
        .collect();
    let girder_count = spacings_ft.len() + 1;
    if girder_count != model.girder_count(span) {
        return Err(CalcError::configuration_mismatch(format!(
            "span {} reports {} girders but {} spacings",
            span + 1,
            model.girder_count(span),
            spacings_ft.len()
        )));
    }

    let overhang = model.slab_overhang_ft(span, x_ft);
    let left_overhang_ft = round_to(overhang.left, GEOMETRY_ROUNDING_FT);
    let right_overhang_ft = round_to(overhang.right, GEOMETRY_ROUNDING_FT);
    let barrier = model.barrier_interface_width_ft();
    let left_curb_offset_ft = left_overhang_ft - barrier.left;
    let right_curb_offset_ft = right_overhang_ft - barrier.right;

    let location = if girder == 0 || girder + 1 >= girder_count {
        GirderLocation::Exterior
    } else {
        GirderLocation::Interior
    };

    let segment = SegmentKey::new(span, girder, 0);
    let web_offset_ft = model.exterior_web_offset_in(segment) / 12.0;
    let de_ft = match location {
        GirderLocation::Interior => 0.0,
        GirderLocation::Exterior if girder == 0 => left_curb_offset_ft - web_offset_ft,
        GirderLocation::Exterior => right_curb_offset_ft - web_offset_ft,
    };

    let spacing_ft = interior_spacing(&spacings_ft, girder);

    // A thickened top flange is sampled where the flange is nominal
    let sample_ft = if model.top_flange_thickening_in(segment) > 0.0 {
        0.0
    } else {
        let ends = model.end_distance_ft(segment);
        (ends.left + x_ft).min(model.segment_length_ft(segment))
    };
    let poi = PointOfInterest::synthetic(segment, sample_ft);
    let props = model.section_properties(&poi, AnalysisStage::NonComposite);

    let girder_modulus_ksi = match config {
        Some(candidate) => candidate
            .ec_ksi
            .unwrap_or_else(|| model.girder_modulus_for_strength_ksi(segment, candidate.fc_ksi)),
        None => model.girder_modulus_ksi(segment),
    };
    let deck_modulus_ksi = model.deck_modulus_ksi();
    if deck_modulus_ksi <= 0.0 {
        return Err(CalcError::invalid_input(
            "deck_modulus_ksi",
            deck_modulus_ksi.to_string(),
            "must be positive",
        ));
    }
    let modular_ratio = girder_modulus_ksi / deck_modulus_ksi;

    let deck_thickness_in = model.deck_thickness_in();
    let eg_in = eccentricity_eg(props.yt_in, deck_thickness_in);
    let kg_in4 = longitudinal_stiffness(modular_ratio, props.ix_in4, props.area_in2, eg_in);

    let torsion = torsion::strategy_for(model.closed_cell(segment));
    let j_in4 = torsion.torsional_constant_in4(&props)?;

    let inputs = DistributionFactorInputs {
        locator,
        family: model.beam_family(segment),
        connected_as_unit: model.connected_as_unit(span),
        location,
        girder_index: girder,
        girder_count,
        design_lanes,
        lane_width_ft,
        controlling_location_ft: x_ft,
        curb_to_curb_ft,
        deck_width_ft: model.deck_width_ft(span, x_ft),
        span_length_ft: resolved.length_ft,
        spacings_ft,
        spacing_ft,
        left_overhang_ft,
        right_overhang_ft,
        left_curb_offset_ft,
        right_curb_offset_ft,
        de_ft,
        skew_start_deg: resolved.skew_start_deg,
        skew_end_deg: resolved.skew_end_deg,
        deck_thickness_in,
        girder_depth_in: props.height_in,
        girder_width_in: model.girder_width_in(segment),
        ix_in4: props.ix_in4,
        area_in2: props.area_in2,
        yt_in: props.yt_in,
        modular_ratio,
        eg_in,
        kg_in4,
        j_in4,
        torsion_method: torsion.name().to_string(),
    };

    log::debug!(
        "LLDF inputs for {}: S = {:.4} ft, L = {:.3} ft, NL = {}, Nb = {}, Kg = {:.0} in4",
        locator.description(),
        inputs.spacing_ft,
        inputs.span_length_ft,
        inputs.design_lanes,
        inputs.girder_count,
        inputs.kg_in4
    );

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use crate::providers::GeometryProvider;

    #[test]
    fn test_interior_spacing_averages_adjacent_bays() {
        let spacings = [7.0, 9.0, 8.0];
        assert_eq!(interior_spacing(&spacings, 0), 7.0);
        assert_eq!(interior_spacing(&spacings, 1), 8.0);
        assert_eq!(interior_spacing(&spacings, 2), 8.5);
        assert_eq!(interior_spacing(&spacings, 3), 8.0);
    }

    #[test]
    fn test_gather_interior_girder() {
        let model = fixtures::four_girder_bridge();
        let inputs = gather_inputs(&model, DfLocator::Span(SpanKey::new(0, 1)), None).unwrap();
        assert_eq!(inputs.location, GirderLocation::Interior);
        assert_eq!(inputs.girder_count, 4);
        assert_eq!(inputs.design_lanes, 2);
        assert!((inputs.spacing_ft - 8.0).abs() < 1e-9);
        assert!((inputs.span_length_ft - 100.0).abs() < 1e-9);
        assert_eq!(inputs.de_ft, 0.0);
        let expected_kg = inputs.modular_ratio * (inputs.ix_in4 + inputs.area_in2 * inputs.eg_in.powi(2));
        assert!((inputs.kg_in4 - expected_kg).abs() < 1e-6);
    }

    #[test]
    fn test_gather_exterior_girder_de() {
        let model = fixtures::four_girder_bridge();
        let inputs = gather_inputs(&model, DfLocator::Span(SpanKey::new(0, 0)), None).unwrap();
        assert_eq!(inputs.location, GirderLocation::Exterior);
        // 3.0 ft overhang less 1.5 ft barrier
        assert!((inputs.de_ft - 1.5).abs() < 1e-9);
        assert_eq!(inputs.lever_girder(GirderLocation::Interior), 1);
    }

    #[test]
    fn test_candidate_strength_changes_modular_ratio() {
        let model = fixtures::four_girder_bridge();
        let built = gather_inputs(&model, DfLocator::Span(SpanKey::new(0, 1)), None).unwrap();
        let mut candidate = crate::candidate::tests::candidate();
        candidate.fc_ksi = 12.0;
        let trial = gather_inputs(&model, DfLocator::Span(SpanKey::new(0, 1)), Some(&candidate)).unwrap();
        assert!(trial.modular_ratio > built.modular_ratio);
        assert!(trial.kg_in4 > built.kg_in4);
    }

    #[test]
    fn test_narrower_roadway_sample_governs() {
        let mut model = fixtures::four_girder_bridge();
        model.specification.girder_spacing_location = 0.25;
        model.deck.overhang_taper_ft = -1.0;
        let inputs = gather_inputs(&model, DfLocator::Span(SpanKey::new(0, 1)), None).unwrap();
        assert!((inputs.controlling_location_ft - 75.0).abs() < 1e-9);
        assert!(inputs.curb_to_curb_ft < model.curb_to_curb_width_ft(0, 25.0));
    }

    #[test]
    fn test_pier_face_on_continuous_pier_averages_spans() {
        let model = fixtures::two_span_continuous_bridge();
        let locator = DfLocator::PierFace {
            pier: PierKey::new(1, 1),
            face: PierFace::Back,
        };
        let inputs = gather_inputs(&model, locator, None).unwrap();
        let expected = (model.span_length_ft(0) + model.span_length_ft(1)) / 2.0;
        assert!((inputs.span_length_ft - expected).abs() < 1e-9);
    }

    #[test]
    fn test_missing_pier_face_rejected() {
        let model = fixtures::four_girder_bridge();
        let locator = DfLocator::PierFace {
            pier: PierKey::new(0, 1),
            face: PierFace::Back,
        };
        assert!(gather_inputs(&model, locator, None).is_err());
    }

    #[test]
    fn test_reaction_at_end_pier_uses_single_span() {
        let model = fixtures::two_span_continuous_bridge();
        let inputs = gather_inputs(&model, DfLocator::Reaction(PierKey::new(2, 1)), None).unwrap();
        assert!((inputs.span_length_ft - model.span_length_ft(1)).abs() < 1e-9);
    }
}
