//! # Distribution Factor Engine
//!
//! Turns a strategy into factor sets. Every family goes through the same
//! steps for each lane-count class:
//!
//! 1. Choose candidate sub-methods from the DF method and the
//!    range-of-applicability action
//! 2. The largest candidate governs
//! 3. Multiply by the skew correction where it applies
//! 4. Raise to the lanes-over-beams floor when enabled
//! 5. Remove the 1.2 multiple presence factor for fatigue
//!
//! The compute functions at the bottom resolve directly input factors,
//! gather inputs, decide skew applicability and assemble the detail records
//! the analysis context caches.

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateConfiguration;
use crate::config::{DistributionFactorMethod, RangeOfApplicabilityAction, SpecificationCriteria};
use crate::errors::{CalcError, CalcResult};
use crate::keys::{EndType, LimitStateClass, PierFace, PierKey, SpanKey};
use crate::providers::BridgeServices;

use super::equations::{lanes_over_beams, multiple_presence_factor};
use super::inputs::{gather_inputs, DfLocator, DistributionFactorInputs};
use super::method::{DfMethod, FactorSet, LaneLoading, LaneResult, LanesBeamsDetail};
use super::strategy::{create_strategy, lever_rule_method, DistributionFactorStrategy};
use super::ForceEffect;

/// Multiple presence factor removed from one-lane values for fatigue
pub const FATIGUE_PRESENCE_DIVISOR: f64 = 1.2;

// ============================================================================
// Lane Evaluation
// ============================================================================

/// Candidate sub-methods for one lane class
fn candidates(
    strategy: &dyn DistributionFactorStrategy,
    effect: ForceEffect,
    loading: LaneLoading,
    criteria: &SpecificationCriteria,
) -> CalcResult<Vec<DfMethod>> {
    let inputs = strategy.inputs();
    let location = inputs.location;

    if criteria.df_method == DistributionFactorMethod::LeverRule {
        return Ok(vec![lever_rule_method(inputs, location, loading)?]);
    }

    let violations = strategy.range_violations(effect, location);
    if violations.is_empty() {
        return strategy.calculated(effect, location, loading);
    }

    match criteria.roa_action {
        RangeOfApplicabilityAction::Enforce => Err(violations[0].to_error()),
        RangeOfApplicabilityAction::Ignore => {
            for violation in &violations {
                log::warn!("{}: {} (ignored)", inputs.locator.description(), violation.message());
            }
            strategy.calculated(effect, location, loading)
        }
        RangeOfApplicabilityAction::IgnoreUseLeverRule => {
            log::info!(
                "{}: {} range violation(s), using the lever rule for {}",
                inputs.locator.description(),
                violations.len(),
                effect.display_name().to_lowercase()
            );
            Ok(vec![lever_rule_method(inputs, location, loading)?])
        }
    }
}

/// Evaluate one lane-count class
pub fn evaluate_lane(
    strategy: &dyn DistributionFactorStrategy,
    effect: ForceEffect,
    loading: LaneLoading,
    class: LimitStateClass,
    criteria: &SpecificationCriteria,
    skew_applies: bool,
) -> CalcResult<LaneResult> {
    let inputs = strategy.inputs();
    let mut evaluated = candidates(strategy, effect, loading, criteria)?;

    // First of equal candidates governs
    let mut controlling = evaluated
        .iter()
        .fold(None, |best: Option<&DfMethod>, method| match best {
            Some(b) if b.mg() >= method.mg() => Some(b),
            _ => Some(method),
        })
        .cloned()
        .ok_or_else(|| {
            CalcError::configuration_mismatch(format!(
                "{} produced no {} distribution factor for {}",
                strategy.description(),
                effect.display_name().to_lowercase(),
                inputs.locator.description()
            ))
        })?;
    let mut mg = controlling.mg();

    let skew_correction = if skew_applies && strategy.applies_skew_correction() {
        Some(strategy.skew_correction(effect))
    } else {
        None
    };
    if let Some(factor) = skew_correction {
        mg *= factor;
    }

    let mut floor_applied = false;
    if criteria.limit_to_lanes_over_beams {
        let lanes = match loading {
            LaneLoading::OneLane => 1,
            LaneLoading::MultipleLanes => inputs.design_lanes,
        };
        let floor = lanes_over_beams(lanes, inputs.girder_count);
        if floor > mg {
            let detail = DfMethod::LanesOverBeams(LanesBeamsDetail {
                lanes,
                beams: inputs.girder_count,
                multiple_presence: multiple_presence_factor(lanes),
                mg: floor,
            });
            evaluated.push(detail.clone());
            controlling = detail;
            mg = floor;
            floor_applied = true;
        }
    }

    let fatigue_adjusted = class == LimitStateClass::Fatigue;
    if fatigue_adjusted {
        mg /= FATIGUE_PRESENCE_DIVISOR;
    }

    Ok(LaneResult {
        loading,
        mg,
        controlling,
        evaluated,
        skew_correction,
        floor_applied,
        fatigue_adjusted,
    })
}

/// Evaluate both lane classes of one force effect
pub fn evaluate_effect(
    strategy: &dyn DistributionFactorStrategy,
    effect: ForceEffect,
    class: LimitStateClass,
    criteria: &SpecificationCriteria,
    skew_applies: bool,
) -> CalcResult<FactorSet> {
    let one_lane = evaluate_lane(strategy, effect, LaneLoading::OneLane, class, criteria, skew_applies)?;
    let multiple_lanes = if class == LimitStateClass::Fatigue || strategy.inputs().design_lanes < 2 {
        None
    } else {
        Some(evaluate_lane(
            strategy,
            effect,
            LaneLoading::MultipleLanes,
            class,
            criteria,
            skew_applies,
        )?)
    };
    Ok(FactorSet::new(one_lane, multiple_lanes))
}

// ============================================================================
// Skew Applicability
// ============================================================================

fn obtuse(model: &dyn BridgeServices, span: Option<usize>, girder: usize, end: EndType) -> bool {
    match span {
        Some(span) if span < model.span_count() && girder < model.girder_count(span) => {
            model.has_obtuse_corner(SpanKey::new(span, girder), end)
        }
        _ => false,
    }
}

/// Obtuse corners at the (start, end) of the girder for a locator
fn obtuse_corners(model: &dyn BridgeServices, locator: DfLocator) -> (bool, bool) {
    match locator {
        DfLocator::Span(key) => (
            obtuse(model, Some(key.span), key.girder, EndType::Start),
            obtuse(model, Some(key.span), key.girder, EndType::End),
        ),
        DfLocator::PierFace { pier, .. } | DfLocator::Reaction(pier) => (
            obtuse(model, pier.pier.checked_sub(1), pier.girder, EndType::End),
            obtuse(model, Some(pier.pier), pier.girder, EndType::Start),
        ),
    }
}

/// Whether the skew correction for `effect` applies
pub fn skew_applies(
    model: &dyn BridgeServices,
    inputs: &DistributionFactorInputs,
    effect: ForceEffect,
    criteria: &SpecificationCriteria,
) -> bool {
    if !inputs.is_skewed() {
        return false;
    }
    if effect == ForceEffect::Moment || !criteria.uses_obtuse_corner_shear_skew() {
        return true;
    }
    let (start, end) = obtuse_corners(model, inputs.locator);
    start || end
}

// ============================================================================
// Detail Records
// ============================================================================

/// Positive moment and shear factors for a girder in a span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanFactorDetails {
    pub span: SpanKey,
    pub class: LimitStateClass,
    pub method: DistributionFactorMethod,
    /// Strategy description, empty for directly input factors
    pub strategy: String,
    /// `None` for directly input factors
    pub inputs: Option<DistributionFactorInputs>,
    pub moment: FactorSet,
    pub shear: FactorSet,
    /// Obtuse corners at the start and end of the girder
    pub obtuse_start: bool,
    pub obtuse_end: bool,
}

/// Negative moment factor on one face of a pier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PierFactorDetails {
    pub pier: PierKey,
    pub face: PierFace,
    pub class: LimitStateClass,
    pub method: DistributionFactorMethod,
    pub strategy: String,
    pub inputs: Option<DistributionFactorInputs>,
    pub negative_moment: FactorSet,
}

/// Reaction factor at a pier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionFactorDetails {
    pub pier: PierKey,
    pub class: LimitStateClass,
    pub method: DistributionFactorMethod,
    pub strategy: String,
    pub inputs: Option<DistributionFactorInputs>,
    pub reaction: FactorSet,
}

impl SpanFactorDetails {
    /// Shear factor at `x_ft` from the start of the span.
    ///
    /// With obtuse-corner shear skew the correction is full at the obtuse
    /// end and tapers linearly to 1.0 at midspan. Otherwise the span value
    /// applies everywhere.
    pub fn shear_factor_at(&self, x_ft: f64, span_length_ft: f64, criteria: &SpecificationCriteria) -> f64 {
        if !criteria.uses_obtuse_corner_shear_skew() || span_length_ft <= 0.0 {
            return self.shear.controlling;
        }
        let half = span_length_ft / 2.0;
        let x = x_ft.clamp(0.0, span_length_ft);
        let from_start = if self.obtuse_start { (1.0 - x / half).max(0.0) } else { 0.0 };
        let from_end = if self.obtuse_end { (1.0 - (span_length_ft - x) / half).max(0.0) } else { 0.0 };
        let weight = from_start.max(from_end);

        let tapered = |lane: &LaneResult| -> f64 {
            match lane.skew_correction {
                Some(r) if !lane.floor_applied && r > 0.0 => lane.mg / r * (1.0 + (r - 1.0) * weight),
                _ => lane.mg,
            }
        };
        let one = tapered(&self.shear.one_lane);
        self.shear.multiple_lanes.as_ref().map_or(one, |multi| one.max(tapered(multi)))
    }
}

// ============================================================================
// Compute Functions
// ============================================================================

fn missing_direct_input(what: String) -> CalcError {
    CalcError::invalid_input(
        "direct distribution factors",
        what,
        "distribution factors are set to be directly input but none were provided",
    )
}

pub fn compute_span_factors(
    model: &dyn BridgeServices,
    key: SpanKey,
    class: LimitStateClass,
    config: Option<&CandidateConfiguration>,
) -> CalcResult<SpanFactorDetails> {
    let criteria = model.specification();
    let locator = DfLocator::Span(key);

    if criteria.df_method == DistributionFactorMethod::DirectlyInput {
        let direct = model
            .direct_span_factors(key, class)
            .ok_or_else(|| missing_direct_input(key.to_string()))?;
        return Ok(SpanFactorDetails {
            span: key,
            class,
            method: criteria.df_method,
            strategy: String::new(),
            inputs: None,
            moment: FactorSet::direct(direct.positive_moment),
            shear: FactorSet::direct(direct.shear),
            obtuse_start: false,
            obtuse_end: false,
        });
    }

    let inputs = gather_inputs(model, locator, config)?;
    let moment_skew = skew_applies(model, &inputs, ForceEffect::Moment, criteria);
    let shear_skew = skew_applies(model, &inputs, ForceEffect::Shear, criteria);
    let (obtuse_start, obtuse_end) = if shear_skew && criteria.uses_obtuse_corner_shear_skew() {
        obtuse_corners(model, locator)
    } else {
        (false, false)
    };

    let strategy = create_strategy(inputs, criteria.agency);
    let moment = evaluate_effect(strategy.as_ref(), ForceEffect::Moment, class, criteria, moment_skew)?;
    let shear = evaluate_effect(strategy.as_ref(), ForceEffect::Shear, class, criteria, shear_skew)?;

    log::debug!(
        "{}: moment mg = {:.4}, shear mg = {:.4}",
        key,
        moment.controlling,
        shear.controlling
    );

    Ok(SpanFactorDetails {
        span: key,
        class,
        method: criteria.df_method,
        strategy: strategy.description().to_string(),
        inputs: Some(strategy.inputs().clone()),
        moment,
        shear,
        obtuse_start,
        obtuse_end,
    })
}

pub fn compute_pier_factors(
    model: &dyn BridgeServices,
    pier: PierKey,
    face: PierFace,
    class: LimitStateClass,
    config: Option<&CandidateConfiguration>,
) -> CalcResult<PierFactorDetails> {
    let criteria = model.specification();

    if criteria.df_method == DistributionFactorMethod::DirectlyInput {
        let direct = model
            .direct_pier_factors(pier, class)
            .ok_or_else(|| missing_direct_input(format!("Pier {}", pier.pier + 1)))?;
        return Ok(PierFactorDetails {
            pier,
            face,
            class,
            method: criteria.df_method,
            strategy: String::new(),
            inputs: None,
            negative_moment: FactorSet::direct(direct.negative_moment),
        });
    }

    let inputs = gather_inputs(model, DfLocator::PierFace { pier, face }, config)?;
    let skew = skew_applies(model, &inputs, ForceEffect::Moment, criteria);
    let strategy = create_strategy(inputs, criteria.agency);
    let negative_moment = evaluate_effect(strategy.as_ref(), ForceEffect::Moment, class, criteria, skew)?;

    Ok(PierFactorDetails {
        pier,
        face,
        class,
        method: criteria.df_method,
        strategy: strategy.description().to_string(),
        inputs: Some(strategy.inputs().clone()),
        negative_moment,
    })
}

pub fn compute_reaction_factors(
    model: &dyn BridgeServices,
    pier: PierKey,
    class: LimitStateClass,
    config: Option<&CandidateConfiguration>,
) -> CalcResult<ReactionFactorDetails> {
    let criteria = model.specification();

    if criteria.df_method == DistributionFactorMethod::DirectlyInput {
        let direct = model
            .direct_pier_factors(pier, class)
            .ok_or_else(|| missing_direct_input(format!("Pier {}", pier.pier + 1)))?;
        return Ok(ReactionFactorDetails {
            pier,
            class,
            method: criteria.df_method,
            strategy: String::new(),
            inputs: None,
            reaction: FactorSet::direct(direct.reaction),
        });
    }

    let inputs = gather_inputs(model, DfLocator::Reaction(pier), config)?;
    let skew = skew_applies(model, &inputs, ForceEffect::Reaction, criteria);
    let strategy = create_strategy(inputs, criteria.agency);
    let reaction = evaluate_effect(strategy.as_ref(), ForceEffect::Reaction, class, criteria, skew)?;

    Ok(ReactionFactorDetails {
        pier,
        class,
        method: criteria.df_method,
        strategy: strategy.description().to_string(),
        inputs: Some(strategy.inputs().clone()),
        reaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgencyMethod, SpecificationEdition};
    use crate::distribution::equations as eq;
    use crate::distribution::strategy::tests::inputs;
    use crate::distribution::strategy::SlabOnGirder;
    use crate::distribution::BeamFamily;
    use crate::model::fixtures;
    use crate::providers::{DirectPierFactors, DirectSpanFactors};

    fn criteria() -> SpecificationCriteria {
        SpecificationCriteria::default()
    }

    #[test]
    fn test_controlling_is_max_of_lane_classes() {
        let strategy = SlabOnGirder::new(inputs(BeamFamily::IBeam, 1, 4, 8.0), false);
        let set = evaluate_effect(
            &strategy,
            ForceEffect::Moment,
            LimitStateClass::StrengthService,
            &criteria(),
            false,
        )
        .unwrap();
        let multi = set.multiple_lanes.as_ref().unwrap();
        assert_eq!(set.controlling, set.one_lane.mg.max(multi.mg));
        assert_eq!(set.one_lane.skew_correction, None);
    }

    #[test]
    fn test_fatigue_removes_presence_factor() {
        let strategy = SlabOnGirder::new(inputs(BeamFamily::IBeam, 1, 4, 8.0), false);
        let strength = evaluate_effect(&strategy, ForceEffect::Moment, LimitStateClass::StrengthService, &criteria(), false)
            .unwrap();
        let fatigue =
            evaluate_effect(&strategy, ForceEffect::Moment, LimitStateClass::Fatigue, &criteria(), false).unwrap();
        assert!(fatigue.multiple_lanes.is_none());
        assert!((fatigue.controlling - strength.one_lane.mg / 1.2).abs() < 1e-12);
        assert!(fatigue.one_lane.fatigue_adjusted);
    }

    #[test]
    fn test_enforced_range_fails() {
        let mut wide = inputs(BeamFamily::IBeam, 1, 4, 17.0);
        wide.spacing_ft = 17.0;
        let strategy = SlabOnGirder::new(wide, false);
        let mut enforce = criteria();
        enforce.roa_action = RangeOfApplicabilityAction::Enforce;
        let err = evaluate_effect(&strategy, ForceEffect::Moment, LimitStateClass::StrengthService, &enforce, false)
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILURE");
    }

    #[test]
    fn test_ignore_range_uses_equation_or_lever_rule() {
        let strategy = SlabOnGirder::new(inputs(BeamFamily::IBeam, 1, 4, 17.0), false);

        let mut ignore = criteria();
        ignore.roa_action = RangeOfApplicabilityAction::Ignore;
        let set = evaluate_effect(&strategy, ForceEffect::Moment, LimitStateClass::StrengthService, &ignore, false)
            .unwrap();
        assert!(matches!(set.one_lane.controlling, DfMethod::Equation(_)));

        let mut lever = criteria();
        lever.roa_action = RangeOfApplicabilityAction::IgnoreUseLeverRule;
        let set = evaluate_effect(&strategy, ForceEffect::Moment, LimitStateClass::StrengthService, &lever, false)
            .unwrap();
        assert!(set.one_lane.controlling.is_lever_rule());
    }

    #[test]
    fn test_whole_bridge_lever_rule() {
        let strategy = SlabOnGirder::new(inputs(BeamFamily::IBeam, 1, 4, 8.0), false);
        let mut lever = criteria();
        lever.df_method = DistributionFactorMethod::LeverRule;
        let set =
            evaluate_effect(&strategy, ForceEffect::Shear, LimitStateClass::StrengthService, &lever, false).unwrap();
        assert!(set.one_lane.controlling.is_lever_rule());
        assert_eq!(set.one_lane.evaluated.len(), 1);
    }

    #[test]
    fn test_lanes_over_beams_floor() {
        // Close spacing: the one-lane moment equation falls below 1.2/Nb
        let strategy = SlabOnGirder::new(inputs(BeamFamily::IBeam, 1, 4, 3.5), false);
        let mut floor = criteria();
        floor.limit_to_lanes_over_beams = true;
        let set = evaluate_effect(&strategy, ForceEffect::Moment, LimitStateClass::StrengthService, &floor, false)
            .unwrap();
        for lane in std::iter::once(&set.one_lane).chain(set.multiple_lanes.as_ref()) {
            let lanes = match lane.loading {
                LaneLoading::OneLane => 1,
                LaneLoading::MultipleLanes => strategy_lanes(&strategy),
            };
            assert!(lane.mg >= eq::lanes_over_beams(lanes, 4) - 1e-12);
            if lane.floor_applied {
                assert!(matches!(lane.controlling, DfMethod::LanesOverBeams(_)));
            }
        }
    }

    fn strategy_lanes(strategy: &SlabOnGirder) -> usize {
        strategy.inputs().design_lanes
    }

    #[test]
    fn test_skew_correction_multiplies_governing_value() {
        let mut skewed = inputs(BeamFamily::IBeam, 1, 4, 8.0);
        skewed.skew_start_deg = 40.0;
        skewed.skew_end_deg = 40.0;
        let strategy = SlabOnGirder::new(skewed, false);
        let plain = evaluate_effect(&strategy, ForceEffect::Moment, LimitStateClass::StrengthService, &criteria(), false)
            .unwrap();
        let corrected =
            evaluate_effect(&strategy, ForceEffect::Moment, LimitStateClass::StrengthService, &criteria(), true)
                .unwrap();
        let r = corrected.one_lane.skew_correction.unwrap();
        assert!(r < 1.0);
        assert!((corrected.one_lane.mg - plain.one_lane.mg * r).abs() < 1e-12);
    }

    #[test]
    fn test_type_k_regression_s8_l100() {
        let model = fixtures::four_girder_bridge();
        let first = compute_span_factors(&model, SpanKey::new(0, 1), LimitStateClass::StrengthService, None).unwrap();
        let second = compute_span_factors(&model, SpanKey::new(0, 1), LimitStateClass::StrengthService, None).unwrap();

        let inputs = first.inputs.as_ref().unwrap();
        assert_eq!(inputs.design_lanes, 2);
        let (s, l, ts) = (8.0_f64, 100.0_f64, inputs.deck_thickness_in);
        let kg = inputs.kg_in4;
        let stiffness = kg / (12.0 * l * ts.powi(3));
        let one = 0.06 + (s / 14.0).powf(0.4) * (s / l).powf(0.3) * stiffness.powf(0.1);
        let two = 0.075 + (s / 9.5).powf(0.6) * (s / l).powf(0.2) * stiffness.powf(0.1);

        assert!((first.moment.one_lane.mg - one).abs() < 1e-6);
        assert!((first.moment.multiple_lanes.as_ref().unwrap().mg - two).abs() < 1e-6);
        assert!((first.moment.controlling - one.max(two)).abs() < 1e-6);
        assert_eq!(first.moment.controlling.to_bits(), second.moment.controlling.to_bits());
    }

    #[test]
    fn test_shear_skew_needs_obtuse_corner_from_2014() {
        let mut model = fixtures::four_girder_bridge();
        model.piers[0].skew_deg = 30.0;
        model.piers[1].skew_deg = 30.0;
        let key = SpanKey::new(0, 0);
        let inputs = gather_inputs(&model, DfLocator::Span(key), None).unwrap();

        let modern = model.specification.clone();
        assert!(skew_applies(&model, &inputs, ForceEffect::Moment, &modern));
        // Exterior girder 0 has its obtuse corner at the end for a positive skew
        assert_eq!(obtuse_corners(&model, DfLocator::Span(key)), (false, true));
        assert!(skew_applies(&model, &inputs, ForceEffect::Shear, &modern));

        let mut older = modern.clone();
        older.edition = SpecificationEdition::SixthEdition2012;
        assert!(skew_applies(&model, &inputs, ForceEffect::Shear, &older));
    }

    #[test]
    fn test_no_skew_no_correction() {
        let model = fixtures::four_girder_bridge();
        let inputs = gather_inputs(&model, DfLocator::Span(SpanKey::new(0, 1)), None).unwrap();
        assert!(!skew_applies(&model, &inputs, ForceEffect::Moment, &model.specification));
        assert!(!skew_applies(&model, &inputs, ForceEffect::Shear, &model.specification));
    }

    #[test]
    fn test_shear_taper_to_midspan() {
        let mut model = fixtures::four_girder_bridge();
        model.piers[0].skew_deg = 30.0;
        model.piers[1].skew_deg = 30.0;
        let details =
            compute_span_factors(&model, SpanKey::new(0, 0), LimitStateClass::StrengthService, None).unwrap();
        let l = model.spans[0].length_ft;
        let at_obtuse = details.shear_factor_at(l, l, &model.specification);
        let at_mid = details.shear_factor_at(l / 2.0, l, &model.specification);
        let at_start = details.shear_factor_at(0.0, l, &model.specification);
        assert!((at_obtuse - details.shear.controlling).abs() < 1e-12);
        assert!(at_mid < at_obtuse);
        assert!((at_mid - at_start).abs() < 1e-12);
    }

    #[test]
    fn test_direct_input_factors() {
        let mut model = fixtures::four_girder_bridge();
        model.specification.df_method = DistributionFactorMethod::DirectlyInput;
        let key = SpanKey::new(0, 1);
        model.direct_factors.spans.push(fixtures::direct_span(
            key,
            DirectSpanFactors {
                positive_moment: 0.61,
                negative_moment: 0.72,
                shear: 0.83,
            },
        ));
        model.direct_factors.piers.push(fixtures::direct_pier(
            PierKey::new(1, 1),
            DirectPierFactors {
                negative_moment: 0.72,
                reaction: 0.9,
            },
        ));
        let details = compute_span_factors(&model, key, LimitStateClass::StrengthService, None).unwrap();
        assert_eq!(details.moment.controlling, 0.61);
        assert_eq!(details.shear.controlling, 0.83);
        assert!(details.inputs.is_none());

        let reaction =
            compute_reaction_factors(&model, PierKey::new(1, 1), LimitStateClass::StrengthService, None).unwrap();
        assert_eq!(reaction.reaction.controlling, 0.9);

        assert!(compute_span_factors(&model, SpanKey::new(0, 2), LimitStateClass::StrengthService, None).is_err());
    }

    #[test]
    fn test_pier_and_reaction_factors() {
        let model = fixtures::two_span_continuous_bridge();
        let pier = PierKey::new(1, 1);
        let back = compute_pier_factors(&model, pier, PierFace::Back, LimitStateClass::StrengthService, None).unwrap();
        let ahead = compute_pier_factors(&model, pier, PierFace::Ahead, LimitStateClass::StrengthService, None).unwrap();
        assert!((back.negative_moment.controlling - ahead.negative_moment.controlling).abs() < 1e-9);

        let reaction = compute_reaction_factors(&model, pier, LimitStateClass::StrengthService, None).unwrap();
        let span = compute_span_factors(&model, SpanKey::new(0, 1), LimitStateClass::StrengthService, None).unwrap();
        // Interior shear equations depend on S only
        assert!((reaction.reaction.controlling - span.shear.controlling).abs() < 1e-9);
    }

    #[test]
    fn test_wsdot_agency_flows_through_factory() {
        let mut model = fixtures::four_girder_bridge();
        model.specification.agency = AgencyMethod::Wsdot;
        let exterior =
            compute_span_factors(&model, SpanKey::new(0, 0), LimitStateClass::StrengthService, None).unwrap();
        let interior =
            compute_span_factors(&model, SpanKey::new(0, 1), LimitStateClass::StrengthService, None).unwrap();
        assert!(exterior.strategy.contains("WSDOT"));
        assert!((exterior.moment.controlling - interior.moment.controlling).abs() < 1e-9);
    }
}
