//! # Beam Family Strategies
//!
//! One strategy per family of AASHTO cross-section types. A strategy owns the
//! gathered inputs and knows which equations, ranges and skew corrections
//! apply to its family. The engine drives every strategy the same way:
//! range check, candidate sub-methods, governing value, skew, floor.
//!
//! | Strategy       | Families                                        |
//! |----------------|-------------------------------------------------|
//! | `SlabOnGirder` | I-beams; multi-web beams connected as a unit    |
//! | `SpreadBox`    | U-beams                                         |
//! | `AdjacentBox`  | Adjacent boxes and voided slabs as a unit; TxDOT|
//! | `SOverD`       | Adjacent and multi-web beams minimally connected|

use crate::config::{aashto_ref, AgencyMethod};
use crate::errors::CalcResult;

use super::applicability::{RangeChecker, RangeViolation};
use super::equations as eq;
use super::inputs::DistributionFactorInputs;
use super::method::{DfEquation, DfMethod, EquationDetail, LaneLoading, OverrideDetail, OverrideReason};
use super::statics;
use super::{BeamFamily, ForceEffect, GirderLocation};

/// Family-specific distribution factor rules
pub trait DistributionFactorStrategy {
    /// Short description used in reports and logs
    fn description(&self) -> &'static str;

    fn inputs(&self) -> &DistributionFactorInputs;

    /// Parameters outside the range of the equations used for `effect` at
    /// `location`
    fn range_violations(&self, effect: ForceEffect, location: GirderLocation) -> Vec<RangeViolation>;

    /// Every sub-method that applies to the lane class, before skew
    /// correction and the lanes-over-beams floor
    fn calculated(
        &self,
        effect: ForceEffect,
        location: GirderLocation,
        loading: LaneLoading,
    ) -> CalcResult<Vec<DfMethod>>;

    /// Skew correction factor for `effect`
    fn skew_correction(&self, effect: ForceEffect) -> f64;

    /// False when the family's method does not correct for skew
    fn applies_skew_correction(&self) -> bool {
        true
    }
}

/// Select the strategy for the gathered inputs
pub fn create_strategy(inputs: DistributionFactorInputs, agency: AgencyMethod) -> Box<dyn DistributionFactorStrategy> {
    let strategy: Box<dyn DistributionFactorStrategy> = match (inputs.family, inputs.connected_as_unit) {
        (BeamFamily::IBeam, _) | (BeamFamily::MultiWeb, true) => {
            Box::new(SlabOnGirder::new(inputs, agency == AgencyMethod::Wsdot))
        }
        (BeamFamily::UBeam, _) => Box::new(SpreadBox::new(inputs)),
        (BeamFamily::AdjacentBox | BeamFamily::VoidedSlab, _) if agency == AgencyMethod::Txdot => {
            Box::new(AdjacentBox::txdot(inputs))
        }
        (BeamFamily::AdjacentBox | BeamFamily::VoidedSlab, true) => Box::new(AdjacentBox::aashto(inputs)),
        (BeamFamily::AdjacentBox | BeamFamily::VoidedSlab, false) => {
            Box::new(SOverD::new(inputs, SOverDKind::AdjacentBeams))
        }
        (BeamFamily::MultiWeb, false) => Box::new(SOverD::new(inputs, SOverDKind::MultiWeb)),
    };
    log::debug!(
        "LLDF strategy for {}: {}",
        strategy.inputs().locator.description(),
        strategy.description()
    );
    strategy
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Lever rule result as a sub-method
pub fn lever_rule_method(
    inputs: &DistributionFactorInputs,
    location: GirderLocation,
    loading: LaneLoading,
) -> CalcResult<DfMethod> {
    let detail =
        statics::lever_rule_for(&inputs.layout(), inputs.lever_girder(location), loading, inputs.design_lanes)?;
    Ok(DfMethod::LeverRule(detail))
}

fn equation(equation: DfEquation, reference: &str, mg: f64) -> DfMethod {
    DfMethod::Equation(EquationDetail {
        equation,
        reference: reference.to_string(),
        mg_interior: None,
        e: None,
        mg,
    })
}

fn exterior_equation(reference: &str, mg_interior: f64, e: f64) -> DfMethod {
    DfMethod::Equation(EquationDetail {
        equation: DfEquation::ExteriorRangeFactor,
        reference: reference.to_string(),
        mg_interior: Some(mg_interior),
        e: Some(e),
        mg: e * mg_interior,
    })
}

/// Governing value of a set of sub-methods
fn governing(methods: &[DfMethod]) -> f64 {
    methods.iter().map(DfMethod::mg).fold(0.0, f64::max)
}

fn interior_reference(effect: ForceEffect) -> &'static str {
    if effect.uses_shear_equations() {
        aashto_ref::SHEAR_INTERIOR
    } else {
        aashto_ref::MOMENT_INTERIOR
    }
}

fn exterior_reference(effect: ForceEffect) -> &'static str {
    if effect.uses_shear_equations() {
        aashto_ref::SHEAR_EXTERIOR
    } else {
        aashto_ref::MOMENT_EXTERIOR
    }
}

// ============================================================================
// Slab-on-Girder (Types a, e, k; i, j connected as a unit)
// ============================================================================

pub struct SlabOnGirder {
    inputs: DistributionFactorInputs,
    /// WSDOT: exterior girders use the interior factor when the overhang does
    /// not exceed half the girder spacing
    wsdot: bool,
}

impl SlabOnGirder {
    pub fn new(inputs: DistributionFactorInputs, wsdot: bool) -> Self {
        SlabOnGirder { inputs, wsdot }
    }

    fn interior(&self, effect: ForceEffect, loading: LaneLoading) -> DfMethod {
        let i = &self.inputs;
        let s = i.spacing_ft;
        let (eqn, mg) = match (effect.uses_shear_equations(), loading) {
            (false, LaneLoading::OneLane) => (
                DfEquation::SlabOnGirderMoment,
                eq::slab_on_girder_moment_one_lane(s, i.span_length_ft, i.kg_in4, i.deck_thickness_in),
            ),
            (false, LaneLoading::MultipleLanes) => (
                DfEquation::SlabOnGirderMoment,
                eq::slab_on_girder_moment_multi_lane(s, i.span_length_ft, i.kg_in4, i.deck_thickness_in),
            ),
            (true, LaneLoading::OneLane) => (DfEquation::SlabOnGirderShear, eq::slab_on_girder_shear_one_lane(s)),
            (true, LaneLoading::MultipleLanes) => {
                (DfEquation::SlabOnGirderShear, eq::slab_on_girder_shear_multi_lane(s))
            }
        };
        equation(eqn, interior_reference(effect), mg)
    }
}

impl DistributionFactorStrategy for SlabOnGirder {
    fn description(&self) -> &'static str {
        if self.wsdot {
            "Slab-on-girder, AASHTO types a, e, k (WSDOT exterior girder method)"
        } else {
            "Slab-on-girder, AASHTO types a, e, k"
        }
    }

    fn inputs(&self) -> &DistributionFactorInputs {
        &self.inputs
    }

    fn range_violations(&self, effect: ForceEffect, location: GirderLocation) -> Vec<RangeViolation> {
        let i = &self.inputs;
        let mut checker = RangeChecker::new(interior_reference(effect));
        checker
            .check("S", i.spacing_ft, 3.5, 16.0)
            .check("ts", i.deck_thickness_in, 4.5, 12.0)
            .check("L", i.span_length_ft, 20.0, 240.0)
            .at_least("Nb", i.girder_count as f64, 4.0)
            .check("Kg", i.kg_in4, 10_000.0, 7_000_000.0);
        let mut violations = checker.finish();
        if location == GirderLocation::Exterior {
            violations.extend(RangeChecker::new(exterior_reference(effect)).check("de", i.de_ft, -1.0, 5.5).finish());
        }
        violations
    }

    fn calculated(
        &self,
        effect: ForceEffect,
        location: GirderLocation,
        loading: LaneLoading,
    ) -> CalcResult<Vec<DfMethod>> {
        let i = &self.inputs;
        if location == GirderLocation::Interior {
            return Ok(vec![self.interior(effect, loading)]);
        }

        if self.wsdot && i.overhang_ft() <= i.spacing_ft / 2.0 {
            let interior = self.interior(effect, loading).mg();
            return Ok(vec![DfMethod::Override(OverrideDetail {
                reason: OverrideReason::InteriorGirderFactor,
                mg: interior,
            })]);
        }

        let mut methods = match loading {
            LaneLoading::OneLane => vec![lever_rule_method(i, location, loading)?],
            LaneLoading::MultipleLanes => {
                let interior = self.interior(effect, loading).mg();
                let e = if effect.uses_shear_equations() {
                    eq::slab_on_girder_exterior_shear_e(i.de_ft)
                } else {
                    eq::slab_on_girder_exterior_moment_e(i.de_ft)
                };
                vec![exterior_equation(exterior_reference(effect), interior, e)]
            }
        };

        // Cross-frames make the section act as a rigid body
        if i.connected_as_unit {
            if let Some(rigid) =
                statics::rigid_method_for(&i.layout(), i.girder_index, loading, i.design_lanes, i.lane_width_ft)
            {
                methods.push(DfMethod::RigidMethod(rigid));
            }
        }
        Ok(methods)
    }

    fn skew_correction(&self, effect: ForceEffect) -> f64 {
        let i = &self.inputs;
        if effect.uses_shear_equations() {
            eq::slab_on_girder_shear_skew(i.shear_skew(), i.span_length_ft, i.kg_in4, i.deck_thickness_in)
        } else {
            eq::slab_on_girder_moment_skew(
                i.moment_skew(),
                i.spacing_ft,
                i.span_length_ft,
                i.kg_in4,
                i.deck_thickness_in,
            )
        }
    }
}

// ============================================================================
// Spread Box Beams (Types b, c)
// ============================================================================

pub struct SpreadBox {
    inputs: DistributionFactorInputs,
}

impl SpreadBox {
    pub fn new(inputs: DistributionFactorInputs) -> Self {
        SpreadBox { inputs }
    }

    fn interior(&self, effect: ForceEffect, loading: LaneLoading) -> DfMethod {
        let i = &self.inputs;
        let (s, d, l) = (i.spacing_ft, i.girder_depth_in, i.span_length_ft);
        let (eqn, mg) = match (effect.uses_shear_equations(), loading) {
            (false, LaneLoading::OneLane) => (DfEquation::SpreadBoxMoment, eq::spread_box_moment_one_lane(s, d, l)),
            (false, LaneLoading::MultipleLanes) => {
                (DfEquation::SpreadBoxMoment, eq::spread_box_moment_multi_lane(s, d, l))
            }
            (true, LaneLoading::OneLane) => (DfEquation::SpreadBoxShear, eq::spread_box_shear_one_lane(s, d, l)),
            (true, LaneLoading::MultipleLanes) => (DfEquation::SpreadBoxShear, eq::spread_box_shear_multi_lane(s, d, l)),
        };
        equation(eqn, interior_reference(effect), mg)
    }
}

impl DistributionFactorStrategy for SpreadBox {
    fn description(&self) -> &'static str {
        "Spread box beams, AASHTO types b, c"
    }

    fn inputs(&self) -> &DistributionFactorInputs {
        &self.inputs
    }

    fn range_violations(&self, effect: ForceEffect, location: GirderLocation) -> Vec<RangeViolation> {
        let i = &self.inputs;
        let mut violations = RangeChecker::new(interior_reference(effect))
            .check("S", i.spacing_ft, 6.0, 18.0)
            .check("L", i.span_length_ft, 20.0, 140.0)
            .check("d", i.girder_depth_in, 18.0, 65.0)
            .at_least("Nb", i.girder_count as f64, 3.0)
            .finish();
        if location == GirderLocation::Exterior {
            violations.extend(RangeChecker::new(exterior_reference(effect)).check("de", i.de_ft, 0.0, 4.5).finish());
        }
        violations
    }

    fn calculated(
        &self,
        effect: ForceEffect,
        location: GirderLocation,
        loading: LaneLoading,
    ) -> CalcResult<Vec<DfMethod>> {
        let i = &self.inputs;
        if location == GirderLocation::Interior {
            return Ok(vec![self.interior(effect, loading)]);
        }
        match loading {
            LaneLoading::OneLane => Ok(vec![lever_rule_method(i, location, loading)?]),
            LaneLoading::MultipleLanes => {
                let interior = self.interior(effect, loading).mg();
                let e = if effect.uses_shear_equations() {
                    eq::spread_box_exterior_shear_e(i.de_ft)
                } else {
                    eq::spread_box_exterior_moment_e(i.de_ft)
                };
                Ok(vec![exterior_equation(exterior_reference(effect), interior, e)])
            }
        }
    }

    fn skew_correction(&self, effect: ForceEffect) -> f64 {
        let i = &self.inputs;
        if effect.uses_shear_equations() {
            eq::spread_box_shear_skew(i.shear_skew(), i.span_length_ft, i.girder_depth_in, i.spacing_ft)
        } else {
            eq::box_moment_skew(i.moment_skew())
        }
    }
}

// ============================================================================
// Adjacent Beams Connected as a Unit (Type f)
// ============================================================================

pub struct AdjacentBox {
    inputs: DistributionFactorInputs,
    /// TxDOT fixes k instead of computing it from Nb
    fixed_k: Option<f64>,
    txdot: bool,
}

/// k used by the TxDOT adjacent beam method
pub const TXDOT_ADJACENT_K: f64 = 1.5;

impl AdjacentBox {
    pub fn aashto(inputs: DistributionFactorInputs) -> Self {
        AdjacentBox {
            inputs,
            fixed_k: None,
            txdot: false,
        }
    }

    pub fn txdot(inputs: DistributionFactorInputs) -> Self {
        AdjacentBox {
            inputs,
            fixed_k: Some(TXDOT_ADJACENT_K),
            txdot: true,
        }
    }

    pub fn k(&self) -> f64 {
        self.fixed_k.unwrap_or_else(|| eq::adjacent_box_k(self.inputs.girder_count))
    }

    fn interior(&self, effect: ForceEffect, loading: LaneLoading) -> DfMethod {
        adjacent_interior(&self.inputs, self.k(), effect, loading)
    }

    fn exterior(&self, effect: ForceEffect, loading: LaneLoading) -> DfMethod {
        let i = &self.inputs;
        let interior = self.interior(effect, loading).mg();
        let e = match (effect.uses_shear_equations(), loading) {
            (false, LaneLoading::OneLane) => eq::adjacent_box_exterior_moment_e_one_lane(i.de_ft),
            (false, LaneLoading::MultipleLanes) => eq::adjacent_box_exterior_moment_e_multi_lane(i.de_ft),
            (true, LaneLoading::OneLane) => eq::adjacent_box_exterior_shear_e_one_lane(i.de_ft),
            (true, LaneLoading::MultipleLanes) => {
                eq::adjacent_box_exterior_shear_e_multi_lane(i.de_ft, i.girder_width_in)
                    * eq::adjacent_box_exterior_shear_width_factor(i.girder_width_in)
            }
        };
        exterior_equation(exterior_reference(effect), interior, e)
    }
}

/// Type f interior equations for a given k
fn adjacent_interior(i: &DistributionFactorInputs, k: f64, effect: ForceEffect, loading: LaneLoading) -> DfMethod {
    let (b, l, ix, j) = (i.girder_width_in, i.span_length_ft, i.ix_in4, i.j_in4);
    let (eqn, mg) = match (effect.uses_shear_equations(), loading) {
        (false, LaneLoading::OneLane) => (DfEquation::AdjacentBoxMoment, eq::adjacent_box_moment_one_lane(k, b, l, ix, j)),
        (false, LaneLoading::MultipleLanes) => {
            (DfEquation::AdjacentBoxMoment, eq::adjacent_box_moment_multi_lane(k, b, l, ix, j))
        }
        (true, LaneLoading::OneLane) => (DfEquation::AdjacentBoxShear, eq::adjacent_box_shear_one_lane(b, l, ix, j)),
        (true, LaneLoading::MultipleLanes) => {
            (DfEquation::AdjacentBoxShear, eq::adjacent_box_shear_multi_lane(b, l, ix, j))
        }
    };
    equation(eqn, interior_reference(effect), mg)
}

fn adjacent_range_violations(
    i: &DistributionFactorInputs,
    effect: ForceEffect,
    location: GirderLocation,
) -> Vec<RangeViolation> {
    let mut checker = RangeChecker::new(interior_reference(effect));
    checker
        .check("b", i.girder_width_in, 35.0, 60.0)
        .check("L", i.span_length_ft, 20.0, 120.0)
        .check("Nb", i.girder_count as f64, 5.0, 20.0);
    if effect.uses_shear_equations() {
        checker
            .check("J", i.j_in4, 25_000.0, 610_000.0)
            .check("I", i.ix_in4, 40_000.0, 610_000.0);
    }
    let mut violations = checker.finish();
    if location == GirderLocation::Exterior {
        violations.extend(RangeChecker::new(exterior_reference(effect)).at_most("de", i.de_ft, 2.0).finish());
    }
    violations
}

impl DistributionFactorStrategy for AdjacentBox {
    fn description(&self) -> &'static str {
        if self.txdot {
            "Adjacent beams, TxDOT method (type f equations, k = 1.5)"
        } else {
            "Adjacent beams connected as a unit, AASHTO type f"
        }
    }

    fn inputs(&self) -> &DistributionFactorInputs {
        &self.inputs
    }

    fn range_violations(&self, effect: ForceEffect, location: GirderLocation) -> Vec<RangeViolation> {
        adjacent_range_violations(&self.inputs, effect, location)
    }

    fn calculated(
        &self,
        effect: ForceEffect,
        location: GirderLocation,
        loading: LaneLoading,
    ) -> CalcResult<Vec<DfMethod>> {
        if location == GirderLocation::Interior {
            return Ok(vec![self.interior(effect, loading)]);
        }
        let mut methods = vec![self.exterior(effect, loading)];
        if self.txdot {
            let interior = self.interior(effect, loading).mg();
            if interior > governing(&methods) {
                methods.push(DfMethod::Override(OverrideDetail {
                    reason: OverrideReason::ExteriorNotLessThanInterior,
                    mg: interior,
                }));
            }
        }
        Ok(methods)
    }

    fn skew_correction(&self, effect: ForceEffect) -> f64 {
        let i = &self.inputs;
        if effect.uses_shear_equations() {
            eq::adjacent_box_shear_skew(i.shear_skew(), i.span_length_ft, i.girder_depth_in)
        } else {
            eq::box_moment_skew(i.moment_skew())
        }
    }

    fn applies_skew_correction(&self) -> bool {
        !self.txdot
    }
}

// ============================================================================
// S/D Method (Types g, i, j Minimally Connected)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SOverDKind {
    /// Adjacent boxes or voided slabs with shear keys only (type g)
    AdjacentBeams,
    /// Multi-web beams with shear keys only (types i, j)
    MultiWeb,
}

pub struct SOverD {
    inputs: DistributionFactorInputs,
    kind: SOverDKind,
}

impl SOverD {
    pub fn new(inputs: DistributionFactorInputs, kind: SOverDKind) -> Self {
        SOverD { inputs, kind }
    }

    /// mg = S/D, the same for every lane class
    fn s_over_d(&self) -> DfMethod {
        let i = &self.inputs;
        let k = eq::s_over_d_k(i.ix_in4, i.j_in4);
        let c = eq::s_over_d_c(k, i.deck_width_ft, i.span_length_ft);
        let d = eq::s_over_d_d(c, i.design_lanes);
        equation(DfEquation::SOverD, aashto_ref::MOMENT_INTERIOR, i.spacing_ft / d)
    }
}

impl DistributionFactorStrategy for SOverD {
    fn description(&self) -> &'static str {
        match self.kind {
            SOverDKind::AdjacentBeams => "Adjacent beams with shear keys, AASHTO type g (S/D)",
            SOverDKind::MultiWeb => "Multi-web beams with shear keys, AASHTO types i, j (S/D)",
        }
    }

    fn inputs(&self) -> &DistributionFactorInputs {
        &self.inputs
    }

    fn range_violations(&self, effect: ForceEffect, location: GirderLocation) -> Vec<RangeViolation> {
        let i = &self.inputs;
        match (effect.uses_shear_equations(), self.kind) {
            (false, _) => RangeChecker::new(aashto_ref::MOMENT_INTERIOR)
                .at_most("skew", i.shear_skew().0, 45.0)
                .at_most("NL", i.design_lanes as f64, 6.0)
                .finish(),
            (true, SOverDKind::AdjacentBeams) => adjacent_range_violations(i, effect, location),
            (true, SOverDKind::MultiWeb) => Vec::new(),
        }
    }

    fn calculated(
        &self,
        effect: ForceEffect,
        location: GirderLocation,
        loading: LaneLoading,
    ) -> CalcResult<Vec<DfMethod>> {
        let i = &self.inputs;
        match (effect.uses_shear_equations(), self.kind, location) {
            (false, _, GirderLocation::Interior) => Ok(vec![self.s_over_d()]),
            (false, _, GirderLocation::Exterior) => Ok(vec![lever_rule_method(i, location, loading)?]),
            (true, SOverDKind::AdjacentBeams, GirderLocation::Interior) => {
                Ok(vec![adjacent_interior(i, eq::adjacent_box_k(i.girder_count), effect, loading)])
            }
            (true, SOverDKind::AdjacentBeams, GirderLocation::Exterior) => {
                let interior = adjacent_interior(i, eq::adjacent_box_k(i.girder_count), effect, loading).mg();
                let e = match loading {
                    LaneLoading::OneLane => eq::adjacent_box_exterior_shear_e_one_lane(i.de_ft),
                    LaneLoading::MultipleLanes => {
                        eq::adjacent_box_exterior_shear_e_multi_lane(i.de_ft, i.girder_width_in)
                            * eq::adjacent_box_exterior_shear_width_factor(i.girder_width_in)
                    }
                };
                Ok(vec![exterior_equation(exterior_reference(effect), interior, e)])
            }
            (true, SOverDKind::MultiWeb, _) => Ok(vec![lever_rule_method(i, location, loading)?]),
        }
    }

    fn skew_correction(&self, effect: ForceEffect) -> f64 {
        let i = &self.inputs;
        match (effect.uses_shear_equations(), self.kind) {
            (false, _) => eq::box_moment_skew(i.moment_skew()),
            (true, SOverDKind::AdjacentBeams) => {
                eq::adjacent_box_shear_skew(i.shear_skew(), i.span_length_ft, i.girder_depth_in)
            }
            (true, SOverDKind::MultiWeb) => {
                eq::slab_on_girder_shear_skew(i.shear_skew(), i.span_length_ft, i.kg_in4, i.deck_thickness_in)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::distribution::inputs::DfLocator;
    use crate::keys::SpanKey;

    pub(crate) fn inputs(family: BeamFamily, girder: usize, nb: usize, spacing_ft: f64) -> DistributionFactorInputs {
        let location = if girder == 0 || girder + 1 == nb {
            GirderLocation::Exterior
        } else {
            GirderLocation::Interior
        };
        let overhang = 3.0;
        let barrier = 1.5;
        let curb_to_curb = spacing_ft * (nb - 1) as f64 + 2.0 * (overhang - barrier);
        let lanes = eq::design_lane_count(curb_to_curb);
        DistributionFactorInputs {
            locator: DfLocator::Span(SpanKey::new(0, girder)),
            family,
            connected_as_unit: true,
            location,
            girder_index: girder,
            girder_count: nb,
            design_lanes: lanes,
            lane_width_ft: eq::design_lane_width_ft(curb_to_curb, lanes),
            controlling_location_ft: 50.0,
            curb_to_curb_ft: curb_to_curb,
            deck_width_ft: curb_to_curb + 2.0 * barrier,
            span_length_ft: 100.0,
            spacings_ft: vec![spacing_ft; nb - 1],
            spacing_ft,
            left_overhang_ft: overhang,
            right_overhang_ft: overhang,
            left_curb_offset_ft: overhang - barrier,
            right_curb_offset_ft: overhang - barrier,
            de_ft: if location == GirderLocation::Exterior { overhang - barrier } else { 0.0 },
            skew_start_deg: 0.0,
            skew_end_deg: 0.0,
            deck_thickness_in: 8.0,
            girder_depth_in: 54.0,
            girder_width_in: 48.0,
            ix_in4: 260_741.0,
            area_in2: 789.0,
            yt_in: 29.27,
            modular_ratio: 1.2,
            eg_in: 33.27,
            kg_in4: eq::longitudinal_stiffness(1.2, 260_741.0, 789.0, 33.27),
            j_in4: 250_000.0,
            torsion_method: "test".to_string(),
        }
    }

    #[test]
    fn test_factory_selects_family_strategy() {
        let ibeam = create_strategy(inputs(BeamFamily::IBeam, 1, 4, 8.0), AgencyMethod::Aashto);
        assert!(ibeam.description().contains("types a, e, k"));

        let ubeam = create_strategy(inputs(BeamFamily::UBeam, 1, 4, 8.0), AgencyMethod::Aashto);
        assert!(ubeam.description().contains("types b, c"));

        let boxes = create_strategy(inputs(BeamFamily::AdjacentBox, 2, 8, 4.0), AgencyMethod::Aashto);
        assert!(boxes.description().contains("type f"));

        let mut loose = inputs(BeamFamily::VoidedSlab, 2, 8, 4.0);
        loose.connected_as_unit = false;
        let loose = create_strategy(loose, AgencyMethod::Aashto);
        assert!(loose.description().contains("type g"));

        let txdot = create_strategy(inputs(BeamFamily::AdjacentBox, 2, 8, 4.0), AgencyMethod::Txdot);
        assert!(txdot.description().contains("TxDOT"));
        assert!(!txdot.applies_skew_correction());

        let mut multiweb = inputs(BeamFamily::MultiWeb, 1, 4, 8.0);
        multiweb.connected_as_unit = false;
        assert!(create_strategy(multiweb, AgencyMethod::Aashto).description().contains("types i, j"));
    }

    #[test]
    fn test_slab_on_girder_interior_is_single_equation() {
        let strategy = SlabOnGirder::new(inputs(BeamFamily::IBeam, 1, 4, 8.0), false);
        let methods = strategy
            .calculated(ForceEffect::Moment, GirderLocation::Interior, LaneLoading::MultipleLanes)
            .unwrap();
        assert_eq!(methods.len(), 1);
        assert!(matches!(methods[0], DfMethod::Equation(_)));
        assert!(strategy.range_violations(ForceEffect::Moment, GirderLocation::Interior).is_empty());
    }

    #[test]
    fn test_slab_on_girder_exterior_candidates() {
        let strategy = SlabOnGirder::new(inputs(BeamFamily::IBeam, 0, 4, 8.0), false);
        let one = strategy
            .calculated(ForceEffect::Moment, GirderLocation::Exterior, LaneLoading::OneLane)
            .unwrap();
        assert!(one.iter().any(DfMethod::is_lever_rule));
        assert!(one.iter().any(|m| matches!(m, DfMethod::RigidMethod(_))));

        let multi = strategy
            .calculated(ForceEffect::Moment, GirderLocation::Exterior, LaneLoading::MultipleLanes)
            .unwrap();
        match &multi[0] {
            DfMethod::Equation(detail) => {
                let e = detail.e.unwrap();
                assert!((e - (0.77 + 1.5 / 9.1)).abs() < 1e-12);
                assert!((detail.mg - e * detail.mg_interior.unwrap()).abs() < 1e-12);
            }
            other => panic!("expected equation, got {:?}", other),
        }
    }

    #[test]
    fn test_rigid_method_needs_unit_connection() {
        let mut loose = inputs(BeamFamily::IBeam, 0, 4, 8.0);
        loose.connected_as_unit = false;
        let strategy = SlabOnGirder::new(loose, false);
        for loading in [LaneLoading::OneLane, LaneLoading::MultipleLanes] {
            let methods = strategy
                .calculated(ForceEffect::Moment, GirderLocation::Exterior, loading)
                .unwrap();
            assert!(!methods.is_empty());
            assert!(!methods.iter().any(|m| matches!(m, DfMethod::RigidMethod(_))));
        }
    }

    #[test]
    fn test_wsdot_interior_override_for_short_overhang() {
        let strategy = SlabOnGirder::new(inputs(BeamFamily::IBeam, 0, 4, 8.0), true);
        let methods = strategy
            .calculated(ForceEffect::Moment, GirderLocation::Exterior, LaneLoading::MultipleLanes)
            .unwrap();
        let interior = eq::slab_on_girder_moment_multi_lane(8.0, 100.0, strategy.inputs().kg_in4, 8.0);
        match &methods[..] {
            [DfMethod::Override(detail)] => {
                assert_eq!(detail.reason, OverrideReason::InteriorGirderFactor);
                assert!((detail.mg - interior).abs() < 1e-12);
            }
            other => panic!("unexpected methods {:?}", other),
        }
    }

    #[test]
    fn test_exterior_range_includes_de() {
        let mut exterior = inputs(BeamFamily::IBeam, 0, 4, 8.0);
        exterior.de_ft = 6.0;
        let strategy = SlabOnGirder::new(exterior, false);
        let violations = strategy.range_violations(ForceEffect::Moment, GirderLocation::Exterior);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].parameter, "de");
        assert!(strategy.range_violations(ForceEffect::Moment, GirderLocation::Interior).is_empty());
    }

    #[test]
    fn test_txdot_exterior_not_less_than_interior() {
        // Wide boxes: the 48/b width factor pulls the exterior shear below interior
        let mut exterior = inputs(BeamFamily::AdjacentBox, 0, 8, 5.0);
        exterior.girder_width_in = 60.0;
        exterior.de_ft = -3.0;
        let strategy = AdjacentBox::txdot(exterior);
        assert_eq!(strategy.k(), TXDOT_ADJACENT_K);
        let methods = strategy
            .calculated(ForceEffect::Shear, GirderLocation::Exterior, LaneLoading::MultipleLanes)
            .unwrap();
        let interior = strategy
            .calculated(ForceEffect::Shear, GirderLocation::Interior, LaneLoading::MultipleLanes)
            .unwrap()[0]
            .mg();
        assert!(methods.iter().any(|m| matches!(
            m,
            DfMethod::Override(OverrideDetail {
                reason: OverrideReason::ExteriorNotLessThanInterior,
                ..
            })
        )));
        assert!((governing(&methods) - interior).abs() < 1e-12);
    }

    #[test]
    fn test_s_over_d_same_for_both_lane_classes() {
        let mut loose = inputs(BeamFamily::AdjacentBox, 3, 8, 4.0);
        loose.connected_as_unit = false;
        let strategy = SOverD::new(loose, SOverDKind::AdjacentBeams);
        let one = strategy
            .calculated(ForceEffect::Moment, GirderLocation::Interior, LaneLoading::OneLane)
            .unwrap();
        let multi = strategy
            .calculated(ForceEffect::Moment, GirderLocation::Interior, LaneLoading::MultipleLanes)
            .unwrap();
        assert_eq!(one[0].mg(), multi[0].mg());
    }

    #[test]
    fn test_multi_web_shear_uses_lever_rule() {
        let mut loose = inputs(BeamFamily::MultiWeb, 1, 4, 6.0);
        loose.connected_as_unit = false;
        let strategy = SOverD::new(loose, SOverDKind::MultiWeb);
        let methods = strategy
            .calculated(ForceEffect::Shear, GirderLocation::Interior, LaneLoading::OneLane)
            .unwrap();
        assert!(methods[0].is_lever_rule());
    }
}
