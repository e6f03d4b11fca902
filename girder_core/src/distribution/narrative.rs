//! # Computation Narrative
//!
//! Plain-text description of how a distribution factor was obtained. The
//! text is rendered from the same [`DfMethod`] values the numeric path
//! selected, so it always names the method that actually controls.

use std::fmt::Write;

use crate::config::{aashto_ref, DistributionFactorMethod};

use super::engine::{PierFactorDetails, ReactionFactorDetails, SpanFactorDetails};
use super::inputs::DistributionFactorInputs;
use super::method::{DfMethod, FactorSet, LaneResult};

fn method_lines(out: &mut String, method: &DfMethod) {
    match method {
        DfMethod::Equation(detail) => {
            let _ = writeln!(out, "    {} ({})", detail.equation.display_name(), detail.reference);
            if let (Some(interior), Some(e)) = (detail.mg_interior, detail.e) {
                let _ = writeln!(out, "    e = {:.4}, mg interior = {:.4}", e, interior);
            }
            let _ = writeln!(out, "    mg = {:.4}", detail.mg);
        }
        DfMethod::LeverRule(detail) => {
            let wheels: Vec<String> = detail.wheel_positions_ft.iter().map(|x| format!("{:.3}", x)).collect();
            let _ = writeln!(
                out,
                "    Lever Rule: {} lane(s) loaded, girder at {:.3} ft, wheels at [{}] ft from curb",
                detail.lanes_loaded,
                detail.girder_position_ft,
                wheels.join(", ")
            );
            let _ = writeln!(
                out,
                "    mg = (m = {:.2})({:.4}) = {:.4}",
                detail.multiple_presence, detail.sum_reactions, detail.mg
            );
        }
        DfMethod::RigidMethod(detail) => {
            let e: Vec<String> = detail.eccentricities_ft.iter().map(|x| format!("{:.3}", x)).collect();
            let _ = writeln!(
                out,
                "    Rigid Method ({}): NL = {}, Nb = {}, Xext = {:.3} ft, e = [{}] ft, Σx² = {:.3} ft²",
                aashto_ref::RIGID_METHOD,
                detail.lanes_loaded,
                detail.girder_count,
                detail.x_exterior_ft,
                e.join(", "),
                detail.sum_x_squared
            );
            let _ = writeln!(out, "    mg = (m = {:.2})(NL/Nb + Xext·Σe/Σx²) = {:.4}", detail.multiple_presence, detail.mg);
        }
        DfMethod::LanesOverBeams(detail) => {
            let _ = writeln!(
                out,
                "    Number of Lanes over Number of Beams - Factor cannot be less than this: ({:.2})({}/{}) = {:.4}",
                detail.multiple_presence, detail.lanes, detail.beams, detail.mg
            );
            let _ = writeln!(out, "    Skew correction is not applied to Lanes/Beams method");
        }
        DfMethod::Override(detail) => {
            let _ = writeln!(out, "    {}: mg = {:.4}", detail.reason.display_name(), detail.mg);
        }
    }
}

fn lane_lines(out: &mut String, lane: &LaneResult) {
    let _ = writeln!(out, "  {}", lane.loading.display_name());
    let others: Vec<&DfMethod> = lane.evaluated.iter().filter(|m| **m != lane.controlling).collect();
    for method in others {
        let _ = writeln!(out, "   Also evaluated: {}", method.display_name());
        method_lines(out, method);
    }
    let _ = writeln!(out, "   Controlling: {}", lane.controlling.display_name());
    method_lines(out, &lane.controlling);
    if let Some(r) = lane.skew_correction {
        if !lane.floor_applied {
            let _ = writeln!(out, "    Skew correction factor = {:.4}", r);
        }
    }
    if lane.fatigue_adjusted {
        let _ = writeln!(out, "    Fatigue: multiple presence factor removed, mg/1.2");
    }
    let _ = writeln!(out, "    mg = {:.4}", lane.mg);
}

/// Description of one factor set
pub fn describe_factor_set(title: &str, set: &FactorSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Distribution Factor for {}", title);
    lane_lines(&mut out, &set.one_lane);
    if let Some(multi) = &set.multiple_lanes {
        lane_lines(&mut out, multi);
    }
    let _ = writeln!(
        out,
        "  Controlling: {} = {:.4}",
        set.controlling_result().loading.display_name(),
        set.controlling
    );
    out
}

fn inputs_lines(out: &mut String, strategy: &str, inputs: &DistributionFactorInputs) {
    let _ = writeln!(out, "Method: {}", strategy);
    let _ = writeln!(
        out,
        "{}, {} ({}), Nb = {}, NL = {}",
        inputs.location.display_name(),
        inputs.family.display_name(),
        if inputs.connected_as_unit { "connected as a unit" } else { "minimally connected" },
        inputs.girder_count,
        inputs.design_lanes
    );
    let _ = writeln!(
        out,
        "S = {:.4} ft, L = {:.3} ft, ts = {:.3} in, de = {:.4} ft, curb-to-curb = {:.3} ft at {:.3} ft",
        inputs.spacing_ft,
        inputs.span_length_ft,
        inputs.deck_thickness_in,
        inputs.de_ft,
        inputs.curb_to_curb_ft,
        inputs.controlling_location_ft
    );
    let _ = writeln!(
        out,
        "n = {:.4}, I = {:.1} in⁴, A = {:.2} in², eg = {:.3} in, Kg = {:.1} in⁴, J = {:.1} in⁴ ({})",
        inputs.modular_ratio,
        inputs.ix_in4,
        inputs.area_in2,
        inputs.eg_in,
        inputs.kg_in4,
        inputs.j_in4,
        inputs.torsion_method
    );
    let _ = writeln!(
        out,
        "Skew: {:.3}° start, {:.3}° end",
        inputs.skew_start_deg, inputs.skew_end_deg
    );
}

fn header(out: &mut String, title: String, method: DistributionFactorMethod, strategy: &str, inputs: Option<&DistributionFactorInputs>) {
    let _ = writeln!(out, "{}", title);
    match (method, inputs) {
        (DistributionFactorMethod::DirectlyInput, _) | (_, None) => {
            let _ = writeln!(out, "Distribution factors were directly input");
        }
        (DistributionFactorMethod::LeverRule, Some(inputs)) => {
            let _ = writeln!(out, "Lever rule used for all distribution factors");
            inputs_lines(out, strategy, inputs);
        }
        (DistributionFactorMethod::Calculated, Some(inputs)) => inputs_lines(out, strategy, inputs),
    }
}

pub fn describe_span(details: &SpanFactorDetails) -> String {
    let mut out = String::new();
    header(
        &mut out,
        format!("{} ({:?})", details.span, details.class),
        details.method,
        &details.strategy,
        details.inputs.as_ref(),
    );
    out.push_str(&describe_factor_set("Moment", &details.moment));
    out.push_str(&describe_factor_set("Shear", &details.shear));
    out
}

pub fn describe_pier(details: &PierFactorDetails) -> String {
    let mut out = String::new();
    header(
        &mut out,
        format!(
            "Pier {}, {} face, Girder {} ({:?})",
            details.pier.pier + 1,
            details.face.display_name(),
            crate::keys::girder_label(details.pier.girder),
            details.class
        ),
        details.method,
        &details.strategy,
        details.inputs.as_ref(),
    );
    out.push_str(&describe_factor_set("Negative Moment", &details.negative_moment));
    out
}

pub fn describe_reaction(details: &ReactionFactorDetails) -> String {
    let mut out = String::new();
    header(
        &mut out,
        format!(
            "Pier {}, Girder {} ({:?})",
            details.pier.pier + 1,
            crate::keys::girder_label(details.pier.girder),
            details.class
        ),
        details.method,
        &details.strategy,
        details.inputs.as_ref(),
    );
    out.push_str(&describe_factor_set("Reaction", &details.reaction));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::engine::compute_span_factors;
    use crate::keys::{LimitStateClass, SpanKey};
    use crate::model::fixtures;

    #[test]
    fn test_narrative_names_controlling_method() {
        let model = fixtures::four_girder_bridge();
        let details = compute_span_factors(&model, SpanKey::new(0, 0), LimitStateClass::StrengthService, None).unwrap();
        let text = describe_span(&details);
        let controlling = details.moment.controlling_result();
        let expected = format!("Controlling: {}", controlling.controlling.display_name());
        assert!(text.contains(&expected));
        assert!(text.contains("Span 1 Girder A"));
        assert!(text.contains(&format!("{:.4}", details.moment.controlling)));
    }

    #[test]
    fn test_direct_input_narrative() {
        let set = FactorSet::direct(0.55);
        let text = describe_factor_set("Moment", &set);
        assert!(text.contains("Directly input: mg = 0.5500"));
    }
}
