//! Test bridges shared by the unit tests

use super::*;

fn span(length_ft: f64, girders: usize, spacing_ft: f64) -> SpanData {
    SpanData {
        length_ft,
        spacings_ft: vec![spacing_ft; girders - 1],
        girders: vec![demo::wf_girder(); girders],
        beam_family: BeamFamily::IBeam,
        connected_as_unit: true,
        curvature_deg: 0.0,
    }
}

fn deck() -> DeckData {
    DeckData {
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
    }
}

fn bridge(name: &str, spans: Vec<SpanData>, piers: Vec<PierData>) -> BridgeModel {
    BridgeModel {
        name: name.to_string(),
        spans,
        piers,
        deck: deck(),
        materials: MaterialData::default(),
        loads: LoadData::default(),
        specification: SpecificationCriteria::default(),
        rating: RatingCriteria::default(),
        load_modifiers: LoadModifiers::default(),
        environment: Environment::default(),
        direct_factors: DirectFactorTable::default(),
        reaction_overrides: Vec::new(),
    }
}

/// Single 100 ft span, four WF54G girders at 8 ft
pub(crate) fn four_girder_bridge() -> BridgeModel {
    bridge(
        "Four girder single span",
        vec![span(100.0, 4, 8.0)],
        vec![PierData::new(0.0, false), PierData::new(0.0, false)],
    )
}

/// Two identical 100 ft spans made continuous over pier 1
pub(crate) fn two_span_continuous_bridge() -> BridgeModel {
    bridge(
        "Two span continuous",
        vec![span(100.0, 4, 8.0), span(100.0, 4, 8.0)],
        vec![
            PierData::new(0.0, false),
            PierData::new(0.0, true),
            PierData::new(0.0, false),
        ],
    )
}

pub(crate) fn direct_span(span: SpanKey, factors: DirectSpanFactors) -> DirectSpanEntry {
    DirectSpanEntry {
        span,
        factors,
        fatigue: None,
    }
}

pub(crate) fn direct_pier(pier: PierKey, factors: DirectPierFactors) -> DirectPierEntry {
    DirectPierEntry {
        pier,
        factors,
        fatigue: None,
    }
}
