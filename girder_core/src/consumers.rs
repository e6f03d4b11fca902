//! # Girder Check
//!
//! Flexure and shear demand against capacity at every POI between the faces
//! of support of one girder. Everything is read through [`AnalysisContext`],
//! so a re-check after an unrelated model edit reuses cached capacities.
//!
//! Inside a critical section zone the shear check uses the demand and
//! capacity at the critical section itself.

use serde::{Deserialize, Serialize};

use crate::cache::AnalysisContext;
use crate::candidate::CandidateConfiguration;
use crate::capacity::HaunchDetails;
use crate::critical_section::CriticalSection;
use crate::errors::{CalcError, CalcResult};
use crate::keys::{AnalysisStage, EndType, GirderKey, LimitState, PointOfInterest, SegmentKey};
use crate::providers::BridgeServices;

/// Demand/capacity ratio, infinite when demand meets no capacity
pub fn demand_capacity_ratio(demand: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        demand.abs() / capacity
    } else if demand.abs() > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Check results at one POI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiCheck {
    pub poi: PointOfInterest,
    pub mu_kip_ft: f64,
    pub mr_kip_ft: f64,
    pub flexure_ratio: f64,
    /// Mr ≥ min(1.33·Mu, 1.2·Mcr)
    pub min_capacity_passes: bool,
    pub vu_kip: f64,
    pub phi_vn_kip: f64,
    pub shear_ratio: f64,
    /// Shear values come from the critical section
    pub in_critical_zone: bool,
}

impl PoiCheck {
    pub fn passes(&self) -> bool {
        self.flexure_ratio <= 1.0 && self.shear_ratio <= 1.0 && self.min_capacity_passes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderCheckArtifact {
    pub girder: GirderKey,
    pub limit_state: LimitState,
    pub critical_sections: Vec<CriticalSection>,
    pub haunch: HaunchDetails,
    pub points: Vec<PoiCheck>,
}

impl GirderCheckArtifact {
    pub fn controlling_flexure(&self) -> Option<&PoiCheck> {
        self.points.iter().max_by(|a, b| a.flexure_ratio.total_cmp(&b.flexure_ratio))
    }

    pub fn controlling_shear(&self) -> Option<&PoiCheck> {
        self.points.iter().max_by(|a, b| a.shear_ratio.total_cmp(&b.shear_ratio))
    }

    pub fn passes(&self) -> bool {
        self.points.iter().all(PoiCheck::passes)
    }
}

fn support_range(sections: &[CriticalSection]) -> Option<(f64, f64)> {
    let start = sections.iter().find(|cs| cs.end == EndType::Start)?;
    let end = sections.iter().find(|cs| cs.end == EndType::End)?;
    Some((
        start.face_of_support.distance_from_start_ft,
        end.face_of_support.distance_from_start_ft,
    ))
}

/// Check a girder for a strength limit state
pub fn check_girder<M: BridgeServices>(
    ctx: &AnalysisContext<M>,
    girder: GirderKey,
    limit_state: LimitState,
    candidate: Option<&CandidateConfiguration>,
) -> CalcResult<GirderCheckArtifact> {
    if !limit_state.is_strength() {
        return Err(CalcError::invalid_input(
            "limit_state",
            limit_state.display_name(),
            "the girder check is performed for strength limit states",
        ));
    }

    let segment = SegmentKey::from(girder);
    let sections = ctx.critical_sections(limit_state, girder, candidate)?;
    let (first_face, last_face) = support_range(&sections).ok_or_else(|| {
        CalcError::configuration_mismatch(format!("{:?} is missing a critical section at one end", girder))
    })?;
    let haunch = ctx.haunch(segment, candidate)?;

    let mut points = Vec::new();
    for poi in ctx.model().segment_pois(segment) {
        let x = poi.distance_from_start_ft;
        if x < first_face - 1.0e-9 || x > last_face + 1.0e-9 {
            continue;
        }

        let demand = ctx.demand(limit_state, &poi, candidate)?;
        let mr = ctx.moment_capacity(&poi, AnalysisStage::Composite, true, candidate)?;
        let min_capacity = ctx.min_moment_capacity(&poi, AnalysisStage::Composite, true, candidate)?;

        let zone = sections.iter().find(|cs| cs.in_zone(x));
        let shear_poi = zone.map_or(poi, |cs| cs.poi());
        let shear = ctx.shear_capacity(limit_state, &shear_poi, candidate)?;
        let vu_kip = if zone.is_some() {
            ctx.demand(limit_state, &shear_poi, candidate)?.vu_kip
        } else {
            demand.vu_kip
        };

        points.push(PoiCheck {
            poi,
            mu_kip_ft: demand.mu_kip_ft,
            mr_kip_ft: mr.mr_kip_ft,
            flexure_ratio: demand_capacity_ratio(demand.mu_kip_ft, mr.mr_kip_ft),
            min_capacity_passes: min_capacity.passes(),
            vu_kip,
            phi_vn_kip: shear.phi_vn_kip,
            shear_ratio: demand_capacity_ratio(vu_kip, shear.phi_vn_kip),
            in_critical_zone: zone.is_some(),
        });
    }

    log::info!(
        "{:?} {}: checked {} points, {}",
        girder,
        limit_state,
        points.len(),
        if points.iter().all(PoiCheck::passes) { "all pass" } else { "some fail" }
    );

    Ok(GirderCheckArtifact {
        girder,
        limit_state,
        critical_sections: sections.as_ref().clone(),
        haunch: haunch.as_ref().clone(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use std::rc::Rc;

    #[test]
    fn test_ratio_edge_cases() {
        assert_eq!(demand_capacity_ratio(0.0, 0.0), 0.0);
        assert!(demand_capacity_ratio(5.0, 0.0).is_infinite());
        assert!((demand_capacity_ratio(-50.0, 100.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_check_covers_faces_of_support() {
        let ctx = AnalysisContext::for_model(fixtures::four_girder_bridge());
        let girder = GirderKey::new(0, 1);
        let artifact = ctx.girder_check(girder, LimitState::StrengthI, None).unwrap();
        assert_eq!(artifact.critical_sections.len(), 2);
        let first = artifact.points.first().unwrap();
        let last = artifact.points.last().unwrap();
        assert!((first.poi.distance_from_start_ft - 1.25).abs() < 1e-9);
        assert!((last.poi.distance_from_start_ft - 100.25).abs() < 1e-9);
        assert!(artifact.points.iter().all(|p| p.flexure_ratio.is_finite() && p.flexure_ratio >= 0.0));
        assert!(artifact.points.iter().all(|p| p.phi_vn_kip > 0.0));
    }

    #[test]
    fn test_zone_points_share_critical_section_shear() {
        let ctx = AnalysisContext::for_model(fixtures::four_girder_bridge());
        let artifact = ctx.girder_check(GirderKey::new(0, 1), LimitState::StrengthI, None).unwrap();
        let start = &artifact.critical_sections[0];
        let zone: Vec<_> = artifact
            .points
            .iter()
            .filter(|p| p.in_critical_zone && start.in_zone(p.poi.distance_from_start_ft))
            .collect();
        assert!(!zone.is_empty());
        assert!(zone.iter().all(|p| p.phi_vn_kip == zone[0].phi_vn_kip && p.vu_kip == zone[0].vu_kip));
        let midspan = artifact
            .points
            .iter()
            .find(|p| (p.poi.distance_from_start_ft - 50.75).abs() < 1e-9)
            .unwrap();
        assert!(!midspan.in_critical_zone);
        assert!(midspan.mu_kip_ft > zone[0].mu_kip_ft);
    }

    #[test]
    fn test_artifact_is_cached() {
        let ctx = AnalysisContext::for_model(fixtures::four_girder_bridge());
        let girder = GirderKey::new(0, 0);
        let a = ctx.girder_check(girder, LimitState::StrengthI, None).unwrap();
        let b = ctx.girder_check(girder, LimitState::StrengthI, None).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        ctx.on_load_modifiers_changed();
        let c = ctx.girder_check(girder, LimitState::StrengthI, None).unwrap();
        assert!(!Rc::ptr_eq(&a, &c));
        assert_eq!(a.points.len(), c.points.len());
    }

    #[test]
    fn test_service_limit_state_is_rejected() {
        let ctx = AnalysisContext::for_model(fixtures::four_girder_bridge());
        let err = ctx.girder_check(GirderKey::new(0, 1), LimitState::ServiceI, None).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
