//! # Critical Section for Shear
//!
//! Locates the critical section for shear near each end of a girder
//! (AASHTO LRFD 5.7.3.2).
//!
//! ## Method
//!
//! ```text
//! For each face of support:
//!   Rmin ≤ 0 (uplift)          → critical section at the face of support
//!   otherwise, for POIs within 2.5·Hg of the face on the span side:
//!     x      = distance from the face of support
//!     dv(x)  = effective shear depth
//!     ct(x)  = 0.5·dv·cot θ    (only where θ is defined)
//!     line   = x                (45° from the face of support)
//!   critical section at dv(x) = x
//!   before 2004: the farther of dv(x) = x and ct(x) = x
//! ```
//!
//! The locator is a pure function of the model and two callbacks: the
//! minimum factored reaction at a pier and the shear capacity details at a
//! POI. The analysis context supplies both from its caches.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::capacity::ShearCapacityDetails;
use crate::config::{aashto_ref, SpecificationCriteria};
use crate::errors::{CalcError, CalcResult};
use crate::keys::{poi_attr, EndType, GirderKey, PierFace, PierKey, PointOfInterest};
use crate::math::{zero_if_small, PiecewiseFunction};
use crate::providers::{BridgeServices, SupportFace};

/// Search extent past the face of support, in girder heights
pub const SEARCH_HEIGHTS: f64 = 2.5;

/// Reactions smaller than this are taken as zero (kip)
pub const REACTION_TOLERANCE_KIP: f64 = 0.001;

// ============================================================================
// Results
// ============================================================================

/// How the critical section was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CriticalSectionRule {
    /// dv from the face of support
    DvOnly,
    /// Farther of dv and 0.5·dv·cot θ
    FartherOfDvAndCotTheta,
}

impl CriticalSectionRule {
    pub const ALL: [CriticalSectionRule; 2] = [CriticalSectionRule::DvOnly, CriticalSectionRule::FartherOfDvAndCotTheta];

    pub fn for_criteria(criteria: &SpecificationCriteria) -> Self {
        if criteria.uses_dv_only_critical_section() {
            CriticalSectionRule::DvOnly
        } else {
            CriticalSectionRule::FartherOfDvAndCotTheta
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CriticalSectionRule::DvOnly => "dv from face of support",
            CriticalSectionRule::FartherOfDvAndCotTheta => "Greater of dv and 0.5·dv·cot θ",
        }
    }
}

impl fmt::Display for CriticalSectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Which curve produced the critical section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoverningCurve {
    Dv,
    CotTheta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CriticalSectionLocation {
    /// Uplift: no search performed
    AtFaceOfSupport,
    Intersection {
        /// Synthetic POI at the critical section
        poi: PointOfInterest,
        distance_from_face_ft: f64,
        dv_in: f64,
        /// θ where the shear stress is in range
        theta_deg: Option<f64>,
        cot_theta_term_ft: Option<f64>,
        governing: GoverningCurve,
    },
}

/// Critical section at one end of a girder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalSection {
    pub pier: PierKey,
    pub face: PierFace,
    pub end: EndType,
    pub face_of_support: PointOfInterest,
    pub min_reaction_kip: f64,
    pub location: CriticalSectionLocation,
    pub rule: CriticalSectionRule,
    /// Critical section zone along the segment, girder end to critical section
    pub zone_start_ft: f64,
    pub zone_end_ft: f64,
}

impl CriticalSection {
    pub fn is_uplift(&self) -> bool {
        self.location == CriticalSectionLocation::AtFaceOfSupport
    }

    /// Point where shear is checked for the whole zone
    pub fn poi(&self) -> PointOfInterest {
        match &self.location {
            CriticalSectionLocation::AtFaceOfSupport => self.face_of_support,
            CriticalSectionLocation::Intersection { poi, .. } => *poi,
        }
    }

    /// Location along the segment
    pub fn distance_from_start_ft(&self) -> f64 {
        self.poi().distance_from_start_ft
    }

    /// True when `x_ft` lies between the girder end and the critical section
    pub fn in_zone(&self, x_ft: f64) -> bool {
        self.zone_start_ft - 1.0e-9 <= x_ft && x_ft <= self.zone_end_ft + 1.0e-9
    }
}

// ============================================================================
// Search
// ============================================================================

/// Sampled curves of one search, x measured from the face of support (ft)
#[derive(Debug, Default)]
struct InterceptCurves {
    dv: PiecewiseFunction,
    theta: PiecewiseFunction,
    cot_theta: PiecewiseFunction,
    max_x: f64,
}

impl InterceptCurves {
    fn unity_line(&self) -> PiecewiseFunction {
        PiecewiseFunction::line(0.0, self.max_x, 1.0, 0.0)
    }

    fn log_table(&self, support: &SupportFace) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        log::debug!("critical section intercepts, pier {} {} face", support.pier + 1, support.face.display_name());
        for p in self.dv.points() {
            let ct = self.cot_theta.evaluate(p.x).ok();
            log::debug!("  x = {:8.4} ft  dv = {:8.4} ft  0.5·dv·cot θ = {:?}", p.x, p.y, ct);
        }
    }
}

fn search_pois(model: &dyn BridgeServices, girder: GirderKey, support: &SupportFace) -> Vec<(f64, PointOfInterest)> {
    let fos = &support.poi;
    let height_ft = model.girder_height_in(fos.segment, fos.distance_from_start_ft) / 12.0;
    let extent = SEARCH_HEIGHTS * height_ft;
    let interior = model.is_interior_pier(support.pier);
    let (left, right, direction) = match support.face {
        PierFace::Ahead => (if interior { 0.0 } else { extent }, extent, 1.0),
        PierFace::Back => (extent, if interior { 0.0 } else { extent }, -1.0),
    };
    log::trace!("searching girder {:?} within {:.3} ft of pier {}", girder, extent, support.pier + 1);
    model
        .pois_in_range(fos, left, right)
        .into_iter()
        .map(|poi| (direction * (poi.distance_from_start_ft - fos.distance_from_start_ft), poi))
        // Between the bearing and the face of support
        .filter(|(x, _)| *x >= -1.0e-9)
        .map(|(x, poi)| (x.max(0.0), poi))
        .collect()
}

fn build_curves<S>(samples: &[(f64, PointOfInterest)], shear: &mut S) -> CalcResult<InterceptCurves>
where
    S: FnMut(&PointOfInterest) -> CalcResult<Rc<ShearCapacityDetails>>,
{
    let mut curves = InterceptCurves::default();
    for (x, poi) in samples {
        let details = shear(poi)?;
        let dv_ft = details.dv_in / 12.0;
        curves.dv.add_point(*x, dv_ft);
        if details.shear_in_range {
            curves.theta.add_point(*x, details.theta_deg);
            let cot = 1.0 / details.theta_deg.to_radians().tan();
            curves.cot_theta.add_point(*x, 0.5 * dv_ft * cot);
        }
        curves.max_x = curves.max_x.max(*x);
    }
    Ok(curves)
}

fn intersect_dv(curves: &InterceptCurves, support: &SupportFace) -> CalcResult<f64> {
    let range = curves.dv.range().ok_or_else(|| no_samples(support))?;
    let hits = curves.dv.intersect(&curves.unity_line(), range)?;
    match hits.as_slice() {
        [hit] => Ok(hit.x),
        _ => Err(CalcError::numeric_degeneracy(
            format!("critical section at pier {} {} face", support.pier + 1, support.face.display_name()),
            format!("dv meets the 45° line {} times, expected exactly once", hits.len()),
        )),
    }
}

fn intersect_cot_theta(curves: &InterceptCurves, support: &SupportFace) -> CalcResult<Option<f64>> {
    let Some(range) = curves.cot_theta.range() else {
        return Ok(None);
    };
    let hits = curves.cot_theta.intersect(&curves.unity_line(), range)?;
    match hits.as_slice() {
        [] => Ok(None),
        [hit] => Ok(Some(hit.x)),
        _ => Err(CalcError::numeric_degeneracy(
            format!("critical section at pier {} {} face", support.pier + 1, support.face.display_name()),
            format!("0.5·dv·cot θ meets the 45° line {} times", hits.len()),
        )),
    }
}

fn no_samples(support: &SupportFace) -> CalcError {
    CalcError::numeric_degeneracy(
        format!("critical section at pier {} {} face", support.pier + 1, support.face.display_name()),
        "no points of interest in the search range",
    )
}

/// Critical section at one face of support
pub fn locate_at_face<R, S>(
    model: &dyn BridgeServices,
    girder: GirderKey,
    support: &SupportFace,
    criteria: &SpecificationCriteria,
    min_reaction: &mut R,
    shear: &mut S,
) -> CalcResult<CriticalSection>
where
    R: FnMut(PierKey) -> CalcResult<f64>,
    S: FnMut(&PointOfInterest) -> CalcResult<Rc<ShearCapacityDetails>>,
{
    let pier = PierKey::new(support.pier, girder.girder);
    let fos = support.poi;
    let end = match support.face {
        PierFace::Ahead => EndType::Start,
        PierFace::Back => EndType::End,
    };
    let segment_length = model.segment_length_ft(fos.segment);
    let end_distance = model.end_distance_ft(fos.segment);
    // zones run from the CL bearing to the critical section
    let zone = |x_cs: f64| match end {
        EndType::Start => (end_distance.left, x_cs),
        EndType::End => (x_cs, segment_length - end_distance.right),
    };
    let rule = CriticalSectionRule::for_criteria(criteria);
    let min_reaction_kip = zero_if_small(min_reaction(pier)?, REACTION_TOLERANCE_KIP);

    if min_reaction_kip <= 0.0 {
        log::info!(
            "uplift at pier {} girder {:?} (Rmin = {:.3} kip), critical section at face of support",
            support.pier + 1,
            girder,
            min_reaction_kip
        );
        let (zone_start_ft, zone_end_ft) = zone(fos.distance_from_start_ft);
        return Ok(CriticalSection {
            pier,
            face: support.face,
            end,
            face_of_support: fos,
            min_reaction_kip,
            location: CriticalSectionLocation::AtFaceOfSupport,
            rule,
            zone_start_ft,
            zone_end_ft,
        });
    }

    let samples = search_pois(model, girder, support);
    if samples.is_empty() {
        return Err(no_samples(support));
    }
    let curves = build_curves(&samples, shear)?;
    curves.log_table(support);

    let dv_x = intersect_dv(&curves, support)?;
    let (x, governing) = match rule {
        CriticalSectionRule::DvOnly => (dv_x, GoverningCurve::Dv),
        CriticalSectionRule::FartherOfDvAndCotTheta => match intersect_cot_theta(&curves, support)? {
            Some(ct_x) if ct_x > dv_x => (ct_x, GoverningCurve::CotTheta),
            _ => (dv_x, GoverningCurve::Dv),
        },
    };

    let direction = if end == EndType::Start { 1.0 } else { -1.0 };
    let location_ft = fos.distance_from_start_ft + direction * x;
    let mut poi = PointOfInterest::synthetic(fos.segment, location_ft);
    poi.attributes |= poi_attr::CRITICAL_SECTION;
    let (zone_start_ft, zone_end_ft) = zone(location_ft);

    log::debug!(
        "critical section ({}) for {:?} at pier {}: {:.4} ft from face ({})",
        aashto_ref::CRITICAL_SECTION,
        girder,
        support.pier + 1,
        x,
        rule
    );

    Ok(CriticalSection {
        pier,
        face: support.face,
        end,
        face_of_support: fos,
        min_reaction_kip,
        location: CriticalSectionLocation::Intersection {
            poi,
            distance_from_face_ft: x,
            dv_in: curves.dv.evaluate(x)? * 12.0,
            theta_deg: curves.theta.evaluate(x).ok(),
            cot_theta_term_ft: curves.cot_theta.evaluate(x).ok(),
            governing,
        },
        rule,
        zone_start_ft,
        zone_end_ft,
    })
}

/// Critical sections at both ends of a girder, start end first
pub fn locate_critical_sections<R, S>(
    model: &dyn BridgeServices,
    girder: GirderKey,
    criteria: &SpecificationCriteria,
    mut min_reaction: R,
    mut shear: S,
) -> CalcResult<Vec<CriticalSection>>
where
    R: FnMut(PierKey) -> CalcResult<f64>,
    S: FnMut(&PointOfInterest) -> CalcResult<Rc<ShearCapacityDetails>>,
{
    let supports = model.face_of_support_pois(girder);
    if supports.is_empty() {
        return Err(CalcError::invalid_input(
            "girder",
            format!("{:?}", girder),
            "girder has no faces of support",
        ));
    }
    supports
        .iter()
        .map(|support| locate_at_face(model, girder, support, criteria, &mut min_reaction, &mut shear))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpecificationEdition;
    use crate::model::fixtures;
    use crate::providers::GeometryProvider;
    use std::cell::Cell;

    fn details(dv_in: f64, theta_deg: f64, in_range: bool) -> Rc<ShearCapacityDetails> {
        Rc::new(ShearCapacityDetails {
            dv_in,
            theta_deg,
            shear_in_range: in_range,
            vu_kip: 100.0,
            mu_kip_ft: 200.0,
            vc_kip: 80.0,
            vs_kip: 90.0,
            vp_kip: 0.0,
            vn_kip: 170.0,
            phi: 0.9,
            phi_vn_kip: 153.0,
        })
    }

    #[test]
    fn test_uplift_places_section_at_face() {
        let model = fixtures::four_girder_bridge();
        let calls = Cell::new(0);
        let sections = locate_critical_sections(
            &model,
            GirderKey::new(0, 1),
            &model.specification,
            |_| Ok(-5.0),
            |_| {
                calls.set(calls.get() + 1);
                Ok(details(54.0, 30.0, true))
            },
        )
        .unwrap();
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| s.is_uplift()));
        assert_eq!(calls.get(), 0);
        let segment = sections[0].face_of_support.segment;
        let end_distance = model.end_distance_ft(segment);
        assert!((sections[0].zone_start_ft - end_distance.left).abs() < 1e-12);
        assert!((sections[0].zone_end_ft - sections[0].face_of_support.distance_from_start_ft).abs() < 1e-12);
        let length = model.segment_length_ft(segment);
        assert!((sections[1].zone_end_ft - (length - end_distance.right)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_reaction_is_uplift() {
        let model = fixtures::four_girder_bridge();
        for reaction in [0.0, -0.0005, 0.0005] {
            let calls = Cell::new(0);
            let sections = locate_critical_sections(
                &model,
                GirderKey::new(0, 1),
                &model.specification,
                |_| Ok(reaction),
                |_| {
                    calls.set(calls.get() + 1);
                    Ok(details(54.0, 30.0, true))
                },
            )
            .unwrap();
            assert!(sections.iter().all(|s| s.is_uplift()));
            assert!(sections.iter().all(|s| s.min_reaction_kip == 0.0));
            assert_eq!(calls.get(), 0);
        }
    }

    #[test]
    fn test_small_positive_reaction_searches() {
        let model = fixtures::four_girder_bridge();
        let sections = locate_critical_sections(
            &model,
            GirderKey::new(0, 1),
            &model.specification,
            |_| Ok(0.01),
            |_| Ok(details(54.0, 30.0, true)),
        )
        .unwrap();
        assert!(!sections[0].is_uplift());
    }

    #[test]
    fn test_symmetric_girder_gives_mirrored_sections() {
        let model = fixtures::four_girder_bridge();
        let sections = locate_critical_sections(
            &model,
            GirderKey::new(0, 1),
            &model.specification,
            |_| Ok(50.0),
            |_| Ok(details(54.0, 30.0, true)),
        )
        .unwrap();
        let length = model.segment_length_ft(crate::keys::SegmentKey::new(0, 1, 0));
        let (start, end) = (&sections[0], &sections[1]);
        assert_eq!(start.end, EndType::Start);
        assert_eq!(end.end, EndType::End);
        assert_eq!(start.rule, CriticalSectionRule::DvOnly);
        match &start.location {
            CriticalSectionLocation::Intersection {
                distance_from_face_ft,
                dv_in,
                governing,
                ..
            } => {
                assert!((distance_from_face_ft - 4.5).abs() < 1e-9);
                assert!((dv_in - 54.0).abs() < 1e-9);
                assert_eq!(*governing, GoverningCurve::Dv);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!((start.distance_from_start_ft() + end.distance_from_start_ft() - length).abs() < 1e-9);
        assert!((start.zone_end_ft - (length - end.zone_start_ft)).abs() < 1e-9);
        assert!(start.in_zone(2.0));
        assert!(!start.in_zone(50.0));
    }

    #[test]
    fn test_cot_theta_governs_before_2004() {
        let mut model = fixtures::four_girder_bridge();
        model.specification.edition = SpecificationEdition::SecondEdition1998;
        let sections = locate_critical_sections(
            &model,
            GirderKey::new(0, 1),
            &model.specification,
            |_| Ok(50.0),
            |_| Ok(details(54.0, 20.0, true)),
        )
        .unwrap();
        let expected = 0.5 * 4.5 / 20.0_f64.to_radians().tan();
        match &sections[0].location {
            CriticalSectionLocation::Intersection {
                distance_from_face_ft,
                governing,
                ..
            } => {
                assert!((distance_from_face_ft - expected).abs() < 1e-6);
                assert_eq!(*governing, GoverningCurve::CotTheta);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sections[0].rule, CriticalSectionRule::FartherOfDvAndCotTheta);
    }

    #[test]
    fn test_no_dv_intersection_is_degenerate() {
        let model = fixtures::four_girder_bridge();
        let err = locate_critical_sections(
            &model,
            GirderKey::new(0, 1),
            &model.specification,
            |_| Ok(50.0),
            |_| Ok(details(1200.0, 30.0, true)),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "NUMERIC_DEGENERACY");
    }

    #[test]
    fn test_interior_pier_searches_span_side_only() {
        let model = fixtures::two_span_continuous_bridge();
        let girder = GirderKey::new(1, 1);
        let supports = model.face_of_support_pois(girder);
        let ahead = &supports[0];
        assert!(model.is_interior_pier(ahead.pier));
        let samples = search_pois(&model, girder, ahead);
        assert!(samples.iter().all(|(x, _)| *x >= 0.0));
        assert!(samples
            .iter()
            .all(|(_, p)| p.distance_from_start_ft >= ahead.poi.distance_from_start_ft - 1e-9));
    }
}
