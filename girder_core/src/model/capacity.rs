//! # Simple Capacity Engine
//!
//! A compact [`CapacityEngine`] for pretensioned girders, enough to drive
//! the shear critical section search and a girder check report:
//!
//! - Flexure: rectangular stress block with bonded strand stress (5.6.3.1.1)
//! - Cracking moment: fr = 0.24√f'c
//! - Losses: elastic shortening plus the approximate long-term estimate (5.9.3.3)
//! - Shear: general procedure (5.7.3.4.2) or the Vci/Vcw cot θ (5.7.3.3)
//! - Principal web tension against 0.110√f'c
//! - Haunch: deck plus fillet plus camber at midspan
//!
//! Vertical prestress component Vp and mild flexural steel are not modeled.

use crate::candidate::CandidateConfiguration;
use crate::capacity::{
    CapacityEngine, CrackingMomentDetails, Demand, FpcDetails, HaunchDetails, MomentCapacityDetails,
    PrestressLossDetails, PrincipalWebStressDetails, ShearCapacityDetails,
};
use crate::config::ShearCapacityMethod;
use crate::errors::{CalcError, CalcResult};
use crate::keys::{AnalysisStage, LimitState, PointOfInterest, SegmentKey};
use crate::providers::BridgeServices;

use super::BridgeModel;

/// Low-relaxation strand factor k
const STRAND_K: f64 = 0.28;

/// Resistance factors
const PHI_FLEXURE_PRESTRESSED: f64 = 1.0;
const PHI_FLEXURE_REINFORCED: f64 = 0.9;
const PHI_SHEAR: f64 = 0.9;

/// Stress block factor β1 for f'c in ksi
#[inline]
pub fn beta1(fc_ksi: f64) -> f64 {
    (0.85 - 0.05 * (fc_ksi - 4.0)).clamp(0.65, 0.85)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleCapacityEngine {
    pub strand_modulus_ksi: f64,
    pub rebar_fy_ksi: f64,
    /// Deck top mat area per foot of flange width
    pub top_rebar_in2_per_ft: f64,
    pub fillet_in: f64,
    pub transfer_length_ft: f64,
}

impl Default for SimpleCapacityEngine {
    fn default() -> Self {
        SimpleCapacityEngine {
            strand_modulus_ksi: 28_500.0,
            rebar_fy_ksi: 60.0,
            top_rebar_in2_per_ft: 0.62,
            fillet_in: 0.75,
            // 60 strand diameters for 0.6 in strand
            transfer_length_ft: 3.0,
        }
    }
}

/// Intermediate flexure values shared by moment and shear
struct Flexure {
    c_in: f64,
    a_in: f64,
    dp_in: f64,
    fps_ksi: f64,
    mn_kip_ft: f64,
}

impl SimpleCapacityEngine {
    /// Engine parameters taken from a bridge model
    pub fn for_model(model: &BridgeModel) -> Self {
        SimpleCapacityEngine {
            strand_modulus_ksi: model.materials.strand_modulus_ksi,
            rebar_fy_ksi: model.materials.rebar_fy_ksi,
            top_rebar_in2_per_ft: model.deck.top_rebar_in2_per_ft,
            fillet_in: model.deck.fillet_in,
            ..Default::default()
        }
    }

    fn positive_flexure(
        &self,
        model: &dyn BridgeServices,
        poi: &PointOfInterest,
        stage: AnalysisStage,
        config: &CandidateConfiguration,
    ) -> CalcResult<Flexure> {
        let (dp_in, b_in, fc_ksi) = match stage {
            AnalysisStage::NonComposite => (
                config.strands.depth_to_centroid_in,
                model.girder_width_in(poi.segment),
                config.fc_ksi,
            ),
            AnalysisStage::Composite => (
                config.strands.depth_to_centroid_in + model.deck_thickness_in(),
                model.effective_flange_width_in(poi.segment.girder_key()),
                model.deck_fc_ksi(),
            ),
        };
        let aps = config.strands.permanent_area_in2();
        let fpu = config.strands.fpu_ksi;
        if aps <= 0.0 || fpu <= 0.0 {
            return Ok(Flexure {
                c_in: 0.0,
                a_in: 0.0,
                dp_in,
                fps_ksi: 0.0,
                mn_kip_ft: 0.0,
            });
        }
        if dp_in <= 0.0 || b_in <= 0.0 || fc_ksi <= 0.0 {
            return Err(CalcError::numeric_degeneracy(
                "flexural resistance",
                format!("dp = {:.3} in, b = {:.3} in, f'c = {:.3} ksi", dp_in, b_in, fc_ksi),
            ));
        }
        let b1 = beta1(fc_ksi);
        // c = Aps·fpu / (0.85·f'c·β1·b + k·Aps·fpu/dp)
        let c = aps * fpu / (0.85 * fc_ksi * b1 * b_in + STRAND_K * aps * fpu / dp_in);
        let a = b1 * c;
        let fps = fpu * (1.0 - STRAND_K * c / dp_in);
        Ok(Flexure {
            c_in: c,
            a_in: a,
            dp_in,
            fps_ksi: fps,
            mn_kip_ft: aps * fps * (dp_in - a / 2.0) / 12.0,
        })
    }

    fn negative_flexure(
        &self,
        model: &dyn BridgeServices,
        poi: &PointOfInterest,
        config: &CandidateConfiguration,
    ) -> CalcResult<MomentCapacityDetails> {
        let props = model.section_properties(poi, AnalysisStage::Composite);
        let flange_ft = model.effective_flange_width_in(poi.segment.girder_key()) / 12.0;
        let as_in2 = self.top_rebar_in2_per_ft * flange_ft;
        let b_in = model.girder_width_in(poi.segment);
        if b_in <= 0.0 || config.fc_ksi <= 0.0 {
            return Err(CalcError::numeric_degeneracy(
                "negative moment resistance",
                format!("b = {:.3} in, f'c = {:.3} ksi", b_in, config.fc_ksi),
            ));
        }
        let de = props.height_in - model.deck_thickness_in() / 2.0;
        let a = as_in2 * self.rebar_fy_ksi / (0.85 * config.fc_ksi * b_in);
        let mn = as_in2 * self.rebar_fy_ksi * (de - a / 2.0) / 12.0;
        Ok(MomentCapacityDetails {
            stage: AnalysisStage::Composite,
            positive_moment: false,
            mn_kip_ft: mn,
            phi: PHI_FLEXURE_REINFORCED,
            mr_kip_ft: PHI_FLEXURE_REINFORCED * mn,
            c_in: a / beta1(config.fc_ksi),
            a_in: a,
            de_in: de,
            fps_ksi: 0.0,
        })
    }

    /// Fraction of the effective force developed at a POI
    fn transfer_fraction(&self, model: &dyn BridgeServices, poi: &PointOfInterest) -> f64 {
        let length = model.segment_length_ft(poi.segment);
        let from_end = poi.distance_from_start_ft.min(length - poi.distance_from_start_ft).max(0.0);
        if self.transfer_length_ft <= 0.0 {
            1.0
        } else {
            (from_end / self.transfer_length_ft).min(1.0)
        }
    }
}

impl CapacityEngine for SimpleCapacityEngine {
    fn moment_capacity(
        &self,
        model: &dyn BridgeServices,
        poi: &PointOfInterest,
        stage: AnalysisStage,
        positive_moment: bool,
        config: &CandidateConfiguration,
    ) -> CalcResult<MomentCapacityDetails> {
        if !positive_moment {
            return self.negative_flexure(model, poi, config);
        }
        let flexure = self.positive_flexure(model, poi, stage, config)?;
        let mn = flexure.mn_kip_ft * self.transfer_fraction(model, poi);
        Ok(MomentCapacityDetails {
            stage,
            positive_moment,
            mn_kip_ft: mn,
            phi: PHI_FLEXURE_PRESTRESSED,
            mr_kip_ft: PHI_FLEXURE_PRESTRESSED * mn,
            c_in: flexure.c_in,
            a_in: flexure.a_in,
            de_in: flexure.dp_in,
            fps_ksi: flexure.fps_ksi,
        })
    }

    fn cracking_moment(
        &self,
        model: &dyn BridgeServices,
        poi: &PointOfInterest,
        stage: AnalysisStage,
        positive_moment: bool,
        losses: &PrestressLossDetails,
    ) -> CalcResult<CrackingMomentDetails> {
        let config = model.built_configuration(poi.segment);
        let nc = model.section_properties(poi, AnalysisStage::NonComposite);
        let props = model.section_properties(poi, stage);
        if nc.area_in2 <= 0.0 || nc.ix_in4 <= 0.0 || props.ix_in4 <= 0.0 {
            return Err(CalcError::numeric_degeneracy("cracking moment", "section has no stiffness"));
        }
        let fr = 0.24 * config.fc_ksi.max(0.0).sqrt();
        let p = losses.effective_force_kip;
        let e = config.strands.depth_to_centroid_in - nc.yt_in;
        let (fcpe, s) = if positive_moment {
            (p / nc.area_in2 + p * e * nc.yb_in / nc.ix_in4, props.ix_in4 / props.yb_in)
        } else {
            // Prestress puts the top fiber in tension, so it only adds to cracking
            let top = (p / nc.area_in2 - p * e * nc.yt_in / nc.ix_in4).min(0.0);
            (top, props.ix_in4 / props.yt_in)
        };
        Ok(CrackingMomentDetails {
            fr_ksi: fr,
            fcpe_ksi: fcpe,
            section_modulus_in3: s,
            mcr_kip_ft: ((fr + fcpe) * s / 12.0).max(0.0),
        })
    }

    fn prestress_losses(
        &self,
        model: &dyn BridgeServices,
        poi: &PointOfInterest,
        config: &CandidateConfiguration,
    ) -> CalcResult<PrestressLossDetails> {
        let aps = config.strands.permanent_area_in2();
        if aps <= 0.0 {
            return Ok(PrestressLossDetails {
                elastic_shortening_ksi: 0.0,
                long_term_ksi: 0.0,
                total_ksi: 0.0,
                fpe_ksi: 0.0,
                effective_force_kip: 0.0,
            });
        }
        if config.fci_ksi <= 0.0 {
            return Err(CalcError::invalid_input(
                "fci_ksi",
                config.fci_ksi.to_string(),
                "release strength must be positive",
            ));
        }
        let props = model.section_properties(poi, AnalysisStage::NonComposite);
        if props.area_in2 <= 0.0 || props.ix_in4 <= 0.0 {
            return Err(CalcError::numeric_degeneracy("prestress losses", "section has no area"));
        }
        let eci = config
            .ec_ksi
            .map(|ec| ec * (config.fci_ksi / config.fc_ksi).sqrt())
            .unwrap_or_else(|| model.girder_modulus_for_strength_ksi(poi.segment, config.fci_ksi));
        let fpj = config.strands.fpj_ksi;
        let pi = aps * fpj;
        let e = config.strands.depth_to_centroid_in - props.yt_in;

        // Girder self-weight moment on the segment length (kip-in)
        let length = model.segment_length_ft(poi.segment);
        let x = poi.distance_from_start_ft.clamp(0.0, length);
        let wg = props.area_in2 / 144.0 * model.girder_density_kcf(poi.segment);
        let mg = wg * x * (length - x) / 2.0 * 12.0;

        let fcgp = pi / props.area_in2 + pi * e * e / props.ix_in4 - mg * e / props.ix_in4;
        let es = self.strand_modulus_ksi / eci * fcgp.max(0.0);

        let h = model.environment().relative_humidity_pct;
        let gamma_h = 1.7 - 0.01 * h;
        let gamma_st = 5.0 / (1.0 + config.fci_ksi);
        let lt = 10.0 * fpj * aps / props.area_in2 * gamma_h * gamma_st + 12.0 * gamma_h * gamma_st + 2.5;

        let total = es + lt;
        let fpe = (fpj - total).max(0.0);
        Ok(PrestressLossDetails {
            elastic_shortening_ksi: es,
            long_term_ksi: lt,
            total_ksi: total,
            fpe_ksi: fpe,
            effective_force_kip: fpe * aps * self.transfer_fraction(model, poi),
        })
    }

    fn fpc(
        &self,
        model: &dyn BridgeServices,
        poi: &PointOfInterest,
        config: &CandidateConfiguration,
        losses: &PrestressLossDetails,
    ) -> CalcResult<FpcDetails> {
        let nc = model.section_properties(poi, AnalysisStage::NonComposite);
        let composite = model.section_properties(poi, AnalysisStage::Composite);
        if nc.area_in2 <= 0.0 || nc.ix_in4 <= 0.0 {
            return Err(CalcError::numeric_degeneracy("fpc", "section has no area"));
        }
        let p = losses.effective_force_kip;
        let e = config.strands.depth_to_centroid_in - nc.yt_in;
        // Composite centroid sits above the girder centroid by this much
        let rise = nc.yt_in - (composite.yt_in - model.deck_thickness_in());
        Ok(FpcDetails {
            effective_force_kip: p,
            eccentricity_in: e,
            fpc_ksi: p / nc.area_in2 - p * e * rise / nc.ix_in4,
        })
    }

    fn shear_capacity(
        &self,
        model: &dyn BridgeServices,
        _limit_state: LimitState,
        poi: &PointOfInterest,
        config: &CandidateConfiguration,
        demand: Demand,
        fpc: &FpcDetails,
    ) -> CalcResult<ShearCapacityDetails> {
        let props = model.section_properties(poi, AnalysisStage::Composite);
        let flexure = self.positive_flexure(model, poi, AnalysisStage::Composite, config)?;
        let de = flexure.dp_in;
        let dv = (de - flexure.a_in / 2.0).max(0.9 * de).max(0.72 * props.height_in);
        let bv = props.web_width_in;
        let fc = config.fc_ksi;
        if dv <= 0.0 || bv <= 0.0 || fc <= 0.0 {
            return Err(CalcError::numeric_degeneracy(
                "shear resistance",
                format!("dv = {:.3} in, bv = {:.3} in, f'c = {:.3} ksi", dv, bv, fc),
            ));
        }

        let vp = 0.0;
        let vu = demand.vu_kip.abs();
        // Mu not less than (Vu - Vp)·dv
        let mu = (demand.mu_kip_ft.abs() * 12.0).max((vu - vp) * dv);
        let stress = (vu - PHI_SHEAR * vp) / (PHI_SHEAR * bv * dv);
        let shear_in_range = stress / fc < 0.25;

        let sqrt_fc = fc.sqrt();
        let (theta_deg, vc) = match model.specification().shear_capacity_method {
            ShearCapacityMethod::General => {
                let aps = config.strands.permanent_area_in2();
                let fpo = 0.7 * config.strands.fpu_ksi;
                let denominator = self.strand_modulus_ksi * aps;
                let es = if denominator > 0.0 {
                    (mu / dv + (vu - vp) - aps * fpo) / denominator
                } else {
                    0.006
                };
                let es = es.clamp(-0.0004, 0.006);
                let beta = 4.8 / (1.0 + 750.0 * es);
                (29.0 + 3500.0 * es, 0.0316 * beta * sqrt_fc * bv * dv)
            }
            ShearCapacityMethod::VciVcw => {
                let cot = (1.0 + 3.0 * fpc.fpc_ksi / sqrt_fc).min(1.8);
                let theta = (1.0 / cot).atan().to_degrees();
                (theta, (0.06 * sqrt_fc + 0.30 * fpc.fpc_ksi) * bv * dv)
            }
        };

        let stirrups = &config.stirrups;
        let cot_theta = 1.0 / theta_deg.to_radians().tan();
        let vs = if stirrups.spacing_in > 0.0 {
            stirrups.bar_area_in2 * stirrups.fy_ksi * dv * cot_theta / stirrups.spacing_in
        } else {
            0.0
        };
        let vn = (vc + vs + vp).min(0.25 * fc * bv * dv + vp);
        Ok(ShearCapacityDetails {
            dv_in: dv,
            theta_deg,
            shear_in_range,
            vu_kip: vu,
            mu_kip_ft: mu / 12.0,
            vc_kip: vc,
            vs_kip: vs,
            vp_kip: vp,
            vn_kip: vn,
            phi: PHI_SHEAR,
            phi_vn_kip: PHI_SHEAR * vn,
        })
    }

    fn principal_web_stress(
        &self,
        model: &dyn BridgeServices,
        poi: &PointOfInterest,
        config: &CandidateConfiguration,
        demand: Demand,
        fpc: &FpcDetails,
    ) -> CalcResult<PrincipalWebStressDetails> {
        let props = model.section_properties(poi, AnalysisStage::Composite);
        if props.ix_in4 <= 0.0 || props.web_width_in <= 0.0 {
            return Err(CalcError::numeric_degeneracy("principal web stress", "section has no web"));
        }
        let q = model.first_moment_of_area_in3(poi, AnalysisStage::Composite, props.yt_in);
        let tau = demand.vu_kip.abs() * q / (props.ix_in4 * props.web_width_in);
        let sigma = fpc.fpc_ksi;
        // Compression positive
        let tension = ((sigma / 2.0).powi(2) + tau * tau).sqrt() - sigma / 2.0;
        Ok(PrincipalWebStressDetails {
            axial_stress_ksi: sigma,
            shear_stress_ksi: tau,
            principal_tension_ksi: tension,
            limit_ksi: 0.110 * config.fc_ksi.max(0.0).sqrt(),
        })
    }

    fn haunch(
        &self,
        model: &dyn BridgeServices,
        segment: SegmentKey,
        config: &CandidateConfiguration,
    ) -> CalcResult<HaunchDetails> {
        let length_in = model.segment_length_ft(segment) * 12.0;
        let mid = PointOfInterest::synthetic(segment, length_in / 24.0);
        let props = model.section_properties(&mid, AnalysisStage::NonComposite);
        let eci = model.girder_modulus_for_strength_ksi(segment, config.fci_ksi);
        if props.ix_in4 <= 0.0 || eci <= 0.0 {
            return Err(CalcError::numeric_degeneracy("haunch", "girder has no stiffness"));
        }
        let p = config.strands.permanent_area_in2() * config.strands.fpj_ksi;
        let e = config.strands.depth_to_centroid_in - props.yt_in;
        let w = props.area_in2 / 144.0 * model.girder_density_kcf(segment) / 12.0;
        let ei = eci * props.ix_in4;
        // Upward camber from prestress less self-weight deflection
        let camber = p * e * length_in.powi(2) / (8.0 * ei) - 5.0 * w * length_in.powi(4) / (384.0 * ei);
        Ok(HaunchDetails {
            provided_slab_offset_in: config.slab_offset_in,
            required_slab_offset_in: model.deck_thickness_in() + self.fillet_in + camber.max(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use crate::providers::{GeometryProvider, SectionProvider};
    use crate::keys::poi_attr;

    fn midspan(model: &BridgeModel, segment: SegmentKey) -> PointOfInterest {
        model
            .segment_pois(segment)
            .into_iter()
            .find(|p| p.has_attribute(poi_attr::MIDSPAN))
            .unwrap()
    }

    #[test]
    fn test_beta1_limits() {
        assert!((beta1(4.0) - 0.85).abs() < 1e-12);
        assert!((beta1(6.0) - 0.75).abs() < 1e-12);
        assert!((beta1(10.0) - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_composite_flexure_exceeds_girder_alone() {
        let model = fixtures::four_girder_bridge();
        let engine = SimpleCapacityEngine::for_model(&model);
        let segment = SegmentKey::new(0, 1, 0);
        let poi = midspan(&model, segment);
        let config = model.built_configuration(segment);
        let nc = engine
            .moment_capacity(&model, &poi, AnalysisStage::NonComposite, true, &config)
            .unwrap();
        let c = engine
            .moment_capacity(&model, &poi, AnalysisStage::Composite, true, &config)
            .unwrap();
        assert!(c.mn_kip_ft > nc.mn_kip_ft);
        assert!(c.fps_ksi < config.strands.fpu_ksi);
        assert!(c.a_in < model.deck_thickness_in());
    }

    #[test]
    fn test_losses_are_reasonable() {
        let model = fixtures::four_girder_bridge();
        let engine = SimpleCapacityEngine::default();
        let segment = SegmentKey::new(0, 1, 0);
        let config = model.built_configuration(segment);
        let losses = engine.prestress_losses(&model, &midspan(&model, segment), &config).unwrap();
        assert!(losses.total_ksi > 20.0 && losses.total_ksi < 80.0, "{:?}", losses);
        assert!((losses.total_ksi - losses.elastic_shortening_ksi - losses.long_term_ksi).abs() < 1e-9);

        // No force at the girder end
        let end = PointOfInterest::synthetic(segment, 0.0);
        let at_end = engine.prestress_losses(&model, &end, &config).unwrap();
        assert_eq!(at_end.effective_force_kip, 0.0);
    }

    #[test]
    fn test_shear_general_procedure() {
        let model = fixtures::four_girder_bridge();
        let engine = SimpleCapacityEngine::default();
        let segment = SegmentKey::new(0, 1, 0);
        let poi = PointOfInterest::synthetic(segment, 6.0);
        let config = model.built_configuration(segment);
        let losses = engine.prestress_losses(&model, &poi, &config).unwrap();
        let fpc = engine.fpc(&model, &poi, &config, &losses).unwrap();
        let demand = Demand {
            mu_kip_ft: 900.0,
            vu_kip: 250.0,
        };
        let shear = engine
            .shear_capacity(&model, LimitState::StrengthI, &poi, &config, demand, &fpc)
            .unwrap();
        assert!(shear.dv_in >= 0.72 * (54.0 + 8.0) - 1e-9);
        assert!(shear.theta_deg >= 29.0 - 3500.0 * 0.0004 - 1e-9);
        assert!(shear.shear_in_range);
        assert!((shear.phi_vn_kip - 0.9 * shear.vn_kip).abs() < 1e-9);
    }

    #[test]
    fn test_vci_vcw_cot_theta_capped() {
        let mut model = fixtures::four_girder_bridge();
        model.specification.shear_capacity_method = ShearCapacityMethod::VciVcw;
        let engine = SimpleCapacityEngine::default();
        let segment = SegmentKey::new(0, 1, 0);
        let poi = PointOfInterest::synthetic(segment, 10.0);
        let config = model.built_configuration(segment);
        let fpc = FpcDetails {
            effective_force_kip: 1000.0,
            eccentricity_in: 20.0,
            fpc_ksi: 2.0,
        };
        let shear = engine
            .shear_capacity(
                &model,
                LimitState::StrengthI,
                &poi,
                &config,
                Demand {
                    mu_kip_ft: 100.0,
                    vu_kip: 100.0,
                },
                &fpc,
            )
            .unwrap();
        let cot = 1.0 / shear.theta_deg.to_radians().tan();
        assert!((cot - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_haunch_requirement_includes_deck() {
        let model = fixtures::four_girder_bridge();
        let engine = SimpleCapacityEngine::for_model(&model);
        let segment = SegmentKey::new(0, 1, 0);
        let haunch = engine.haunch(&model, segment, &model.built_configuration(segment)).unwrap();
        assert!(haunch.required_slab_offset_in >= 8.0 + 0.75);
    }
}
