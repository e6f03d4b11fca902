//! # Distribution Factor Equations
//!
//! Closed-form AASHTO LRFD live load distribution factor equations. Every
//! function is pure and already includes the multiple presence factor,
//! exactly as tabulated in AASHTO LRFD 4.6.2.2.
//!
//! ## Notation
//!
//! - `S` = Girder spacing (ft)
//! - `L` = Span length (ft)
//! - `ts` = Depth of concrete slab (in)
//! - `Kg` = Longitudinal stiffness parameter, n(I + A·eg²) (in⁴)
//! - `d` = Depth of girder (in)
//! - `b` = Width of beam (in)
//! - `de` = CL exterior web to inside face of curb (ft), positive inboard
//! - `I`, `J` = Moment of inertia and St. Venant torsional constant (in⁴)
//! - `Nb` = Number of beams, `NL` = number of design lanes
//! - `θ` = Skew angle (degrees)
//!
//! ## Table Types
//!
//! | Family                     | Tables                      |
//! |----------------------------|-----------------------------|
//! | Slab-on-girder             | a, e, k; i, j if connected  |
//! | Spread box                 | b, c                        |
//! | Adjacent box, connected    | f, g                        |
//! | Adjacent, minimally tied   | g, i, j (S/D)               |
//!
//! ## References
//!
//! - AASHTO LRFD Bridge Design Specifications, Tables 4.6.2.2.2b-1 through
//!   4.6.2.2.3c-1

use crate::units::Degrees;

/// Skew angles above this are capped for the moment reduction
pub const MAX_MOMENT_SKEW_DEG: f64 = 60.0;

/// Below this skew the slab-on-girder moment reduction is not applied
pub const MIN_MOMENT_SKEW_DEG: f64 = 30.0;

// =============================================================================
// LANES AND MULTIPLE PRESENCE
// =============================================================================

/// Multiple presence factor for `lanes` loaded lanes (AASHTO 3.6.1.1.2)
///
/// | Lanes | m    |
/// |-------|------|
/// | 1     | 1.20 |
/// | 2     | 1.00 |
/// | 3     | 0.85 |
/// | >3    | 0.65 |
#[inline]
pub fn multiple_presence_factor(lanes: usize) -> f64 {
    match lanes {
        0 | 1 => 1.2,
        2 => 1.0,
        3 => 0.85,
        _ => 0.65,
    }
}

/// Number of design lanes for a curb-to-curb width (AASHTO 3.6.1.1.1)
///
/// NL = floor(w/12). Roadways from 20 to 24 ft carry two lanes, each half
/// the roadway width. Narrower roadways carry one lane.
#[inline]
pub fn design_lane_count(curb_to_curb_ft: f64) -> usize {
    if curb_to_curb_ft < 20.0 {
        1
    } else if curb_to_curb_ft <= 24.0 {
        2
    } else {
        (curb_to_curb_ft / 12.0).floor() as usize
    }
}

/// Width of one design lane
#[inline]
pub fn design_lane_width_ft(curb_to_curb_ft: f64, lanes: usize) -> f64 {
    if lanes == 2 && curb_to_curb_ft <= 24.0 {
        curb_to_curb_ft / 2.0
    } else {
        12.0_f64.min(curb_to_curb_ft)
    }
}

/// Lanes-over-beams floor, m(NL)·NL/Nb
#[inline]
pub fn lanes_over_beams(lanes: usize, beams: usize) -> f64 {
    multiple_presence_factor(lanes) * lanes as f64 / beams as f64
}

// =============================================================================
// STIFFNESS PARAMETERS
// =============================================================================

/// Distance between the centers of gravity of girder and deck, eg = Yt + ts/2
#[inline]
pub fn eccentricity_eg(yt_in: f64, ts_in: f64) -> f64 {
    yt_in + ts_in / 2.0
}

/// Longitudinal stiffness parameter Kg = n(I + A·eg²)
#[inline]
pub fn longitudinal_stiffness(modular_ratio: f64, i_in4: f64, area_in2: f64, eg_in: f64) -> f64 {
    modular_ratio * (i_in4 + area_in2 * eg_in * eg_in)
}

/// The recurring stiffness term Kg/(12·L·ts³)
#[inline]
fn stiffness_ratio(kg_in4: f64, l_ft: f64, ts_in: f64) -> f64 {
    kg_in4 / (12.0 * l_ft * ts_in.powi(3))
}

// =============================================================================
// SLAB-ON-GIRDER (TYPES a, e, k)
// =============================================================================

/// Interior moment, one lane
///
/// ```text
/// mg = 0.06 + (S/14)^0.4 · (S/L)^0.3 · (Kg/12Lts³)^0.1
/// ```
#[inline]
pub fn slab_on_girder_moment_one_lane(s_ft: f64, l_ft: f64, kg_in4: f64, ts_in: f64) -> f64 {
    0.06 + (s_ft / 14.0).powf(0.4) * (s_ft / l_ft).powf(0.3) * stiffness_ratio(kg_in4, l_ft, ts_in).powf(0.1)
}

/// Interior moment, two or more lanes
///
/// ```text
/// mg = 0.075 + (S/9.5)^0.6 · (S/L)^0.2 · (Kg/12Lts³)^0.1
/// ```
#[inline]
pub fn slab_on_girder_moment_multi_lane(s_ft: f64, l_ft: f64, kg_in4: f64, ts_in: f64) -> f64 {
    0.075 + (s_ft / 9.5).powf(0.6) * (s_ft / l_ft).powf(0.2) * stiffness_ratio(kg_in4, l_ft, ts_in).powf(0.1)
}

/// Interior shear, one lane: mg = 0.36 + S/25
#[inline]
pub fn slab_on_girder_shear_one_lane(s_ft: f64) -> f64 {
    0.36 + s_ft / 25.0
}

/// Interior shear, two or more lanes: mg = 0.2 + S/12 - (S/35)²
#[inline]
pub fn slab_on_girder_shear_multi_lane(s_ft: f64) -> f64 {
    0.2 + s_ft / 12.0 - (s_ft / 35.0).powi(2)
}

/// Exterior moment correction, two or more lanes: e = 0.77 + de/9.1
#[inline]
pub fn slab_on_girder_exterior_moment_e(de_ft: f64) -> f64 {
    0.77 + de_ft / 9.1
}

/// Exterior shear correction, two or more lanes: e = 0.6 + de/10
#[inline]
pub fn slab_on_girder_exterior_shear_e(de_ft: f64) -> f64 {
    0.6 + de_ft / 10.0
}

/// Moment reduction for skewed supports
///
/// ```text
/// r  = 1 - c1·(tan θ)^1.5
/// c1 = 0.25 · (Kg/12Lts³)^0.25 · (S/L)^0.5     (c1 = 0 for θ < 30°)
/// ```
///
/// θ is capped at 60°.
#[inline]
pub fn slab_on_girder_moment_skew(skew: Degrees, s_ft: f64, l_ft: f64, kg_in4: f64, ts_in: f64) -> f64 {
    let skew = skew.abs();
    if skew.0 < MIN_MOMENT_SKEW_DEG {
        return 1.0;
    }
    let c1 = 0.25 * stiffness_ratio(kg_in4, l_ft, ts_in).powf(0.25) * (s_ft / l_ft).sqrt();
    1.0 - c1 * skew.capped(Degrees(MAX_MOMENT_SKEW_DEG)).tan().powf(1.5)
}

/// Shear correction at the obtuse corner
///
/// ```text
/// r = 1 + 0.2 · (12Lts³/Kg)^0.3 · tan θ
/// ```
#[inline]
pub fn slab_on_girder_shear_skew(skew: Degrees, l_ft: f64, kg_in4: f64, ts_in: f64) -> f64 {
    1.0 + 0.2 * (1.0 / stiffness_ratio(kg_in4, l_ft, ts_in)).powf(0.3) * skew.abs().tan()
}

// =============================================================================
// SPREAD BOX BEAMS (TYPES b, c)
// =============================================================================

/// Interior moment, one lane: mg = (S/3)^0.35 · (Sd/12L²)^0.25
#[inline]
pub fn spread_box_moment_one_lane(s_ft: f64, d_in: f64, l_ft: f64) -> f64 {
    (s_ft / 3.0).powf(0.35) * (s_ft * d_in / (12.0 * l_ft * l_ft)).powf(0.25)
}

/// Interior moment, two or more lanes: mg = (S/6.3)^0.6 · (Sd/12L²)^0.125
#[inline]
pub fn spread_box_moment_multi_lane(s_ft: f64, d_in: f64, l_ft: f64) -> f64 {
    (s_ft / 6.3).powf(0.6) * (s_ft * d_in / (12.0 * l_ft * l_ft)).powf(0.125)
}

/// Interior shear, one lane: mg = (S/10)^0.6 · (d/12L)^0.1
#[inline]
pub fn spread_box_shear_one_lane(s_ft: f64, d_in: f64, l_ft: f64) -> f64 {
    (s_ft / 10.0).powf(0.6) * (d_in / (12.0 * l_ft)).powf(0.1)
}

/// Interior shear, two or more lanes: mg = (S/7.4)^0.8 · (d/12L)^0.1
#[inline]
pub fn spread_box_shear_multi_lane(s_ft: f64, d_in: f64, l_ft: f64) -> f64 {
    (s_ft / 7.4).powf(0.8) * (d_in / (12.0 * l_ft)).powf(0.1)
}

/// Exterior moment correction, two or more lanes: e = 0.97 + de/28.5
#[inline]
pub fn spread_box_exterior_moment_e(de_ft: f64) -> f64 {
    0.97 + de_ft / 28.5
}

/// Exterior shear correction, two or more lanes: e = 0.8 + de/10
#[inline]
pub fn spread_box_exterior_shear_e(de_ft: f64) -> f64 {
    0.8 + de_ft / 10.0
}

/// Shear correction at the obtuse corner
///
/// ```text
/// r = 1 + (√(Ld/12) / 6S) · tan θ
/// ```
#[inline]
pub fn spread_box_shear_skew(skew: Degrees, l_ft: f64, d_in: f64, s_ft: f64) -> f64 {
    1.0 + (l_ft * d_in / 12.0).sqrt() / (6.0 * s_ft) * skew.abs().tan()
}

// =============================================================================
// BOX BEAMS (SHARED SKEW)
// =============================================================================

/// Moment reduction for box sections: r = 1.05 - 0.25·tan θ ≤ 1.0
#[inline]
pub fn box_moment_skew(skew: Degrees) -> f64 {
    (1.05 - 0.25 * skew.abs().capped(Degrees(MAX_MOMENT_SKEW_DEG)).tan()).min(1.0)
}

// =============================================================================
// ADJACENT BOX BEAMS CONNECTED AS A UNIT (TYPE f)
// =============================================================================

/// k = 2.5·Nb^-0.2 ≥ 1.5
#[inline]
pub fn adjacent_box_k(beams: usize) -> f64 {
    (2.5 * (beams as f64).powf(-0.2)).max(1.5)
}

/// Interior moment, one lane: mg = k · (b/33.3L)^0.5 · (I/J)^0.25
#[inline]
pub fn adjacent_box_moment_one_lane(k: f64, b_in: f64, l_ft: f64, i_in4: f64, j_in4: f64) -> f64 {
    k * (b_in / (33.3 * l_ft)).sqrt() * (i_in4 / j_in4).powf(0.25)
}

/// Interior moment, two or more lanes: mg = k · (b/305)^0.6 · (b/12L)^0.2 · (I/J)^0.06
#[inline]
pub fn adjacent_box_moment_multi_lane(k: f64, b_in: f64, l_ft: f64, i_in4: f64, j_in4: f64) -> f64 {
    k * (b_in / 305.0).powf(0.6) * (b_in / (12.0 * l_ft)).powf(0.2) * (i_in4 / j_in4).powf(0.06)
}

/// Interior shear, one lane: mg = (b/130L)^0.15 · (I/J)^0.05
#[inline]
pub fn adjacent_box_shear_one_lane(b_in: f64, l_ft: f64, i_in4: f64, j_in4: f64) -> f64 {
    (b_in / (130.0 * l_ft)).powf(0.15) * (i_in4 / j_in4).powf(0.05)
}

/// Interior shear, two or more lanes
///
/// ```text
/// mg = (b/156)^0.4 · (b/12L)^0.1 · (I/J)^0.05 · (b/48)     with b/48 ≥ 1.0
/// ```
#[inline]
pub fn adjacent_box_shear_multi_lane(b_in: f64, l_ft: f64, i_in4: f64, j_in4: f64) -> f64 {
    (b_in / 156.0).powf(0.4) * (b_in / (12.0 * l_ft)).powf(0.1) * (i_in4 / j_in4).powf(0.05) * (b_in / 48.0).max(1.0)
}

/// Exterior moment correction, one lane: e = 1.125 + de/30 ≥ 1.0
#[inline]
pub fn adjacent_box_exterior_moment_e_one_lane(de_ft: f64) -> f64 {
    (1.125 + de_ft / 30.0).max(1.0)
}

/// Exterior moment correction, two or more lanes: e = 1.04 + de/25 ≥ 1.0
#[inline]
pub fn adjacent_box_exterior_moment_e_multi_lane(de_ft: f64) -> f64 {
    (1.04 + de_ft / 25.0).max(1.0)
}

/// Exterior shear correction, one lane: e = 1.25 + de/20 ≥ 1.0
#[inline]
pub fn adjacent_box_exterior_shear_e_one_lane(de_ft: f64) -> f64 {
    (1.25 + de_ft / 20.0).max(1.0)
}

/// Exterior shear correction, two or more lanes
///
/// ```text
/// e = 1 + ((de + b/12 - 2)/40)^0.5 ≥ 1.0
/// ```
#[inline]
pub fn adjacent_box_exterior_shear_e_multi_lane(de_ft: f64, b_in: f64) -> f64 {
    let term = ((de_ft + b_in / 12.0 - 2.0) / 40.0).max(0.0);
    (1.0 + term.sqrt()).max(1.0)
}

/// Width factor applied to the exterior two-lane shear, 48/b ≤ 1.0
#[inline]
pub fn adjacent_box_exterior_shear_width_factor(b_in: f64) -> f64 {
    (48.0 / b_in).min(1.0)
}

/// Shear correction at the obtuse corner: r = 1 + (12L/90d)·√(tan θ)
#[inline]
pub fn adjacent_box_shear_skew(skew: Degrees, l_ft: f64, d_in: f64) -> f64 {
    1.0 + 12.0 * l_ft / (90.0 * d_in) * skew.abs().tan().sqrt()
}

// =============================================================================
// S/D METHOD (TYPES g, i, j NOT CONNECTED AS A UNIT)
// =============================================================================

/// K = √((1 + μ)·I/J) with μ = 0.2
#[inline]
pub fn s_over_d_k(i_in4: f64, j_in4: f64) -> f64 {
    (1.2 * i_in4 / j_in4).sqrt()
}

/// C = K·(W/L) ≤ K
#[inline]
pub fn s_over_d_c(k: f64, width_ft: f64, l_ft: f64) -> f64 {
    (k * width_ft / l_ft).min(k)
}

/// D = 11.5 - NL + 1.4·NL·(1 - 0.2C)²   for C ≤ 5
/// D = 11.5 - NL                        for C > 5
#[inline]
pub fn s_over_d_d(c: f64, lanes: usize) -> f64 {
    let nl = lanes as f64;
    if c <= 5.0 {
        11.5 - nl + 1.4 * nl * (1.0 - 0.2 * c).powi(2)
    } else {
        11.5 - nl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_multiple_presence() {
        assert_eq!(multiple_presence_factor(1), 1.2);
        assert_eq!(multiple_presence_factor(2), 1.0);
        assert_eq!(multiple_presence_factor(3), 0.85);
        assert_eq!(multiple_presence_factor(4), 0.65);
        assert_eq!(multiple_presence_factor(7), 0.65);
    }

    #[test]
    fn test_design_lanes() {
        assert_eq!(design_lane_count(18.0), 1);
        assert_eq!(design_lane_count(20.0), 2);
        assert_eq!(design_lane_count(24.0), 2);
        assert_eq!(design_lane_count(35.99), 2);
        assert_eq!(design_lane_count(36.0), 3);
        assert_eq!(design_lane_width_ft(22.0, 2), 11.0);
        assert_eq!(design_lane_width_ft(40.0, 3), 12.0);
    }

    #[test]
    fn test_slab_on_girder_interior_moment() {
        // S = 8 ft, L = 100 ft, ts = 8 in, Kg = 1,000,000 in⁴
        let stiffness: f64 = 1.0e6 / (12.0 * 100.0 * 512.0);
        let expected = 0.075 + (8.0_f64 / 9.5).powf(0.6) * 0.08_f64.powf(0.2) * stiffness.powf(0.1);
        let mg = slab_on_girder_moment_multi_lane(8.0, 100.0, 1.0e6, 8.0);
        assert!((mg - expected).abs() < TOL);
        assert!(mg > 0.5 && mg < 0.8);
    }

    #[test]
    fn test_slab_on_girder_shear() {
        assert!((slab_on_girder_shear_one_lane(8.0) - 0.68).abs() < TOL);
        let expected = 0.2 + 8.0 / 12.0 - (8.0_f64 / 35.0).powi(2);
        assert!((slab_on_girder_shear_multi_lane(8.0) - expected).abs() < TOL);
    }

    #[test]
    fn test_moment_skew_thresholds() {
        assert_eq!(slab_on_girder_moment_skew(Degrees(20.0), 8.0, 100.0, 1.0e6, 8.0), 1.0);
        let at_60 = slab_on_girder_moment_skew(Degrees(60.0), 8.0, 100.0, 1.0e6, 8.0);
        let at_70 = slab_on_girder_moment_skew(Degrees(70.0), 8.0, 100.0, 1.0e6, 8.0);
        assert!(at_60 < 1.0);
        assert!((at_60 - at_70).abs() < TOL);
        // Sign of the skew does not matter
        let negative = slab_on_girder_moment_skew(Degrees(-45.0), 8.0, 100.0, 1.0e6, 8.0);
        let positive = slab_on_girder_moment_skew(Degrees(45.0), 8.0, 100.0, 1.0e6, 8.0);
        assert!((negative - positive).abs() < TOL);
    }

    #[test]
    fn test_shear_skew_increases() {
        assert_eq!(slab_on_girder_shear_skew(Degrees(0.0), 100.0, 1.0e6, 8.0), 1.0);
        assert!(slab_on_girder_shear_skew(Degrees(30.0), 100.0, 1.0e6, 8.0) > 1.0);
        assert!(spread_box_shear_skew(Degrees(30.0), 100.0, 48.0, 8.0) > 1.0);
        assert!(adjacent_box_shear_skew(Degrees(30.0), 60.0, 33.0) > 1.0);
    }

    #[test]
    fn test_box_moment_skew_capped_at_one() {
        assert_eq!(box_moment_skew(Degrees(0.0)), 1.0);
        let r = box_moment_skew(Degrees(45.0));
        assert!((r - 0.80).abs() < 1e-9);
    }

    #[test]
    fn test_adjacent_k_floor() {
        assert!((adjacent_box_k(5) - 2.5 * 5.0_f64.powf(-0.2)).abs() < TOL);
        assert_eq!(adjacent_box_k(20), 1.5);
    }

    #[test]
    fn test_adjacent_exterior_e_floors() {
        assert_eq!(adjacent_box_exterior_moment_e_one_lane(-10.0), 1.0);
        assert_eq!(adjacent_box_exterior_moment_e_multi_lane(-10.0), 1.0);
        assert_eq!(adjacent_box_exterior_shear_e_one_lane(-10.0), 1.0);
        assert_eq!(adjacent_box_exterior_shear_e_multi_lane(-10.0, 48.0), 1.0);
        assert_eq!(adjacent_box_exterior_shear_width_factor(36.0), 1.0);
        assert!((adjacent_box_exterior_shear_width_factor(60.0) - 0.8).abs() < TOL);
    }

    #[test]
    fn test_s_over_d() {
        let k = s_over_d_k(10000.0, 12000.0);
        assert!((k - 1.0).abs() < TOL);
        assert_eq!(s_over_d_c(k, 40.0, 20.0), 1.0);
        assert!((s_over_d_c(k, 20.0, 40.0) - 0.5).abs() < TOL);
        // C = 0.5, NL = 2: D = 9.5 + 2.8·0.81
        assert!((s_over_d_d(0.5, 2) - (9.5 + 2.8 * 0.81)).abs() < TOL);
        assert_eq!(s_over_d_d(6.0, 3), 8.5);
    }

    #[test]
    fn test_stiffness_parameter() {
        let eg = eccentricity_eg(29.27, 8.0);
        assert!((eg - 33.27).abs() < TOL);
        let kg = longitudinal_stiffness(1.2, 260_741.0, 789.0, eg);
        assert!((kg - 1.2 * (260_741.0 + 789.0 * 33.27 * 33.27)).abs() < 1e-6);
    }

    #[test]
    fn test_lanes_over_beams() {
        assert!((lanes_over_beams(2, 4) - 0.5).abs() < TOL);
        assert!((lanes_over_beams(1, 4) - 0.3).abs() < TOL);
    }
}
