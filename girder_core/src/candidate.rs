//! # Candidate Configurations
//!
//! A candidate configuration is a girder definition that exists only inside
//! a design iteration: strand layout, concrete strength and slab offset that
//! the designer is trying before committing anything to the bridge model.
//!
//! ## Precondition of the design-iteration API
//!
//! Exactly one candidate may be in flight at a time. The analysis context
//! keeps a single temporary slot; asking for a result under a candidate that
//! is not flexurally equal to the one in the slot discards every temporary
//! result first. Alternating between two candidates is legal but recomputes
//! on every switch.

use serde::{Deserialize, Serialize};

use crate::keys::SegmentKey;

/// Prestressing strand layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandLayout {
    pub straight_count: u32,
    pub harped_count: u32,
    pub temporary_count: u32,
    /// Area of one strand (in²)
    pub strand_area_in2: f64,
    /// Ultimate strength (ksi)
    pub fpu_ksi: f64,
    /// Jacking stress (ksi)
    pub fpj_ksi: f64,
    /// Distance from the girder top to the permanent strand centroid at midspan (in)
    pub depth_to_centroid_in: f64,
    /// Debonded strand count per girder end
    pub debonded_count: u32,
}

impl StrandLayout {
    pub fn permanent_count(&self) -> u32 {
        self.straight_count + self.harped_count
    }

    pub fn permanent_area_in2(&self) -> f64 {
        self.permanent_count() as f64 * self.strand_area_in2
    }
}

/// Transverse reinforcement, which does not affect flexural results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirrupLayout {
    pub bar_area_in2: f64,
    pub spacing_in: f64,
    pub fy_ksi: f64,
}

/// A hypothetical girder definition used during design iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateConfiguration {
    pub segment: SegmentKey,
    pub strands: StrandLayout,
    /// Final concrete strength (ksi)
    pub fc_ksi: f64,
    /// Release strength (ksi)
    pub fci_ksi: f64,
    /// User modulus override (ksi)
    pub ec_ksi: Option<f64>,
    /// Slab offset at the bearings (in)
    pub slab_offset_in: f64,
    pub stirrups: StirrupLayout,
}

impl CandidateConfiguration {
    /// Equality over the fields that change flexural results.
    ///
    /// Release strength and stirrups are excluded. Changing only those keeps
    /// the moment capacities already computed for the candidate.
    pub fn is_flexurally_equal(&self, other: &CandidateConfiguration) -> bool {
        self.segment == other.segment
            && self.strands == other.strands
            && self.fc_ksi == other.fc_ksi
            && self.ec_ksi == other.ec_ksi
            && self.slab_offset_in == other.slab_offset_in
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn candidate() -> CandidateConfiguration {
        CandidateConfiguration {
            segment: SegmentKey::new(0, 1, 0),
            strands: StrandLayout {
                straight_count: 30,
                harped_count: 8,
                temporary_count: 0,
                strand_area_in2: 0.217,
                fpu_ksi: 270.0,
                fpj_ksi: 202.5,
                depth_to_centroid_in: 66.0,
                debonded_count: 4,
            },
            fc_ksi: 8.0,
            fci_ksi: 6.0,
            ec_ksi: None,
            slab_offset_in: 9.0,
            stirrups: StirrupLayout {
                bar_area_in2: 0.40,
                spacing_in: 12.0,
                fy_ksi: 60.0,
            },
        }
    }

    #[test]
    fn test_stirrups_are_not_flexural() {
        let a = candidate();
        let mut b = candidate();
        b.stirrups.spacing_in = 6.0;
        b.fci_ksi = 6.5;
        assert!(a.is_flexurally_equal(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_strands_are_flexural() {
        let a = candidate();
        let mut b = candidate();
        b.strands.harped_count = 10;
        assert!(!a.is_flexurally_equal(&b));

        let mut c = candidate();
        c.fc_ksi = 9.0;
        assert!(!a.is_flexurally_equal(&c));
    }

    #[test]
    fn test_permanent_area() {
        let c = candidate();
        assert!((c.strands.permanent_area_in2() - 38.0 * 0.217).abs() < 1e-9);
    }
}
