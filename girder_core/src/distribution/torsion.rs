//! # St. Venant Torsional Constant
//!
//! The adjacent-beam equations need J. Thin-walled closed sections use the
//! Bredt formula; everything else uses the solid-section approximation of
//! AASHTO C4.6.2.2.1. The choice is a strategy so a family can supply a
//! better estimate without touching the engine.

use crate::errors::{CalcError, CalcResult};
use crate::providers::{ClosedCell, SectionProperties};

/// Computes J for a girder cross section
pub trait TorsionalConstantStrategy {
    fn name(&self) -> &'static str;

    fn torsional_constant_in4(&self, props: &SectionProperties) -> CalcResult<f64>;
}

/// Thin-walled closed cell: J = 4·Ao² / Σ(s/t)
#[derive(Debug, Clone, Copy)]
pub struct ClosedCellTorsion {
    pub cell: ClosedCell,
}

impl TorsionalConstantStrategy for ClosedCellTorsion {
    fn name(&self) -> &'static str {
        "J = 4Ao²/Σ(s/t)"
    }

    fn torsional_constant_in4(&self, _props: &SectionProperties) -> CalcResult<f64> {
        if self.cell.sum_length_over_thickness <= 0.0 {
            return Err(CalcError::invalid_input(
                "sum_length_over_thickness",
                self.cell.sum_length_over_thickness.to_string(),
                "must be positive",
            ));
        }
        Ok(4.0 * self.cell.enclosed_area_in2.powi(2) / self.cell.sum_length_over_thickness)
    }
}

/// Solid or open section: J ≈ A⁴ / (40·Ip)
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidSectionTorsion;

impl TorsionalConstantStrategy for SolidSectionTorsion {
    fn name(&self) -> &'static str {
        "J = A⁴/40Ip"
    }

    fn torsional_constant_in4(&self, props: &SectionProperties) -> CalcResult<f64> {
        let ip = props.polar_moment_in4();
        if ip <= 0.0 {
            return Err(CalcError::numeric_degeneracy(
                "torsional constant",
                "polar moment of inertia is zero",
            ));
        }
        Ok(props.area_in2.powi(4) / (40.0 * ip))
    }
}

/// Strategy for a section: Bredt when a closed cell is known
pub fn strategy_for(cell: Option<ClosedCell>) -> Box<dyn TorsionalConstantStrategy> {
    match cell {
        Some(cell) => Box::new(ClosedCellTorsion { cell }),
        None => Box::new(SolidSectionTorsion),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> SectionProperties {
        SectionProperties {
            area_in2: 100.0,
            ix_in4: 1000.0,
            iy_in4: 1000.0,
            yt_in: 5.0,
            yb_in: 5.0,
            height_in: 10.0,
            web_width_in: 10.0,
        }
    }

    #[test]
    fn test_solid_approximation() {
        // 10 × 10 square: A⁴/40Ip = 1e8 / 80000 = 1250 (exact 1406)
        let j = SolidSectionTorsion.torsional_constant_in4(&props()).unwrap();
        assert!((j - 1250.0).abs() < 1e-9);
    }

    #[test]
    fn test_closed_cell() {
        let cell = ClosedCell {
            enclosed_area_in2: 1000.0,
            sum_length_over_thickness: 40.0,
        };
        let strategy = strategy_for(Some(cell));
        let j = strategy.torsional_constant_in4(&props()).unwrap();
        assert!((j - 100_000.0).abs() < 1e-9);
        assert_eq!(strategy.name(), "J = 4Ao²/Σ(s/t)");
    }

    #[test]
    fn test_degenerate_cell_rejected() {
        let cell = ClosedCell {
            enclosed_area_in2: 1000.0,
            sum_length_over_thickness: 0.0,
        };
        assert!(strategy_for(Some(cell)).torsional_constant_in4(&props()).is_err());
    }
}
