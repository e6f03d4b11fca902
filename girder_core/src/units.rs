//! # Angle Units
//!
//! Struct fields keep the unit-suffix naming convention (`span_length_ft`,
//! `deck_thickness_in`, `skew_deg`). Angles are the exception: skew enters
//! the distribution factor equations through `tan θ`, and a skew corrected
//! with radians where degrees were meant is a silent error. The wrappers
//! below keep that conversion in one place.
//!
//! ```rust
//! use girder_core::units::Degrees;
//!
//! let skew = Degrees(45.0);
//! assert!((skew.tan() - 1.0).abs() < 1e-12);
//! assert_eq!(Degrees(-70.0).capped(Degrees(60.0)), Degrees(60.0));
//! ```

use serde::{Deserialize, Serialize};

/// Plan angle in degrees (skew, curvature, girder bearing)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Radians(pub f64);

impl From<Degrees> for Radians {
    fn from(deg: Degrees) -> Self {
        Radians(deg.0.to_radians())
    }
}

impl From<Radians> for Degrees {
    fn from(rad: Radians) -> Self {
        Degrees(rad.0.to_degrees())
    }
}

impl Degrees {
    /// Tangent of the angle
    pub fn tan(self) -> f64 {
        Radians::from(self).0.tan()
    }

    /// Absolute value, for skew angles where only the magnitude matters
    pub fn abs(self) -> Self {
        Degrees(self.0.abs())
    }

    /// Limit the magnitude to `max`
    pub fn capped(self, max: Degrees) -> Self {
        Degrees(self.0.abs().min(max.0))
    }

    /// Get the raw f64 value
    pub fn value(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skew_cap() {
        let skew = Degrees(-70.0).capped(Degrees(60.0));
        assert_eq!(skew.0, 60.0);
        assert!((Degrees(60.0).tan() - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_radian_round_trip() {
        let rad = Radians::from(Degrees(180.0));
        assert!((rad.0 - std::f64::consts::PI).abs() < 1e-12);
        assert!((Degrees::from(rad).0 - 180.0).abs() < 1e-12);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Degrees(12.5)).unwrap();
        assert_eq!(json, "12.5");
    }
}
