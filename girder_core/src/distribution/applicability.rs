//! # Range of Applicability and Prerequisites
//!
//! The tabulated equations are only valid inside the parameter ranges they
//! were calibrated for. Strategies report every parameter outside its range
//! as a [`RangeViolation`]; the engine decides what to do with them based on
//! the range-of-applicability action.
//!
//! Independently of the equations, the approximate method as a whole requires
//! a nearly straight span with girders of similar stiffness that are roughly
//! parallel. Those prerequisites are checked once per span.

use serde::{Deserialize, Serialize};

use crate::config::aashto_ref;
use crate::errors::{CalcError, CalcResult};
use crate::keys::{AnalysisStage, PointOfInterest, SegmentKey, SpanKey};
use crate::providers::BridgeServices;

/// Suffix of every prerequisite failure message
pub const REFINED_ANALYSIS_REQUIRED: &str = "A refined method of analysis is required";

/// One parameter outside the range of an equation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeViolation {
    pub parameter: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub reference: String,
}

impl RangeViolation {
    /// The bound that was exceeded
    pub fn limit(&self) -> f64 {
        if self.value < self.min {
            self.min
        } else {
            self.max
        }
    }

    pub fn message(&self) -> String {
        let bound = if self.value < self.min {
            format!("less than {}", self.min)
        } else {
            format!("greater than {}", self.max)
        };
        format!(
            "{} = {:.4} is {}, outside the range of applicability of {}",
            self.parameter, self.value, bound, self.reference
        )
    }

    pub fn to_error(&self) -> CalcError {
        CalcError::validation_failure(self.parameter.clone(), self.value, self.limit(), self.message())
    }
}

/// Collects range violations for one equation set
#[derive(Debug, Default)]
pub struct RangeChecker {
    reference: &'static str,
    violations: Vec<RangeViolation>,
}

impl RangeChecker {
    pub fn new(reference: &'static str) -> Self {
        RangeChecker {
            reference,
            violations: Vec::new(),
        }
    }

    /// Record a violation when `value` is outside `[min, max]`
    pub fn check(&mut self, parameter: &str, value: f64, min: f64, max: f64) -> &mut Self {
        if value < min || value > max {
            self.violations.push(RangeViolation {
                parameter: parameter.to_string(),
                value,
                min,
                max,
                reference: self.reference.to_string(),
            });
        }
        self
    }

    pub fn at_least(&mut self, parameter: &str, value: f64, min: f64) -> &mut Self {
        self.check(parameter, value, min, f64::INFINITY)
    }

    pub fn at_most(&mut self, parameter: &str, value: f64, max: f64) -> &mut Self {
        self.check(parameter, value, f64::NEG_INFINITY, max)
    }

    pub fn finish(&mut self) -> Vec<RangeViolation> {
        std::mem::take(&mut self.violations)
    }
}

// ============================================================================
// Span Prerequisites
// ============================================================================

/// Values computed by the span prerequisite checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrerequisiteReport {
    pub span: usize,
    pub curvature_deg: f64,
    /// `None` when curvature was not checked
    pub curvature_limit_deg: Option<f64>,
    pub stiffness_ratio: f64,
    pub min_stiffness_ratio: f64,
    pub angle_deviation_deg: f64,
    pub max_angle_deviation_deg: f64,
}

/// Maximum central angle for straight-girder analysis (AASHTO 4.6.1.2.1)
pub fn curvature_limit_deg(girder_count: usize, single_span: bool) -> Option<f64> {
    let base = match girder_count {
        0 | 1 => return None,
        2 => 2.0,
        3 | 4 => 3.0,
        _ => 4.0,
    };
    Some(if single_span { base } else { base + 1.0 })
}

/// Curvature, relative stiffness and parallelism checks for a span
///
/// The measured values are always reported. None of the checks fails when
/// the criteria ignore the ranges of applicability.
pub fn check_prerequisites(model: &dyn BridgeServices, span: usize) -> CalcResult<PrerequisiteReport> {
    if span >= model.span_count() {
        return Err(CalcError::invalid_input("span", span.to_string(), "span does not exist"));
    }
    let criteria = model.specification();
    let enforce = !criteria.ignores_range_of_applicability();
    let nb = model.girder_count(span);

    let curvature_deg = model.span_curvature_deg(span).abs();
    let curvature_limit_deg = if criteria.checks_curvature() {
        curvature_limit_deg(nb, model.span_count() == 1)
    } else {
        None
    };
    if let Some(limit) = curvature_limit_deg {
        if curvature_deg >= limit {
            return Err(CalcError::validation_failure(
                "plan curvature",
                curvature_deg,
                limit,
                format!(
                    "Span {}: the central angle of {:.2}° exceeds the {:.1}° limit of {}. {}",
                    span + 1,
                    curvature_deg,
                    limit,
                    aashto_ref::CURVATURE,
                    REFINED_ANALYSIS_REQUIRED
                ),
            ));
        }
    }

    let stiffnesses: Vec<f64> = (0..nb)
        .map(|g| {
            let segment = SegmentKey::new(span, g, 0);
            let mid = model.segment_length_ft(segment) / 2.0;
            let poi = PointOfInterest::synthetic(segment, mid);
            model.section_properties(&poi, AnalysisStage::NonComposite).ix_in4
        })
        .collect();
    let i_min = stiffnesses.iter().copied().fold(f64::INFINITY, f64::min);
    let i_max = stiffnesses.iter().copied().fold(0.0, f64::max);
    let stiffness_ratio = if i_max > 0.0 { i_min / i_max } else { 1.0 };
    if enforce && stiffness_ratio < criteria.min_girder_stiffness_ratio {
        return Err(CalcError::validation_failure(
            "girder stiffness ratio",
            stiffness_ratio,
            criteria.min_girder_stiffness_ratio,
            format!(
                "Span {}: the ratio of the least to the greatest girder stiffness is {:.3}, less than {:.3}. {}",
                span + 1,
                stiffness_ratio,
                criteria.min_girder_stiffness_ratio,
                REFINED_ANALYSIS_REQUIRED
            ),
        ));
    }

    let angles: Vec<f64> = (0..nb).map(|g| model.girder_plan_angle_deg(SpanKey::new(span, g))).collect();
    let angle_deviation_deg = angles.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        - angles.iter().copied().fold(f64::INFINITY, f64::min);
    let angle_deviation_deg = if angle_deviation_deg.is_finite() { angle_deviation_deg } else { 0.0 };
    if enforce && angle_deviation_deg > criteria.max_girder_angle_deviation_deg {
        return Err(CalcError::validation_failure(
            "girder parallelism",
            angle_deviation_deg,
            criteria.max_girder_angle_deviation_deg,
            format!(
                "Span {}: girders deviate from parallel by {:.2}°, more than {:.2}°. {}",
                span + 1,
                angle_deviation_deg,
                criteria.max_girder_angle_deviation_deg,
                REFINED_ANALYSIS_REQUIRED
            ),
        ));
    }

    Ok(PrerequisiteReport {
        span,
        curvature_deg,
        curvature_limit_deg,
        stiffness_ratio,
        min_stiffness_ratio: criteria.min_girder_stiffness_ratio,
        angle_deviation_deg,
        max_angle_deviation_deg: criteria.max_girder_angle_deviation_deg,
    })
}
