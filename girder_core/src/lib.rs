//! # girder_core - Bridge Girder Analysis Core
//!
//! `girder_core` computes and memoizes the analysis results a precast girder
//! bridge design needs: AASHTO LRFD live load distribution factors, the shear
//! critical section at each support, and girder capacities. All inputs and
//! outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Memoized**: every result is computed once per configuration and shared
//! - **Provider-Driven**: geometry, sections, materials and forces come through traits
//! - **Rich Errors**: structured error types, not just strings
//! - **Explainable**: distribution factors carry the method that produced them
//!
//! ## Quick Start
//!
//! ```rust
//! use girder_core::cache::AnalysisContext;
//! use girder_core::keys::{LimitState, SpanKey};
//! use girder_core::model::BridgeModel;
//!
//! let ctx = AnalysisContext::for_model(BridgeModel::demo());
//! let mg = ctx.moment_df(SpanKey::new(0, 1), LimitState::StrengthI, None).unwrap();
//! assert!(mg > 0.0 && mg < 1.5);
//! ```
//!
//! ## Modules
//!
//! - [`cache`] - Analysis context: memoized results and invalidation
//! - [`distribution`] - Live load distribution factor engine
//! - [`critical_section`] - Shear critical section locator
//! - [`consumers`] - Girder check built on cached results
//! - [`providers`] - Traits the analysis reads the bridge through
//! - [`capacity`] - Capacity engine trait and detail records
//! - [`model`] - In-memory bridge model and capacity engine
//! - [`keys`] - Girder, span, pier and POI keys; limit states
//! - [`config`] - Specification and rating criteria
//! - [`status`] - Warning and failure collector
//! - [`errors`] - Structured error types

pub mod cache;
pub mod candidate;
pub mod capacity;
pub mod config;
pub mod consumers;
pub mod critical_section;
pub mod distribution;
pub mod errors;
pub mod keys;
pub mod math;
pub mod model;
pub mod providers;
pub mod status;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use cache::{AnalysisContext, ChangeEvent};
pub use candidate::CandidateConfiguration;
pub use config::{SpecificationCriteria, SpecificationEdition};
pub use critical_section::CriticalSection;
pub use errors::{CalcError, CalcResult};
pub use keys::{GirderKey, LimitState, PierKey, PointOfInterest, SegmentKey, SpanKey};
pub use model::BridgeModel;
pub use providers::BridgeServices;
