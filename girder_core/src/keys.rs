//! # Keys and Locators
//!
//! Identifiers used to address results: points of interest, span/pier/girder
//! keys and the limit states that act as secondary cache discriminators.
//!
//! Group and span indices coincide for the precast girder bridges handled
//! here (one girder group per span, one segment per girder).

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Structural Keys
// ============================================================================

/// A girder line within a girder group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GirderKey {
    pub group: usize,
    pub girder: usize,
}

impl GirderKey {
    pub fn new(group: usize, girder: usize) -> Self {
        GirderKey { group, girder }
    }
}

/// A precast segment within a girder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentKey {
    pub group: usize,
    pub girder: usize,
    pub segment: usize,
}

impl SegmentKey {
    pub fn new(group: usize, girder: usize, segment: usize) -> Self {
        SegmentKey { group, girder, segment }
    }

    pub fn girder_key(&self) -> GirderKey {
        GirderKey::new(self.group, self.girder)
    }
}

impl From<GirderKey> for SegmentKey {
    fn from(key: GirderKey) -> Self {
        SegmentKey::new(key.group, key.girder, 0)
    }
}

/// A girder line within a span (the span-girder hash of the cache)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanKey {
    pub span: usize,
    pub girder: usize,
}

impl SpanKey {
    pub fn new(span: usize, girder: usize) -> Self {
        SpanKey { span, girder }
    }
}

impl fmt::Display for SpanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span {} Girder {}", self.span + 1, girder_label(self.girder))
    }
}

/// A girder line at a pier (the pier-girder hash of the cache)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PierKey {
    pub pier: usize,
    pub girder: usize,
}

impl PierKey {
    pub fn new(pier: usize, girder: usize) -> Self {
        PierKey { pier, girder }
    }
}

/// Side of a pier a girder end bears on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PierFace {
    /// Face looking back along the alignment (span on the left of the pier)
    Back,
    /// Face looking ahead along the alignment (span on the right of the pier)
    Ahead,
}

impl PierFace {
    pub fn display_name(&self) -> &'static str {
        match self {
            PierFace::Back => "Back",
            PierFace::Ahead => "Ahead",
        }
    }
}

/// End of a span or segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndType {
    Start,
    End,
}

/// Girder label as used on drawings: A, B, C, ...
pub fn girder_label(girder: usize) -> String {
    let mut label = String::new();
    let mut n = girder;
    loop {
        label.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label
}

// ============================================================================
// Points of Interest
// ============================================================================

/// Unique identifier of a point of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoiId(pub u64);

impl PoiId {
    /// Identifier of a synthetic POI; results for it are never cached
    pub const INVALID: PoiId = PoiId(u64::MAX);

    pub fn is_valid(self) -> bool {
        self != PoiId::INVALID
    }
}

/// POI attribute bits
pub mod poi_attr {
    pub const FACE_OF_SUPPORT: u32 = 1 << 0;
    pub const BEARING: u32 = 1 << 1;
    pub const TENTH_POINT: u32 = 1 << 2;
    pub const MIDSPAN: u32 = 1 << 3;
    pub const CRITICAL_SECTION: u32 = 1 << 4;
    pub const SEGMENT_END: u32 = 1 << 5;
}

/// A stable location on a segment.
///
/// `distance_from_start_ft` is measured from the start face of the segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: PoiId,
    pub segment: SegmentKey,
    pub distance_from_start_ft: f64,
    pub attributes: u32,
}

impl PointOfInterest {
    pub fn new(id: PoiId, segment: SegmentKey, distance_from_start_ft: f64, attributes: u32) -> Self {
        PointOfInterest {
            id,
            segment,
            distance_from_start_ft,
            attributes,
        }
    }

    /// A POI that is not managed by the POI layout
    pub fn synthetic(segment: SegmentKey, distance_from_start_ft: f64) -> Self {
        PointOfInterest::new(PoiId::INVALID, segment, distance_from_start_ft, 0)
    }

    pub fn has_attribute(&self, attribute: u32) -> bool {
        self.attributes & attribute != 0
    }
}

// ============================================================================
// Limit States
// ============================================================================

/// Design and load rating limit states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LimitState {
    ServiceI,
    ServiceIA,
    ServiceIII,
    StrengthI,
    StrengthII,
    FatigueI,
    StrengthIInventory,
    StrengthIOperating,
    StrengthILegalRoutine,
    StrengthILegalSpecial,
    StrengthIIPermitRoutine,
    StrengthIIPermitSpecial,
    ServiceIIIInventory,
    ServiceIIIOperating,
}

/// Class of limit state used to key distribution factor partitions.
///
/// Fatigue factors exclude the multiple presence factor so they are cached
/// separately; every other limit state shares a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LimitStateClass {
    StrengthService,
    Fatigue,
}

impl LimitState {
    pub const ALL: [LimitState; 14] = [
        LimitState::ServiceI,
        LimitState::ServiceIA,
        LimitState::ServiceIII,
        LimitState::StrengthI,
        LimitState::StrengthII,
        LimitState::FatigueI,
        LimitState::StrengthIInventory,
        LimitState::StrengthIOperating,
        LimitState::StrengthILegalRoutine,
        LimitState::StrengthILegalSpecial,
        LimitState::StrengthIIPermitRoutine,
        LimitState::StrengthIIPermitSpecial,
        LimitState::ServiceIIIInventory,
        LimitState::ServiceIIIOperating,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            LimitState::ServiceI => "Service I",
            LimitState::ServiceIA => "Service IA",
            LimitState::ServiceIII => "Service III",
            LimitState::StrengthI => "Strength I",
            LimitState::StrengthII => "Strength II",
            LimitState::FatigueI => "Fatigue I",
            LimitState::StrengthIInventory => "Strength I (Design - Inventory)",
            LimitState::StrengthIOperating => "Strength I (Design - Operating)",
            LimitState::StrengthILegalRoutine => "Strength I (Legal - Routine)",
            LimitState::StrengthILegalSpecial => "Strength I (Legal - Special)",
            LimitState::StrengthIIPermitRoutine => "Strength II (Permit - Routine)",
            LimitState::StrengthIIPermitSpecial => "Strength II (Permit - Special)",
            LimitState::ServiceIIIInventory => "Service III (Design - Inventory)",
            LimitState::ServiceIIIOperating => "Service III (Design - Operating)",
        }
    }

    pub fn is_strength(&self) -> bool {
        matches!(
            self,
            LimitState::StrengthI
                | LimitState::StrengthII
                | LimitState::StrengthIInventory
                | LimitState::StrengthIOperating
                | LimitState::StrengthILegalRoutine
                | LimitState::StrengthILegalSpecial
                | LimitState::StrengthIIPermitRoutine
                | LimitState::StrengthIIPermitSpecial
        )
    }

    /// Load rating limit states
    pub fn is_rating(&self) -> bool {
        matches!(
            self,
            LimitState::StrengthIInventory
                | LimitState::StrengthIOperating
                | LimitState::StrengthILegalRoutine
                | LimitState::StrengthILegalSpecial
                | LimitState::StrengthIIPermitRoutine
                | LimitState::StrengthIIPermitSpecial
                | LimitState::ServiceIIIInventory
                | LimitState::ServiceIIIOperating
        )
    }

    pub fn is_fatigue(&self) -> bool {
        matches!(self, LimitState::FatigueI | LimitState::ServiceIA)
    }

    pub fn class(&self) -> LimitStateClass {
        if *self == LimitState::FatigueI {
            LimitStateClass::Fatigue
        } else {
            LimitStateClass::StrengthService
        }
    }

    /// Load factor applied to the live load effect of this limit state
    pub fn live_load_factor(&self) -> f64 {
        match self {
            LimitState::StrengthI | LimitState::StrengthIInventory => 1.75,
            LimitState::StrengthIOperating => 1.35,
            LimitState::StrengthILegalRoutine | LimitState::StrengthILegalSpecial => 1.45,
            LimitState::StrengthII | LimitState::StrengthIIPermitRoutine | LimitState::StrengthIIPermitSpecial => 1.35,
            LimitState::ServiceI | LimitState::ServiceIIIOperating => 1.0,
            LimitState::ServiceIII | LimitState::ServiceIIIInventory => 0.8,
            LimitState::ServiceIA => 0.5,
            LimitState::FatigueI => 1.75,
        }
    }

    /// Load factor applied to dead load effects (maximum)
    pub fn dead_load_factor(&self) -> f64 {
        if self.is_strength() {
            1.25
        } else if *self == LimitState::FatigueI {
            0.0
        } else {
            1.0
        }
    }

    /// Load factor applied to dead load effects when they relieve the demand
    pub fn min_dead_load_factor(&self) -> f64 {
        if self.is_strength() {
            0.9
        } else {
            self.dead_load_factor()
        }
    }
}

impl fmt::Display for LimitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Analysis stage for section properties and capacities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnalysisStage {
    /// Girder alone (release through deck casting)
    NonComposite,
    /// Girder acting compositely with the deck
    Composite,
}
