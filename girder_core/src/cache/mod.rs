//! # Analysis Context
//!
//! Memoized analysis results for one open bridge document. Every query goes
//! through a get-or-compute on a keyed partition, so each distinct result is
//! computed at most once between invalidations.
//!
//! ## Partitions
//!
//! | Partition            | Key                                        |
//! |----------------------|--------------------------------------------|
//! | moment capacity      | (stage, positive moment, POI)              |
//! | cracking moment      | (stage, positive moment, POI)              |
//! | min moment capacity  | (stage, positive moment, POI)              |
//! | shear capacity       | (limit state, POI)                         |
//! | critical sections    | (limit state, girder)                      |
//! | losses, Fpc          | POI                                        |
//! | principal web stress | (limit state, POI)                         |
//! | haunch               | segment                                    |
//! | girder check         | (girder, limit state)                      |
//! | span / pier / reaction distribution factors | key + limit state class |
//!
//! Results for the built configuration live in the permanent store. Results
//! for a candidate configuration live in a single temporary slot; see
//! [`crate::candidate`] for the one-candidate-in-flight precondition.
//!
//! ## Symmetry
//!
//! On a symmetric girder, positive moment results for POIs past midspan are
//! served from the mirrored POI. Negative moment results are never mirrored.
//!
//! ## Threading
//!
//! The context is single threaded. Results are `Rc` and partitions use
//! `RefCell`, which keeps the type `!Send + !Sync`.

pub mod partition;

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateConfiguration;
use crate::capacity::{
    CapacityEngine, CrackingMomentDetails, Demand, FpcDetails, HaunchDetails, MinMomentCapacityDetails,
    MomentCapacityDetails, PrestressLossDetails, PrincipalWebStressDetails, ShearCapacityDetails,
};
use crate::config::{DistributionFactorMethod, RangeOfApplicabilityAction};
use crate::consumers::{check_girder, GirderCheckArtifact};
use crate::critical_section::{locate_critical_sections, CriticalSection};
use crate::distribution::applicability::{check_prerequisites, PrerequisiteReport};
use crate::distribution::engine::{
    compute_pier_factors, compute_reaction_factors, compute_span_factors, PierFactorDetails, ReactionFactorDetails,
    SpanFactorDetails,
};
use crate::distribution::narrative;
use crate::errors::CalcResult;
use crate::keys::{
    AnalysisStage, GirderKey, LimitState, LimitStateClass, PierFace, PierKey, PoiId, PointOfInterest, SegmentKey,
    SpanKey,
};
use crate::model::{BridgeModel, SimpleCapacityEngine};
use crate::providers::BridgeServices;
use crate::status::{Severity, StatusCategory, StatusCenter};

use partition::Partition;

// ============================================================================
// Warnings
// ============================================================================

pub const USER_INPUT_WARNING: &str = "Live Load Distribution Factors were User-Input.";
pub const LEVER_RULE_WARNING: &str = "All Live Load Distribution Factors are computed using the Lever Rule.";
pub const ROA_IGNORED_WARNING: &str =
    "Ranges of Applicability for Live Load Distribution Factor Equations have been ignored.";
pub const ROA_LEVER_RULE_WARNING: &str = "The Lever Rule has been used for all cases where Ranges of Applicability for Live Load Distribution Factor Equations are exceeded. Otherwise, factors are computed using the Equations.";

// ============================================================================
// Change Events
// ============================================================================

/// Model change notifications and what they invalidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeEvent {
    Bridge,
    GirderFamily,
    Specification,
    RatingSpecification,
    LoadModifiers,
    Environment,
    LiveLoad,
    LossParameters,
}

impl ChangeEvent {
    pub const ALL: [ChangeEvent; 8] = [
        ChangeEvent::Bridge,
        ChangeEvent::GirderFamily,
        ChangeEvent::Specification,
        ChangeEvent::RatingSpecification,
        ChangeEvent::LoadModifiers,
        ChangeEvent::Environment,
        ChangeEvent::LiveLoad,
        ChangeEvent::LossParameters,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ChangeEvent::Bridge => "Bridge changed",
            ChangeEvent::GirderFamily => "Girder family changed",
            ChangeEvent::Specification => "Specification changed",
            ChangeEvent::RatingSpecification => "Rating specification changed",
            ChangeEvent::LoadModifiers => "Load modifiers changed",
            ChangeEvent::Environment => "Environment changed",
            ChangeEvent::LiveLoad => "Live load changed",
            ChangeEvent::LossParameters => "Loss parameters changed",
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Partitions
// ============================================================================

type MomentKey = (AnalysisStage, bool, PoiId);

/// Entry counts of one partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionStatistics {
    pub partition: &'static str,
    pub entries: usize,
    pub computed: usize,
}

struct Partitions {
    moment_capacity: Partition<MomentKey, MomentCapacityDetails>,
    cracking_moment: Partition<MomentKey, CrackingMomentDetails>,
    min_moment_capacity: Partition<MomentKey, MinMomentCapacityDetails>,
    shear_capacity: Partition<(LimitState, PoiId), ShearCapacityDetails>,
    critical_sections: Partition<(LimitState, GirderKey), Vec<CriticalSection>>,
    losses: Partition<PoiId, PrestressLossDetails>,
    fpc: Partition<PoiId, FpcDetails>,
    principal_web_stress: Partition<(LimitState, PoiId), PrincipalWebStressDetails>,
    haunch: Partition<SegmentKey, HaunchDetails>,
    artifacts: Partition<(GirderKey, LimitState), GirderCheckArtifact>,
    span_factors: Partition<(SpanKey, LimitStateClass), SpanFactorDetails>,
    pier_factors: Partition<(PierKey, PierFace, LimitStateClass), PierFactorDetails>,
    reaction_factors: Partition<(PierKey, LimitStateClass), ReactionFactorDetails>,
}

impl Partitions {
    fn new() -> Self {
        Partitions {
            moment_capacity: Partition::new("moment capacity"),
            cracking_moment: Partition::new("cracking moment"),
            min_moment_capacity: Partition::new("min moment capacity"),
            shear_capacity: Partition::new("shear capacity"),
            critical_sections: Partition::new("critical sections"),
            losses: Partition::new("prestress losses"),
            fpc: Partition::new("fpc"),
            principal_web_stress: Partition::new("principal web stress"),
            haunch: Partition::new("haunch"),
            artifacts: Partition::new("girder check artifacts"),
            span_factors: Partition::new("span distribution factors"),
            pier_factors: Partition::new("pier distribution factors"),
            reaction_factors: Partition::new("reaction distribution factors"),
        }
    }

    /// Results that depend on anything beyond the flexural configuration
    fn clear_non_flexural(&self) {
        self.cracking_moment.clear();
        self.min_moment_capacity.clear();
        self.shear_capacity.clear();
        self.critical_sections.clear();
        self.losses.clear();
        self.fpc.clear();
        self.principal_web_stress.clear();
        self.haunch.clear();
        self.artifacts.clear();
        self.span_factors.clear();
        self.pier_factors.clear();
        self.reaction_factors.clear();
    }

    fn clear(&self) {
        self.moment_capacity.clear();
        self.clear_non_flexural();
    }

    /// Results that depend on factored demand
    fn clear_demand_dependent(&self) {
        self.haunch.clear();
        self.artifacts.clear();
        self.shear_capacity.clear();
        self.fpc.clear();
        self.critical_sections.clear();
        self.principal_web_stress.clear();
        self.min_moment_capacity.clear();
    }

    fn clear_rating_strength(&self) {
        let rating = |ls: &LimitState| ls.is_rating() && ls.is_strength();
        self.shear_capacity.retain(|(ls, _)| !rating(ls));
        self.critical_sections.retain(|(ls, _)| !rating(ls));
        self.artifacts.retain(|(_, ls)| !rating(ls));
    }

    fn statistics(&self) -> Vec<PartitionStatistics> {
        fn stats<K: Eq + std::hash::Hash + Copy + fmt::Debug, V>(p: &Partition<K, V>) -> PartitionStatistics {
            PartitionStatistics {
                partition: p.name(),
                entries: p.len(),
                computed: p.computed_count(),
            }
        }
        vec![
            stats(&self.moment_capacity),
            stats(&self.cracking_moment),
            stats(&self.min_moment_capacity),
            stats(&self.shear_capacity),
            stats(&self.critical_sections),
            stats(&self.losses),
            stats(&self.fpc),
            stats(&self.principal_web_stress),
            stats(&self.haunch),
            stats(&self.artifacts),
            stats(&self.span_factors),
            stats(&self.pier_factors),
            stats(&self.reaction_factors),
        ]
    }

    fn total_entries(&self) -> usize {
        self.statistics().iter().map(|s| s.entries).sum()
    }
}

struct CandidateSlot {
    config: CandidateConfiguration,
    store: Rc<Partitions>,
}

/// Store and effective candidate for one query
struct Scope<'a> {
    store: Rc<Partitions>,
    candidate: Option<&'a CandidateConfiguration>,
}

/// Lookup through `partition`, bypassing it for unmanaged POIs
fn cached<K, V>(
    partition: &Partition<K, V>,
    key: K,
    cacheable: bool,
    compute: impl FnOnce() -> CalcResult<V>,
) -> CalcResult<Rc<V>>
where
    K: Eq + std::hash::Hash + Copy + fmt::Debug,
{
    if cacheable {
        partition.get_or_try_insert_with(key, compute)
    } else {
        compute().map(Rc::new)
    }
}

// ============================================================================
// Analysis Context
// ============================================================================

pub struct AnalysisContext<M = BridgeModel> {
    model: M,
    capacity: Box<dyn CapacityEngine>,
    permanent: Rc<Partitions>,
    candidate: RefCell<Option<CandidateSlot>>,
    prerequisites: Partition<usize, CalcResult<PrerequisiteReport>>,
    status: RefCell<StatusCenter>,
    df_warnings_posted: Cell<bool>,
}

impl AnalysisContext<BridgeModel> {
    /// Context over a bridge model with the bundled capacity engine
    pub fn for_model(model: BridgeModel) -> Self {
        let engine = SimpleCapacityEngine::for_model(&model);
        AnalysisContext::new(model, Box::new(engine))
    }
}

impl<M: BridgeServices> AnalysisContext<M> {
    pub fn new(model: M, capacity: Box<dyn CapacityEngine>) -> Self {
        AnalysisContext {
            model,
            capacity,
            permanent: Rc::new(Partitions::new()),
            candidate: RefCell::new(None),
            prerequisites: Partition::new("span prerequisites"),
            status: RefCell::new(StatusCenter::new()),
            df_warnings_posted: Cell::new(false),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    fn services(&self) -> &dyn BridgeServices {
        &self.model
    }

    /// Apply an edit to the model and invalidate what it affects
    pub fn edit_model(&mut self, event: ChangeEvent, edit: impl FnOnce(&mut M)) {
        edit(&mut self.model);
        self.notify(event);
    }

    pub fn status(&self) -> Ref<'_, StatusCenter> {
        self.status.borrow()
    }

    fn post(&self, category: StatusCategory, severity: Severity, message: impl Into<String>) {
        self.status.borrow_mut().post(category, severity, message);
    }

    /// Entry counts of the permanent store
    pub fn statistics(&self) -> Vec<PartitionStatistics> {
        self.permanent.statistics()
    }

    /// Number of cached results across the permanent store and the candidate slot
    pub fn cached_result_count(&self) -> usize {
        let temporary = self.candidate.borrow().as_ref().map_or(0, |slot| slot.store.total_entries());
        self.permanent.total_entries() + temporary + self.prerequisites.len()
    }

    // ------------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------------

    pub fn notify(&self, event: ChangeEvent) {
        match event {
            ChangeEvent::Bridge => self.on_bridge_changed(),
            ChangeEvent::GirderFamily => self.on_girder_family_changed(),
            ChangeEvent::Specification => self.on_specification_changed(),
            ChangeEvent::RatingSpecification => self.on_rating_specification_changed(),
            ChangeEvent::LoadModifiers => self.on_load_modifiers_changed(),
            ChangeEvent::Environment => self.on_environment_changed(),
            ChangeEvent::LiveLoad => self.on_live_load_changed(),
            ChangeEvent::LossParameters => self.on_loss_parameters_changed(),
        }
    }

    fn invalidate_all(&self, event: ChangeEvent) {
        log::info!("{}: invalidating all analysis results", event);
        self.permanent.clear();
        *self.candidate.borrow_mut() = None;
        self.prerequisites.clear();
        self.status.borrow_mut().clear();
        self.df_warnings_posted.set(false);
    }

    pub fn on_bridge_changed(&self) {
        self.invalidate_all(ChangeEvent::Bridge);
    }

    pub fn on_girder_family_changed(&self) {
        self.invalidate_all(ChangeEvent::GirderFamily);
    }

    pub fn on_specification_changed(&self) {
        self.invalidate_all(ChangeEvent::Specification);
    }

    pub fn on_environment_changed(&self) {
        self.invalidate_all(ChangeEvent::Environment);
    }

    pub fn on_live_load_changed(&self) {
        self.invalidate_all(ChangeEvent::LiveLoad);
    }

    pub fn on_loss_parameters_changed(&self) {
        self.invalidate_all(ChangeEvent::LossParameters);
    }

    /// Only rating strength limit states depend on the rating criteria
    pub fn on_rating_specification_changed(&self) {
        log::info!("{}: invalidating rating shear results", ChangeEvent::RatingSpecification);
        self.permanent.clear_rating_strength();
        if let Some(slot) = self.candidate.borrow().as_ref() {
            slot.store.clear_rating_strength();
        }
    }

    pub fn on_load_modifiers_changed(&self) {
        log::info!("{}: invalidating demand-dependent results", ChangeEvent::LoadModifiers);
        self.permanent.clear_demand_dependent();
        if let Some(slot) = self.candidate.borrow().as_ref() {
            slot.store.clear_demand_dependent();
        }
    }

    // ------------------------------------------------------------------------
    // Scoping
    // ------------------------------------------------------------------------

    fn candidate_store(&self, candidate: &CandidateConfiguration) -> Rc<Partitions> {
        let mut slot = self.candidate.borrow_mut();
        if let Some(current) = slot.as_mut() {
            if current.config.is_flexurally_equal(candidate) {
                if current.config != *candidate {
                    log::debug!("candidate changed outside flexure, keeping moment capacities");
                    current.store.clear_non_flexural();
                    current.config = candidate.clone();
                }
                return Rc::clone(&current.store);
            }
            log::info!("new candidate configuration, flushing temporary results");
        }
        let store = Rc::new(Partitions::new());
        *slot = Some(CandidateSlot {
            config: candidate.clone(),
            store: Rc::clone(&store),
        });
        store
    }

    fn scope<'a>(&self, segment: SegmentKey, candidate: Option<&'a CandidateConfiguration>) -> Scope<'a> {
        match candidate {
            Some(config) if config.segment == segment => Scope {
                store: self.candidate_store(config),
                candidate: Some(config),
            },
            _ => Scope {
                store: Rc::clone(&self.permanent),
                candidate: None,
            },
        }
    }

    fn configuration(&self, segment: SegmentKey, candidate: Option<&CandidateConfiguration>) -> CandidateConfiguration {
        match candidate {
            Some(config) => config.clone(),
            None => self.model.built_configuration(segment),
        }
    }

    /// POI whose result is served for `poi`
    fn mirrored(&self, poi: &PointOfInterest, positive_moment: bool) -> PointOfInterest {
        if !positive_moment || !self.model.is_symmetric(poi.segment.girder_key()) {
            return *poi;
        }
        let half = self.model.segment_length_ft(poi.segment) / 2.0;
        if poi.distance_from_start_ft <= half {
            return *poi;
        }
        self.model.mirror_poi(poi).unwrap_or(*poi)
    }

    // ------------------------------------------------------------------------
    // Capacity Results
    // ------------------------------------------------------------------------

    pub fn moment_capacity(
        &self,
        poi: &PointOfInterest,
        stage: AnalysisStage,
        positive_moment: bool,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<MomentCapacityDetails>> {
        let poi = self.mirrored(poi, positive_moment);
        let scope = self.scope(poi.segment, candidate);
        cached(
            &scope.store.moment_capacity,
            (stage, positive_moment, poi.id),
            poi.id.is_valid(),
            || {
                let config = self.configuration(poi.segment, scope.candidate);
                self.capacity
                    .moment_capacity(self.services(), &poi, stage, positive_moment, &config)
            },
        )
    }

    pub fn cracking_moment(
        &self,
        poi: &PointOfInterest,
        stage: AnalysisStage,
        positive_moment: bool,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<CrackingMomentDetails>> {
        let poi = self.mirrored(poi, positive_moment);
        let scope = self.scope(poi.segment, candidate);
        cached(
            &scope.store.cracking_moment,
            (stage, positive_moment, poi.id),
            poi.id.is_valid(),
            || {
                let losses = self.prestress_losses(&poi, scope.candidate)?;
                self.capacity
                    .cracking_moment(self.services(), &poi, stage, positive_moment, &losses)
            },
        )
    }

    /// Minimum reinforcement check against the Strength I moment
    pub fn min_moment_capacity(
        &self,
        poi: &PointOfInterest,
        stage: AnalysisStage,
        positive_moment: bool,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<MinMomentCapacityDetails>> {
        let poi = self.mirrored(poi, positive_moment);
        let scope = self.scope(poi.segment, candidate);
        cached(
            &scope.store.min_moment_capacity,
            (stage, positive_moment, poi.id),
            poi.id.is_valid(),
            || {
                let mcr = self.cracking_moment(&poi, stage, positive_moment, scope.candidate)?;
                let mr = self.moment_capacity(&poi, stage, positive_moment, scope.candidate)?;
                let demand = self.demand(LimitState::StrengthI, &poi, scope.candidate)?;
                Ok(MinMomentCapacityDetails::from_values(
                    mcr.mcr_kip_ft,
                    demand.mu_kip_ft,
                    mr.mr_kip_ft,
                ))
            },
        )
    }

    pub fn prestress_losses(
        &self,
        poi: &PointOfInterest,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<PrestressLossDetails>> {
        let scope = self.scope(poi.segment, candidate);
        cached(&scope.store.losses, poi.id, poi.id.is_valid(), || {
            let config = self.configuration(poi.segment, scope.candidate);
            self.capacity.prestress_losses(self.services(), poi, &config)
        })
    }

    pub fn fpc(&self, poi: &PointOfInterest, candidate: Option<&CandidateConfiguration>) -> CalcResult<Rc<FpcDetails>> {
        let scope = self.scope(poi.segment, candidate);
        cached(&scope.store.fpc, poi.id, poi.id.is_valid(), || {
            let config = self.configuration(poi.segment, scope.candidate);
            let losses = self.prestress_losses(poi, scope.candidate)?;
            self.capacity.fpc(self.services(), poi, &config, &losses)
        })
    }

    pub fn shear_capacity(
        &self,
        limit_state: LimitState,
        poi: &PointOfInterest,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<ShearCapacityDetails>> {
        let scope = self.scope(poi.segment, candidate);
        cached(
            &scope.store.shear_capacity,
            (limit_state, poi.id),
            poi.id.is_valid(),
            || {
                let config = self.configuration(poi.segment, scope.candidate);
                let demand = self.demand(limit_state, poi, scope.candidate)?;
                let fpc = self.fpc(poi, scope.candidate)?;
                self.capacity
                    .shear_capacity(self.services(), limit_state, poi, &config, demand, &fpc)
            },
        )
    }

    pub fn principal_web_stress(
        &self,
        limit_state: LimitState,
        poi: &PointOfInterest,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<PrincipalWebStressDetails>> {
        let scope = self.scope(poi.segment, candidate);
        cached(
            &scope.store.principal_web_stress,
            (limit_state, poi.id),
            poi.id.is_valid(),
            || {
                let config = self.configuration(poi.segment, scope.candidate);
                let demand = self.demand(limit_state, poi, scope.candidate)?;
                let fpc = self.fpc(poi, scope.candidate)?;
                self.capacity
                    .principal_web_stress(self.services(), poi, &config, demand, &fpc)
            },
        )
    }

    pub fn haunch(
        &self,
        segment: SegmentKey,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<HaunchDetails>> {
        let scope = self.scope(segment, candidate);
        cached(&scope.store.haunch, segment, true, || {
            let config = self.configuration(segment, scope.candidate);
            self.capacity.haunch(self.services(), segment, &config)
        })
    }

    // ------------------------------------------------------------------------
    // Demand
    // ------------------------------------------------------------------------

    /// Factored moment and shear at a POI for one girder
    pub fn demand(
        &self,
        limit_state: LimitState,
        poi: &PointOfInterest,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Demand> {
        let key = SpanKey::new(poi.segment.group, poi.segment.girder);
        let gamma_dc = limit_state.dead_load_factor();
        let gamma_ll = limit_state.live_load_factor();
        let eta = self.model.load_modifiers().eta();

        let mg_moment = self.moment_df(key, limit_state, candidate)?;
        let mg_shear = self.shear_df_at(poi, limit_state, candidate)?;
        let (_, ll_moment) = self.model.lane_live_load_moment_kip_ft(poi);
        let (ll_shear_min, ll_shear_max) = self.model.lane_live_load_shear_kip(poi);
        let ll_shear = ll_shear_min.abs().max(ll_shear_max.abs());

        Ok(Demand {
            mu_kip_ft: eta * (gamma_dc * self.model.dead_load_moment_kip_ft(poi) + gamma_ll * mg_moment * ll_moment),
            vu_kip: eta * (gamma_dc * self.model.dead_load_shear_kip(poi).abs() + gamma_ll * mg_shear * ll_shear),
        })
    }

    /// Minimum factored reaction, dead load at its minimum factor
    pub fn min_reaction(
        &self,
        pier: PierKey,
        limit_state: LimitState,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<f64> {
        let mg = self.reaction_df(pier.pier, pier.girder, limit_state, candidate)?;
        let (ll_min, _) = self.model.lane_live_load_reaction_kip(pier);
        Ok(limit_state.min_dead_load_factor() * self.model.dead_load_reaction_kip(pier)
            + limit_state.live_load_factor() * mg * ll_min)
    }

    // ------------------------------------------------------------------------
    // Critical Sections
    // ------------------------------------------------------------------------

    /// Limit state the critical section of `limit_state` is stored under
    pub fn critical_section_limit_state(&self, limit_state: LimitState) -> LimitState {
        if limit_state.is_strength() && self.model.specification().uses_dv_only_critical_section() {
            LimitState::StrengthI
        } else {
            limit_state
        }
    }

    pub fn critical_sections(
        &self,
        limit_state: LimitState,
        girder: GirderKey,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<Vec<CriticalSection>>> {
        let limit_state = self.critical_section_limit_state(limit_state);
        let scope = self.scope(SegmentKey::from(girder), candidate);
        cached(&scope.store.critical_sections, (limit_state, girder), true, || {
            let result = locate_critical_sections(
                self.services(),
                girder,
                self.model.specification(),
                |pier| self.min_reaction(pier, limit_state, scope.candidate),
                |poi| self.shear_capacity(limit_state, poi, scope.candidate),
            );
            if let Err(err) = &result {
                self.post(
                    StatusCategory::CriticalSection,
                    Severity::Error,
                    format!(
                        "Unable to locate the critical section for shear for Span {} Girder {}: {}",
                        girder.group + 1,
                        crate::keys::girder_label(girder.girder),
                        err
                    ),
                );
            }
            result
        })
    }

    // ------------------------------------------------------------------------
    // Girder Check
    // ------------------------------------------------------------------------

    pub fn girder_check(
        &self,
        girder: GirderKey,
        limit_state: LimitState,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<GirderCheckArtifact>> {
        let scope = self.scope(SegmentKey::from(girder), candidate);
        cached(&scope.store.artifacts, (girder, limit_state), true, || {
            check_girder(self, girder, limit_state, scope.candidate)
        })
    }

    // ------------------------------------------------------------------------
    // Distribution Factors
    // ------------------------------------------------------------------------

    fn post_df_warnings(&self) {
        if self.df_warnings_posted.replace(true) {
            return;
        }
        let criteria = self.model.specification();
        let message = match (criteria.df_method, criteria.roa_action) {
            (DistributionFactorMethod::DirectlyInput, _) => Some(USER_INPUT_WARNING),
            (DistributionFactorMethod::LeverRule, _) => Some(LEVER_RULE_WARNING),
            (DistributionFactorMethod::Calculated, RangeOfApplicabilityAction::Ignore) => Some(ROA_IGNORED_WARNING),
            (DistributionFactorMethod::Calculated, RangeOfApplicabilityAction::IgnoreUseLeverRule) => {
                Some(ROA_LEVER_RULE_WARNING)
            }
            (DistributionFactorMethod::Calculated, RangeOfApplicabilityAction::Enforce) => None,
        };
        if let Some(message) = message {
            self.post(StatusCategory::LldfWarning, Severity::Warning, message);
        }
    }

    /// Curvature, stiffness and parallelism checks for a span, run once
    pub fn prerequisites(&self, span: usize) -> CalcResult<PrerequisiteReport> {
        let result = self
            .prerequisites
            .get_or_try_insert_with(span, || Ok(check_prerequisites(self.services(), span)))?;
        match result.as_ref() {
            Ok(report) => Ok(report.clone()),
            Err(err) => {
                self.post(StatusCategory::RefinedAnalysis, Severity::Error, err.to_string());
                Err(err.clone())
            }
        }
    }

    fn before_df(&self, spans: &[usize]) -> CalcResult<()> {
        self.post_df_warnings();
        if self.model.specification().df_method != DistributionFactorMethod::DirectlyInput {
            for span in spans {
                self.prerequisites(*span)?;
            }
        }
        Ok(())
    }

    /// Spans that frame into a pier
    fn spans_at_pier(&self, pier: usize) -> Vec<usize> {
        let count = self.model.span_count();
        pier.checked_sub(1)
            .into_iter()
            .chain(Some(pier))
            .filter(|span| *span < count)
            .collect()
    }

    pub fn span_factor_details(
        &self,
        key: SpanKey,
        limit_state: LimitState,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<SpanFactorDetails>> {
        let class = limit_state.class();
        let scope = self.scope(SegmentKey::new(key.span, key.girder, 0), candidate);
        cached(&scope.store.span_factors, (key, class), true, || {
            self.before_df(&[key.span])?;
            compute_span_factors(self.services(), key, class, scope.candidate)
        })
    }

    pub fn pier_factor_details(
        &self,
        pier: PierKey,
        face: PierFace,
        limit_state: LimitState,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<PierFactorDetails>> {
        let class = limit_state.class();
        let span = match face {
            PierFace::Back => pier.pier.saturating_sub(1),
            PierFace::Ahead => pier.pier,
        };
        let scope = self.scope(SegmentKey::new(span, pier.girder, 0), candidate);
        cached(&scope.store.pier_factors, (pier, face, class), true, || {
            self.before_df(&self.spans_at_pier(pier.pier))?;
            compute_pier_factors(self.services(), pier, face, class, scope.candidate)
        })
    }

    pub fn reaction_factor_details(
        &self,
        pier: PierKey,
        limit_state: LimitState,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<Rc<ReactionFactorDetails>> {
        let class = limit_state.class();
        let span = pier.pier.min(self.model.span_count().saturating_sub(1));
        let scope = self.scope(SegmentKey::new(span, pier.girder, 0), candidate);
        cached(&scope.store.reaction_factors, (pier, class), true, || {
            self.before_df(&self.spans_at_pier(pier.pier))?;
            compute_reaction_factors(self.services(), pier, class, scope.candidate)
        })
    }

    pub fn moment_df(
        &self,
        key: SpanKey,
        limit_state: LimitState,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<f64> {
        Ok(self.span_factor_details(key, limit_state, candidate)?.moment.controlling)
    }

    pub fn negative_moment_df(
        &self,
        pier: usize,
        girder: usize,
        limit_state: LimitState,
        face: PierFace,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<f64> {
        let details = self.pier_factor_details(PierKey::new(pier, girder), face, limit_state, candidate)?;
        Ok(details.negative_moment.controlling)
    }

    pub fn shear_df(
        &self,
        key: SpanKey,
        limit_state: LimitState,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<f64> {
        Ok(self.span_factor_details(key, limit_state, candidate)?.shear.controlling)
    }

    pub fn reaction_df(
        &self,
        pier: usize,
        girder: usize,
        limit_state: LimitState,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<f64> {
        let details = self.reaction_factor_details(PierKey::new(pier, girder), limit_state, candidate)?;
        Ok(details.reaction.controlling)
    }

    /// Shear factor at a POI, with the obtuse-corner taper where it applies
    pub fn shear_df_at(
        &self,
        poi: &PointOfInterest,
        limit_state: LimitState,
        candidate: Option<&CandidateConfiguration>,
    ) -> CalcResult<f64> {
        let key = SpanKey::new(poi.segment.group, poi.segment.girder);
        let details = self.span_factor_details(key, limit_state, candidate)?;
        let start = self.model.end_distance_ft(poi.segment).left;
        let length = self.model.span_length_ft(key.span);
        Ok(details.shear_factor_at(poi.distance_from_start_ft - start, length, self.model.specification()))
    }

    /// Moment and shear factor sets for a girder in a span
    pub fn distribution_factor_details(
        &self,
        key: SpanKey,
        limit_state: LimitState,
    ) -> CalcResult<Rc<SpanFactorDetails>> {
        self.span_factor_details(key, limit_state, None)
    }

    /// Skew correction of the controlling moment lane class, if one was applied
    pub fn skew_correction_for_moment(&self, key: SpanKey, limit_state: LimitState) -> CalcResult<Option<f64>> {
        let details = self.distribution_factor_details(key, limit_state)?;
        Ok(details.moment.controlling_result().skew_correction)
    }

    pub fn skew_correction_for_shear(&self, key: SpanKey, limit_state: LimitState) -> CalcResult<Option<f64>> {
        let details = self.distribution_factor_details(key, limit_state)?;
        Ok(details.shear.controlling_result().skew_correction)
    }

    /// Narrative of how the span factors were obtained
    pub fn computation_description(&self, key: SpanKey, limit_state: LimitState) -> CalcResult<String> {
        let details = self.distribution_factor_details(key, limit_state)?;
        Ok(narrative::describe_span(&details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpecificationEdition;
    use crate::keys::poi_attr;
    use crate::model::{fixtures, ReactionOverride};
    use crate::providers::{GeometryProvider, SectionProvider, SpecificationProvider};

    fn context() -> AnalysisContext {
        AnalysisContext::for_model(fixtures::four_girder_bridge())
    }

    fn pois(ctx: &AnalysisContext, girder: usize) -> Vec<PointOfInterest> {
        ctx.model().segment_pois(SegmentKey::new(0, girder, 0))
    }

    fn tenth(ctx: &AnalysisContext, girder: usize, n: usize) -> PointOfInterest {
        pois(ctx, girder)
            .into_iter()
            .filter(|p| p.has_attribute(poi_attr::TENTH_POINT))
            .nth(n)
            .unwrap()
    }

    #[test]
    fn test_memoization_returns_same_result() {
        let ctx = context();
        let poi = tenth(&ctx, 1, 3);
        let first = ctx.moment_capacity(&poi, AnalysisStage::Composite, true, None).unwrap();
        let second = ctx.moment_capacity(&poi, AnalysisStage::Composite, true, None).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        let stats = ctx.statistics();
        let moment = stats.iter().find(|s| s.partition == "moment capacity").unwrap();
        assert_eq!(moment.computed, 1);
    }

    #[test]
    fn test_symmetric_girder_reuses_mirror() {
        let ctx = context();
        let near = tenth(&ctx, 1, 3);
        let far = tenth(&ctx, 1, 7);
        let a = ctx.moment_capacity(&near, AnalysisStage::Composite, true, None).unwrap();
        let b = ctx.moment_capacity(&far, AnalysisStage::Composite, true, None).unwrap();
        assert!(Rc::ptr_eq(&a, &b));

        let neg_near = ctx.moment_capacity(&near, AnalysisStage::Composite, false, None).unwrap();
        let neg_far = ctx.moment_capacity(&far, AnalysisStage::Composite, false, None).unwrap();
        assert!(!Rc::ptr_eq(&neg_near, &neg_far));
    }

    #[test]
    fn test_synthetic_poi_is_not_cached() {
        let ctx = context();
        let poi = PointOfInterest::synthetic(SegmentKey::new(0, 1, 0), 20.0);
        let before = ctx.cached_result_count();
        ctx.prestress_losses(&poi, None).unwrap();
        ctx.prestress_losses(&poi, None).unwrap();
        assert_eq!(ctx.cached_result_count(), before);
    }

    #[test]
    fn test_candidate_slot_flushes_on_flexural_change() {
        let ctx = context();
        let poi = tenth(&ctx, 1, 5);
        let segment = poi.segment;
        let mut a = ctx.model().built_configuration(segment);
        a.fc_ksi = 9.0;
        let first = ctx.moment_capacity(&poi, AnalysisStage::Composite, true, Some(&a)).unwrap();

        // Stirrups are not flexural, the moment capacity survives
        let mut b = a.clone();
        b.stirrups.spacing_in = 6.0;
        let second = ctx.moment_capacity(&poi, AnalysisStage::Composite, true, Some(&b)).unwrap();
        assert!(Rc::ptr_eq(&first, &second));

        let mut c = a.clone();
        c.strands.straight_count += 4;
        let third = ctx.moment_capacity(&poi, AnalysisStage::Composite, true, Some(&c)).unwrap();
        assert!(!Rc::ptr_eq(&first, &third));
        assert!(third.mn_kip_ft > first.mn_kip_ft);

        // Built configuration results are separate from the candidate slot
        let built = ctx.moment_capacity(&poi, AnalysisStage::Composite, true, None).unwrap();
        assert!(!Rc::ptr_eq(&built, &third));
    }

    #[test]
    fn test_every_full_invalidation_clears_everything() {
        for event in ChangeEvent::ALL {
            if matches!(event, ChangeEvent::RatingSpecification | ChangeEvent::LoadModifiers) {
                continue;
            }
            let ctx = context();
            let poi = tenth(&ctx, 1, 4);
            ctx.shear_capacity(LimitState::StrengthI, &poi, None).unwrap();
            ctx.moment_capacity(&poi, AnalysisStage::Composite, true, None).unwrap();
            assert!(ctx.cached_result_count() > 0);
            ctx.notify(event);
            assert_eq!(ctx.cached_result_count(), 0, "{} left results behind", event);
        }
    }

    #[test]
    fn test_load_modifier_change_scope() {
        let ctx = context();
        let poi = tenth(&ctx, 1, 4);
        let moment = ctx.moment_capacity(&poi, AnalysisStage::Composite, true, None).unwrap();
        let shear = ctx.shear_capacity(LimitState::StrengthI, &poi, None).unwrap();
        ctx.on_load_modifiers_changed();
        let moment_again = ctx.moment_capacity(&poi, AnalysisStage::Composite, true, None).unwrap();
        let shear_again = ctx.shear_capacity(LimitState::StrengthI, &poi, None).unwrap();
        assert!(Rc::ptr_eq(&moment, &moment_again));
        assert!(!Rc::ptr_eq(&shear, &shear_again));
    }

    #[test]
    fn test_rating_specification_change_scope() {
        let ctx = context();
        let poi = tenth(&ctx, 1, 4);
        let design = ctx.shear_capacity(LimitState::StrengthI, &poi, None).unwrap();
        let rating = ctx.shear_capacity(LimitState::StrengthIInventory, &poi, None).unwrap();
        let service = ctx.shear_capacity(LimitState::ServiceIIIInventory, &poi, None).unwrap();
        ctx.on_rating_specification_changed();
        assert!(Rc::ptr_eq(&design, &ctx.shear_capacity(LimitState::StrengthI, &poi, None).unwrap()));
        assert!(Rc::ptr_eq(
            &service,
            &ctx.shear_capacity(LimitState::ServiceIIIInventory, &poi, None).unwrap()
        ));
        assert!(!Rc::ptr_eq(
            &rating,
            &ctx.shear_capacity(LimitState::StrengthIInventory, &poi, None).unwrap()
        ));
    }

    #[test]
    fn test_df_warning_posted_once_per_cycle() {
        let mut model = fixtures::four_girder_bridge();
        model.specification.roa_action = RangeOfApplicabilityAction::Ignore;
        let mut ctx = AnalysisContext::for_model(model);
        ctx.moment_df(SpanKey::new(0, 1), LimitState::StrengthI, None).unwrap();
        ctx.shear_df(SpanKey::new(0, 2), LimitState::StrengthI, None).unwrap();
        let warnings: Vec<_> = ctx.status().items_in(StatusCategory::LldfWarning).cloned().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, ROA_IGNORED_WARNING);

        ctx.edit_model(ChangeEvent::Specification, |m| {
            m.specification.df_method = DistributionFactorMethod::LeverRule;
        });
        assert!(ctx.status().is_empty());
        ctx.moment_df(SpanKey::new(0, 1), LimitState::StrengthI, None).unwrap();
        assert_eq!(ctx.status().items()[0].message, LEVER_RULE_WARNING);
    }

    #[test]
    fn test_prerequisite_failure_is_posted_and_propagated() {
        let mut model = fixtures::four_girder_bridge();
        model.spans[0].girders[2].section.ix_in4 *= 0.5;
        let ctx = AnalysisContext::for_model(model);
        assert!(ctx.moment_df(SpanKey::new(0, 1), LimitState::StrengthI, None).is_err());
        assert!(ctx.shear_df(SpanKey::new(0, 1), LimitState::StrengthI, None).is_err());
        assert_eq!(ctx.status().items_in(StatusCategory::RefinedAnalysis).count(), 1);
    }

    #[test]
    fn test_ignored_ranges_compute_factors_for_irregular_span() {
        let mut model = fixtures::four_girder_bridge();
        model.spans[0].girders[2].section.ix_in4 *= 0.5;
        model.specification.roa_action = RangeOfApplicabilityAction::Ignore;
        let ctx = AnalysisContext::for_model(model);
        let mg = ctx.moment_df(SpanKey::new(0, 1), LimitState::StrengthI, None).unwrap();
        assert!(mg > 0.0);
        assert!(ctx.shear_df(SpanKey::new(0, 2), LimitState::StrengthI, None).unwrap() > 0.0);
        assert_eq!(ctx.status().items_in(StatusCategory::RefinedAnalysis).count(), 0);
        let report = ctx.prerequisites(0).unwrap();
        assert!((report.stiffness_ratio - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_df_queries_match_engine() {
        let ctx = context();
        let key = SpanKey::new(0, 1);
        let details =
            compute_span_factors(ctx.model(), key, LimitStateClass::StrengthService, None).unwrap();
        assert_eq!(ctx.moment_df(key, LimitState::StrengthI, None).unwrap(), details.moment.controlling);
        assert_eq!(ctx.shear_df(key, LimitState::ServiceI, None).unwrap(), details.shear.controlling);
        let fatigue = ctx.moment_df(key, LimitState::FatigueI, None).unwrap();
        assert!(fatigue < details.moment.controlling);
        assert_eq!(ctx.skew_correction_for_moment(key, LimitState::StrengthI).unwrap(), None);
        let text = ctx.computation_description(key, LimitState::StrengthI).unwrap();
        assert!(text.contains("Span 1 Girder B"));
    }

    #[test]
    fn test_strength_states_share_critical_section() {
        let ctx = context();
        assert!(ctx.model().specification().edition >= SpecificationEdition::DV_ONLY_CRITICAL_SECTION);
        let girder = GirderKey::new(0, 1);
        let one = ctx.critical_sections(LimitState::StrengthI, girder, None).unwrap();
        let two = ctx.critical_sections(LimitState::StrengthII, girder, None).unwrap();
        assert!(Rc::ptr_eq(&one, &two));
        assert_eq!(one.len(), 2);
        assert!(one.iter().all(|cs| !cs.is_uplift()));
    }

    #[test]
    fn test_uplift_from_negative_reaction() {
        let mut model = fixtures::four_girder_bridge();
        model.reaction_overrides.push(ReactionOverride {
            pier: PierKey::new(0, 1),
            dead_load_kip: -20.0,
        });
        let ctx = AnalysisContext::for_model(model);
        let sections = ctx.critical_sections(LimitState::StrengthI, GirderKey::new(0, 1), None).unwrap();
        assert!(sections[0].is_uplift());
        assert!(!sections[1].is_uplift());
    }

    #[test]
    fn test_critical_section_failure_is_posted() {
        let mut model = fixtures::four_girder_bridge();
        // dv exceeds every distance from the face on a 4 ft span
        model.spans[0].length_ft = 4.0;
        let ctx = AnalysisContext::for_model(model);
        let result = ctx.critical_sections(LimitState::StrengthI, GirderKey::new(0, 1), None);
        assert!(result.is_err());
        assert_eq!(ctx.status().items_in(StatusCategory::CriticalSection).count(), 1);
    }

    #[test]
    fn test_edit_model_invalidates() {
        let mut ctx = context();
        let poi = tenth(&ctx, 1, 5);
        let before = ctx.moment_capacity(&poi, AnalysisStage::Composite, true, None).unwrap();
        ctx.edit_model(ChangeEvent::Bridge, |m| m.deck.thickness_in = 9.0);
        let after = ctx.moment_capacity(&poi, AnalysisStage::Composite, true, None).unwrap();
        assert!(after.mn_kip_ft > before.mn_kip_ft);
        assert_eq!(ctx.model().deck_thickness_in(), 9.0);
    }
}
