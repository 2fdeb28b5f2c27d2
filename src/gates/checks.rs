use crate::evidence::DimensionEvidence;
use crate::types::config::{
    LegalGateThresholds, MarketGateThresholds, TeamGateThresholds, TechGateThresholds,
};
use crate::types::evidence::{Marker, ValidationStage};
use crate::types::report::Blocker;
use crate::types::scoring::{Dimension, DimensionScore};

pub const TEAM_TECH_FIT: &str = "team_tech_fit";
pub const NAMED_OPERATORS: &str = "named_operators";
pub const TECHNICAL_LEADS: &str = "technical_leads";

/// Everything a gate may look at for one initiative: its dimension score and evidence counts.
#[derive(Debug, Clone, Copy)]
pub struct GateInputs<'a> {
    pub dimension: Dimension,
    pub score: Option<&'a DimensionScore>,
    pub evidence: &'a DimensionEvidence,
}

impl GateInputs<'_> {
    fn score_blocker(&self, minimum: f64) -> Option<Blocker> {
        match self.score {
            None => Some(Blocker::DimensionNotScored(self.dimension)),
            Some(scored) if scored.score < minimum => {
                Some(Blocker::DimensionBelowThreshold(self.dimension))
            }
            Some(_) => None,
        }
    }

    fn qualifying_blocker(&self, minimum: u32) -> Option<Blocker> {
        below(self.evidence.qualifying_count, minimum)
            .then_some(Blocker::InsufficientQualifyingEvidence)
    }

    fn diversity_blocker(&self, minimum: u32) -> Option<Blocker> {
        below(self.evidence.qualifying_source_classes.len(), minimum)
            .then_some(Blocker::InsufficientSourceDiversity)
    }
}

fn below(count: usize, minimum: u32) -> bool {
    count < minimum as usize
}

pub fn team(inputs: &GateInputs<'_>, thresholds: &TeamGateThresholds) -> Vec<Blocker> {
    let mut blockers = Vec::new();
    blockers.extend(inputs.score_blocker(thresholds.team_dd_min));

    let fit = inputs
        .score
        .and_then(|scored| scored.component(TEAM_TECH_FIT))
        .map(|contribution| contribution.score);
    if fit.map_or(true, |score| score < thresholds.team_tech_fit_min) {
        blockers.push(Blocker::TeamTechFitBelowThreshold);
    }
    if below(
        inputs.evidence.component_count(NAMED_OPERATORS),
        thresholds.min_named_operators,
    ) {
        blockers.push(Blocker::InsufficientNamedOperators);
    }
    if below(
        inputs.evidence.component_count(TECHNICAL_LEADS),
        thresholds.min_technical_leads,
    ) {
        blockers.push(Blocker::InsufficientTechnicalLeads);
    }
    blockers.extend(inputs.qualifying_blocker(thresholds.min_qualifying_evidence));
    blockers
}

pub fn tech(inputs: &GateInputs<'_>, thresholds: &TechGateThresholds) -> Vec<Blocker> {
    let mut blockers = Vec::new();
    blockers.extend(inputs.score_blocker(thresholds.tech_dd_min));
    blockers.extend(inputs.diversity_blocker(thresholds.min_source_classes));
    blockers.extend(inputs.qualifying_blocker(thresholds.min_qualifying_evidence));
    if thresholds.require_hard_proof_artifact
        && !inputs.evidence.has_marker(Marker::HardProofArtifact)
    {
        blockers.push(Blocker::MissingHardProofArtifact);
    }
    blockers
}

pub fn market(inputs: &GateInputs<'_>, thresholds: &MarketGateThresholds) -> Vec<Blocker> {
    let mut blockers = Vec::new();
    blockers.extend(inputs.score_blocker(thresholds.market_dd_min));
    let stage = inputs
        .evidence
        .highest_stage
        .unwrap_or(ValidationStage::Unvalidated);
    if stage < thresholds.min_stage {
        blockers.push(Blocker::ValidationStageBelowMinimum);
    }
    blockers.extend(inputs.diversity_blocker(thresholds.min_source_classes));
    blockers.extend(inputs.qualifying_blocker(thresholds.min_qualifying_evidence));
    blockers
}

pub fn legal(inputs: &GateInputs<'_>, thresholds: &LegalGateThresholds) -> Vec<Blocker> {
    let evidence = inputs.evidence;
    let mut blockers = Vec::new();
    blockers.extend(inputs.score_blocker(thresholds.legal_dd_min));
    if thresholds.require_entity_known && !evidence.has_marker(Marker::EntityKnown) {
        blockers.push(Blocker::EntityStatusUnknown);
    }
    if thresholds.require_ip_known && !evidence.has_marker(Marker::IpKnown) {
        blockers.push(Blocker::IpOwnershipUnknown);
    }
    if thresholds.forbid_critical_conflict && evidence.has_marker(Marker::CriticalConflict) {
        blockers.push(Blocker::CriticalLegalConflict);
    }
    blockers.extend(inputs.qualifying_blocker(thresholds.min_qualifying_evidence));
    blockers
}
