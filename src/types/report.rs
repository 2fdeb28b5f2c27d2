use crate::types::evidence::{Initiative, ValidationStage};
use crate::types::scoring::{Dimension, DimensionScore, LensScore, Score};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GateName {
    A,
    B,
    C,
    D,
}

impl GateName {
    pub const ALL: [GateName; 4] = [GateName::A, GateName::B, GateName::C, GateName::D];

    pub fn dimension(self) -> Dimension {
        match self {
            Self::A => Dimension::TeamDd,
            Self::B => Dimension::TechDd,
            Self::C => Dimension::MarketDd,
            Self::D => Dimension::LegalDd,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::A => "team",
            Self::B => "tech",
            Self::C => "market",
            Self::D => "legal/ip",
        }
    }
}

impl fmt::Display for GateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    Pass,
    Fail,
}

/// A failed sub-condition of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Blocker {
    DimensionNotScored(Dimension),
    DimensionBelowThreshold(Dimension),
    TeamTechFitBelowThreshold,
    InsufficientNamedOperators,
    InsufficientTechnicalLeads,
    InsufficientQualifyingEvidence,
    InsufficientSourceDiversity,
    MissingHardProofArtifact,
    ValidationStageBelowMinimum,
    EntityStatusUnknown,
    IpOwnershipUnknown,
    CriticalLegalConflict,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionNotScored(dimension) => write!(f, "{dimension}_not_scored"),
            Self::DimensionBelowThreshold(dimension) => write!(f, "{dimension}_below_threshold"),
            Self::TeamTechFitBelowThreshold => f.write_str("team_tech_fit_below_threshold"),
            Self::InsufficientNamedOperators => f.write_str("insufficient_named_operators"),
            Self::InsufficientTechnicalLeads => f.write_str("insufficient_technical_leads"),
            Self::InsufficientQualifyingEvidence => {
                f.write_str("insufficient_qualifying_evidence")
            }
            Self::InsufficientSourceDiversity => f.write_str("insufficient_source_diversity"),
            Self::MissingHardProofArtifact => f.write_str("missing_hard_proof_artifact"),
            Self::ValidationStageBelowMinimum => f.write_str("validation_stage_below_minimum"),
            Self::EntityStatusUnknown => f.write_str("entity_status_unknown"),
            Self::IpOwnershipUnknown => f.write_str("ip_ownership_unknown"),
            Self::CriticalLegalConflict => f.write_str("critical_legal_conflict"),
        }
    }
}

impl Serialize for Blocker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateResult {
    pub initiative_id: u64,
    pub gate: GateName,
    pub status: GateStatus,
    pub blockers: Vec<Blocker>,
    pub reason: String,
}

impl GateResult {
    pub const PASS_REASON: &'static str = "pass";

    pub fn from_blockers(initiative_id: u64, gate: GateName, blockers: Vec<Blocker>) -> Self {
        if blockers.is_empty() {
            return Self {
                initiative_id,
                gate,
                status: GateStatus::Pass,
                blockers,
                reason: Self::PASS_REASON.to_string(),
            };
        }
        let listed = blockers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            initiative_id,
            gate,
            status: GateStatus::Fail,
            reason: format!("Gate {gate} failed: {listed}"),
            blockers,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == GateStatus::Pass
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MalformedRecord,
    UnknownInitiative,
    UnknownDimension,
    UnknownComponent,
    StrengthOutOfRange,
    SeedOutOfRange,
    DuplicateSeed,
    SeedNotApplied,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiative_id: Option<u64>,
    pub kind: WarningKind,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitiativeReport {
    pub initiative: Initiative,
    pub dimensions: Vec<DimensionScore>,
    pub market_validation_stage: Option<ValidationStage>,
    pub lenses: Vec<LensScore>,
    pub gates: Vec<GateResult>,
    pub warnings: Vec<DataWarning>,
}

impl InitiativeReport {
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions
            .iter()
            .find(|score| score.dimension == dimension)
    }

    pub fn lens(&self, name: &str) -> Option<&LensScore> {
        self.lenses.iter().find(|lens| lens.lens == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    /// Wall-clock time of the run; the only field allowed to differ between identical runs.
    pub generated_at: String,
    pub snapshot_version: String,
    pub initiatives: Vec<InitiativeReport>,
    /// Inconsistencies that could not be attributed to a known initiative.
    pub warnings: Vec<DataWarning>,
}

impl ScoreReport {
    pub fn initiative(&self, initiative_id: u64) -> Option<&InitiativeReport> {
        self.initiatives
            .iter()
            .find(|report| report.initiative.id == initiative_id)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
            + self
                .initiatives
                .iter()
                .map(|report| report.warnings.len())
                .sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitiativeGates {
    pub initiative_id: u64,
    pub name: String,
    pub gates: Vec<GateResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateListing {
    pub snapshot_version: String,
    pub initiatives: Vec<InitiativeGates>,
}

impl GateListing {
    pub fn from_report(report: &ScoreReport, only: Option<u64>) -> Self {
        Self {
            snapshot_version: report.snapshot_version.clone(),
            initiatives: report
                .initiatives
                .iter()
                .filter(|initiative| only.map_or(true, |id| initiative.initiative.id == id))
                .map(|initiative| InitiativeGates {
                    initiative_id: initiative.initiative.id,
                    name: initiative.initiative.name.clone(),
                    gates: initiative.gates.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankRow {
    pub rank: usize,
    pub initiative_id: u64,
    pub name: String,
    pub university: String,
    pub score: Score,
    pub confidence: f64,
    pub shown: BTreeMap<String, Option<Score>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankListing {
    pub lens: String,
    pub top_n: usize,
    pub eligible: usize,
    pub rows: Vec<RankRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationEntry {
    pub dimension: Dimension,
    pub component_key: String,
    pub weighted_contribution: f64,
    pub confidence: f64,
    pub provenance_tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Explanation {
    Scored {
        initiative_id: u64,
        dimension: Dimension,
        score: Score,
        confidence: f64,
        entries: Vec<ExplanationEntry>,
    },
    NotScored {
        initiative_id: u64,
        dimension: Dimension,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockerCount {
    pub blocker: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateSummary {
    pub gate: GateName,
    pub evaluated: usize,
    pub passed: usize,
    pub pass_rate: f64,
    pub top_blockers: Vec<BlockerCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub dimension: Dimension,
    pub scored: usize,
    pub min: Score,
    pub median: Score,
    pub max: Score,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualitySummary {
    pub initiatives: usize,
    pub gates: Vec<GateSummary>,
    pub all_gates_zero_pass: bool,
    pub distributions: Vec<Distribution>,
    pub initiatives_with_warnings: usize,
    pub warning_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_gate_reason_lists_every_blocker() {
        let result = GateResult::from_blockers(
            4,
            GateName::B,
            vec![
                Blocker::DimensionBelowThreshold(Dimension::TechDd),
                Blocker::InsufficientSourceDiversity,
            ],
        );
        assert_eq!(result.status, GateStatus::Fail);
        assert_eq!(
            result.reason,
            "Gate B failed: tech_dd_below_threshold, insufficient_source_diversity"
        );
    }

    #[test]
    fn passing_gate_uses_pass_sentinel() {
        let result = GateResult::from_blockers(4, GateName::D, Vec::new());
        assert!(result.passed());
        assert_eq!(result.reason, GateResult::PASS_REASON);
    }

    #[test]
    fn blockers_serialize_as_names() {
        let rendered =
            serde_json::to_string(&Blocker::DimensionNotScored(Dimension::LegalDd)).expect("json");
        assert_eq!(rendered, "\"legal_dd_not_scored\"");
    }
}
