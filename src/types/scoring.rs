use crate::error::ScoutError;
use crate::types::evidence::SourceClass;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type Score = f64;

pub const MAX_SCORE: Score = 5.0;
pub const DISPLAY_PRECISION: i32 = 4;

/// Rounds to `DISPLAY_PRECISION` decimal places for reproducible display.
pub fn round_display(value: f64) -> f64 {
    let factor = 10f64.powi(DISPLAY_PRECISION);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    TechDepth,
    TeamStrength,
    MarketOpportunity,
    Maturity,
    #[serde(rename = "actionability_0_6m")]
    Actionability,
    SupportFit,
    TeamDd,
    TechDd,
    MarketDd,
    ExecutionDd,
    LegalDd,
}

impl Dimension {
    pub const ALL: [Dimension; 11] = [
        Dimension::TechDepth,
        Dimension::TeamStrength,
        Dimension::MarketOpportunity,
        Dimension::Maturity,
        Dimension::Actionability,
        Dimension::SupportFit,
        Dimension::TeamDd,
        Dimension::TechDd,
        Dimension::MarketDd,
        Dimension::ExecutionDd,
        Dimension::LegalDd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TechDepth => "tech_depth",
            Self::TeamStrength => "team_strength",
            Self::MarketOpportunity => "market_opportunity",
            Self::Maturity => "maturity",
            Self::Actionability => "actionability_0_6m",
            Self::SupportFit => "support_fit",
            Self::TeamDd => "team_dd",
            Self::TechDd => "tech_dd",
            Self::MarketDd => "market_dd",
            Self::ExecutionDd => "execution_dd",
            Self::LegalDd => "legal_dd",
        }
    }

    pub fn family(self) -> DimensionFamily {
        match self {
            Self::TeamDd | Self::TechDd | Self::MarketDd | Self::ExecutionDd | Self::LegalDd => {
                DimensionFamily::DueDiligence
            }
            _ => DimensionFamily::Legacy,
        }
    }

    pub fn no_evidence_policy(self) -> NoEvidencePolicy {
        self.family().no_evidence_policy()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = ScoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|dimension| dimension.as_str() == normalized)
            .ok_or_else(|| ScoutError::UnknownDimension(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionFamily {
    Legacy,
    DueDiligence,
}

impl DimensionFamily {
    pub fn no_evidence_policy(self) -> NoEvidencePolicy {
        match self {
            Self::Legacy => NoEvidencePolicy::ZeroContribution,
            Self::DueDiligence => NoEvidencePolicy::FloorWithPenalty,
        }
    }
}

/// How a component without evidence enters its dimension's weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoEvidencePolicy {
    /// Contribution is forced to 0; the floor score is kept for display only.
    ZeroContribution,
    /// The floor score contributes like any other value; confidence carries the penalty.
    FloorWithPenalty,
}

/// Position of an evidence record in the loaded snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub dimension: Dimension,
    pub component_key: String,
    pub score: Score,
    pub confidence: f64,
    pub source_classes: Vec<SourceClass>,
    pub evidence: Vec<EvidenceId>,
}

impl ComponentScore {
    pub fn has_evidence(&self) -> bool {
        !self.evidence.is_empty()
    }

    pub fn provenance_tag(&self) -> String {
        if self.source_classes.is_empty() {
            return "no_evidence".to_string();
        }
        self.source_classes
            .iter()
            .map(|class| class.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub component_key: String,
    pub weight: f64,
    pub score: Score,
    pub weighted_contribution: f64,
    pub confidence: f64,
    pub provenance_tag: String,
    pub evidence: Vec<EvidenceId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub policy: NoEvidencePolicy,
    /// Evidence-only score, before the seed bridge.
    pub computed_score: Score,
    pub seed_rating: Option<f64>,
    pub score: Score,
    pub confidence: f64,
    /// Sorted by weighted contribution, highest first.
    pub contributions: Vec<Contribution>,
}

impl DimensionScore {
    pub fn component(&self, key: &str) -> Option<&Contribution> {
        self.contributions
            .iter()
            .find(|contribution| contribution.component_key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LensOutcome {
    Scored { score: Score, confidence: f64 },
    Unavailable { missing: Vec<Dimension> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LensScore {
    pub lens: String,
    #[serde(flatten)]
    pub outcome: LensOutcome,
}

impl LensScore {
    pub fn score(&self) -> Option<Score> {
        match self.outcome {
            LensOutcome::Scored { score, .. } => Some(score),
            LensOutcome::Unavailable { .. } => None,
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        match self.outcome {
            LensOutcome::Scored { confidence, .. } => Some(confidence),
            LensOutcome::Unavailable { .. } => None,
        }
    }
}
