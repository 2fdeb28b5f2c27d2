use crate::types::scoring::{Dimension, EvidenceId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitiativeStatus {
    Active,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initiative {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: InitiativeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLevel {
    Low,
    Medium,
    High,
}

/// Either a coarse level or a raw quality in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Strength {
    Level(StrengthLevel),
    Quality(f64),
}

impl Strength {
    pub fn quality(self) -> f64 {
        match self {
            Self::Level(StrengthLevel::Low) => 0.35,
            Self::Level(StrengthLevel::Medium) => 0.60,
            Self::Level(StrengthLevel::High) => 0.90,
            Self::Quality(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceClass {
    OfficialDirectory,
    Github,
    Linkedin,
    ManualDd,
    Website,
    PublicSignals,
    PeopleMarkdown,
    SeedMarkdown,
    Research,
    Unclassified,
}

impl SourceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OfficialDirectory => "official_directory",
            Self::Github => "github",
            Self::Linkedin => "linkedin",
            Self::ManualDd => "manual_dd",
            Self::Website => "website",
            Self::PublicSignals => "public_signals",
            Self::PeopleMarkdown => "people_markdown",
            Self::SeedMarkdown => "seed_markdown",
            Self::Research => "research",
            Self::Unclassified => "unclassified",
        }
    }
}

/// Source-specific payload. Scoring only ever sees `source_class()` and `reference()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source_class", rename_all = "snake_case")]
pub enum Provenance {
    OfficialDirectory {
        directory: String,
        #[serde(default)]
        listing_url: Option<String>,
    },
    Github {
        repository: String,
        #[serde(default)]
        metric: Option<String>,
    },
    Linkedin {
        profile_url: String,
    },
    ManualDd {
        document: String,
        #[serde(default)]
        reviewer: Option<String>,
    },
    Website {
        url: String,
    },
    PublicSignals {
        url: String,
    },
    PeopleMarkdown {
        path: String,
    },
    SeedMarkdown {
        path: String,
    },
    Research {
        reference: String,
    },
    #[serde(other)]
    Unclassified,
}

impl Provenance {
    pub fn source_class(&self) -> SourceClass {
        match self {
            Self::OfficialDirectory { .. } => SourceClass::OfficialDirectory,
            Self::Github { .. } => SourceClass::Github,
            Self::Linkedin { .. } => SourceClass::Linkedin,
            Self::ManualDd { .. } => SourceClass::ManualDd,
            Self::Website { .. } => SourceClass::Website,
            Self::PublicSignals { .. } => SourceClass::PublicSignals,
            Self::PeopleMarkdown { .. } => SourceClass::PeopleMarkdown,
            Self::SeedMarkdown { .. } => SourceClass::SeedMarkdown,
            Self::Research { .. } => SourceClass::Research,
            Self::Unclassified => SourceClass::Unclassified,
        }
    }

    pub fn reference(&self) -> &str {
        match self {
            Self::OfficialDirectory {
                listing_url: Some(url),
                ..
            } => url,
            Self::OfficialDirectory { directory, .. } => directory,
            Self::Github { repository, .. } => repository,
            Self::Linkedin { profile_url } => profile_url,
            Self::ManualDd { document, .. } => document,
            Self::Website { url } | Self::PublicSignals { url } => url,
            Self::PeopleMarkdown { path } | Self::SeedMarkdown { path } => path,
            Self::Research { reference } => reference,
            Self::Unclassified => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    HardProofArtifact,
    EntityKnown,
    IpKnown,
    CriticalConflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    #[serde(rename = "none")]
    Unvalidated,
    Interviews,
    Loi,
    Pilot,
    PaidPilot,
    RepeatRevenue,
}

/// Evidence exactly as supplied by a collection process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub initiative_id: u64,
    pub dimension: String,
    pub component_key: String,
    pub strength: Strength,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub validation_stage: Option<ValidationStage>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedRating {
    pub initiative_id: u64,
    pub dimension: String,
    pub seed_value: f64,
}

/// A snapshot entry that could not be read as a record. It is skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiative_id: Option<u64>,
    pub detail: String,
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    initiatives: Vec<Initiative>,
    #[serde(default)]
    evidence: Vec<Value>,
    #[serde(default)]
    seed_ratings: Vec<Value>,
}

/// Entries are read one by one, so a malformed record only costs itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct Snapshot {
    pub initiatives: Vec<Initiative>,
    pub evidence: Vec<EvidenceRecord>,
    pub seed_ratings: Vec<SeedRating>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedRecord>,
}

impl From<RawSnapshot> for Snapshot {
    fn from(raw: RawSnapshot) -> Self {
        let mut rejected = Vec::new();
        let evidence = read_entries(raw.evidence, "evidence", &mut rejected);
        let seed_ratings = read_entries(raw.seed_ratings, "seed rating", &mut rejected);
        Self {
            initiatives: raw.initiatives,
            evidence,
            seed_ratings,
            rejected,
        }
    }
}

fn read_entries<T: DeserializeOwned>(
    values: Vec<Value>,
    label: &str,
    rejected: &mut Vec<RejectedRecord>,
) -> Vec<T> {
    let mut entries = Vec::with_capacity(values.len());
    for (position, value) in values.into_iter().enumerate() {
        let initiative_id = value.get("initiative_id").and_then(Value::as_u64);
        match serde_json::from_value(value) {
            Ok(entry) => entries.push(entry),
            Err(e) => rejected.push(RejectedRecord {
                initiative_id,
                detail: format!("{label} entry {position} is malformed: {e}"),
            }),
        }
    }
    entries
}

/// A record accepted into the evidence store: dimension resolved, quality checked.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceItem {
    pub id: EvidenceId,
    pub initiative_id: u64,
    pub dimension: Dimension,
    pub component_key: String,
    pub quality: f64,
    pub snippet: String,
    pub markers: Vec<Marker>,
    pub validation_stage: Option<ValidationStage>,
    pub provenance: Provenance,
}

impl EvidenceItem {
    pub fn source_class(&self) -> SourceClass {
        self.provenance.source_class()
    }

    /// Two items with the same key describe the same observation.
    pub fn dedupe_key(&self) -> (SourceClass, String, String) {
        (
            self.source_class(),
            self.provenance.reference().trim().to_lowercase(),
            self.snippet.trim().to_lowercase(),
        )
    }
}
