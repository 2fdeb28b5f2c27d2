use crate::error::ScoutError;
use crate::types::evidence::ValidationStage;
use crate::types::scoring::{Dimension, MAX_SCORE};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

pub const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Built-in layer every other config file is merged over.
pub const DEFAULT_CONFIG: &str = r#"
[scoring]
no_evidence_floor = 1.0
no_evidence_confidence_penalty = 0.12
seed_bridge_cap = 0.4
quality_threshold = 0.55

[dimensions.tech_depth.components]
technology_domains = 0.40
github_activity = 0.35
research_output = 0.25

[dimensions.team_strength.components]
team_size = 0.30
leadership_roles = 0.40
external_presence = 0.30

[dimensions.market_opportunity.components]
market_domains = 0.40
commercial_mentions = 0.35
industry_partners = 0.25

[dimensions.maturity.components]
prototype_stage = 0.45
years_active = 0.25
competition_results = 0.30

[dimensions.actionability_0_6m.components]
reachable_contacts = 0.50
recent_activity = 0.30
open_asks = 0.20

[dimensions.support_fit.components]
support_needs = 0.60
domain_alignment = 0.40

[dimensions.team_dd.components]
named_operators = 0.30
technical_leads = 0.20
team_tech_fit = 0.35
commitment = 0.15

[dimensions.tech_dd.components]
quality = 0.35
performance = 0.25
scalability = 0.25
moat_signal = 0.15

[dimensions.market_dd.components]
validation_stage = 0.60
icp_pricing_clarity = 0.25
sales_cycle_realism = 0.15

[dimensions.execution_dd.components]
tech_outcomes = 0.50
market_outcomes = 0.50

[dimensions.legal_dd.components]
entity_ip_basics = 0.70
compliance_risk = 0.30

[lenses.outreach_now]
shown = ["team_strength", "market_opportunity", "support_fit"]

[lenses.outreach_now.weights]
actionability_0_6m = 0.30
team_strength = 0.25
market_opportunity = 0.20
support_fit = 0.15
tech_depth = 0.10

[lenses.venture_upside]
shown = ["tech_depth", "market_opportunity", "team_strength"]

[lenses.venture_upside.weights]
tech_depth = 0.35
market_opportunity = 0.30
team_strength = 0.20
maturity = 0.10
support_fit = 0.05

[lenses.conviction]
shown = ["team_dd", "tech_dd", "market_dd"]

[lenses.conviction.weights]
team_dd = 0.32
tech_dd = 0.28
market_dd = 0.25
execution_dd = 0.10
legal_dd = 0.05

[gates.a]
team_dd_min = 3.2
team_tech_fit_min = 3.5
min_named_operators = 2
min_technical_leads = 1
min_qualifying_evidence = 2

[gates.b]
tech_dd_min = 3.0
min_source_classes = 2
min_qualifying_evidence = 2
require_hard_proof_artifact = true

[gates.c]
market_dd_min = 3.0
min_stage = "loi"
min_source_classes = 2
min_qualifying_evidence = 2

[gates.d]
legal_dd_min = 2.5
require_entity_known = true
require_ip_known = true
forbid_critical_conflict = true
min_qualifying_evidence = 1
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct ScoutConfig {
    pub scoring: ScoringSettings,
    pub dimensions: BTreeMap<String, DimensionConfig>,
    pub lenses: BTreeMap<String, LensConfig>,
    pub gates: GateThresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScoringSettings {
    pub no_evidence_floor: f64,
    pub no_evidence_confidence_penalty: f64,
    pub seed_bridge_cap: f64,
    pub quality_threshold: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            no_evidence_floor: 1.0,
            no_evidence_confidence_penalty: 0.12,
            seed_bridge_cap: 0.4,
            quality_threshold: 0.55,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DimensionConfig {
    pub components: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LensConfig {
    pub weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub shown: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GateThresholds {
    pub a: TeamGateThresholds,
    pub b: TechGateThresholds,
    pub c: MarketGateThresholds,
    pub d: LegalGateThresholds,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamGateThresholds {
    pub team_dd_min: f64,
    pub team_tech_fit_min: f64,
    pub min_named_operators: u32,
    pub min_technical_leads: u32,
    pub min_qualifying_evidence: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TechGateThresholds {
    pub tech_dd_min: f64,
    pub min_source_classes: u32,
    pub min_qualifying_evidence: u32,
    pub require_hard_proof_artifact: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketGateThresholds {
    pub market_dd_min: f64,
    pub min_stage: ValidationStage,
    pub min_source_classes: u32,
    pub min_qualifying_evidence: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegalGateThresholds {
    pub legal_dd_min: f64,
    pub require_entity_known: bool,
    pub require_ip_known: bool,
    pub forbid_critical_conflict: bool,
    pub min_qualifying_evidence: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentWeight {
    pub key: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lens {
    pub name: String,
    pub weights: Vec<(Dimension, f64)>,
    pub shown: Vec<Dimension>,
}

/// Validated, immutable configuration handed to every scoring function.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringModel {
    pub settings: ScoringSettings,
    pub dimensions: BTreeMap<Dimension, Vec<ComponentWeight>>,
    pub lenses: BTreeMap<String, Lens>,
    pub gates: GateThresholds,
}

impl ScoringModel {
    pub fn components(&self, dimension: Dimension) -> Option<&[ComponentWeight]> {
        self.dimensions.get(&dimension).map(Vec::as_slice)
    }

    pub fn has_component(&self, dimension: Dimension, key: &str) -> bool {
        self.components(dimension)
            .map(|components| components.iter().any(|component| component.key == key))
            .unwrap_or(false)
    }

    pub fn lens(&self, name: &str) -> Result<&Lens, ScoutError> {
        self.lenses
            .get(name)
            .ok_or_else(|| ScoutError::UnknownLens(name.to_string()))
    }
}

impl ScoutConfig {
    pub fn validate(&self) -> Result<ScoringModel, ScoutError> {
        let settings = self.scoring;
        check_range(
            "scoring.no_evidence_floor",
            settings.no_evidence_floor,
            0.0,
            MAX_SCORE,
        )?;
        check_unit(
            "scoring.no_evidence_confidence_penalty",
            settings.no_evidence_confidence_penalty,
        )?;
        check_unit("scoring.seed_bridge_cap", settings.seed_bridge_cap)?;
        check_unit("scoring.quality_threshold", settings.quality_threshold)?;

        let unknown = self
            .dimensions
            .keys()
            .filter(|key| key.parse::<Dimension>().is_err())
            .cloned()
            .collect::<Vec<_>>();
        if !unknown.is_empty() {
            return Err(ScoutError::Config(format!(
                "dimensions contains unknown dimension(s): {}",
                unknown.join(", ")
            )));
        }

        let mut dimensions = BTreeMap::new();
        for (name, dimension_config) in &self.dimensions {
            let dimension = name.parse::<Dimension>()?;
            let path = format!("dimensions.{name}.components");
            check_weight_vector(&path, &dimension_config.components)?;
            let components = dimension_config
                .components
                .iter()
                .map(|(key, weight)| ComponentWeight {
                    key: key.clone(),
                    weight: *weight,
                })
                .collect::<Vec<_>>();
            dimensions.insert(dimension, components);
        }

        let mut lenses = BTreeMap::new();
        for (name, lens_config) in &self.lenses {
            lenses.insert(name.clone(), validate_lens(name, lens_config)?);
        }

        self.validate_gates()?;

        Ok(ScoringModel {
            settings,
            dimensions,
            lenses,
            gates: self.gates.clone(),
        })
    }

    fn validate_gates(&self) -> Result<(), ScoutError> {
        let gates = &self.gates;
        check_range("gates.a.team_dd_min", gates.a.team_dd_min, 0.0, MAX_SCORE)?;
        check_range(
            "gates.a.team_tech_fit_min",
            gates.a.team_tech_fit_min,
            0.0,
            MAX_SCORE,
        )?;
        check_range("gates.b.tech_dd_min", gates.b.tech_dd_min, 0.0, MAX_SCORE)?;
        check_range("gates.c.market_dd_min", gates.c.market_dd_min, 0.0, MAX_SCORE)?;
        check_range("gates.d.legal_dd_min", gates.d.legal_dd_min, 0.0, MAX_SCORE)?;
        Ok(())
    }
}

fn validate_lens(name: &str, lens_config: &LensConfig) -> Result<Lens, ScoutError> {
    let path = format!("lenses.{name}.weights");
    let unknown = lens_config
        .weights
        .keys()
        .chain(lens_config.shown.iter())
        .filter(|key| key.parse::<Dimension>().is_err())
        .cloned()
        .collect::<Vec<_>>();
    if !unknown.is_empty() {
        return Err(ScoutError::Config(format!(
            "lenses.{name} references unknown dimension(s): {}",
            unknown.join(", ")
        )));
    }
    check_weight_vector(&path, &lens_config.weights)?;

    let mut weights = lens_config
        .weights
        .iter()
        .map(|(key, weight)| key.parse::<Dimension>().map(|dimension| (dimension, *weight)))
        .collect::<Result<Vec<_>, _>>()?;
    weights.sort_by_key(|(dimension, _)| *dimension);

    let mut seen = HashSet::new();
    let mut shown = Vec::new();
    for key in &lens_config.shown {
        let dimension = key.parse::<Dimension>()?;
        if !seen.insert(dimension) {
            return Err(ScoutError::Config(format!(
                "lenses.{name}.shown contains duplicate dimension: {key}"
            )));
        }
        shown.push(dimension);
    }

    Ok(Lens {
        name: name.to_string(),
        weights,
        shown,
    })
}

fn check_weight_vector(path: &str, weights: &BTreeMap<String, f64>) -> Result<(), ScoutError> {
    if weights.is_empty() {
        return Err(ScoutError::Config(format!("{path} must not be empty")));
    }
    if let Some((key, _)) = weights
        .iter()
        .find(|(_, weight)| !(0.0..=1.0).contains(*weight))
    {
        return Err(ScoutError::Config(format!(
            "{path}.{key} must be between 0.0 and 1.0"
        )));
    }
    let weight_sum: f64 = weights.values().sum();
    if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ScoutError::Config(format!(
            "{path} must sum to 1.0 (found {weight_sum:.3})"
        )));
    }
    Ok(())
}

fn check_unit(key: &str, value: f64) -> Result<(), ScoutError> {
    check_range(key, value, 0.0, 1.0)
}

fn check_range(key: &str, value: f64, min: f64, max: f64) -> Result<(), ScoutError> {
    if !(min..=max).contains(&value) {
        return Err(ScoutError::Config(format!(
            "{key} must be between {min:.1} and {max:.1}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ScoutConfig {
        toml::from_str(DEFAULT_CONFIG).expect("default config should parse")
    }

    #[test]
    fn default_config_validates() {
        let model = defaults().validate().expect("defaults should validate");
        assert_eq!(model.dimensions.len(), Dimension::ALL.len());
        assert_eq!(model.lenses.len(), 3);
        assert_eq!(model.settings, ScoringSettings::default());
        assert_eq!(model.gates.c.min_stage, ValidationStage::Loi);
    }

    #[test]
    fn default_weight_vectors_sum_to_one() {
        let model = defaults().validate().expect("defaults should validate");
        for components in model.dimensions.values() {
            let sum: f64 = components.iter().map(|component| component.weight).sum();
            assert!((sum - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        }
        for lens in model.lenses.values() {
            let sum: f64 = lens.weights.iter().map(|(_, weight)| weight).sum();
            assert!((sum - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        }
    }

    #[test]
    fn validate_rejects_component_weights_not_summing_to_one() {
        let mut cfg = defaults();
        cfg.dimensions
            .get_mut("team_dd")
            .expect("team_dd configured")
            .components
            .insert("commitment".to_string(), 0.05);
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.is_config());
        assert!(err
            .to_string()
            .contains("dimensions.team_dd.components must sum to 1.0 (found 0.900)"));
    }

    #[test]
    fn validate_rejects_lens_weights_not_summing_to_one() {
        let mut cfg = defaults();
        cfg.lenses
            .get_mut("conviction")
            .expect("conviction configured")
            .weights
            .insert("legal_dd".to_string(), 0.50);
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("lenses.conviction.weights"));
    }

    #[test]
    fn validate_rejects_unknown_dimension_keys() {
        let mut cfg = defaults();
        cfg.dimensions.insert(
            "charisma".to_string(),
            DimensionConfig {
                components: BTreeMap::from([("smile".to_string(), 1.0)]),
            },
        );
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("unknown dimension(s): charisma"));
    }

    #[test]
    fn validate_rejects_unknown_lens_dimension() {
        let mut cfg = defaults();
        cfg.lenses
            .get_mut("outreach_now")
            .expect("outreach configured")
            .shown
            .push("hype".to_string());
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("lenses.outreach_now"));
        assert!(err.to_string().contains("hype"));
    }

    #[test]
    fn validate_rejects_out_of_range_floor_and_cap() {
        let mut cfg = defaults();
        cfg.scoring.no_evidence_floor = 5.5;
        let err = cfg.validate().expect_err("floor above 5 should fail");
        assert!(err.to_string().contains("scoring.no_evidence_floor"));

        let mut cfg = defaults();
        cfg.scoring.seed_bridge_cap = 1.2;
        let err = cfg.validate().expect_err("cap above 1 should fail");
        assert!(err.to_string().contains("scoring.seed_bridge_cap"));
    }

    #[test]
    fn validate_rejects_negative_component_weight() {
        let mut cfg = defaults();
        let components = &mut cfg
            .dimensions
            .get_mut("legal_dd")
            .expect("legal_dd configured")
            .components;
        components.insert("entity_ip_basics".to_string(), 1.3);
        components.insert("compliance_risk".to_string(), -0.3);
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("must be between 0.0 and 1.0"));
    }

    #[test]
    fn validate_rejects_gate_minimum_above_max_score() {
        let mut cfg = defaults();
        cfg.gates.b.tech_dd_min = 6.0;
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("gates.b.tech_dd_min"));
    }

    #[test]
    fn validate_accepts_boundary_values() {
        let mut cfg = defaults();
        cfg.scoring.no_evidence_floor = 0.0;
        cfg.scoring.seed_bridge_cap = 1.0;
        cfg.gates.a.team_dd_min = 5.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn lens_lookup_rejects_unknown_name() {
        let model = defaults().validate().expect("defaults should validate");
        assert!(model.lens("conviction").is_ok());
        let err = model.lens("gut_feeling").expect_err("unknown lens");
        assert!(matches!(err, ScoutError::UnknownLens(name) if name == "gut_feeling"));
    }
}
