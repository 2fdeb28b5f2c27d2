pub mod checks;

use crate::evidence::EvidenceStore;
use crate::types::config::ScoringModel;
use crate::types::report::{Blocker, GateName, GateResult};
use crate::types::scoring::DimensionScore;
use checks::GateInputs;

/// Evaluates all four gates for one initiative. Failing gates are ordinary results.
pub fn evaluate(
    initiative_id: u64,
    dimensions: &[DimensionScore],
    store: &EvidenceStore,
    model: &ScoringModel,
) -> Vec<GateResult> {
    GateName::ALL
        .iter()
        .map(|gate| {
            let dimension = gate.dimension();
            let evidence = store.dimension_evidence(
                initiative_id,
                dimension,
                model.settings.quality_threshold,
            );
            let inputs = GateInputs {
                dimension,
                score: dimensions.iter().find(|scored| scored.dimension == dimension),
                evidence: &evidence,
            };
            let result =
                GateResult::from_blockers(initiative_id, *gate, blockers(*gate, &inputs, model));
            tracing::debug!(
                initiative_id,
                gate = %gate,
                evidence = evidence.item_count,
                passed = result.passed(),
                blockers = result.blockers.len(),
                "gate evaluated"
            );
            result
        })
        .collect()
}

fn blockers(gate: GateName, inputs: &GateInputs<'_>, model: &ScoringModel) -> Vec<Blocker> {
    let thresholds = &model.gates;
    match gate {
        GateName::A => checks::team(inputs, &thresholds.a),
        GateName::B => checks::tech(inputs, &thresholds.b),
        GateName::C => checks::market(inputs, &thresholds.c),
        GateName::D => checks::legal(inputs, &thresholds.d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::types::config::GateThresholds;
    use crate::types::evidence::{
        EvidenceRecord, Initiative, Marker, Provenance, Snapshot, Strength, StrengthLevel,
        ValidationStage,
    };
    use crate::types::report::GateStatus;
    use crate::types::scoring::{Dimension, NoEvidencePolicy};

    fn model() -> ScoringModel {
        parse_config("")
            .expect("defaults parse")
            .validate()
            .expect("defaults validate")
    }

    fn dd_record(dimension: &str, component: &str, provenance: Provenance) -> EvidenceRecord {
        EvidenceRecord {
            initiative_id: 1,
            dimension: dimension.to_string(),
            component_key: component.to_string(),
            strength: Strength::Level(StrengthLevel::High),
            snippet: None,
            markers: Vec::new(),
            validation_stage: None,
            provenance,
        }
    }

    fn snapshot() -> Snapshot {
        let mut benchmark = dd_record(
            "tech_dd",
            "performance",
            Provenance::Github {
                repository: "alpha/rover".to_string(),
                metric: Some("benchmarks".to_string()),
            },
        );
        benchmark.markers = vec![Marker::HardProofArtifact];
        let mut pilot = dd_record(
            "market_dd",
            "validation_stage",
            Provenance::ManualDd {
                document: "pilot.pdf".to_string(),
                reviewer: None,
            },
        );
        pilot.validation_stage = Some(ValidationStage::Pilot);

        Snapshot {
            initiatives: vec![Initiative {
                id: 1,
                name: "Alpha Robotics".to_string(),
                university: "TUM".to_string(),
                description: String::new(),
                status: Default::default(),
            }],
            evidence: vec![
                benchmark,
                dd_record(
                    "tech_dd",
                    "quality",
                    Provenance::ManualDd {
                        document: "code-review.md".to_string(),
                        reviewer: Some("dd-team".to_string()),
                    },
                ),
                pilot,
            ],
            seed_ratings: Vec::new(),
            rejected: Vec::new(),
        }
    }

    fn tech_dd(score: f64) -> DimensionScore {
        DimensionScore {
            dimension: Dimension::TechDd,
            policy: NoEvidencePolicy::FloorWithPenalty,
            computed_score: score,
            seed_rating: None,
            score,
            confidence: 0.4,
            contributions: Vec::new(),
        }
    }

    fn gate(results: &[GateResult], name: GateName) -> &GateResult {
        results
            .iter()
            .find(|result| result.gate == name)
            .expect("every gate is evaluated")
    }

    #[test]
    fn every_gate_is_evaluated_and_unscored_dimensions_block() {
        let model = model();
        let store = EvidenceStore::build(&snapshot(), &model);
        let results = evaluate(1, &[tech_dd(3.1)], &store, &model);
        assert_eq!(results.len(), 4);

        let tech = gate(&results, GateName::B);
        assert_eq!(tech.status, GateStatus::Pass);
        assert_eq!(tech.reason, GateResult::PASS_REASON);

        let market = gate(&results, GateName::C);
        assert_eq!(market.status, GateStatus::Fail);
        assert!(market
            .reason
            .starts_with("Gate C failed: market_dd_not_scored"));
        assert!(!market
            .blockers
            .contains(&Blocker::ValidationStageBelowMinimum));
    }

    #[test]
    fn low_tech_score_with_one_source_lists_both_blockers() {
        let model = model();
        let mut snapshot = snapshot();
        snapshot.evidence.remove(1);
        snapshot.evidence[0].markers.clear();
        let store = EvidenceStore::build(&snapshot, &model);
        let mut thresholds = model.gates.clone();
        thresholds.b.min_qualifying_evidence = 1;
        thresholds.b.require_hard_proof_artifact = false;
        let model = ScoringModel {
            gates: thresholds,
            ..model
        };

        let results = evaluate(1, &[tech_dd(2.4)], &store, &model);
        let tech = gate(&results, GateName::B);
        assert_eq!(
            tech.reason,
            "Gate B failed: tech_dd_below_threshold, insufficient_source_diversity"
        );
    }

    #[test]
    fn raising_thresholds_never_turns_fail_into_pass() {
        let base = model();
        let store = EvidenceStore::build(&snapshot(), &base);
        let dimensions = [tech_dd(3.1)];
        let before = evaluate(1, &dimensions, &store, &base);

        let raised = |adjust: fn(&mut GateThresholds)| {
            let mut gates = base.gates.clone();
            adjust(&mut gates);
            ScoringModel {
                gates,
                ..base.clone()
            }
        };
        let variants: [fn(&mut GateThresholds); 6] = [
            |gates| gates.b.tech_dd_min = 3.5,
            |gates| gates.b.min_source_classes = 3,
            |gates| gates.b.min_qualifying_evidence = 5,
            |gates| gates.c.min_stage = ValidationStage::RepeatRevenue,
            |gates| gates.a.min_named_operators = 4,
            |gates| gates.d.legal_dd_min = 4.0,
        ];
        for adjust in variants {
            let after = evaluate(1, &dimensions, &store, &raised(adjust));
            for (old, new) in before.iter().zip(&after) {
                if !old.passed() {
                    assert!(!new.passed(), "gate {} flipped to pass", new.gate);
                }
                assert!(new.blockers.len() >= old.blockers.len());
            }
        }
    }
}
