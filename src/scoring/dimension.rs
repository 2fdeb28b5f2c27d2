use crate::types::config::ScoringSettings;
use crate::types::scoring::{
    ComponentScore, Contribution, Dimension, DimensionScore, NoEvidencePolicy,
};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedComponent {
    pub weight: f64,
    pub score: ComponentScore,
}

/// Folds weighted component scores into a dimension score, then applies the seed bridge.
pub fn aggregate(
    dimension: Dimension,
    components: &[WeightedComponent],
    seed: Option<f64>,
    settings: &ScoringSettings,
) -> DimensionScore {
    let policy = dimension.no_evidence_policy();
    let mut contributions = components
        .iter()
        .map(|component| contribution(policy, component))
        .collect::<Vec<_>>();

    let computed_score = contributions
        .iter()
        .map(|contribution| contribution.weighted_contribution)
        .sum::<f64>();
    let confidence = components
        .iter()
        .map(|component| component.weight * component.score.confidence)
        .sum::<f64>()
        .clamp(0.0, 1.0);
    let score = match seed {
        Some(seed) => bridge_seed(computed_score, seed, settings.seed_bridge_cap),
        None => computed_score,
    };

    contributions.sort_by(|left, right| {
        right
            .weighted_contribution
            .partial_cmp(&left.weighted_contribution)
            .unwrap_or(Ordering::Equal)
            .then_with(|| left.component_key.cmp(&right.component_key))
    });

    DimensionScore {
        dimension,
        policy,
        computed_score,
        seed_rating: seed,
        score,
        confidence,
        contributions,
    }
}

fn contribution(policy: NoEvidencePolicy, component: &WeightedComponent) -> Contribution {
    let score = &component.score;
    let weighted_contribution = match policy {
        NoEvidencePolicy::ZeroContribution if !score.has_evidence() => 0.0,
        _ => score.score * component.weight,
    };
    Contribution {
        component_key: score.component_key.clone(),
        weight: component.weight,
        score: score.score,
        weighted_contribution,
        confidence: score.confidence,
        provenance_tag: score.provenance_tag(),
        evidence: score.evidence.clone(),
    }
}

/// Seeds share the 1..=5 scale of computed scores, so they blend in unscaled.
fn bridge_seed(computed: f64, seed: f64, cap: f64) -> f64 {
    (1.0 - cap) * computed + cap * seed
}
