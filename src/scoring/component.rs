use crate::evidence::store::distinct;
use crate::types::config::ScoringSettings;
use crate::types::evidence::EvidenceItem;
use crate::types::scoring::{ComponentScore, Dimension, Score, MAX_SCORE};
use std::collections::BTreeSet;

/// Confidence added by the k-th distinct source class is `SOURCE_DIVERSITY_BONUS / k`.
const SOURCE_DIVERSITY_BONUS: f64 = 0.12;
const MAX_COUNTED_SOURCE_CLASSES: usize = 3;

/// Scores one (initiative, dimension, component) from its evidence.
///
/// Empty evidence yields exactly the floor with zero confidence. Otherwise the
/// mean quality is scaled by a saturating volume term (`1 - 0.5^n`) and mapped
/// onto `[floor, 5.0]`; confidence grows with volume and with the first three
/// distinct source classes.
pub fn score_component(
    dimension: Dimension,
    component_key: &str,
    items: &[&EvidenceItem],
    settings: &ScoringSettings,
) -> ComponentScore {
    let floor = settings.no_evidence_floor;
    let items = distinct(items);
    if items.is_empty() {
        return ComponentScore {
            dimension,
            component_key: component_key.to_string(),
            score: floor,
            confidence: (0.0 - settings.no_evidence_confidence_penalty).max(0.0),
            source_classes: Vec::new(),
            evidence: Vec::new(),
        };
    }

    let count = items.len() as f64;
    let mean_quality = items.iter().map(|item| item.quality).sum::<f64>() / count;
    let volume = 1.0 - 0.5f64.powf(count);
    let strength = mean_quality * (0.5 + 0.5 * volume);
    let score: Score = (floor + (MAX_SCORE - floor) * strength).clamp(floor, MAX_SCORE);

    let source_classes = items
        .iter()
        .map(|item| item.source_class())
        .collect::<BTreeSet<_>>();
    let diversity = (1..=source_classes.len().min(MAX_COUNTED_SOURCE_CLASSES))
        .map(|k| SOURCE_DIVERSITY_BONUS / k as f64)
        .sum::<f64>();
    let confidence = (mean_quality * volume + diversity).clamp(0.0, 1.0);

    ComponentScore {
        dimension,
        component_key: component_key.to_string(),
        score,
        confidence,
        source_classes: source_classes.into_iter().collect(),
        evidence: items.iter().map(|item| item.id).collect(),
    }
}
