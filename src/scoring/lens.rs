use crate::types::config::Lens;
use crate::types::scoring::{DimensionScore, LensOutcome, LensScore};

/// Weighs already-computed dimension scores; a lens missing any input is unavailable, not zero.
pub fn compose(lens: &Lens, dimensions: &[DimensionScore]) -> LensScore {
    let mut missing = Vec::new();
    let mut score = 0.0;
    let mut confidence = 0.0;
    for (dimension, weight) in &lens.weights {
        match dimensions.iter().find(|scored| scored.dimension == *dimension) {
            Some(scored) => {
                score += weight * scored.score;
                confidence += weight * scored.confidence;
            }
            None => missing.push(*dimension),
        }
    }

    let outcome = if missing.is_empty() {
        LensOutcome::Scored {
            score,
            confidence: confidence.clamp(0.0, 1.0),
        }
    } else {
        LensOutcome::Unavailable { missing }
    };
    LensScore {
        lens: lens.name.clone(),
        outcome,
    }
}
