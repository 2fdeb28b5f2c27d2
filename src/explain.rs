use crate::error::{Result, ScoutError};
use crate::types::report::{Explanation, ExplanationEntry, ScoreReport};
use crate::types::scoring::{round_display, Dimension};

pub const DEFAULT_TOP_K: usize = 3;

/// Top contributing components of one dimension for one initiative.
pub fn explain(
    report: &ScoreReport,
    initiative_id: u64,
    dimension: &str,
    top_k: usize,
) -> Result<Explanation> {
    let dimension = dimension.parse::<Dimension>()?;
    if top_k == 0 {
        return Err(ScoutError::InvalidTopK(top_k));
    }

    let Some(scored) = report
        .initiative(initiative_id)
        .and_then(|initiative| initiative.dimension(dimension))
    else {
        return Ok(Explanation::NotScored {
            initiative_id,
            dimension,
        });
    };

    let entries = scored
        .contributions
        .iter()
        .take(top_k)
        .map(|contribution| ExplanationEntry {
            dimension,
            component_key: contribution.component_key.clone(),
            weighted_contribution: round_display(contribution.weighted_contribution),
            confidence: round_display(contribution.confidence),
            provenance_tag: contribution.provenance_tag.clone(),
        })
        .collect();
    Ok(Explanation::Scored {
        initiative_id,
        dimension,
        score: round_display(scored.score),
        confidence: round_display(scored.confidence),
        entries,
    })
}
