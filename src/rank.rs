use crate::error::{Result, ScoutError};
use crate::types::config::ScoringModel;
use crate::types::report::{InitiativeReport, RankListing, RankRow, ScoreReport};
use crate::types::scoring::{round_display, Dimension};
use std::cmp::Ordering;

pub const DEFAULT_TOP_N: usize = 10;

/// Orders initiatives with a scored lens by rounded score, highest first; ties go to the lower id.
pub fn rank(
    report: &ScoreReport,
    model: &ScoringModel,
    lens_name: &str,
    top_n: usize,
) -> Result<RankListing> {
    if top_n == 0 {
        return Err(ScoutError::InvalidTopN(top_n));
    }
    let lens = model.lens(lens_name)?;

    let mut eligible = report
        .initiatives
        .iter()
        .filter_map(|initiative| {
            let scored = initiative.lens(lens_name)?;
            Some((initiative, scored.score()?, scored.confidence()?))
        })
        .collect::<Vec<_>>();
    eligible.sort_by(|(left, left_score, _), (right, right_score, _)| {
        round_display(*right_score)
            .partial_cmp(&round_display(*left_score))
            .unwrap_or(Ordering::Equal)
            .then_with(|| left.initiative.id.cmp(&right.initiative.id))
    });

    let total = eligible.len();
    let rows = eligible
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(position, (initiative, score, confidence))| RankRow {
            rank: position + 1,
            initiative_id: initiative.initiative.id,
            name: initiative.initiative.name.clone(),
            university: initiative.initiative.university.clone(),
            score: round_display(score),
            confidence: round_display(confidence),
            shown: lens
                .shown
                .iter()
                .map(|dimension| {
                    (
                        dimension.to_string(),
                        shown_value(initiative, *dimension),
                    )
                })
                .collect(),
        })
        .collect::<Vec<_>>();
    tracing::info!(lens = lens_name, eligible = total, rows = rows.len(), "ranking built");

    Ok(RankListing {
        lens: lens_name.to_string(),
        top_n,
        eligible: total,
        rows,
    })
}

fn shown_value(initiative: &InitiativeReport, dimension: Dimension) -> Option<f64> {
    initiative
        .dimension(dimension)
        .map(|scored| round_display(scored.score))
}
