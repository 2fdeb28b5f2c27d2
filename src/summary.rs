use crate::error::{Result, ScoutError};
use crate::types::report::{
    BlockerCount, Distribution, GateName, GateSummary, QualitySummary, ScoreReport,
};
use crate::types::scoring::{round_display, Dimension, Score};
use std::collections::BTreeMap;

pub const DEFAULT_TOP_BLOCKERS: usize = 3;

/// Read-only quality signal over a finished score report.
pub fn summarize(report: &ScoreReport, top_blockers: usize) -> Result<QualitySummary> {
    if top_blockers == 0 {
        return Err(ScoutError::InvalidTopK(top_blockers));
    }

    let gates = GateName::ALL
        .iter()
        .map(|gate| gate_summary(report, *gate, top_blockers))
        .collect::<Vec<_>>();
    let all_gates_zero_pass =
        !report.initiatives.is_empty() && gates.iter().all(|gate| gate.passed == 0);
    if all_gates_zero_pass {
        tracing::warn!(
            initiatives = report.initiatives.len(),
            "no initiative passes any gate"
        );
    }

    Ok(QualitySummary {
        initiatives: report.initiatives.len(),
        gates,
        all_gates_zero_pass,
        distributions: distributions(report),
        initiatives_with_warnings: report
            .initiatives
            .iter()
            .filter(|initiative| !initiative.warnings.is_empty())
            .count(),
        warning_count: report.warning_count(),
    })
}

fn gate_summary(report: &ScoreReport, gate: GateName, top_blockers: usize) -> GateSummary {
    let results = report
        .initiatives
        .iter()
        .flat_map(|initiative| initiative.gates.iter())
        .filter(|result| result.gate == gate)
        .collect::<Vec<_>>();
    let passed = results.iter().filter(|result| result.passed()).count();

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for blocker in results.iter().flat_map(|result| result.blockers.iter()) {
        *counts.entry(blocker.to_string()).or_default() += 1;
    }
    let mut ranked = counts
        .into_iter()
        .map(|(blocker, count)| BlockerCount { blocker, count })
        .collect::<Vec<_>>();
    ranked.sort_by(|left, right| {
        right
            .count
            .cmp(&left.count)
            .then_with(|| left.blocker.cmp(&right.blocker))
    });
    ranked.truncate(top_blockers);

    GateSummary {
        gate,
        evaluated: results.len(),
        passed,
        pass_rate: if results.is_empty() {
            0.0
        } else {
            round_display(passed as f64 / results.len() as f64)
        },
        top_blockers: ranked,
    }
}

fn distributions(report: &ScoreReport) -> Vec<Distribution> {
    let mut scores: BTreeMap<Dimension, Vec<Score>> = BTreeMap::new();
    for initiative in &report.initiatives {
        for scored in &initiative.dimensions {
            scores.entry(scored.dimension).or_default().push(scored.score);
        }
    }
    scores
        .into_iter()
        .filter_map(|(dimension, mut values)| {
            values.sort_by(f64::total_cmp);
            let min = *values.first()?;
            let max = *values.last()?;
            Some(Distribution {
                dimension,
                scored: values.len(),
                min: round_display(min),
                median: round_display(median(&values)),
                max: round_display(max),
            })
        })
        .collect()
}

/// Expects sorted, non-empty input.
fn median(sorted: &[Score]) -> Score {
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    }
}
