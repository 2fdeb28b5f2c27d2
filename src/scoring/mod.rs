pub mod component;
pub mod dimension;
pub mod lens;

use crate::evidence::{EvidenceStore, LoadedSnapshot};
use crate::gates;
use crate::types::config::ScoringModel;
use crate::types::evidence::Initiative;
use crate::types::report::{DataWarning, InitiativeReport, ScoreReport, WarningKind};
use crate::types::scoring::{Dimension, DimensionFamily, DimensionScore};
use chrono::Utc;
use component::score_component;
use dimension::{aggregate, WeightedComponent};
use lens::compose;

/// Runs the full pipeline over a loaded snapshot. Pure apart from the `generated_at` stamp.
pub fn score_snapshot(loaded: &LoadedSnapshot, model: &ScoringModel) -> ScoreReport {
    let store = EvidenceStore::build(&loaded.snapshot, model);
    let initiatives = store
        .initiatives()
        .map(|initiative| score_initiative(initiative, &store, model))
        .collect::<Vec<_>>();
    tracing::info!(
        initiatives = initiatives.len(),
        snapshot_version = %loaded.version,
        "initiatives scored"
    );

    ScoreReport {
        generated_at: Utc::now().to_rfc3339(),
        snapshot_version: loaded.version.clone(),
        initiatives,
        warnings: store.unattributed_warnings(),
    }
}

pub fn score_initiative(
    initiative: &Initiative,
    store: &EvidenceStore,
    model: &ScoringModel,
) -> InitiativeReport {
    let id = initiative.id;
    let has_dd = store.covers(id, DimensionFamily::DueDiligence);
    let dimensions = model
        .dimensions
        .keys()
        .filter(|dimension| has_dd || dimension.family() != DimensionFamily::DueDiligence)
        .map(|dimension| score_dimension(id, *dimension, store, model))
        .collect::<Vec<_>>();

    let market_validation_stage = store
        .dimension_evidence(id, Dimension::MarketDd, model.settings.quality_threshold)
        .highest_stage;
    let lenses = model
        .lenses
        .values()
        .map(|lens| compose(lens, &dimensions))
        .collect::<Vec<_>>();
    let gates = gates::evaluate(id, &dimensions, store, model);
    tracing::debug!(
        initiative_id = id,
        dimensions = dimensions.len(),
        gates_passed = gates.iter().filter(|gate| gate.passed()).count(),
        "initiative scored"
    );

    let mut warnings = store.warnings_for(id);
    if !has_dd {
        warnings.extend(unapplied_seeds(id, store, model));
    }

    InitiativeReport {
        initiative: initiative.clone(),
        dimensions,
        market_validation_stage,
        lenses,
        gates,
        warnings,
    }
}

/// Seeds on due-diligence dimensions that stay unscored for lack of evidence.
fn unapplied_seeds(id: u64, store: &EvidenceStore, model: &ScoringModel) -> Vec<DataWarning> {
    model
        .dimensions
        .keys()
        .filter(|dimension| dimension.family() == DimensionFamily::DueDiligence)
        .filter_map(|dimension| {
            let seed = store.seed(id, *dimension)?;
            tracing::warn!(
                initiative_id = id,
                dimension = %dimension,
                seed,
                "seed rating not applied"
            );
            Some(DataWarning {
                initiative_id: Some(id),
                kind: WarningKind::SeedNotApplied,
                detail: format!(
                    "seed rating {seed} for {dimension} not applied: no due-diligence evidence"
                ),
            })
        })
        .collect()
}

fn score_dimension(
    initiative_id: u64,
    dimension: Dimension,
    store: &EvidenceStore,
    model: &ScoringModel,
) -> DimensionScore {
    let components = model
        .components(dimension)
        .unwrap_or(&[])
        .iter()
        .map(|component| {
            let items = store
                .component_evidence(initiative_id, dimension, &component.key)
                .iter()
                .collect::<Vec<_>>();
            WeightedComponent {
                weight: component.weight,
                score: score_component(
                    dimension,
                    &component.key,
                    &items,
                    &model.settings,
                ),
            }
        })
        .collect::<Vec<_>>();
    aggregate(
        dimension,
        &components,
        store.seed(initiative_id, dimension),
        &model.settings,
    )
}
