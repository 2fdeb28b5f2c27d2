use crate::types::config::ScoringModel;
use crate::types::evidence::{
    EvidenceItem, EvidenceRecord, Initiative, Marker, SourceClass, Snapshot, ValidationStage,
};
use crate::types::report::{DataWarning, WarningKind};
use crate::types::scoring::{Dimension, DimensionFamily, EvidenceId, MAX_SCORE};
use std::collections::{BTreeMap, BTreeSet};

type ComponentKey = (u64, Dimension, String);

/// Read-only index of one snapshot's evidence, deduplicated per component.
#[derive(Debug, Clone, Default)]
pub struct EvidenceStore {
    initiatives: BTreeMap<u64, Initiative>,
    items: BTreeMap<ComponentKey, Vec<EvidenceItem>>,
    seeds: BTreeMap<(u64, Dimension), f64>,
    warnings: Vec<DataWarning>,
}

/// Evidence counts for one initiative in one dimension, as seen by the gates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionEvidence {
    pub item_count: usize,
    pub qualifying_count: usize,
    pub qualifying_source_classes: BTreeSet<SourceClass>,
    pub markers: BTreeSet<Marker>,
    pub highest_stage: Option<ValidationStage>,
    pub component_counts: BTreeMap<String, usize>,
}

impl DimensionEvidence {
    pub fn component_count(&self, key: &str) -> usize {
        self.component_counts.get(key).copied().unwrap_or(0)
    }

    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }
}

impl EvidenceStore {
    pub fn build(snapshot: &Snapshot, model: &ScoringModel) -> Self {
        let mut store = Self {
            initiatives: snapshot
                .initiatives
                .iter()
                .map(|initiative| (initiative.id, initiative.clone()))
                .collect(),
            ..Self::default()
        };
        for rejected in &snapshot.rejected {
            let owner = rejected
                .initiative_id
                .filter(|id| store.initiatives.contains_key(id));
            store.warn(owner, WarningKind::MalformedRecord, rejected.detail.clone());
        }

        let mut grouped: BTreeMap<ComponentKey, Vec<EvidenceItem>> = BTreeMap::new();
        for (position, record) in snapshot.evidence.iter().enumerate() {
            let id = EvidenceId(position as u64);
            if let Some(item) = store.accept(id, record, model) {
                grouped
                    .entry((item.initiative_id, item.dimension, item.component_key.clone()))
                    .or_default()
                    .push(item);
            }
        }
        store.items = grouped
            .into_iter()
            .map(|(key, items)| {
                let before = items.len();
                let kept = distinct(&items.iter().collect::<Vec<_>>())
                    .into_iter()
                    .cloned()
                    .collect::<Vec<_>>();
                if kept.len() < before {
                    tracing::debug!(
                        initiative_id = key.0,
                        dimension = %key.1,
                        component = %key.2,
                        dropped = before - kept.len(),
                        "duplicate evidence collapsed"
                    );
                }
                (key, kept)
            })
            .collect();

        for seed in &snapshot.seed_ratings {
            store.accept_seed(seed.initiative_id, &seed.dimension, seed.seed_value);
        }
        store
    }

    fn accept(
        &mut self,
        id: EvidenceId,
        record: &EvidenceRecord,
        model: &ScoringModel,
    ) -> Option<EvidenceItem> {
        let initiative_id = record.initiative_id;
        if !self.initiatives.contains_key(&initiative_id) {
            self.warn(
                None,
                WarningKind::UnknownInitiative,
                format!(
                    "evidence #{} references unknown initiative {initiative_id}",
                    id.0
                ),
            );
            return None;
        }
        let Ok(dimension) = record.dimension.parse::<Dimension>() else {
            self.warn(
                Some(initiative_id),
                WarningKind::UnknownDimension,
                format!("evidence #{} uses unknown dimension '{}'", id.0, record.dimension),
            );
            return None;
        };
        if !model.has_component(dimension, &record.component_key) {
            self.warn(
                Some(initiative_id),
                WarningKind::UnknownComponent,
                format!(
                    "evidence #{} targets unconfigured component {dimension}.{}",
                    id.0, record.component_key
                ),
            );
            return None;
        }
        let quality = record.strength.quality();
        if !(0.0..=1.0).contains(&quality) {
            self.warn(
                Some(initiative_id),
                WarningKind::StrengthOutOfRange,
                format!(
                    "evidence #{} has strength {quality} outside [0, 1]",
                    id.0
                ),
            );
            return None;
        }

        Some(EvidenceItem {
            id,
            initiative_id,
            dimension,
            component_key: record.component_key.clone(),
            quality,
            snippet: record.snippet.clone().unwrap_or_default(),
            markers: record.markers.clone(),
            validation_stage: record.validation_stage,
            provenance: record.provenance.clone(),
        })
    }

    fn accept_seed(&mut self, initiative_id: u64, dimension: &str, value: f64) {
        if !self.initiatives.contains_key(&initiative_id) {
            self.warn(
                None,
                WarningKind::UnknownInitiative,
                format!("seed rating references unknown initiative {initiative_id}"),
            );
            return;
        }
        let Ok(dimension) = dimension.parse::<Dimension>() else {
            self.warn(
                Some(initiative_id),
                WarningKind::UnknownDimension,
                format!("seed rating uses unknown dimension '{dimension}'"),
            );
            return;
        };
        if !(1.0..=MAX_SCORE).contains(&value) {
            self.warn(
                Some(initiative_id),
                WarningKind::SeedOutOfRange,
                format!("seed rating {value} for {dimension} outside [1, 5]"),
            );
            return;
        }
        if self.seeds.contains_key(&(initiative_id, dimension)) {
            self.warn(
                Some(initiative_id),
                WarningKind::DuplicateSeed,
                format!("second seed rating for {dimension} ignored"),
            );
            return;
        }
        self.seeds.insert((initiative_id, dimension), value);
    }

    fn warn(&mut self, initiative_id: Option<u64>, kind: WarningKind, detail: String) {
        tracing::warn!(initiative_id = ?initiative_id, kind = ?kind, "{detail}");
        self.warnings.push(DataWarning {
            initiative_id,
            kind,
            detail,
        });
    }

    pub fn initiatives(&self) -> impl Iterator<Item = &Initiative> {
        self.initiatives.values()
    }

    pub fn component_evidence(
        &self,
        initiative_id: u64,
        dimension: Dimension,
        component_key: &str,
    ) -> &[EvidenceItem] {
        self.items
            .get(&(initiative_id, dimension, component_key.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn dimension_items(
        &self,
        initiative_id: u64,
        dimension: Dimension,
    ) -> impl Iterator<Item = &EvidenceItem> {
        self.items
            .iter()
            .filter(move |((id, dim, _), _)| *id == initiative_id && *dim == dimension)
            .flat_map(|(_, items)| items.iter())
    }

    pub fn dimension_evidence(
        &self,
        initiative_id: u64,
        dimension: Dimension,
        quality_threshold: f64,
    ) -> DimensionEvidence {
        let mut summary = DimensionEvidence::default();
        for item in self.dimension_items(initiative_id, dimension) {
            summary.item_count += 1;
            *summary
                .component_counts
                .entry(item.component_key.clone())
                .or_default() += 1;
            summary.markers.extend(item.markers.iter().copied());
            if let Some(stage) = item.validation_stage {
                summary.highest_stage = summary.highest_stage.max(Some(stage));
            }
            if item.quality >= quality_threshold {
                summary.qualifying_count += 1;
                summary.qualifying_source_classes.insert(item.source_class());
            }
        }
        summary
    }

    /// True when the initiative has at least one accepted item in any dimension of `family`.
    pub fn covers(&self, initiative_id: u64, family: DimensionFamily) -> bool {
        self.items
            .keys()
            .any(|(id, dimension, _)| *id == initiative_id && dimension.family() == family)
    }

    pub fn seed(&self, initiative_id: u64, dimension: Dimension) -> Option<f64> {
        self.seeds.get(&(initiative_id, dimension)).copied()
    }

    pub fn warnings_for(&self, initiative_id: u64) -> Vec<DataWarning> {
        self.warnings
            .iter()
            .filter(|warning| warning.initiative_id == Some(initiative_id))
            .cloned()
            .collect()
    }

    pub fn unattributed_warnings(&self) -> Vec<DataWarning> {
        self.warnings
            .iter()
            .filter(|warning| warning.initiative_id.is_none())
            .cloned()
            .collect()
    }
}

/// Collapses items sharing a dedupe key, keeping the strongest (then earliest) one.
/// Output is ordered by evidence id.
pub fn distinct<'a>(items: &[&'a EvidenceItem]) -> Vec<&'a EvidenceItem> {
    let mut best: BTreeMap<(SourceClass, String, String), &'a EvidenceItem> = BTreeMap::new();
    for &item in items {
        best.entry(item.dedupe_key())
            .and_modify(|kept| {
                if item.quality > kept.quality
                    || (item.quality == kept.quality && item.id < kept.id)
                {
                    *kept = item;
                }
            })
            .or_insert(item);
    }
    let mut kept = best.into_values().collect::<Vec<_>>();
    kept.sort_by_key(|item| item.id);
    kept
}
