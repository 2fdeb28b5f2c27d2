use crate::error::{Result, ScoutError};
use crate::types::evidence::{Initiative, Snapshot};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    /// SHA-256 over the input bytes; identical inputs give identical versions.
    pub version: String,
}

impl LoadedSnapshot {
    #[cfg(test)]
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let bytes = serde_json::to_vec(&snapshot)?;
        Ok(Self {
            snapshot,
            version: hex_digest(Sha256::digest(&bytes).as_slice()),
        })
    }
}

/// Reads a snapshot file, or every `*.json` below a directory in path order.
pub fn load_snapshot(path: &Path) -> Result<LoadedSnapshot> {
    if !path.exists() {
        return Err(ScoutError::PathNotFound(path.display().to_string()));
    }
    if path.is_file() {
        let bytes = std::fs::read(path)?;
        let snapshot = merge_snapshots(vec![parse_snapshot(path, &bytes)?])?;
        tracing::info!(
            path = %path.display(),
            initiatives = snapshot.initiatives.len(),
            evidence = snapshot.evidence.len(),
            "snapshot loaded"
        );
        return Ok(LoadedSnapshot {
            snapshot,
            version: hex_digest(Sha256::digest(&bytes).as_slice()),
        });
    }

    let files = snapshot_files(path);
    let mut hasher = Sha256::new();
    let mut parts = Vec::with_capacity(files.len());
    for file in &files {
        let bytes = std::fs::read(file)?;
        let relative = file.strip_prefix(path).unwrap_or(file);
        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update(&bytes);
        parts.push(parse_snapshot(file, &bytes)?);
    }
    let snapshot = merge_snapshots(parts)?;
    tracing::info!(
        path = %path.display(),
        files = files.len(),
        initiatives = snapshot.initiatives.len(),
        evidence = snapshot.evidence.len(),
        "snapshot directory loaded"
    );
    Ok(LoadedSnapshot {
        snapshot,
        version: hex_digest(hasher.finalize().as_slice()),
    })
}

fn snapshot_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
        .collect()
}

fn parse_snapshot(path: &Path, bytes: &[u8]) -> Result<Snapshot> {
    serde_json::from_slice(bytes)
        .map_err(|e| ScoutError::SnapshotParse(format!("{}: {}", path.display(), e)))
}

/// Concatenates evidence and seeds; an initiative id may repeat only with an identical record.
pub fn merge_snapshots(parts: Vec<Snapshot>) -> Result<Snapshot> {
    let mut initiatives: BTreeMap<u64, Initiative> = BTreeMap::new();
    let mut merged = Snapshot::default();
    for part in parts {
        for initiative in part.initiatives {
            match initiatives.get(&initiative.id) {
                Some(existing) if *existing != initiative => {
                    return Err(ScoutError::SnapshotConflict(initiative.id));
                }
                Some(_) => {}
                None => {
                    initiatives.insert(initiative.id, initiative);
                }
            }
        }
        merged.evidence.extend(part.evidence);
        merged.seed_ratings.extend(part.seed_ratings);
        merged.rejected.extend(part.rejected);
    }
    merged.initiatives = initiatives.into_values().collect();
    Ok(merged)
}

fn hex_digest(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const INITIATIVES: &str = r#"{
        "initiatives": [
            {"id": 2, "name": "Beta Bio", "university": "LMU", "status": "active"},
            {"id": 1, "name": "Alpha Robotics", "university": "TUM", "status": "active"}
        ]
    }"#;

    const EVIDENCE: &str = r#"{
        "initiatives": [
            {"id": 1, "name": "Alpha Robotics", "university": "TUM", "status": "active"}
        ],
        "evidence": [
            {
                "initiative_id": 1,
                "dimension": "tech_dd",
                "component_key": "quality",
                "strength": "high",
                "source_class": "github",
                "repository": "alpha/rover"
            }
        ],
        "seed_ratings": [
            {"initiative_id": 2, "dimension": "tech_depth", "seed_value": 4}
        ]
    }"#;

    #[test]
    fn load_single_file_hashes_its_bytes() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("snapshot.json");
        fs::write(&path, INITIATIVES).expect("snapshot should write");

        let first = load_snapshot(&path).expect("load should succeed");
        let second = load_snapshot(&path).expect("load should succeed");
        assert_eq!(first.snapshot.initiatives.len(), 2);
        assert_eq!(first.version, second.version);
        assert_eq!(first.version.len(), 64);
    }

    #[test]
    fn load_directory_merges_files_and_sorts_initiatives() {
        let dir = TempDir::new().expect("temp dir should be created");
        fs::create_dir_all(dir.path().join("dd")).expect("nested dir should be created");
        fs::write(dir.path().join("a_initiatives.json"), INITIATIVES).expect("write");
        fs::write(dir.path().join("dd/b_evidence.json"), EVIDENCE).expect("write");
        fs::write(dir.path().join("notes.md"), "ignored").expect("write");

        let loaded = load_snapshot(dir.path()).expect("load should succeed");
        let ids = loaded
            .snapshot
            .initiatives
            .iter()
            .map(|initiative| initiative.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(loaded.snapshot.evidence.len(), 1);
        assert_eq!(loaded.snapshot.seed_ratings.len(), 1);
    }

    #[test]
    fn conflicting_initiative_records_are_rejected() {
        let dir = TempDir::new().expect("temp dir should be created");
        fs::write(dir.path().join("a.json"), INITIATIVES).expect("write");
        fs::write(
            dir.path().join("b.json"),
            r#"{"initiatives": [{"id": 1, "name": "Renamed Robotics"}]}"#,
        )
        .expect("write");

        let err = load_snapshot(dir.path()).expect_err("conflict should fail");
        assert!(matches!(err, ScoutError::SnapshotConflict(1)));
    }

    #[test]
    fn single_file_with_conflicting_duplicate_initiative_is_rejected() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("snapshot.json");
        fs::write(
            &path,
            r#"{"initiatives": [
                {"id": 1, "name": "Alpha Robotics"},
                {"id": 1, "name": "Alpha Rockets"}
            ]}"#,
        )
        .expect("write");

        let err = load_snapshot(&path).expect_err("conflict should fail");
        assert!(matches!(err, ScoutError::SnapshotConflict(1)));
    }

    #[test]
    fn single_file_with_identical_duplicate_initiative_loads_once() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("snapshot.json");
        fs::write(
            &path,
            r#"{"initiatives": [
                {"id": 1, "name": "Alpha Robotics"},
                {"id": 1, "name": "Alpha Robotics"}
            ]}"#,
        )
        .expect("write");

        let loaded = load_snapshot(&path).expect("load should succeed");
        assert_eq!(loaded.snapshot.initiatives.len(), 1);
    }

    #[test]
    fn malformed_evidence_survives_directory_merge() {
        let dir = TempDir::new().expect("temp dir should be created");
        fs::write(dir.path().join("a.json"), INITIATIVES).expect("write");
        fs::write(
            dir.path().join("b.json"),
            r#"{"evidence": [{"initiative_id": 2, "dimension": "tech_dd",
                "component_key": "quality", "strength": "stellar",
                "source_class": "github", "repository": "beta/lab"}]}"#,
        )
        .expect("write");

        let loaded = load_snapshot(dir.path()).expect("load should succeed");
        assert!(loaded.snapshot.evidence.is_empty());
        assert_eq!(loaded.snapshot.rejected.len(), 1);
        assert_eq!(loaded.snapshot.rejected[0].initiative_id, Some(2));
    }

    #[test]
    fn malformed_snapshot_names_the_file() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").expect("write");

        let err = load_snapshot(&path).expect_err("parse should fail");
        assert!(matches!(err, ScoutError::SnapshotParse(ref message) if message.contains("broken.json")));
    }

    #[test]
    fn missing_path_is_reported() {
        let dir = TempDir::new().expect("temp dir should be created");
        let err = load_snapshot(&dir.path().join("nope.json")).expect_err("missing path");
        assert!(matches!(err, ScoutError::PathNotFound(_)));
    }
}
