//! Read/write run manifest JSON files.
//!
//! A manifest records what a `run` produced: the parameters, the output file,
//! per-stage row accounting and the units removed by cleanup. `summary`
//! prints it back without touching the DataPack.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Granularity, RunConfig};
use crate::domain::{GeoKey, StageReport};
use crate::enrich::FeatureRun;
use crate::error::AppError;
use crate::io::staged::StagedFile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub granularity: Granularity,
    pub index_code: String,
    pub output: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
    pub stages: Vec<StageReport>,
    pub removed_by_cleanup: Vec<GeoKey>,
}

impl RunManifest {
    pub fn new(config: &RunConfig, run: &FeatureRun) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            generated_at: Utc::now(),
            granularity: config.granularity,
            index_code: config.index_code.clone(),
            output: config.output.clone(),
            rows: run.table.len(),
            columns: run.table.columns().to_vec(),
            stages: run.stages.clone(),
            removed_by_cleanup: run.removed.clone(),
        }
    }
}

/// Serialize a manifest as pretty JSON.
pub fn manifest_json(manifest: &RunManifest) -> Result<String, AppError> {
    serde_json::to_string_pretty(manifest).map_err(|e| AppError::Export {
        what: "run manifest",
        message: e.to_string(),
    })
}

/// Write a manifest, creating the parent directory as needed.
pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<(), AppError> {
    let json = manifest_json(manifest)?;
    let staged = StagedFile::new(path)?;
    staged.write(&json)?;
    staged.commit().map(|_| ())
}

pub fn read_manifest(path: &Path) -> Result<RunManifest, AppError> {
    let file = File::open(path).map_err(|e| AppError::io("open manifest", path, e))?;
    serde_json::from_reader(file).map_err(|e| AppError::Config(format!("Invalid manifest JSON '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stage;

    #[test]
    fn manifest_survives_a_write_read_cycle() {
        let manifest = RunManifest {
            tool: "abs-features".to_string(),
            generated_at: Utc::now(),
            granularity: Granularity::Sa2,
            index_code: "SA2_MAINCODE_2016".to_string(),
            output: PathBuf::from("features_by_SA2.csv"),
            rows: 2,
            columns: vec!["population".to_string()],
            stages: vec![StageReport {
                stage: Stage::Cleanup,
                rows_in: 3,
                rows_out: 2,
                elapsed_ms: 0.5,
            }],
            removed_by_cleanup: vec!["101".to_string()],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("manifest.json");
        write_manifest(&path, &manifest).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"granularity\": \"SA2\""));
        assert!(text.contains("\"stage\": \"cleanup\""));
        assert_eq!(read_manifest(&path).unwrap(), manifest);
    }

    #[test]
    fn garbage_manifest_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_manifest(&path), Err(AppError::Config(_))));
    }
}
