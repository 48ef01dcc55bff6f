//! Shared "run" workflow: load sources, enrich, export.
//!
//! Every stage runs to completion before anything is written, so a failing run
//! never leaves a partial feature file behind.

use tracing::info;

use crate::config::RunConfig;
use crate::enrich::{FeatureRun, build_features};
use crate::error::AppError;
use crate::io::{DataPackLoader, RunManifest, SourceLoader, StagedFile, commit_all, manifest_json, write_features_csv};

/// All computed outputs of a single `run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub features: FeatureRun,
    pub manifest: RunManifest,
}

/// Execute the full pipeline against the DataPack on disk.
pub fn run(config: &RunConfig) -> Result<RunOutput, AppError> {
    let loader = DataPackLoader::new(config);
    info!(
        granularity = %config.granularity,
        dir = %config.datapack_dir().display(),
        "reading DataPack"
    );
    run_with_loader(config, &loader)
}

/// Execute the pipeline with any source loader, then write the outputs.
///
/// The feature CSV and the manifest are staged next to their targets and only
/// renamed into place once both were written.
pub fn run_with_loader(config: &RunConfig, loader: &dyn SourceLoader) -> Result<RunOutput, AppError> {
    let features = build_features(loader)?;
    let manifest = RunManifest::new(config, &features);

    let mut staged = Vec::with_capacity(2);
    if let Some(path) = &config.manifest {
        let json = manifest_json(&manifest)?;
        let file = StagedFile::new(path)?;
        file.write(&json)?;
        staged.push(file);
    }
    let csv = StagedFile::new(&config.output)?;
    write_features_csv(csv.path(), &features.table, &config.index_code)?;
    staged.insert(0, csv);

    for path in commit_all(staged)? {
        info!(path = %path.display(), "wrote output");
    }
    info!(
        rows = features.table.len(),
        columns = features.table.columns().len() + 1,
        "feature table complete"
    );

    Ok(RunOutput { features, manifest })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Granularity, Overrides};
    use crate::enrich::fixtures;
    use crate::io::{MemoryLoader, read_manifest};

    fn config(dir: &std::path::Path, manifest: bool) -> RunConfig {
        RunConfig::resolve(
            Overrides {
                granularity: Some(Granularity::Poa),
                dir: Some(dir.to_path_buf()),
                manifest: manifest.then(|| dir.join("run.json")),
                ..Overrides::default()
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn run_writes_features_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), true);

        let output = run_with_loader(&config, &fixtures::loader()).unwrap();
        assert_eq!(output.manifest.rows, 2);

        let text = std::fs::read_to_string(dir.path().join("features_by_POA.csv")).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("POA_CODE_2016,population,median_personal_weekly_income,"));
        assert_eq!(lines.count(), 2);

        let manifest = read_manifest(&dir.path().join("run.json")).unwrap();
        assert_eq!(manifest.removed_by_cleanup, vec!["4000".to_string()]);
        assert_eq!(manifest.stages.len(), 6);
    }

    #[test]
    fn failed_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), true);

        let err = run_with_loader(&config, &MemoryLoader::new()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(!config.output.exists());
        assert!(!dir.path().join("run.json").exists());
    }

    #[test]
    fn unwritable_manifest_leaves_no_feature_file() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the manifest's directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let mut config = config(dir.path(), false);
        config.manifest = Some(blocker.join("run.json"));

        let err = run_with_loader(&config, &fixtures::loader()).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
        assert!(!config.output.exists());
        assert!(!dir.path().join("features_by_POA.csv.tmp").exists());
    }

    #[test]
    fn manifest_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), false);
        config.manifest = Some(dir.path().join("no_such_dir").join("run.json"));

        run_with_loader(&config, &fixtures::loader()).unwrap();
        assert!(config.output.exists());
        assert_eq!(read_manifest(&dir.path().join("no_such_dir").join("run.json")).unwrap().rows, 2);
    }

    #[test]
    fn missing_datapack_files_are_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), false);
        let err = run(&config).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }
}
