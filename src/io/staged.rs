//! Write-to-temp-then-rename output files.
//!
//! A run writes every output to a `.tmp` sibling first and only renames them
//! into place once all of them were written. Dropping an uncommitted
//! `StagedFile` removes its temp file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

#[derive(Debug)]
pub struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Reserve a temp path next to `target`, creating the parent directory.
    pub fn new(target: &Path) -> Result<Self, AppError> {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AppError::io("create directory", parent, e))?;
        }
        let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        Ok(Self {
            temp: target.with_file_name(name),
            target: target.to_path_buf(),
            committed: false,
        })
    }

    /// Where the content should be written before `commit`.
    pub fn path(&self) -> &Path {
        &self.temp
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn write(&self, contents: &str) -> Result<(), AppError> {
        fs::write(&self.temp, contents).map_err(|e| AppError::io("write", &self.temp, e))
    }

    /// Rename the temp file onto the target.
    pub fn commit(mut self) -> Result<PathBuf, AppError> {
        fs::rename(&self.temp, &self.target).map_err(|e| AppError::io("rename", &self.temp, e))?;
        self.committed = true;
        Ok(self.target.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

/// Commit every staged file, or none: if a rename fails, targets already
/// renamed by this call are removed again.
pub fn commit_all(files: Vec<StagedFile>) -> Result<Vec<PathBuf>, AppError> {
    let mut done = Vec::with_capacity(files.len());
    for file in files {
        match file.commit() {
            Ok(path) => done.push(path),
            Err(e) => {
                for path in &done {
                    let _ = fs::remove_file(path);
                }
                return Err(e);
            }
        }
    }
    Ok(done)
}
