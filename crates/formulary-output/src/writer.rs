//! Whole-file artifact replacement.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{OutputError, Result};

/// Writes `contents` to `path` through a temporary file in the same
/// directory, so readers see either the old file or the complete new one.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    write_artifacts(&[(path, contents)])
}

/// Writes several artifacts together.
///
/// Every temporary file is written before any target is replaced, so a
/// failure while staging leaves all targets untouched.
pub fn write_artifacts(artifacts: &[(&Path, &str)]) -> Result<()> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for &(path, contents) in artifacts {
        staged.push((path, stage(path, contents)?, contents.len()));
    }
    for (path, file, bytes) in staged {
        file.persist(path).map_err(|e| OutputError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        info!(path = %path.display(), bytes, "artifact written");
    }
    Ok(())
}

fn stage(path: &Path, contents: &str) -> Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })?;

    let mut file = NamedTempFile::new_in(parent).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(file)
}
