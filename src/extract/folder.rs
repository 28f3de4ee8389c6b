//! Folder mode: every regular file below a root, keyed by its relative path

use super::UploadableFile;
use crate::core::path::to_repo_path;
use crate::core::{ZiprepoError, ZiprepoResult};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub(super) async fn collect(root: &Path) -> ZiprepoResult<Vec<UploadableFile>> {
    let root: PathBuf = root.to_path_buf();
    let name = root.display().to_string();

    tokio::task::spawn_blocking(move || walk(&root))
        .await
        .map_err(|e| ZiprepoError::Processing {
            name: name.clone(),
            cause: e.to_string(),
        })?
        .map_err(|e| match e {
            e @ ZiprepoError::Processing { .. } => e,
            other => ZiprepoError::Processing {
                name,
                cause: other.to_string(),
            },
        })
}

fn walk(root: &Path) -> ZiprepoResult<Vec<UploadableFile>> {
    if !root.is_dir() {
        return Err(ZiprepoError::Path(format!(
            "Not a directory: {}",
            root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| ZiprepoError::Path(e.to_string()))?;
        let path = to_repo_path(relative)?;
        let content = std::fs::read(entry.path())?;

        debug!(path = %path, bytes = content.len(), "Folder file collected");
        files.push(UploadableFile::new(path, content));
    }

    Ok(files)
}
