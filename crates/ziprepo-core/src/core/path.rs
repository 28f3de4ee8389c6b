use crate::core::error::{ZiprepoError, ZiprepoResult};
use std::path::{Path, PathBuf};

/// Get the ziprepo home directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\ziprepo
/// - Linux: ~/.config/ziprepo
/// - macOS: ~/Library/Application Support/ziprepo
pub fn ziprepo_home() -> ZiprepoResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ZiprepoError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("ziprepo"))
}

/// Get the config file path (`<ziprepo_home>/config.yaml`)
pub fn config_file() -> ZiprepoResult<PathBuf> {
    Ok(ziprepo_home()?.join("config.yaml"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> ZiprepoResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Normalize an archive or folder-relative path into repository form.
///
/// Backslashes become forward slashes, leading slashes and `.` segments are
/// dropped. Empty paths and paths containing `..` are rejected.
pub fn normalize_repo_path(raw: &str) -> ZiprepoResult<String> {
    let mut segments = Vec::new();
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(ZiprepoError::Path(format!(
                    "Path escapes the upload root: {}",
                    raw
                )))
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(ZiprepoError::Path(format!("Empty path: '{}'", raw)));
    }

    Ok(segments.join("/"))
}

/// Join the components of a relative filesystem path with `/`
pub fn to_repo_path(relative: &Path) -> ZiprepoResult<String> {
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    normalize_repo_path(&joined)
}
