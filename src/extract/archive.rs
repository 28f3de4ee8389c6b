//! ZIP expansion
//!
//! The archive is parsed once from memory; every entry is then read by its
//! own blocking task holding a clone of the archive over the shared bytes.

use super::UploadableFile;
use crate::core::path::normalize_repo_path;
use crate::core::{ZiprepoError, ZiprepoResult};
use std::io::{Cursor, Read};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use zip::ZipArchive;

/// Upper bound on the buffer reserved up front for one entry
const MAX_SIZE_HINT: u64 = 1 << 20;

type SharedArchive = ZipArchive<Cursor<Arc<[u8]>>>;

enum Entry {
    File(UploadableFile),
    Directory,
}

/// Expand `bytes` (the archive called `name`) into files, in archive order
pub(super) async fn extract(name: &str, bytes: Vec<u8>) -> ZiprepoResult<Vec<UploadableFile>> {
    let bytes: Arc<[u8]> = Arc::from(bytes);
    let archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        debug!(archive = %name, error = %e, "Unreadable archive container");
        ZiprepoError::CorruptArchive {
            name: name.to_string(),
        }
    })?;

    let entry_count = archive.len();
    debug!(archive = %name, entries = entry_count, "Archive opened");

    let mut tasks = JoinSet::new();
    for index in 0..entry_count {
        let archive = archive.clone();
        tasks.spawn_blocking(move || (index, read_entry(archive, index)));
    }

    let mut extracted = Vec::with_capacity(entry_count);
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined.map_err(|e| ZiprepoError::Processing {
            name: name.to_string(),
            cause: format!("entry task failed: {}", e),
        })?;

        match outcome {
            Ok(Entry::File(file)) => extracted.push((index, file)),
            Ok(Entry::Directory) => {}
            Err(cause) => warn!(archive = %name, index, %cause, "Skipping unreadable entry"),
        }
    }

    if extracted.is_empty() {
        return Err(ZiprepoError::EmptyArchive {
            name: name.to_string(),
        });
    }

    extracted.sort_by_key(|(index, _)| *index);
    Ok(extracted.into_iter().map(|(_, file)| file).collect())
}

fn read_entry(mut archive: SharedArchive, index: usize) -> Result<Entry, String> {
    let mut entry = archive.by_index(index).map_err(|e| e.to_string())?;
    if entry.is_dir() {
        return Ok(Entry::Directory);
    }

    let path = normalize_repo_path(entry.name())
        .map_err(|e| format!("{}: {}", entry.name(), e))?;

    // The declared size comes from the archive and is not trusted
    let mut content = Vec::with_capacity(entry.size().min(MAX_SIZE_HINT) as usize);
    entry
        .read_to_end(&mut content)
        .map_err(|e| format!("{}: {}", path, e))?;

    debug!(path = %path, bytes = content.len(), "Entry extracted");
    Ok(Entry::File(UploadableFile::new(path, content)))
}
