//! Turning user inputs into an in-memory file set
//!
//! Inputs are ZIP archives, plain files or a single folder. Archives are
//! expanded entry by entry; plain files pass through unchanged under their
//! own name.

mod archive;
mod folder;

use crate::core::path::normalize_repo_path;
use crate::core::{ZiprepoError, ZiprepoResult};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Media type used when the source carries none (ZIP entries never do)
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// One file ready to be written to a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadableFile {
    /// Repository-relative, forward-slash path
    pub path: String,
    pub content: Vec<u8>,
    pub media_type: String,
}

impl UploadableFile {
    pub fn new(path: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content,
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }
}

/// Non-empty, duplicate-free, ordered file set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    files: Vec<UploadableFile>,
}

impl ExtractionResult {
    /// Build a result from raw files
    ///
    /// A path seen twice keeps its first position and its last content.
    /// `source` names the input in the `EmptyArchive` error.
    pub fn from_files(source: &str, files: Vec<UploadableFile>) -> ZiprepoResult<Self> {
        let mut deduped: Vec<UploadableFile> = Vec::with_capacity(files.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for file in files {
            match positions.get(&file.path) {
                Some(&index) => {
                    debug!(path = %file.path, "Duplicate path, keeping last content");
                    deduped[index] = file;
                }
                None => {
                    positions.insert(file.path.clone(), deduped.len());
                    deduped.push(file);
                }
            }
        }

        if deduped.is_empty() {
            return Err(ZiprepoError::EmptyArchive {
                name: source.to_string(),
            });
        }

        Ok(Self { files: deduped })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadableFile> {
        self.files.iter()
    }

    pub fn files(&self) -> &[UploadableFile] {
        &self.files
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.content.len() as u64).sum()
    }

    pub fn into_files(self) -> Vec<UploadableFile> {
        self.files
    }
}

/// A raw input handed to the extractor
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub content: Vec<u8>,
    pub media_type: Option<String>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
            media_type: None,
        }
    }

    /// Read a file from disk, named after its final path component
    pub fn from_path(path: &Path) -> ZiprepoResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ZiprepoError::Path(format!("Invalid input path: {}", path.display())))?
            .to_string();

        let content = std::fs::read(path).map_err(|e| ZiprepoError::Processing {
            name: name.clone(),
            cause: e.to_string(),
        })?;

        Ok(Self::new(name, content))
    }

    pub fn is_archive(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(".zip")
    }
}

/// Expands inputs into an [`ExtractionResult`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Process archives and plain files in order
    ///
    /// Stops at the first failing input. `CorruptArchive` and `EmptyArchive`
    /// surface as they are; anything else becomes `Processing` naming the
    /// input.
    pub async fn process_files(&self, inputs: Vec<InputFile>) -> ZiprepoResult<ExtractionResult> {
        let source = match inputs.as_slice() {
            [single] => single.name.clone(),
            _ => "upload".to_string(),
        };

        let mut files = Vec::new();
        for input in inputs {
            let name = input.name.clone();
            let extracted = self.process_one(input).await.map_err(|e| match e {
                e @ (ZiprepoError::CorruptArchive { .. }
                | ZiprepoError::EmptyArchive { .. }
                | ZiprepoError::Processing { .. }) => e,
                other => ZiprepoError::Processing {
                    name: name.clone(),
                    cause: other.to_string(),
                },
            })?;
            debug!(input = %name, files = extracted.len(), "Input processed");
            files.extend(extracted);
        }

        let result = ExtractionResult::from_files(&source, files)?;
        info!(files = result.len(), "Extraction complete");
        Ok(result)
    }

    /// Collect every regular file below `root`
    pub async fn process_folder(&self, root: &Path) -> ZiprepoResult<ExtractionResult> {
        let name = root.display().to_string();
        let files = folder::collect(root).await?;
        let result = ExtractionResult::from_files(&name, files)?;
        info!(folder = %name, files = result.len(), "Folder collected");
        Ok(result)
    }

    async fn process_one(&self, input: InputFile) -> ZiprepoResult<Vec<UploadableFile>> {
        if input.is_archive() {
            return archive::extract(&input.name, input.content).await;
        }

        let path = normalize_repo_path(&input.name)?;
        let media_type = input
            .media_type
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());
        Ok(vec![
            UploadableFile::new(path, input.content).with_media_type(media_type)
        ])
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::zip_bytes;
    use super::*;

    #[tokio::test]
    async fn test_plain_file_passes_through() {
        let extractor = ArchiveExtractor::new();
        let mut input = InputFile::new("notes.txt", b"hello".to_vec());
        input.media_type = Some("text/plain".to_string());

        let result = extractor.process_files(vec![input]).await.unwrap();

        assert_eq!(result.len(), 1);
        let file = &result.files()[0];
        assert_eq!(file.path, "notes.txt");
        assert_eq!(file.content, b"hello");
        assert_eq!(file.media_type, "text/plain");
    }

    #[tokio::test]
    async fn test_plain_file_default_media_type() {
        let result = ArchiveExtractor::new()
            .process_files(vec![InputFile::new("logo.png", vec![0x89, 0x50])])
            .await
            .unwrap();
        assert_eq!(result.files()[0].media_type, DEFAULT_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_archive_extension_case_insensitive() {
        let bytes = zip_bytes(&[("a.txt", "a")]);
        let result = ArchiveExtractor::new()
            .process_files(vec![InputFile::new("SITE.ZIP", bytes)])
            .await
            .unwrap();
        assert_eq!(result.paths(), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn test_archive_and_plain_file_combined_in_order() {
        let bytes = zip_bytes(&[("src/main.rs", "fn main() {}"), ("Cargo.toml", "[package]")]);
        let result = ArchiveExtractor::new()
            .process_files(vec![
                InputFile::new("project.zip", bytes),
                InputFile::new("README.md", b"# Readme".to_vec()),
            ])
            .await
            .unwrap();

        assert_eq!(result.paths(), vec!["src/main.rs", "Cargo.toml", "README.md"]);
    }

    #[tokio::test]
    async fn test_duplicates_across_inputs_last_wins() {
        let bytes = zip_bytes(&[("README.md", "old"), ("b.txt", "b")]);
        let result = ArchiveExtractor::new()
            .process_files(vec![
                InputFile::new("site.zip", bytes),
                InputFile::new("README.md", b"new".to_vec()),
            ])
            .await
            .unwrap();

        assert_eq!(result.paths(), vec!["README.md", "b.txt"]);
        assert_eq!(result.files()[0].content, b"new");
    }

    #[tokio::test]
    async fn test_corrupt_archive_surfaces_unchanged() {
        let err = ArchiveExtractor::new()
            .process_files(vec![InputFile::new(
                "broken.zip",
                b"this is not a zip file".to_vec(),
            )])
            .await
            .unwrap_err();

        assert!(matches!(err, ZiprepoError::CorruptArchive { ref name } if name == "broken.zip"));
    }

    #[tokio::test]
    async fn test_first_failing_input_stops_batch() {
        let good = zip_bytes(&[("a.txt", "a")]);
        let err = ArchiveExtractor::new()
            .process_files(vec![
                InputFile::new("empty.zip", zip_bytes(&[("docs/", "")])),
                InputFile::new("good.zip", good),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, ZiprepoError::EmptyArchive { ref name } if name == "empty.zip"));
    }

    #[tokio::test]
    async fn test_unsafe_plain_file_name_is_processing_error() {
        let err = ArchiveExtractor::new()
            .process_files(vec![InputFile::new("..", b"x".to_vec())])
            .await
            .unwrap_err();

        match err {
            ZiprepoError::Processing { name, .. } => assert_eq!(name, ".."),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_inputs_is_empty() {
        let err = ArchiveExtractor::new()
            .process_files(Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ZiprepoError::EmptyArchive { .. }));
    }

    #[test]
    fn test_from_files_keeps_first_position() {
        let result = ExtractionResult::from_files(
            "batch",
            vec![
                UploadableFile::new("a", b"1".to_vec()),
                UploadableFile::new("b", b"2".to_vec()),
                UploadableFile::new("a", b"3".to_vec()),
            ],
        )
        .unwrap();

        assert_eq!(result.paths(), vec!["a", "b"]);
        assert_eq!(result.files()[0].content, b"3");
        assert_eq!(result.total_bytes(), 2);
    }

    #[test]
    fn test_from_files_empty() {
        let err = ExtractionResult::from_files("batch", Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "No valid files found in batch");
    }

    #[test]
    fn test_input_from_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("site.zip");
        std::fs::write(&path, b"bytes").unwrap();

        let input = InputFile::from_path(&path).unwrap();
        assert_eq!(input.name, "site.zip");
        assert_eq!(input.content, b"bytes");
        assert!(input.is_archive());
    }

    #[test]
    fn test_input_from_missing_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = InputFile::from_path(&temp.path().join("gone.zip")).unwrap_err();
        assert!(matches!(err, ZiprepoError::Processing { ref name, .. } if name == "gone.zip"));
    }
}
