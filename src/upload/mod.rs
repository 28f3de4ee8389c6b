//! Publishing an extracted file set to GitHub
//!
//! New repositories are written directly on their default branch. Existing
//! repositories get a fresh `update-<millis>` branch and a pull request.

mod session;
mod uploader;

pub use session::UploadSession;
pub use uploader::RepositoryUploader;

use crate::extract::ExtractionResult;
use std::fmt;

/// What to publish and where
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Repository name, owned by the authenticated user
    pub repo_name: String,
    pub files: ExtractionResult,
    /// Target an existing repository through a pull request
    pub existing: bool,
}

impl UploadRequest {
    pub fn new_repository(repo_name: impl Into<String>, files: ExtractionResult) -> Self {
        Self {
            repo_name: repo_name.into(),
            files,
            existing: false,
        }
    }

    pub fn existing_repository(repo_name: impl Into<String>, files: ExtractionResult) -> Self {
        Self {
            repo_name: repo_name.into(),
            files,
            existing: true,
        }
    }
}

/// Where the uploaded content can be seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Files landed on the default branch of a new repository
    Repository(String),
    /// Files landed on a branch with an open pull request
    PullRequest(String),
}

impl UploadOutcome {
    pub fn url(&self) -> &str {
        match self {
            UploadOutcome::Repository(url) | UploadOutcome::PullRequest(url) => url,
        }
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Repository(url) => write!(f, "Repository: {}", url),
            UploadOutcome::PullRequest(url) => write!(f, "Pull request: {}", url),
        }
    }
}
