//! GitHub API type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user (`GET /user`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// GitHub repository information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    pub html_url: String,
    pub default_branch: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /user/repos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRepository {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub private: bool,
    pub auto_init: bool,
}

/// A git reference (`GET /repos/{owner}/{repo}/git/ref/{ref}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub reference: String,
    pub object: GitObject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

/// Outcome of looking up a path before writing it.
///
/// Lookup failures other than "not found" are returned as errors, never
/// folded into `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLookup {
    /// The path exists; `sha` is the blob identity required to update it
    Found { sha: String },
    /// Nothing at this path on the requested ref
    NotFound,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutContent {
    #[serde(skip)]
    pub path: String,
    pub message: String,
    /// Base64-encoded file content
    pub content: String,
    /// Present for updates, absent for creates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Body of `POST /repos/{owner}/{repo}/pulls`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// Error payload GitHub returns alongside non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}
