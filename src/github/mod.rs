//! GitHub integration
//!
//! Thin wrappers over the REST endpoints the upload pipeline needs:
//! - Identity and repository listing/creation
//! - Branch refs (resolve and create)
//! - File contents (lookup and create-or-update)
//! - Pull requests

pub mod client;
pub mod types;

pub use client::GitHubClient;
pub use types::{
    ContentLookup, CreateRepository, GitHubRepo, GitHubUser, NewPullRequest, PullRequest,
    PutContent,
};
