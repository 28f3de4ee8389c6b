//! Trait definitions for dependency injection

use crate::config::{PullRequestTemplate, RateLimitSettings, ReadinessPolicy};
use crate::core::{Credentials, ZiprepoResult};
use crate::github::types::{
    ContentLookup, CreateRepository, GitHubRepo, GitHubUser, NewPullRequest, PullRequest,
    PutContent,
};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Trait for configuration access
///
/// Provides read-only access to application configuration.
/// Implementations should be thread-safe (Send + Sync).
pub trait ConfigProvider: Send + Sync {
    /// GitHub REST API base URL
    fn api_url(&self) -> &str;

    /// Quota applied to file writes
    fn rate_limit(&self) -> &RateLimitSettings;

    /// Wait strategy before writing into a new repository
    fn readiness(&self) -> &ReadinessPolicy;

    /// Largest single input accepted, in bytes
    fn max_input_bytes(&self) -> u64;

    /// Accepted input extensions; empty accepts everything
    fn allowed_extensions(&self) -> &[String];

    /// Title and body for update pull requests
    fn pull_request(&self) -> &PullRequestTemplate;
}

/// Trait for the GitHub repository API
///
/// Every call carries the caller's bearer credential. A rejected credential
/// surfaces as `ZiprepoError::Auth`; other non-success responses as
/// `ZiprepoError::Api`.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Resolve the identity behind the credential
    async fn authenticated_user(&self, credentials: &Credentials) -> ZiprepoResult<GitHubUser>;

    /// Repositories of the authenticated user, most recently updated first
    async fn list_repositories(&self, credentials: &Credentials) -> ZiprepoResult<Vec<GitHubRepo>>;

    /// Create a repository owned by the authenticated user
    async fn create_repository(
        &self,
        credentials: &Credentials,
        repo: &CreateRepository,
    ) -> ZiprepoResult<GitHubRepo>;

    /// Fetch a repository descriptor
    async fn get_repository(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
    ) -> ZiprepoResult<GitHubRepo>;

    /// Resolve a ref (e.g. `heads/main`) to a commit SHA
    async fn get_ref(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> ZiprepoResult<String>;

    /// Create a fully qualified ref (e.g. `refs/heads/update-1`) at `sha`
    async fn create_ref(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> ZiprepoResult<()>;

    /// Look up a file on `reference` (default branch when `None`)
    async fn get_content(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> ZiprepoResult<ContentLookup>;

    /// Create (no sha) or update (sha present) a file
    async fn put_content(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        content: &PutContent,
    ) -> ZiprepoResult<()>;

    /// Open a pull request
    async fn create_pull_request(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        pull: &NewPullRequest,
    ) -> ZiprepoResult<PullRequest>;
}

/// Trait for time access
///
/// The rate limiter and the uploader read and wait on time only through
/// this trait, so tests can drive a manual clock.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic now
    fn now(&self) -> Instant;

    /// Wall-clock milliseconds since the Unix epoch
    fn unix_millis(&self) -> i64;

    /// Suspend the calling task without blocking others
    async fn sleep(&self, duration: Duration);
}
