//! Mock implementations of service traits for testing

use super::traits::{Clock, ConfigProvider, RepositoryClient};
use crate::config::{PullRequestTemplate, RateLimitSettings, ReadinessPolicy};
use crate::core::{Credentials, ZiprepoError, ZiprepoResult};
use crate::github::types::{
    ContentLookup, CreateRepository, GitHubRepo, GitHubUser, NewPullRequest, PullRequest,
    PutContent,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Mock configuration provider for testing
///
/// # Example
///
/// ```
/// use ziprepo::di::mocks::MockConfigProvider;
/// use ziprepo::di::ConfigProvider;
///
/// let mut config = MockConfigProvider::default();
/// config.max_input_bytes = 1024;
///
/// assert_eq!(config.max_input_bytes(), 1024);
/// ```
#[derive(Clone)]
pub struct MockConfigProvider {
    pub api_url: String,
    pub rate_limit: RateLimitSettings,
    pub readiness: ReadinessPolicy,
    pub max_input_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub pull_request: PullRequestTemplate,
}

impl Default for MockConfigProvider {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:9".to_string(),
            rate_limit: RateLimitSettings::default(),
            readiness: ReadinessPolicy::Grace { grace_ms: 2000 },
            max_input_bytes: 100 * 1024 * 1024,
            allowed_extensions: vec!["zip".to_string()],
            pull_request: PullRequestTemplate::default(),
        }
    }
}

impl ConfigProvider for MockConfigProvider {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    fn rate_limit(&self) -> &RateLimitSettings {
        &self.rate_limit
    }

    fn readiness(&self) -> &ReadinessPolicy {
        &self.readiness
    }

    fn max_input_bytes(&self) -> u64 {
        self.max_input_bytes
    }

    fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    fn pull_request(&self) -> &PullRequestTemplate {
        &self.pull_request
    }
}

/// One call received by [`MockRepositoryClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    AuthenticatedUser,
    ListRepositories,
    CreateRepository {
        name: String,
    },
    GetRepository {
        owner: String,
        repo: String,
    },
    GetRef {
        reference: String,
    },
    CreateRef {
        reference: String,
        sha: String,
    },
    GetContent {
        path: String,
        reference: Option<String>,
    },
    PutContent {
        path: String,
        message: String,
        sha: Option<String>,
        branch: Option<String>,
    },
    CreatePullRequest {
        title: String,
        head: String,
        base: String,
    },
}

/// In-memory GitHub stand-in that records every call
///
/// # Example
///
/// ```
/// use ziprepo::di::mocks::MockRepositoryClient;
///
/// let client = MockRepositoryClient::new("octo");
/// client.add_repo("demo", "main");
/// client.add_file("README.md", "abc123");
/// client.fail_write("src/broken.bin");
/// ```
#[derive(Clone)]
pub struct MockRepositoryClient {
    login: String,
    valid_token: Arc<Mutex<Option<String>>>,
    head_sha: String,
    repos: Arc<Mutex<HashMap<String, GitHubRepo>>>,
    files: Arc<Mutex<HashMap<String, String>>>,
    failing_writes: Arc<Mutex<HashSet<String>>>,
    failing_lookups: Arc<Mutex<HashSet<String>>>,
    unavailable_reads: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockRepositoryClient {
    /// Create a mock for the user `login`, accepting any token
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            valid_token: Arc::new(Mutex::new(None)),
            head_sha: "c0ffee".to_string(),
            repos: Arc::new(Mutex::new(HashMap::new())),
            files: Arc::new(Mutex::new(HashMap::new())),
            failing_writes: Arc::new(Mutex::new(HashSet::new())),
            failing_lookups: Arc::new(Mutex::new(HashSet::new())),
            unavailable_reads: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Only accept this token; everything else is rejected with `Auth`
    pub fn require_token(&self, token: &str) {
        *self.valid_token.lock().unwrap() = Some(token.to_string());
    }

    /// Register an existing repository
    pub fn add_repo(&self, name: &str, default_branch: &str) {
        let repo = self.repo_descriptor(name, default_branch, None, false);
        self.repos.lock().unwrap().insert(name.to_string(), repo);
    }

    /// Register an existing file with its blob sha
    pub fn add_file(&self, path: &str, sha: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), sha.to_string());
    }

    /// Reject writes to `path` with HTTP 409
    pub fn fail_write(&self, path: &str) {
        self.failing_writes.lock().unwrap().insert(path.to_string());
    }

    /// Fail lookups of `path` with HTTP 500
    pub fn fail_lookup(&self, path: &str) {
        self.failing_lookups.lock().unwrap().insert(path.to_string());
    }

    /// Make the next `times` get-repository calls fail with HTTP 404
    pub fn fail_get_repository(&self, times: usize) {
        self.unavailable_reads.store(times, Ordering::SeqCst);
    }

    /// The commit SHA returned by every `get_ref`
    pub fn head_sha(&self) -> &str {
        &self.head_sha
    }

    /// All calls, in the order received
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the file writes
    pub fn writes(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, RecordedCall::PutContent { .. }))
            .collect()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, credentials: &Credentials) -> ZiprepoResult<()> {
        match self.valid_token.lock().unwrap().as_deref() {
            Some(valid) if valid != credentials.token() => Err(ZiprepoError::Auth(
                "GitHub rejected the token (HTTP 401)".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn repo_descriptor(
        &self,
        name: &str,
        default_branch: &str,
        description: Option<String>,
        private: bool,
    ) -> GitHubRepo {
        GitHubRepo {
            id: 1,
            name: name.to_string(),
            full_name: format!("{}/{}", self.login, name),
            html_url: format!("https://github.com/{}/{}", self.login, name),
            default_branch: default_branch.to_string(),
            description,
            private,
            stargazers_count: 0,
            forks_count: 0,
            updated_at: None,
        }
    }

    fn not_found() -> ZiprepoError {
        ZiprepoError::Api {
            status: Some(404),
            message: "HTTP 404 Not Found: Not Found".to_string(),
        }
    }
}

#[async_trait]
impl RepositoryClient for MockRepositoryClient {
    async fn authenticated_user(&self, credentials: &Credentials) -> ZiprepoResult<GitHubUser> {
        self.record(RecordedCall::AuthenticatedUser);
        self.check(credentials)?;
        Ok(GitHubUser {
            login: self.login.clone(),
            html_url: Some(format!("https://github.com/{}", self.login)),
        })
    }

    async fn list_repositories(&self, credentials: &Credentials) -> ZiprepoResult<Vec<GitHubRepo>> {
        self.record(RecordedCall::ListRepositories);
        self.check(credentials)?;
        let mut repos: Vec<GitHubRepo> = self.repos.lock().unwrap().values().cloned().collect();
        repos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(repos)
    }

    async fn create_repository(
        &self,
        credentials: &Credentials,
        repo: &CreateRepository,
    ) -> ZiprepoResult<GitHubRepo> {
        self.record(RecordedCall::CreateRepository {
            name: repo.name.clone(),
        });
        self.check(credentials)?;

        let mut repos = self.repos.lock().unwrap();
        if repos.contains_key(&repo.name) {
            return Err(ZiprepoError::Api {
                status: Some(422),
                message: "Repository name already exists or is invalid".to_string(),
            });
        }
        let created =
            self.repo_descriptor(&repo.name, "main", repo.description.clone(), repo.private);
        repos.insert(repo.name.clone(), created.clone());
        Ok(created)
    }

    async fn get_repository(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
    ) -> ZiprepoResult<GitHubRepo> {
        self.record(RecordedCall::GetRepository {
            owner: owner.to_string(),
            repo: repo.to_string(),
        });
        self.check(credentials)?;

        let pending = self.unavailable_reads.load(Ordering::SeqCst);
        if pending > 0 {
            self.unavailable_reads.store(pending - 1, Ordering::SeqCst);
            return Err(Self::not_found());
        }

        self.repos
            .lock()
            .unwrap()
            .get(repo)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn get_ref(
        &self,
        credentials: &Credentials,
        _owner: &str,
        _repo: &str,
        reference: &str,
    ) -> ZiprepoResult<String> {
        self.record(RecordedCall::GetRef {
            reference: reference.to_string(),
        });
        self.check(credentials)?;
        Ok(self.head_sha.clone())
    }

    async fn create_ref(
        &self,
        credentials: &Credentials,
        _owner: &str,
        _repo: &str,
        reference: &str,
        sha: &str,
    ) -> ZiprepoResult<()> {
        self.record(RecordedCall::CreateRef {
            reference: reference.to_string(),
            sha: sha.to_string(),
        });
        self.check(credentials)
    }

    async fn get_content(
        &self,
        credentials: &Credentials,
        _owner: &str,
        _repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> ZiprepoResult<ContentLookup> {
        self.record(RecordedCall::GetContent {
            path: path.to_string(),
            reference: reference.map(str::to_string),
        });
        self.check(credentials)?;

        if self.failing_lookups.lock().unwrap().contains(path) {
            return Err(ZiprepoError::Api {
                status: Some(500),
                message: "HTTP 500 Internal Server Error".to_string(),
            });
        }

        Ok(match self.files.lock().unwrap().get(path) {
            Some(sha) => ContentLookup::Found { sha: sha.clone() },
            None => ContentLookup::NotFound,
        })
    }

    async fn put_content(
        &self,
        credentials: &Credentials,
        _owner: &str,
        _repo: &str,
        content: &PutContent,
    ) -> ZiprepoResult<()> {
        self.record(RecordedCall::PutContent {
            path: content.path.clone(),
            message: content.message.clone(),
            sha: content.sha.clone(),
            branch: content.branch.clone(),
        });
        self.check(credentials)?;

        if self.failing_writes.lock().unwrap().contains(&content.path) {
            return Err(ZiprepoError::Api {
                status: Some(409),
                message: format!("HTTP 409 Conflict: {} was rejected", content.path),
            });
        }

        self.files
            .lock()
            .unwrap()
            .insert(content.path.clone(), format!("sha-{}", content.path));
        Ok(())
    }

    async fn create_pull_request(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        pull: &NewPullRequest,
    ) -> ZiprepoResult<PullRequest> {
        self.record(RecordedCall::CreatePullRequest {
            title: pull.title.clone(),
            head: pull.head.clone(),
            base: pull.base.clone(),
        });
        self.check(credentials)?;
        Ok(PullRequest {
            number: 1,
            html_url: format!("https://github.com/{}/{}/pull/1", owner, repo),
        })
    }
}

/// Manually driven clock
///
/// `sleep` returns immediately after advancing the clock by the requested
/// duration, and records it.
///
/// # Example
///
/// ```
/// use ziprepo::di::mocks::ManualClock;
/// use ziprepo::di::Clock;
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(clock.now() - start, Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct ManualClock {
    origin: Instant,
    epoch_millis: i64,
    elapsed: Arc<Mutex<Duration>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(1_700_000_000_000)
    }

    /// Start with a fixed wall-clock reading
    pub fn starting_at(epoch_millis: i64) -> Self {
        Self {
            origin: Instant::now(),
            epoch_millis,
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Move time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
    }

    /// Every sleep requested so far
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock().unwrap()
    }

    fn unix_millis(&self) -> i64 {
        self.epoch_millis + self.elapsed.lock().unwrap().as_millis() as i64
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}
