//! GitHub API client implementation

use crate::core::{Credentials, ZiprepoError, ZiprepoResult};
use crate::di::traits::{ConfigProvider, RepositoryClient};
use crate::github::types::{
    ApiErrorBody, ContentLookup, CreateRepository, GitHubRepo, GitHubUser, GitRef,
    NewPullRequest, PullRequest, PutContent,
};
use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// GitHub REST API client
///
/// Holds no credentials; every call is authenticated with the token the
/// caller passes in.
pub struct GitHubClient {
    http_client: HttpClient,
    api_url: String,
}

impl GitHubClient {
    /// Create a new GitHub client against the configured API URL
    pub fn new(config: &dyn ConfigProvider) -> ZiprepoResult<Self> {
        Self::with_api_url(config.api_url())
    }

    /// Create a client against an explicit API base URL
    pub fn with_api_url(api_url: &str) -> ZiprepoResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("ziprepo"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ZiprepoError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> String {
        let encoded = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        self.url(&format!("/repos/{}/{}/contents/{}", owner, repo, encoded))
    }

    /// Send an authenticated request without interpreting the status
    async fn send(
        &self,
        request: RequestBuilder,
        credentials: &Credentials,
    ) -> ZiprepoResult<Response> {
        let response = request
            .bearer_auth(credentials.token())
            .send()
            .await
            .map_err(|e| ZiprepoError::Api {
                status: None,
                message: format!("GitHub API request failed: {}", e),
            })?;

        log_rate_limit(&response);

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ZiprepoError::Auth(
                "GitHub rejected the token (HTTP 401)".to_string(),
            ));
        }

        Ok(response)
    }

    /// Send and fail on any non-success status
    async fn send_checked(
        &self,
        request: RequestBuilder,
        credentials: &Credentials,
    ) -> ZiprepoResult<Response> {
        let response = self.send(request, credentials).await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        credentials: &Credentials,
    ) -> ZiprepoResult<T> {
        let response = self.send_checked(request, credentials).await?;
        response.json().await.map_err(|e| ZiprepoError::Api {
            status: None,
            message: format!("Failed to parse GitHub API response: {}", e),
        })
    }

    /// Get the authenticated user
    pub async fn authenticated_user(&self, credentials: &Credentials) -> ZiprepoResult<GitHubUser> {
        debug!("GET /user");
        self.send_json(self.http_client.get(self.url("/user")), credentials)
            .await
    }

    /// List repositories of the authenticated user, most recently updated first
    pub async fn list_repositories(
        &self,
        credentials: &Credentials,
    ) -> ZiprepoResult<Vec<GitHubRepo>> {
        debug!("GET /user/repos");
        let request = self
            .http_client
            .get(self.url("/user/repos"))
            .query(&[("sort", "updated"), ("per_page", "100")]);
        self.send_json(request, credentials).await
    }

    /// Create a repository for the authenticated user
    pub async fn create_repository(
        &self,
        credentials: &Credentials,
        repo: &CreateRepository,
    ) -> ZiprepoResult<GitHubRepo> {
        debug!(name = %repo.name, "POST /user/repos");
        let request = self.http_client.post(self.url("/user/repos")).json(repo);
        let response = self.send(request, credentials).await?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ZiprepoError::Api {
                status: Some(422),
                message: "Repository name already exists or is invalid".to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response.json().await.map_err(|e| ZiprepoError::Api {
            status: None,
            message: format!("Failed to parse GitHub API response: {}", e),
        })
    }

    /// Get repository information
    pub async fn get_repository(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
    ) -> ZiprepoResult<GitHubRepo> {
        debug!(owner, repo, "GET repository");
        let url = self.url(&format!("/repos/{}/{}", owner, repo));
        self.send_json(self.http_client.get(url), credentials).await
    }

    /// Resolve a ref such as `heads/main` to its commit SHA
    pub async fn get_ref(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> ZiprepoResult<String> {
        debug!(owner, repo, reference, "GET ref");
        let url = self.url(&format!("/repos/{}/{}/git/ref/{}", owner, repo, reference));
        let git_ref: GitRef = self.send_json(self.http_client.get(url), credentials).await?;
        Ok(git_ref.object.sha)
    }

    /// Create a ref (`refs/heads/<name>`) pointing at `sha`
    pub async fn create_ref(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> ZiprepoResult<()> {
        debug!(owner, repo, reference, sha, "POST ref");
        let url = self.url(&format!("/repos/{}/{}/git/refs", owner, repo));
        let body = serde_json::json!({ "ref": reference, "sha": sha });
        self.send_checked(self.http_client.post(url).json(&body), credentials)
            .await?;
        Ok(())
    }

    /// Look up a file, distinguishing "not found" from every other failure
    pub async fn get_content(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> ZiprepoResult<ContentLookup> {
        debug!(owner, repo, path, ?reference, "GET content");
        let mut request = self.http_client.get(self.contents_url(owner, repo, path));
        if let Some(reference) = reference {
            request = request.query(&[("ref", reference)]);
        }

        let response = self.send(request, credentials).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(ContentLookup::NotFound);
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        // A directory listing comes back as an array
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum ContentResponse {
            File { sha: String },
            Directory(Vec<serde::de::IgnoredAny>),
        }

        let content: ContentResponse = response.json().await.map_err(|e| ZiprepoError::Api {
            status: None,
            message: format!("Failed to parse content response: {}", e),
        })?;

        match content {
            ContentResponse::File { sha } => Ok(ContentLookup::Found { sha }),
            ContentResponse::Directory(_) => Err(ZiprepoError::Api {
                status: None,
                message: format!("{} is a directory in {}/{}", path, owner, repo),
            }),
        }
    }

    /// Create or update a file
    pub async fn put_content(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        content: &PutContent,
    ) -> ZiprepoResult<()> {
        debug!(
            owner,
            repo,
            path = %content.path,
            update = content.sha.is_some(),
            "PUT content"
        );
        let url = self.contents_url(owner, repo, &content.path);
        self.send_checked(self.http_client.put(url).json(content), credentials)
            .await?;
        Ok(())
    }

    /// Open a pull request
    pub async fn create_pull_request(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        pull: &NewPullRequest,
    ) -> ZiprepoResult<PullRequest> {
        debug!(owner, repo, head = %pull.head, base = %pull.base, "POST pull request");
        let url = self.url(&format!("/repos/{}/{}/pulls", owner, repo));
        self.send_json(self.http_client.post(url).json(pull), credentials)
            .await
    }
}

/// Build an `Api` error from a non-success response, preferring GitHub's message
async fn error_from_response(response: Response) -> ZiprepoError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);

    ZiprepoError::Api {
        status: Some(status.as_u16()),
        message: if message.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, message)
        },
    }
}

fn log_rate_limit(response: &Response) {
    let remaining = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if let Some(remaining) = remaining {
        if remaining == 0 {
            tracing::warn!("GitHub API rate limit exhausted");
        } else {
            debug!(remaining, "GitHub API rate limit");
        }
    }
}

#[async_trait]
impl RepositoryClient for GitHubClient {
    async fn authenticated_user(&self, credentials: &Credentials) -> ZiprepoResult<GitHubUser> {
        Self::authenticated_user(self, credentials).await
    }

    async fn list_repositories(&self, credentials: &Credentials) -> ZiprepoResult<Vec<GitHubRepo>> {
        Self::list_repositories(self, credentials).await
    }

    async fn create_repository(
        &self,
        credentials: &Credentials,
        repo: &CreateRepository,
    ) -> ZiprepoResult<GitHubRepo> {
        Self::create_repository(self, credentials, repo).await
    }

    async fn get_repository(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
    ) -> ZiprepoResult<GitHubRepo> {
        Self::get_repository(self, credentials, owner, repo).await
    }

    async fn get_ref(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> ZiprepoResult<String> {
        Self::get_ref(self, credentials, owner, repo, reference).await
    }

    async fn create_ref(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> ZiprepoResult<()> {
        Self::create_ref(self, credentials, owner, repo, reference, sha).await
    }

    async fn get_content(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> ZiprepoResult<ContentLookup> {
        Self::get_content(self, credentials, owner, repo, path, reference).await
    }

    async fn put_content(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        content: &PutContent,
    ) -> ZiprepoResult<()> {
        Self::put_content(self, credentials, owner, repo, content).await
    }

    async fn create_pull_request(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
        pull: &NewPullRequest,
    ) -> ZiprepoResult<PullRequest> {
        Self::create_pull_request(self, credentials, owner, repo, pull).await
    }
}
