use super::{UploadOutcome, UploadRequest, UploadSession};
use crate::config::{PullRequestTemplate, ReadinessPolicy};
use crate::core::{Credentials, ZiprepoError, ZiprepoResult};
use crate::di::{Clock, RepositoryClient};
use crate::extract::{ExtractionResult, UploadableFile};
use crate::github::types::{ContentLookup, NewPullRequest, PutContent};
use crate::rate_limit::RateLimiter;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indicatif::ProgressBar;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives one upload from identity lookup to the final URL
///
/// Files are written one at a time, in extraction order, each gated by the
/// shared rate limiter. The first failing write aborts the upload; files
/// already written stay written.
pub struct RepositoryUploader {
    client: Arc<dyn RepositoryClient>,
    limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
    readiness: ReadinessPolicy,
    pull_request: PullRequestTemplate,
    progress: Option<ProgressBar>,
}

impl RepositoryUploader {
    pub fn new(
        client: Arc<dyn RepositoryClient>,
        limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            limiter,
            clock,
            readiness: ReadinessPolicy::default(),
            pull_request: PullRequestTemplate::default(),
            progress: None,
        }
    }

    pub fn with_readiness(mut self, readiness: ReadinessPolicy) -> Self {
        self.readiness = readiness;
        self
    }

    pub fn with_pull_request_template(mut self, template: PullRequestTemplate) -> Self {
        self.pull_request = template;
        self
    }

    /// Tick `progress` once per written file
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Publish `request.files`
    ///
    /// `cancel` is checked before every file write; once set, the upload
    /// stops with `Cancelled`.
    pub async fn upload(
        &self,
        credentials: &Credentials,
        request: &UploadRequest,
        cancel: &AtomicBool,
    ) -> ZiprepoResult<UploadOutcome> {
        let user = self.client.authenticated_user(credentials).await?;
        let mut session = UploadSession::new(user.login, &request.repo_name, !request.existing);
        info!(
            repo = %session.full_name(),
            new_repo = session.is_new_repo,
            files = request.files.len(),
            "Upload started"
        );

        if session.is_new_repo {
            self.await_readiness(credentials, &session).await?;
        } else {
            self.prepare_branch(credentials, &mut session).await?;
        }

        self.write_files(credentials, &session, &request.files, cancel)
            .await?;

        let outcome = self.finalize(credentials, &session).await?;
        info!(url = %outcome.url(), "Upload complete");
        Ok(outcome)
    }

    async fn await_readiness(
        &self,
        credentials: &Credentials,
        session: &UploadSession,
    ) -> ZiprepoResult<()> {
        match self.readiness {
            ReadinessPolicy::Grace { grace_ms } => {
                info!(grace_ms, "Waiting for new repository");
                self.clock.sleep(Duration::from_millis(grace_ms)).await;
                Ok(())
            }
            ReadinessPolicy::Poll {
                interval_ms,
                timeout_ms,
            } => {
                info!(interval_ms, timeout_ms, "Polling new repository");
                let started = self.clock.now();
                let timeout = Duration::from_millis(timeout_ms);

                loop {
                    match self
                        .client
                        .get_repository(credentials, &session.owner, &session.repo)
                        .await
                    {
                        Ok(_) => return Ok(()),
                        Err(e @ ZiprepoError::Auth(_)) => return Err(e),
                        Err(e) => {
                            let waited = self.clock.now().saturating_duration_since(started);
                            if waited >= timeout {
                                return Err(ZiprepoError::Api {
                                    status: e.status(),
                                    message: format!(
                                        "Repository {} not ready after {} ms: {}",
                                        session.full_name(),
                                        timeout_ms,
                                        e
                                    ),
                                });
                            }
                            debug!(error = %e, "Repository not ready yet");
                            self.clock.sleep(Duration::from_millis(interval_ms)).await;
                        }
                    }
                }
            }
        }
    }

    async fn prepare_branch(
        &self,
        credentials: &Credentials,
        session: &mut UploadSession,
    ) -> ZiprepoResult<()> {
        let repo = self
            .client
            .get_repository(credentials, &session.owner, &session.repo)
            .await?;

        let sha = self
            .client
            .get_ref(
                credentials,
                &session.owner,
                &session.repo,
                &format!("heads/{}", repo.default_branch),
            )
            .await?;

        let branch = UploadSession::branch_name(self.clock.unix_millis());
        self.client
            .create_ref(
                credentials,
                &session.owner,
                &session.repo,
                &format!("refs/heads/{}", branch),
                &sha,
            )
            .await?;

        info!(branch = %branch, base = %repo.default_branch, "Working branch created");
        session.branch = Some(branch);
        session.default_branch = Some(repo.default_branch);
        session.default_branch_sha = Some(sha);
        Ok(())
    }

    async fn write_files(
        &self,
        credentials: &Credentials,
        session: &UploadSession,
        files: &ExtractionResult,
        cancel: &AtomicBool,
    ) -> ZiprepoResult<()> {
        for file in files.iter() {
            if cancel.load(Ordering::SeqCst) {
                warn!(path = %file.path, "Upload cancelled before write");
                return Err(ZiprepoError::Cancelled);
            }

            self.limiter.acquire().await;
            self.write_file(credentials, session, file)
                .await
                .map_err(|e| match e {
                    e @ ZiprepoError::Auth(_) => e,
                    other => ZiprepoError::Upload {
                        path: file.path.clone(),
                        message: other.to_string(),
                    },
                })?;

            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
        }
        Ok(())
    }

    async fn write_file(
        &self,
        credentials: &Credentials,
        session: &UploadSession,
        file: &UploadableFile,
    ) -> ZiprepoResult<()> {
        let lookup = self
            .client
            .get_content(
                credentials,
                &session.owner,
                &session.repo,
                &file.path,
                session.branch.as_deref(),
            )
            .await?;

        let (message, sha) = match lookup {
            ContentLookup::Found { sha } => (format!("Update {}", file.path), Some(sha)),
            ContentLookup::NotFound => (format!("Add {}", file.path), None),
        };

        debug!(path = %file.path, update = sha.is_some(), bytes = file.content.len(), "Writing file");
        let body = PutContent {
            path: file.path.clone(),
            message,
            content: STANDARD.encode(&file.content),
            sha,
            branch: session.branch.clone(),
        };
        self.client
            .put_content(credentials, &session.owner, &session.repo, &body)
            .await
    }

    async fn finalize(
        &self,
        credentials: &Credentials,
        session: &UploadSession,
    ) -> ZiprepoResult<UploadOutcome> {
        match (&session.branch, &session.default_branch) {
            (Some(branch), Some(base)) => {
                let pull = NewPullRequest {
                    title: self.pull_request.title.clone(),
                    head: branch.clone(),
                    base: base.clone(),
                    body: self.pull_request.body.clone(),
                };
                let pr = self
                    .client
                    .create_pull_request(credentials, &session.owner, &session.repo, &pull)
                    .await?;
                info!(number = pr.number, "Pull request opened");
                Ok(UploadOutcome::PullRequest(pr.html_url))
            }
            _ => {
                let repo = self
                    .client
                    .get_repository(credentials, &session.owner, &session.repo)
                    .await?;
                Ok(UploadOutcome::Repository(repo.html_url))
            }
        }
    }
}
