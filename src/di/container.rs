//! Service container for dependency injection

use super::traits::{Clock, ConfigProvider, RepositoryClient};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::core::ZiprepoResult;
use crate::extract::ArchiveExtractor;
use crate::github::GitHubClient;
use crate::rate_limit::RateLimiter;
use crate::upload::RepositoryUploader;
use std::sync::Arc;

/// Service container for dependency injection
///
/// Holds the configuration, the GitHub client, the clock and the single
/// shared rate limiter. Every uploader built from one container draws from
/// the same budget.
///
/// # Example (Production)
///
/// ```no_run
/// use ziprepo::di::ServiceContainer;
///
/// # fn example() -> ziprepo::core::ZiprepoResult<()> {
/// let container = ServiceContainer::new()?;
/// println!("API: {}", container.config.api_url());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ServiceContainer {
    pub config: Arc<dyn ConfigProvider>,
    pub client: Arc<dyn RepositoryClient>,
    pub clock: Arc<dyn Clock>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl ServiceContainer {
    /// Create a new service container with production implementations
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Config file cannot be loaded or created
    /// - The configured rate limit is invalid
    pub fn new() -> ZiprepoResult<Self> {
        let config = Config::load()?;
        let client = GitHubClient::new(&config)?;
        Self::with_providers(Arc::new(config), Arc::new(client), Arc::new(SystemClock))
    }

    /// Create a service container with custom provider implementations
    ///
    /// This is primarily useful for testing, where you can inject mock
    /// implementations of each service.
    pub fn with_providers(
        config: Arc<dyn ConfigProvider>,
        client: Arc<dyn RepositoryClient>,
        clock: Arc<dyn Clock>,
    ) -> ZiprepoResult<Self> {
        let rate_limiter = Arc::new(RateLimiter::from_settings(
            config.rate_limit(),
            clock.clone(),
        )?);

        Ok(Self {
            config,
            client,
            clock,
            rate_limiter,
        })
    }

    /// Uploader wired to this container's services and settings
    pub fn uploader(&self) -> RepositoryUploader {
        RepositoryUploader::new(
            self.client.clone(),
            self.rate_limiter.clone(),
            self.clock.clone(),
        )
        .with_readiness(self.config.readiness().clone())
        .with_pull_request_template(self.config.pull_request().clone())
    }

    pub fn extractor(&self) -> ArchiveExtractor {
        ArchiveExtractor::new()
    }
}
