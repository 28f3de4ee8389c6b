//! Fixed-window rate limiting for outbound GitHub calls
//!
//! At most `quota` tokens are handed out per window. A caller that finds the
//! window exhausted sleeps until it resets, then checks again. Time is read
//! and slept through the injected [`Clock`].

use crate::config::RateLimitSettings;
use crate::core::{ZiprepoError, ZiprepoResult};
use crate::di::Clock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Shared gate in front of the GitHub API
pub struct RateLimiter {
    quota: u32,
    window: Duration,
    budget: Mutex<RateBudget>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug)]
struct RateBudget {
    consumed: u32,
    window_start: Instant,
}

impl RateLimiter {
    /// Create a limiter allowing `quota` calls per `window`
    pub fn new(quota: u32, window: Duration, clock: Arc<dyn Clock>) -> ZiprepoResult<Self> {
        if quota == 0 {
            return Err(ZiprepoError::Config(
                "rate limit quota must be greater than zero".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(ZiprepoError::Config(
                "rate limit window must be greater than zero".to_string(),
            ));
        }

        let window_start = clock.now();
        Ok(Self {
            quota,
            window,
            budget: Mutex::new(RateBudget {
                consumed: 0,
                window_start,
            }),
            clock,
        })
    }

    pub fn from_settings(
        settings: &RateLimitSettings,
        clock: Arc<dyn Clock>,
    ) -> ZiprepoResult<Self> {
        settings.validate()?;
        Self::new(settings.max_requests, settings.window(), clock)
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Tokens consumed in the current window
    pub async fn consumed(&self) -> u32 {
        self.budget.lock().await.consumed
    }

    /// Wait until a token is available and consume it
    ///
    /// Never fails. Other tasks keep running while the caller waits.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut budget = self.budget.lock().await;
                let now = self.clock.now();

                if now.saturating_duration_since(budget.window_start) >= self.window {
                    budget.consumed = 0;
                    budget.window_start = now;
                }

                if budget.consumed < self.quota {
                    budget.consumed += 1;
                    debug!(
                        consumed = budget.consumed,
                        quota = self.quota,
                        "Rate limit token acquired"
                    );
                    return;
                }

                (budget.window_start + self.window).saturating_duration_since(now)
            };

            debug!(
                wait_ms = wait.as_millis() as u64,
                "Rate limit reached, waiting for window reset"
            );
            self.clock.sleep(wait).await;
        }
    }
}
