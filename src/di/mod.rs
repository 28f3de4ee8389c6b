//! Dependency injection infrastructure for ziprepo
//!
//! Services reach configuration, the GitHub API and time only through the
//! traits in [`traits`], so the upload pipeline can run against mocks.
//!
//! # Example (Production)
//! ```no_run
//! use ziprepo::di::ServiceContainer;
//!
//! # fn example() -> ziprepo::core::ZiprepoResult<()> {
//! let container = ServiceContainer::new()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example (Testing)
//! ```
//! use ziprepo::di::{ServiceContainer, mocks::*};
//! use std::sync::Arc;
//!
//! # fn example() -> ziprepo::core::ZiprepoResult<()> {
//! let config = Arc::new(MockConfigProvider::default());
//! let client = Arc::new(MockRepositoryClient::new("octo"));
//! let clock = Arc::new(ManualClock::new());
//!
//! let container = ServiceContainer::with_providers(config, client, clock)?;
//! # Ok(())
//! # }
//! ```

pub mod container;
pub mod mocks;
pub mod traits;

// Re-export key types
pub use container::ServiceContainer;
pub use traits::{Clock, ConfigProvider, RepositoryClient};
