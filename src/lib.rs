//! ziprepo: publish ZIP archives and folders to GitHub repositories
//!
//! This crate re-exports the shared error, credential and path handling from
//! `ziprepo-core` and adds the extraction and upload pipeline.

pub use ziprepo_core::{
    format_error_with_help, CredentialStore, Credentials, ErrorHelp, ZiprepoError, ZiprepoResult,
};

/// Core module re-exported from ziprepo-core.
pub mod core {
    pub use ziprepo_core::core::*;
}

/// Configuration management.
pub mod config;

/// Dependency injection infrastructure.
pub mod di;

/// GitHub REST API client.
pub mod github;

/// System clock.
pub mod clock;

/// Fixed-window rate limiting.
pub mod rate_limit;

/// Archive, file and folder extraction.
pub mod extract;

/// Repository upload pipeline.
pub mod upload;
