//! Core utilities shared by the ziprepo binary and library:
//! the error taxonomy, platform paths and credential storage.

pub mod core;

pub use crate::core::credentials::{CredentialStore, Credentials};
pub use crate::core::error::{ZiprepoError, ZiprepoResult};
pub use crate::core::error_help::{format_error_with_help, ErrorHelp};
