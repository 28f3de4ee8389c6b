use crate::core::error::{ZiprepoError, ZiprepoResult};
use keyring::Entry;
use std::fmt;

/// Service name for keyring entries
const KEYRING_SERVICE: &str = "ziprepo";

/// Keyring key holding the GitHub token
pub const GITHUB_TOKEN_KEY: &str = "github_token";

/// Environment variable checked before the keychain
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Manages credential storage using OS keychain
///
/// Platform support:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service (libsecret)
pub struct CredentialStore;

impl CredentialStore {
    /// Store a credential in the OS keychain
    pub fn store(key: &str, value: &str) -> ZiprepoResult<()> {
        let entry = Entry::new(KEYRING_SERVICE, key).map_err(|e| {
            ZiprepoError::Credential(format!("Failed to create keyring entry: {}", e))
        })?;

        entry.set_password(value).map_err(|e| {
            ZiprepoError::Credential(format!("Failed to store credential in keychain: {}", e))
        })?;

        Ok(())
    }

    /// Retrieve a credential from the OS keychain
    pub fn retrieve(key: &str) -> ZiprepoResult<String> {
        let entry = Entry::new(KEYRING_SERVICE, key).map_err(|e| {
            ZiprepoError::Credential(format!("Failed to create keyring entry: {}", e))
        })?;

        entry.get_password().map_err(|e| {
            ZiprepoError::Credential(format!(
                "Failed to retrieve credential from keychain: {}",
                e
            ))
        })
    }

    /// Delete a credential from the OS keychain
    pub fn delete(key: &str) -> ZiprepoResult<()> {
        let entry = Entry::new(KEYRING_SERVICE, key).map_err(|e| {
            ZiprepoError::Credential(format!("Failed to create keyring entry: {}", e))
        })?;

        entry.delete_credential().map_err(|e| {
            ZiprepoError::Credential(format!("Failed to delete credential from keychain: {}", e))
        })?;

        Ok(())
    }

    /// Check if a credential exists in the keychain
    pub fn exists(key: &str) -> bool {
        Self::retrieve(key).is_ok()
    }
}

/// Opaque bearer credential for the GitHub API.
///
/// Never empty. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> ZiprepoResult<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(ZiprepoError::Auth("GitHub token is required".to_string()));
        }
        Ok(Self { token })
    }

    /// Resolve the token from `GITHUB_TOKEN`, then the OS keychain.
    pub fn resolve() -> ZiprepoResult<Self> {
        if let Ok(token) = std::env::var(GITHUB_TOKEN_ENV) {
            if !token.trim().is_empty() {
                return Self::new(token);
            }
        }

        let token = CredentialStore::retrieve(GITHUB_TOKEN_KEY).map_err(|_| {
            ZiprepoError::Auth(
                "GitHub token not found. Set GITHUB_TOKEN or run 'ziprepo login' first."
                    .to_string(),
            )
        })?;
        Self::new(token)
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}
