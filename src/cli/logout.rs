use ziprepo::core::credentials::GITHUB_TOKEN_KEY;
use ziprepo::core::{CredentialStore, ZiprepoResult};

pub fn run() -> ZiprepoResult<()> {
    if !CredentialStore::exists(GITHUB_TOKEN_KEY) {
        println!("No stored token.");
        return Ok(());
    }

    CredentialStore::delete(GITHUB_TOKEN_KEY)?;
    println!("✓ Token removed from the keychain");
    Ok(())
}
