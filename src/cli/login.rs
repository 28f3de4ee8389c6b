use dialoguer::Password;
use ziprepo::config::Config;
use ziprepo::core::credentials::GITHUB_TOKEN_KEY;
use ziprepo::core::{CredentialStore, Credentials, ZiprepoError, ZiprepoResult};
use ziprepo::github::GitHubClient;

pub async fn run() -> ZiprepoResult<()> {
    println!("GitHub Login");
    println!("Create a token with the 'repo' scope at https://github.com/settings/tokens");
    println!();

    let token = Password::new()
        .with_prompt("Token")
        .interact()
        .map_err(|e| ZiprepoError::Credential(format!("Failed to read token: {}", e)))?;
    let credentials = Credentials::new(token)?;

    // Check the token before storing it
    let config = Config::load()?;
    let client = GitHubClient::new(&config)?;
    let user = client.authenticated_user(&credentials).await?;

    CredentialStore::store(GITHUB_TOKEN_KEY, credentials.token())?;

    println!();
    println!("✓ Logged in as {}", user.login);

    Ok(())
}
