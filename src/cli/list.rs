use ziprepo::core::{Credentials, ZiprepoResult};
use ziprepo::di::ServiceContainer;
use ziprepo::github::GitHubRepo;

pub async fn run() -> ZiprepoResult<()> {
    let container = ServiceContainer::new()?;
    let credentials = Credentials::resolve()?;

    let repos = container.client.list_repositories(&credentials).await?;
    if repos.is_empty() {
        println!("No repositories found.");
        return Ok(());
    }

    for repo in &repos {
        println!("{}", format_repo(repo));
    }
    println!();
    println!("{} repositories", repos.len());

    Ok(())
}

fn format_repo(repo: &GitHubRepo) -> String {
    let visibility = if repo.private { "private" } else { "public" };
    let updated = repo
        .updated_at
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut line = format!(
        "{} ({})  ★ {}  ⑂ {}  updated {}\n  {}",
        repo.name, visibility, repo.stargazers_count, repo.forks_count, updated, repo.html_url
    );
    if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!("\n  {}", description));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_repo() {
        let repo = GitHubRepo {
            id: 1,
            name: "demo".to_string(),
            full_name: "octo/demo".to_string(),
            html_url: "https://github.com/octo/demo".to_string(),
            default_branch: "main".to_string(),
            description: Some("A demo".to_string()),
            private: true,
            stargazers_count: 3,
            forks_count: 1,
            updated_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        };

        let line = format_repo(&repo);
        assert!(line.starts_with("demo (private)"));
        assert!(line.contains("updated 2024-05-01"));
        assert!(line.contains("https://github.com/octo/demo"));
        assert!(line.ends_with("A demo"));
    }
}
