use ziprepo::core::{Credentials, ZiprepoResult};
use ziprepo::di::ServiceContainer;
use ziprepo::github::CreateRepository;

pub async fn run(
    name: String,
    description: Option<String>,
    private: bool,
    readme: bool,
) -> ZiprepoResult<()> {
    let container = ServiceContainer::new()?;
    let credentials = Credentials::resolve()?;

    let repo = container
        .client
        .create_repository(
            &credentials,
            &CreateRepository {
                name,
                description,
                private,
                auto_init: readme,
            },
        )
        .await?;

    println!("✓ Created repository {}", repo.full_name);
    println!("  {}", repo.html_url);

    Ok(())
}
