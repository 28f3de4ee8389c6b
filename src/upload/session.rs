/// State of one upload call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    pub owner: String,
    pub repo: String,
    pub is_new_repo: bool,
    /// Working branch; `None` writes to the default branch
    pub branch: Option<String>,
    pub default_branch: Option<String>,
    pub default_branch_sha: Option<String>,
}

impl UploadSession {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, is_new_repo: bool) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            is_new_repo,
            branch: None,
            default_branch: None,
            default_branch_sha: None,
        }
    }

    /// Name of the working branch created at `epoch_millis`
    pub fn branch_name(epoch_millis: i64) -> String {
        format!("update-{}", epoch_millis)
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
