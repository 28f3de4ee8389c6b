use thiserror::Error;

pub type ZiprepoResult<T> = Result<T, ZiprepoError>;

#[derive(Error, Debug)]
pub enum ZiprepoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WalkDir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential error: {0}")]
    Credential(String),

    /// The GitHub token is missing or was rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The archive container itself could not be parsed.
    #[error("Invalid or corrupted ZIP file: {name}")]
    CorruptArchive { name: String },

    /// Extraction finished without a single usable file.
    #[error("No valid files found in {name}")]
    EmptyArchive { name: String },

    /// Any other failure while turning one input into files.
    #[error("Failed to process {name}: {cause}")]
    Processing { name: String, cause: String },

    /// A single file write (or its existence lookup) failed.
    #[error("Failed to upload {path}: {message}")]
    Upload { path: String, message: String },

    /// An input refused at intake (size ceiling or extension allow-list).
    #[error("Rejected input {name}: {reason}")]
    InputRejected { name: String, reason: String },

    /// Non-success response from the GitHub API.
    #[error("GitHub API error: {message}")]
    Api { status: Option<u16>, message: String },

    #[error("Upload cancelled")]
    Cancelled,
}

impl ZiprepoError {
    /// HTTP status carried by an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ZiprepoError::Api { status, .. } => *status,
            ZiprepoError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
