pub mod credentials;
pub mod error;
pub mod error_help;
pub mod path;

pub use credentials::{CredentialStore, Credentials};
pub use error::{ZiprepoError, ZiprepoResult};
