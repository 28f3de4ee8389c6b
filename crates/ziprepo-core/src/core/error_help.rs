//! Human-friendly rendering of errors for the CLI

use crate::core::error::ZiprepoError;

/// A suggestion attached to an error category
pub trait ErrorHelp {
    /// One-line hint on how to recover, if there is one
    fn help(&self) -> Option<&'static str>;
}

impl ErrorHelp for ZiprepoError {
    fn help(&self) -> Option<&'static str> {
        match self {
            ZiprepoError::Auth(_) => Some(
                "Set GITHUB_TOKEN or run 'ziprepo login' with a token that has the 'repo' scope.",
            ),
            ZiprepoError::CorruptArchive { .. } => {
                Some("Re-create the archive; the ZIP central directory could not be read.")
            }
            ZiprepoError::EmptyArchive { .. } => {
                Some("The input contains only directories. Add at least one file.")
            }
            ZiprepoError::InputRejected { .. } => Some(
                "Adjust 'allowed_extensions' or 'max_input_bytes' in config.yaml to accept it.",
            ),
            ZiprepoError::Upload { .. } => Some(
                "Files written before the failure stay in the repository. Re-run to overwrite them.",
            ),
            ZiprepoError::Api {
                status: Some(403), ..
            } => Some("The token may lack permission, or the API rate limit was hit."),
            ZiprepoError::Api {
                status: Some(404), ..
            } => Some("Check the repository name and that the token can see it."),
            ZiprepoError::Api {
                status: Some(422), ..
            } => Some("Pick a different repository name."),
            ZiprepoError::Config(_) | ZiprepoError::Yaml(_) => {
                Some("Check config.yaml (see 'ziprepo config path').")
            }
            ZiprepoError::Credential(_) => {
                Some("The OS keychain is unavailable. Use the GITHUB_TOKEN environment variable.")
            }
            _ => None,
        }
    }
}

/// Format an error with its recovery hint for display on stderr
pub fn format_error_with_help(error: &ZiprepoError) -> String {
    match error.help() {
        Some(help) => format!("Error: {}\n\n  help: {}", error, help),
        None => format!("Error: {}", error),
    }
}
