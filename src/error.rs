//! Top-level error types for the command line tool.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, ActionError>;

/// Main error type for all CLI operations
#[derive(Error, Debug)]
pub enum ActionError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// NSIS setup errors
    #[error("{0}")]
    Nsis(#[from] crate::nsis::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// One or more uninstallers reported failure
    #[error("Uninstall failed for: {dirs:?}")]
    UninstallFailed {
        /// Installation directories whose uninstaller failed
        dirs: Vec<String>,
    },
}
