//! Error types for NSIS setup operations.
//!
//! Provides the domain [`Error`], a [`Result`] alias, and small extension
//! traits that attach filesystem paths or free-form context to failures.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for NSIS setup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while discovering, downloading, installing or uninstalling NSIS.
#[derive(Error, Debug)]
pub enum Error {
    /// Catch-all error with a message
    #[error("{0}")]
    GenericError(String),

    /// IO error without path information
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// IO error tied to a specific path
    #[error("{context} ({}): {error}", path.display())]
    Fs {
        /// What was being attempted
        context: String,
        /// Path that was being operated on
        path: PathBuf,
        /// Underlying IO error
        error: std::io::Error,
    },

    /// A child process could not be spawned
    #[error("failed to run {command}: {error}")]
    CommandFailed {
        /// Command that failed to start
        command: String,
        /// Underlying IO error
        error: std::io::Error,
    },

    /// Unsupported or unknown CPU architecture
    #[error("{0}")]
    ArchError(String),

    /// Installer or uninstaller returned a non-zero exit code
    #[error("{program} returned {code}")]
    InstallerFailed {
        /// Installer path
        program: PathBuf,
        /// Process exit code (-1 when terminated without one)
        code: i32,
    },

    /// Post-install verification did not pass
    #[error("verification failed: {0}")]
    Verification(String),

    /// Malformed PE image
    #[error("{}: {reason}", path.display())]
    Pe {
        /// Inspected file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// HTTP request failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed GitHub API payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL construction failure
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid regular expression
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Windows-only operation on another platform
    #[error("{0} is only supported on Windows")]
    Unsupported(&'static str),

    /// Error wrapped with additional context
    #[error("{context}: {source}")]
    Context {
        /// Context message
        context: String,
        /// Wrapped error
        #[source]
        source: Box<Error>,
    },
}

/// Attach filesystem path information to IO results.
pub trait ErrorExt<T> {
    /// Convert an IO error into [`Error::Fs`] with the given context and path.
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context: context.to_string(),
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Attach a context message to any domain result.
pub trait Context<T> {
    /// Wrap the error with `context`.
    fn context(self, context: &str) -> Result<T>;
}

impl<T, E: Into<Error>> Context<T> for std::result::Result<T, E> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|e| Error::Context {
            context: context.to_string(),
            source: Box::new(e.into()),
        })
    }
}

/// Return early with an [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::nsis::Error::GenericError(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_context_keeps_path() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        let err = res.fs_context("opening installer", "C:/tmp/x.exe").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("opening installer"));
        assert!(msg.contains("x.exe"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn context_wraps_message() {
        let res: Result<()> = Err(Error::ArchError("unsupported architecture \"mips\"".into()));
        let err = res.context("installing NSIS").unwrap_err();
        assert_eq!(
            err.to_string(),
            "installing NSIS: unsupported architecture \"mips\""
        );
    }

    fn fails() -> Result<u32> {
        crate::bail!("nothing matched {}", 42)
    }

    #[test]
    fn bail_returns_generic_error() {
        match fails() {
            Err(Error::GenericError(msg)) => assert_eq!(msg, "nothing matched 42"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
