//! NSIS setup library for CI runners
//!
//! This library provides the building blocks of the `setup_nsis` tool:
//! - discovery of existing NSIS installations (registry and default locations)
//! - download of `negrutiu/nsis` releases from GitHub
//! - silent install/uninstall with post-install verification
//! - `PATH` editing for the process, the registry and GitHub Actions
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod nsis;

// Re-export commonly used types
pub use error::{ActionError, CliError, Result};
