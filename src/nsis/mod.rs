//! NSIS lifecycle on CI runners.
//!
//! Finds, installs and uninstalls NSIS (Nullsoft Scriptable Install System)
//! and keeps `PATH` in sync with what is on disk.
//!
//! # Module Organization
//!
//! - `arch` - architecture names and aliases
//! - `pe` - PE header inspection
//! - `version` - makensis version probing
//! - `discovery` - locating existing installations
//! - `download` - GitHub release asset download
//! - `install` - download, silent install, `PATH` registration, verification
//! - `uninstall` - silent uninstall and `PATH` cleanup
//! - `environment` - `PATH` lists, registry and runner files
//! - `error` - error types

mod arch;
mod discovery;
mod download;
pub mod environment;
pub mod error;
mod install;
mod pe;
mod uninstall;
mod version;

pub use arch::Arch;
pub use discovery::{Installation, collect_installations, nsis_list};
pub use download::{
    Asset, Release, ReleaseQuery, download_github_asset, parse_release, release_api_url, select_asset,
};
pub use error::{Context, Error, ErrorExt, Result};
pub use install::{InstallOptions, InstallReport, nsis_install};
pub use pe::pe_architecture;
pub use uninstall::nsis_uninstall;
pub use version::{nsis_version, parse_version};
