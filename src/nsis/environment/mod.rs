//! Environment state kept consistent with NSIS installations.
//!
//! - `path_list` - editing of delimited `PATH` strings
//! - `process` - `PATH` of the running process
//! - `registry` - persistent user/system `PATH` (Windows)
//! - `github` - GitHub Actions runner files

mod github;
mod path_list;
mod process;
mod registry;

pub use github::{github_path_add, runner_debug, set_output};
pub use path_list::{PathStyle, expand_vars, expand_vars_with};
pub use process::{process_path_add, process_path_remove};
pub use registry::{
    RegistryScope, broadcast_environment_change, registry_path_add, registry_path_remove,
};

/// Expand environment references in `path` and normalise it for the host.
pub fn expand_and_normalize(path: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(PathStyle::NATIVE.normalize(&expand_vars(path)))
}
