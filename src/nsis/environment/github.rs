//! GitHub Actions runner files and flags.
//!
//! See: <https://docs.github.com/en/actions/writing-workflows/choosing-what-your-workflow-does/workflow-commands-for-github-actions>

use crate::nsis::error::{ErrorExt, Result};
use std::io::Write;
use std::path::Path;

/// File whose lines are prepended to `PATH` for subsequent steps.
pub const GITHUB_PATH_VAR: &str = "GITHUB_PATH";

/// File collecting `name=value` step outputs.
pub const GITHUB_OUTPUT_VAR: &str = "GITHUB_OUTPUT";

/// Set to `1` by the runner when debug logging is enabled.
pub const RUNNER_DEBUG_VAR: &str = "RUNNER_DEBUG";

/// Whether the runner asked for debug logging.
pub fn runner_debug() -> bool {
    std::env::var(RUNNER_DEBUG_VAR).is_ok_and(|v| v == "1")
}

/// Append `dir` to the `GITHUB_PATH` file.
///
/// Returns `false` when not running under GitHub Actions.
pub fn github_path_add(dir: &str) -> Result<bool> {
    let Some(file) = std::env::var_os(GITHUB_PATH_VAR) else {
        return Ok(false);
    };
    append_line(Path::new(&file), dir)?;
    log::info!("Added \"{}\" to {}", dir, GITHUB_PATH_VAR);
    Ok(true)
}

/// Publish a step output through `GITHUB_OUTPUT`.
///
/// Returns `false` when not running under GitHub Actions.
pub fn set_output(name: &str, value: &str) -> Result<bool> {
    let Some(file) = std::env::var_os(GITHUB_OUTPUT_VAR) else {
        return Ok(false);
    };
    append_line(Path::new(&file), &format!("{name}={value}"))?;
    log::debug!("Set output {}={}", name, value);
    Ok(true)
}

/// Append `line` and a newline to `file`, creating it if needed.
pub fn append_line(file: &Path, line: &str) -> Result<()> {
    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .fs_context("opening runner file", file)?;
    writeln!(f, "{line}").fs_context("appending to runner file", file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_line_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("github_path");

        append_line(&file, r"C:\Program Files\NSIS").unwrap();
        append_line(&file, r"C:\Tools").unwrap();

        let content = std::fs::read_to_string(&file).unwrap();
        assert_eq!(content, "C:\\Program Files\\NSIS\nC:\\Tools\n");
    }

    #[test]
    fn append_line_reports_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing").join("github_path");
        let err = append_line(&file, "x").unwrap_err();
        assert!(err.to_string().contains("opening runner file"));
    }
}
