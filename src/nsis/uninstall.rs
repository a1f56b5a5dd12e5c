//! NSIS removal.
//!
//! Runs the bundled uninstaller in place (`_?=` keeps it from copying itself
//! to a temporary location), then removes the leftovers and the directory
//! from every `PATH` it may have been registered in.

use super::{
    environment::{RegistryScope, process_path_remove, registry_path_remove},
    error::{Error, ErrorExt, Result},
    version::MAKENSIS_EXE,
};
use std::path::Path;

/// Uninstaller shipped with every NSIS installation.
pub const UNINSTALLER_EXE: &str = "uninst-nsis.exe";

/// Whether `dir` looks like a complete NSIS installation that can uninstall itself.
pub fn is_uninstallable(dir: &Path) -> bool {
    dir.join("Bin").join(MAKENSIS_EXE).is_file() && dir.join(UNINSTALLER_EXE).is_file()
}

/// Uninstall the NSIS installation in `dir`.
///
/// Returns the uninstaller exit code, or `None` when `dir` holds no
/// uninstallable NSIS.
pub async fn nsis_uninstall(dir: &Path, unregister_path: bool) -> Result<Option<i32>> {
    if !is_uninstallable(dir) {
        log::warn!("nsis_uninstall(\"{}\") did not find NSIS", dir.display());
        return Ok(None);
    }

    let uninstaller = dir.join(UNINSTALLER_EXE);
    let code = run_uninstaller(&uninstaller, dir).await?;
    if code != 0 {
        return Ok(Some(code));
    }

    tokio::fs::remove_file(&uninstaller)
        .await
        .fs_context("removing uninstaller", &uninstaller)?;
    tokio::fs::remove_dir(dir)
        .await
        .fs_context("removing installation directory", dir)?;

    if unregister_path {
        unregister(&dir.to_string_lossy());
    } else {
        log::debug!("PATH entries left intact");
    }
    Ok(Some(code))
}

async fn run_uninstaller(uninstaller: &Path, dir: &Path) -> Result<i32> {
    let arg = format!("_?={}", dir.display());
    let commandline = format!("\"{}\" /S {}", uninstaller.display(), arg);

    let mut command = tokio::process::Command::new(uninstaller);
    command.arg("/S");
    // _?= must be last and unquoted
    #[cfg(windows)]
    command.raw_arg(&arg);
    #[cfg(not(windows))]
    command.arg(&arg);

    let status = command.status().await.map_err(|error| Error::CommandFailed {
        command: commandline.clone(),
        error,
    })?;
    let code = status.code().unwrap_or(-1);
    log::info!("Run {} : {}", commandline, code);
    Ok(code)
}

fn unregister(dir: &str) {
    process_path_remove(dir);
    for scope in [RegistryScope::User, RegistryScope::System] {
        if let Err(e) = registry_path_remove(dir, scope) {
            log::warn!("registry_path_remove(\"{}\", {}): {}", dir, scope.label(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_compiler_and_uninstaller() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path();
        assert!(!is_uninstallable(dir));

        std::fs::create_dir_all(dir.join("Bin")).unwrap();
        std::fs::write(dir.join("Bin").join(MAKENSIS_EXE), b"MZ").unwrap();
        assert!(!is_uninstallable(dir));

        std::fs::write(dir.join(UNINSTALLER_EXE), b"MZ").unwrap();
        assert!(is_uninstallable(dir));
    }

    #[tokio::test]
    async fn skips_directories_without_nsis() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(nsis_uninstall(root.path(), false).await.unwrap(), None);
        assert!(root.path().exists());
    }

    #[tokio::test]
    async fn unlaunchable_uninstaller_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("NSIS");
        std::fs::create_dir_all(dir.join("Bin")).unwrap();
        std::fs::write(dir.join("Bin").join(MAKENSIS_EXE), b"MZ").unwrap();
        std::fs::write(dir.join(UNINSTALLER_EXE), b"not a program").unwrap();

        let err = nsis_uninstall(&dir, false).await.unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
        assert!(dir.join(UNINSTALLER_EXE).exists());
    }
}
