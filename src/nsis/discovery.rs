//! Discovery of existing NSIS installations.
//!
//! Installations are found through the uninstall key written by the NSIS
//! installer (every hive and registry view) and through the default
//! `Program Files` locations.

use super::{arch::Arch, environment::expand_and_normalize, pe, version};
use std::path::{Path, PathBuf};

/// Uninstall key written by the NSIS installer.
#[cfg_attr(not(windows), allow(dead_code))]
pub const UNINSTALL_KEY: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\NSIS";

/// Default installation directories, in lookup order.
pub const DEFAULT_LOCATIONS: [&str; 2] = [r"%ProgramFiles%\NSIS", r"%ProgramFiles(x86)%\NSIS"];

/// An NSIS installation found on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Installation {
    /// Installation directory (contains `makensis.exe`)
    pub dir: PathBuf,
    /// Architecture of `makensis.exe`, if recognised
    pub arch: Option<Arch>,
    /// Version reported by `makensis.exe /VERSION`
    pub version: Option<String>,
}

impl Installation {
    /// Inspect the installation in `dir`.
    pub async fn inspect(dir: PathBuf) -> Self {
        let makensis = dir.join(version::MAKENSIS_EXE);
        let arch = match pe::pe_architecture(&makensis).await {
            Ok(arch) => arch,
            Err(e) => {
                log::warn!("pe_architecture(\"{}\"): {}", makensis.display(), e);
                None
            }
        };
        let version = version::nsis_version(Some(&dir)).await;
        Self { dir, arch, version }
    }

    /// `nsis/<arch>/<version>` label.
    pub fn describe(&self) -> String {
        format!(
            "nsis/{}/{}",
            self.arch.map_or("unknown", |a| a.as_str()),
            self.version.as_deref().unwrap_or("unknown")
        )
    }
}

/// Directories of all NSIS installations, registry entries first.
pub fn nsis_list() -> Vec<PathBuf> {
    let mut candidates = registry_locations();
    candidates.extend(DEFAULT_LOCATIONS.iter().map(|dir| expand_and_normalize(dir)));
    collect_installations(candidates)
}

/// Keep candidates that contain `makensis.exe`, dropping duplicates.
pub fn collect_installations<I>(candidates: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut installations: Vec<PathBuf> = Vec::new();
    for dir in candidates {
        if !is_installation(&dir) {
            log::debug!("-- \"{}\" has no {}", dir.display(), version::MAKENSIS_EXE);
            continue;
        }
        if !installations.contains(&dir) {
            log::debug!(">> \"{}\" found", dir.display());
            installations.push(dir);
        }
    }
    installations
}

fn is_installation(dir: &Path) -> bool {
    dir.join(version::MAKENSIS_EXE).is_file()
}

/// `InstallLocation` values from every hive and registry view.
#[cfg(windows)]
fn registry_locations() -> Vec<PathBuf> {
    use winreg::RegKey;
    use winreg::enums::*;

    let lookups = [
        (HKEY_LOCAL_MACHINE, "HKLM", KEY_WOW64_64KEY),
        (HKEY_LOCAL_MACHINE, "HKLM", KEY_WOW64_32KEY),
        (HKEY_CURRENT_USER, "HKCU", KEY_WOW64_64KEY),
        (HKEY_CURRENT_USER, "HKCU", KEY_WOW64_32KEY),
    ];

    let mut locations = Vec::new();
    for (hive, hive_name, view) in lookups {
        let view_name = if view == KEY_WOW64_32KEY { "wow64" } else { "native" };
        let location = RegKey::predef(hive)
            .open_subkey_with_flags(UNINSTALL_KEY, KEY_READ | view)
            .and_then(|key| key.get_value::<String, _>("InstallLocation"));
        match location {
            Ok(dir) => {
                log::debug!(">> \"{hive_name}\\{UNINSTALL_KEY}\" ({view_name}): \"{dir}\"");
                locations.push(expand_and_normalize(&dir));
            }
            Err(e) => log::debug!("-- \"{hive_name}\\{UNINSTALL_KEY}\" ({view_name}): {e}"),
        }
    }
    locations
}

#[cfg(not(windows))]
fn registry_locations() -> Vec<PathBuf> {
    Vec::new()
}
