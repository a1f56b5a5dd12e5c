//! Persistent user and system `PATH` stored in the Windows registry.
//!
//! Values are read and written through the 64-bit registry view and keep
//! their original type (`REG_EXPAND_SZ` stays expandable). Every write is
//! followed by a `WM_SETTINGCHANGE` broadcast so that Explorer and new
//! shells pick up the change.

use crate::nsis::error::Result;

#[cfg(not(windows))]
use crate::nsis::error::Error;

/// Which persistent environment to edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryScope {
    /// `HKCU\Environment`
    User,
    /// `HKLM\SYSTEM\CurrentControlSet\Control\Session Manager\Environment`
    System,
}

impl RegistryScope {
    /// Subkey holding the environment block.
    pub fn subkey(&self) -> &'static str {
        match self {
            RegistryScope::User => r"Environment",
            RegistryScope::System => r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment",
        }
    }

    /// Name of the value holding the directory list.
    pub fn value_name(&self) -> &'static str {
        "Path"
    }

    /// Short label used in log messages.
    pub fn label(&self) -> &'static str {
        match self {
            RegistryScope::User => "user",
            RegistryScope::System => "system",
        }
    }
}

/// Add `dir` to the persistent `PATH` of `scope`. Returns whether it changed.
pub fn registry_path_add(dir: &str, scope: RegistryScope, keep_existing: bool, front: bool) -> Result<bool> {
    let changed = edit_path(scope, |list| {
        super::PathStyle::WINDOWS.path_add(list, dir, keep_existing, front)
    })?;
    if changed {
        log::info!("Added \"{}\" to {} PATH", dir, scope.label());
    }
    Ok(changed)
}

/// Remove every occurrence of `dir` from the persistent `PATH` of `scope`.
pub fn registry_path_remove(dir: &str, scope: RegistryScope) -> Result<bool> {
    let changed = edit_path(scope, |list| super::PathStyle::WINDOWS.path_remove(list, dir))?;
    if changed {
        log::info!("Removed \"{}\" from {} PATH", dir, scope.label());
    }
    Ok(changed)
}

#[cfg(windows)]
fn edit_path<F>(scope: RegistryScope, edit: F) -> Result<bool>
where
    F: FnOnce(&str) -> Option<String>,
{
    use crate::nsis::error::Context;
    use winreg::RegKey;
    use winreg::enums::*;

    let hive = match scope {
        RegistryScope::User => RegKey::predef(HKEY_CURRENT_USER),
        RegistryScope::System => RegKey::predef(HKEY_LOCAL_MACHINE),
    };

    let key = hive
        .open_subkey_with_flags(scope.subkey(), KEY_READ | KEY_WOW64_64KEY)
        .context(&format!("opening {} environment key", scope.label()))?;
    let current: String = key
        .get_value(scope.value_name())
        .context(&format!("reading {} PATH", scope.label()))?;
    let vtype = key
        .get_raw_value(scope.value_name())
        .map(|v| v.vtype)
        .unwrap_or(REG_EXPAND_SZ);
    drop(key);

    let Some(updated) = edit(&current) else {
        return Ok(false);
    };

    let key = hive
        .open_subkey_with_flags(scope.subkey(), KEY_WRITE | KEY_WOW64_64KEY)
        .context(&format!("opening {} environment key for writing", scope.label()))?;
    let bytes = updated
        .encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect();
    key.set_raw_value(scope.value_name(), &winreg::RegValue { bytes, vtype })
        .context(&format!("writing {} PATH", scope.label()))?;

    broadcast_environment_change();
    Ok(true)
}

#[cfg(not(windows))]
fn edit_path<F>(_scope: RegistryScope, _edit: F) -> Result<bool>
where
    F: FnOnce(&str) -> Option<String>,
{
    Err(Error::Unsupported("registry PATH editing"))
}

/// Notify top-level windows that the environment block changed.
#[cfg(windows)]
pub fn broadcast_environment_change() {
    use windows::Win32::Foundation::{LPARAM, WPARAM};
    use windows::Win32::UI::WindowsAndMessaging::{
        HWND_BROADCAST, SMTO_ABORTIFHUNG, SendMessageTimeoutW, WM_SETTINGCHANGE,
    };
    use windows::core::w;

    let mut result = 0usize;
    // SAFETY: the lParam points to a static, NUL-terminated UTF-16 literal that
    // outlives the call; the result pointer refers to a live local.
    let ret = unsafe {
        SendMessageTimeoutW(
            HWND_BROADCAST,
            WM_SETTINGCHANGE,
            WPARAM(0),
            LPARAM(w!("Environment").as_ptr() as isize),
            SMTO_ABORTIFHUNG,
            5000,
            Some(&mut result as *mut usize),
        )
    };
    log::debug!(
        "SendMessageTimeout(HWND_BROADCAST, WM_SETTINGCHANGE, \"Environment\") = {}",
        ret.0
    );
}

/// Notify top-level windows that the environment block changed.
#[cfg(not(windows))]
pub fn broadcast_environment_change() {
    log::debug!("WM_SETTINGCHANGE broadcast skipped: not running on Windows");
}
