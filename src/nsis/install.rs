//! NSIS installation from GitHub releases.
//!
//! Downloads the `negrutiu/nsis` installer for the requested architecture,
//! runs it silently, registers the installation directory in `PATH`, and
//! verifies the result.
//!
//! # Process
//!
//! 1. Normalise the architecture name
//! 2. Download the matching release asset (reused when already present)
//! 3. Parse the version from the asset name
//! 4. Run `<installer> /S [/D=<dir>]`
//! 5. Register the installation directory (runner file, process, system `PATH`)
//! 6. Verify version, PE architecture and bundled plugins

use super::{
    arch::Arch,
    download::{ReleaseQuery, download_github_asset},
    environment::{
        RegistryScope, expand_and_normalize, github_path_add, process_path_add, registry_path_add,
        set_output,
    },
    error::{Error, Result},
    pe::pe_architecture,
    version::{MAKENSIS_EXE, nsis_version},
};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Owner of the NSIS fork whose releases are installed.
pub const RELEASE_OWNER: &str = "negrutiu";

/// Repository of the NSIS fork whose releases are installed.
pub const RELEASE_REPO: &str = "nsis";

/// Plugin targets and plugins that must be present after installation.
const REQUIRED_PLUGINS: &[(&str, &str)] = &[
    ("x86-unicode", "NScurl.dll"),
    ("amd64-unicode", "NScurl.dll"),
    ("x86-ansi", "NScurl.dll"),
];

/// What to install and where.
#[derive(Clone, Debug)]
pub struct InstallOptions {
    /// Architecture name as supplied by the user (e.g. `x64`, `Win32`)
    pub arch: String,
    /// Custom installation directory; `None` uses the installer default
    pub dir: Option<String>,
    /// Directory receiving the downloaded installer
    pub download_dir: PathBuf,
    /// Release tag, or `latest`
    pub tag: String,
    /// GitHub API token
    pub token: Option<String>,
    /// Register the installation directory in `PATH`
    pub register_path: bool,
}

/// Outcome of a successful installation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallReport {
    /// Installation directory
    pub dir: PathBuf,
    /// Installed version
    pub version: String,
    /// Installed architecture
    pub arch: Arch,
}

/// Asset name pattern for `arch`.
pub fn asset_pattern(arch: Arch) -> String {
    format!(r"nsis-.*-{}\.exe", arch.as_str())
}

/// Version embedded in an installer file name.
///
/// `nsis-3.11.7461.288-negrutiu-x86.exe` yields `3.11.7461.288`.
pub fn version_from_asset_name(name: &str, arch: Arch) -> Result<String> {
    let re = Regex::new(&format!(r"nsis-(.+)-.*-{}\.exe", arch.as_str()))?;
    let Some(caps) = re.captures(name) else {
        crate::bail!("failed to parse version from \"{name}\"");
    };
    Ok(caps[1].to_string())
}

/// Directory the installer actually used.
///
/// The requested directory wins when it exists after installation; otherwise
/// the default location for `arch` is assumed.
pub fn effective_install_dir(requested: Option<&Path>, arch: Arch) -> PathBuf {
    match requested {
        Some(dir) if dir.is_dir() => dir.to_path_buf(),
        _ => arch.default_install_dir(),
    }
}

/// Download and install NSIS.
pub async fn nsis_install(options: &InstallOptions) -> Result<InstallReport> {
    let arch = Arch::normalize(&options.arch)?;

    let query = ReleaseQuery {
        owner: RELEASE_OWNER.to_string(),
        repo: RELEASE_REPO.to_string(),
        tag: options.tag.clone(),
        asset_pattern: asset_pattern(arch),
        token: options.token.clone(),
    };
    let installer = download_github_asset(&query, &options.download_dir).await?;
    let installer_name = installer
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let version = version_from_asset_name(&installer_name, arch)?;

    let requested = options
        .dir
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(expand_and_normalize);
    run_installer(&installer, requested.as_deref()).await?;

    let dir = effective_install_dir(requested.as_deref(), arch);
    let dir_str = dir.to_string_lossy().into_owned();

    if options.register_path {
        register_path(&dir_str);
    } else {
        log::debug!("PATH entries left intact");
    }

    verify(&dir, &version, arch, options.register_path).await?;

    let report = InstallReport { dir, version, arch };
    publish(&report);
    Ok(report)
}

/// Run the installer silently, optionally into `dir`.
async fn run_installer(installer: &Path, dir: Option<&Path>) -> Result<()> {
    let mut command = tokio::process::Command::new(installer);
    command.arg("/S");
    let mut commandline = format!("\"{}\" /S", installer.display());

    if let Some(dir) = dir {
        // NSIS wants /D= last and unquoted, even with spaces
        let arg = format!("/D={}", dir.display());
        #[cfg(windows)]
        command.raw_arg(&arg);
        #[cfg(not(windows))]
        command.arg(&arg);
        commandline.push(' ');
        commandline.push_str(&arg);
    }

    let status = command.status().await.map_err(|error| Error::CommandFailed {
        command: commandline.clone(),
        error,
    })?;
    let code = status.code().unwrap_or(-1);
    log::info!("Run {} : {}", commandline, code);

    if !status.success() {
        return Err(Error::InstallerFailed {
            program: installer.to_path_buf(),
            code,
        });
    }
    Ok(())
}

/// Make `dir` visible to this process, later workflow steps and new shells.
fn register_path(dir: &str) {
    if let Err(e) = github_path_add(dir) {
        log::warn!("github_path_add(\"{}\"): {}", dir, e);
    }
    process_path_add(dir, true, true);
    if let Err(e) = registry_path_add(dir, RegistryScope::System, true, true) {
        log::warn!("registry_path_add(\"{}\", system): {}", dir, e);
    }
}

fn check(what: String, passed: bool) -> Result<()> {
    log::debug!("Verify {} : {}", what, if passed { "PASS" } else { "FAIL" });
    if passed { Ok(()) } else { Err(Error::Verification(what)) }
}

/// Post-install checks.
async fn verify(dir: &Path, version: &str, arch: Arch, through_path: bool) -> Result<()> {
    if through_path {
        let found = nsis_version(None).await;
        check(
            format!("version(\"makensis\" in PATH) == {version}, got {found:?}"),
            found.as_deref() == Some(version),
        )?;
    }

    let makensis = dir.join(MAKENSIS_EXE);
    let found = nsis_version(Some(dir)).await;
    check(
        format!("version(\"{}\") == {version}, got {found:?}", makensis.display()),
        found.as_deref() == Some(version),
    )?;

    let found = pe_architecture(&makensis).await?;
    check(
        format!(
            "arch(\"{}\") == {arch}, got {}",
            makensis.display(),
            found.map_or("unknown", |a| a.as_str())
        ),
        found == Some(arch),
    )?;

    for (target, plugin) in REQUIRED_PLUGINS {
        let path = dir.join("Plugins").join(target).join(plugin);
        check(format!("exists(\"{}\")", path.display()), path.is_file())?;
    }
    Ok(())
}

/// Expose the installation to later workflow steps.
fn publish(report: &InstallReport) {
    let outputs = [
        ("nsis-dir", report.dir.to_string_lossy().into_owned()),
        ("nsis-version", report.version.clone()),
        ("nsis-arch", report.arch.to_string()),
    ];
    for (name, value) in outputs {
        if let Err(e) = set_output(name, &value) {
            log::warn!("set_output(\"{}\"): {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_patterns_per_arch() {
        assert_eq!(asset_pattern(Arch::X86), r"nsis-.*-x86\.exe");
        assert_eq!(asset_pattern(Arch::Amd64), r"nsis-.*-amd64\.exe");
    }

    #[test]
    fn parses_version_from_asset_name() {
        assert_eq!(
            version_from_asset_name("nsis-3.11.7461.288-negrutiu-x86.exe", Arch::X86).unwrap(),
            "3.11.7461.288"
        );
        assert_eq!(
            version_from_asset_name("nsis-3.10-negrutiu-amd64.exe", Arch::Amd64).unwrap(),
            "3.10"
        );
    }

    #[test]
    fn version_parse_requires_matching_arch() {
        let err = version_from_asset_name("nsis-3.11-negrutiu-x86.exe", Arch::Amd64).unwrap_err();
        assert!(err.to_string().contains("failed to parse version"));
    }

    #[test]
    fn requested_dir_wins_only_when_present() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(
            effective_install_dir(Some(root.path()), Arch::X86),
            root.path().to_path_buf()
        );

        let missing = root.path().join("missing");
        assert_eq!(
            effective_install_dir(Some(&missing), Arch::Amd64),
            Arch::Amd64.default_install_dir()
        );
        assert_eq!(effective_install_dir(None, Arch::X86), Arch::X86.default_install_dir());
    }

    #[test]
    fn failed_check_reports_what() {
        assert!(check("ok".into(), true).is_ok());
        let err = check("exists(\"x\")".into(), false).unwrap_err();
        assert_eq!(err.to_string(), "verification failed: exists(\"x\")");
    }

    #[tokio::test]
    async fn rejects_unknown_arch_before_downloading() {
        let options = InstallOptions {
            arch: "sparc".into(),
            dir: None,
            download_dir: std::env::temp_dir(),
            tag: "latest".into(),
            token: None,
            register_path: false,
        };
        let err = nsis_install(&options).await.unwrap_err();
        assert!(matches!(err, Error::ArchError(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn installer_exit_code_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        match run_installer(Path::new("/bin/false"), Some(dir.path())).await {
            Err(Error::InstallerFailed { code, .. }) => assert_eq!(code, 1),
            other => panic!("unexpected: {other:?}"),
        }
    }

    /// Installation whose `makensis.exe` is a shell script printing
    /// `v<version>`, followed by an x86 COFF header at offset 0x40.
    #[cfg(unix)]
    fn fake_installation(root: &Path, version: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let mut image = format!("#!/bin/sh\necho v{version}\nexit 0\n").into_bytes();
        assert!(image.len() < 0x3C);
        image.resize(0x3C, b'\n');
        image.extend_from_slice(&0x40u32.to_le_bytes());
        image.extend_from_slice(b"PE\0\0");
        image.extend_from_slice(&goblin::pe::header::COFF_MACHINE_X86.to_le_bytes());
        image.resize(0x40 + 4 + goblin::pe::header::SIZEOF_COFF_HEADER, 0);

        let dir = root.join("NSIS");
        std::fs::create_dir_all(&dir).unwrap();
        let makensis = dir.join(MAKENSIS_EXE);
        std::fs::write(&makensis, image).unwrap();
        std::fs::set_permissions(&makensis, std::fs::Permissions::from_mode(0o755)).unwrap();

        for (target, plugin) in REQUIRED_PLUGINS {
            let plugins = dir.join("Plugins").join(target);
            std::fs::create_dir_all(&plugins).unwrap();
            std::fs::write(plugins.join(plugin), b"MZ").unwrap();
        }
        dir
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn verifies_complete_installation() {
        let root = tempfile::tempdir().unwrap();
        let dir = fake_installation(root.path(), "3.10");
        verify(&dir, "3.10", Arch::X86, false).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn version_mismatch_fails_verification() {
        let root = tempfile::tempdir().unwrap();
        let dir = fake_installation(root.path(), "3.10");
        match verify(&dir, "3.11", Arch::X86, false).await {
            Err(Error::Verification(what)) => {
                assert!(what.contains("== 3.11"), "{what}");
                assert!(what.contains("Some(\"3.10\")"), "{what}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn arch_mismatch_fails_verification() {
        let root = tempfile::tempdir().unwrap();
        let dir = fake_installation(root.path(), "3.10");
        match verify(&dir, "3.10", Arch::Amd64, false).await {
            Err(Error::Verification(what)) => assert!(what.contains("got x86"), "{what}"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_plugin_fails_verification() {
        let root = tempfile::tempdir().unwrap();
        let dir = fake_installation(root.path(), "3.10");
        std::fs::remove_file(dir.join("Plugins").join("x86-ansi").join("NScurl.dll")).unwrap();
        match verify(&dir, "3.10", Arch::X86, false).await {
            Err(Error::Verification(what)) => {
                assert!(what.starts_with("exists("), "{what}");
                assert!(what.contains("x86-ansi"), "{what}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn path_lookup_runs_only_when_registered() {
        let root = tempfile::tempdir().unwrap();
        // no makensis on this host's PATH reports this version
        let dir = fake_installation(root.path(), "0.0.1");

        verify(&dir, "0.0.1", Arch::X86, false).await.unwrap();
        match verify(&dir, "0.0.1", Arch::X86, true).await {
            Err(Error::Verification(what)) => assert!(what.contains("in PATH"), "{what}"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_installer_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let installer = dir.path().join("nsis-3.11-negrutiu-x86.exe");
        match run_installer(&installer, None).await {
            Err(Error::CommandFailed { command, .. }) => assert!(command.ends_with("\" /S")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
