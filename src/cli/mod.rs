//! Command line interface for setup_nsis.
//!
//! Lists existing installations, then optionally uninstalls them and
//! installs a fresh copy.

mod args;

pub use args::{Args, RuntimeConfig};

use crate::error::{CliError, Result};
use crate::nsis::{self, InstallOptions, Installation};

/// Main CLI entry point
pub async fn run(args: Args, config: RuntimeConfig) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    if crate::nsis::environment::runner_debug() {
        log::debug!("GitHub debug logging enabled (RUNNER_DEBUG=1)");
    }
    log::info!("Arguments: {}", args.summary());

    list().await;

    let failed = if args.uninstall {
        uninstall_all(&config).await
    } else {
        Vec::new()
    };

    if args.install {
        let options = InstallOptions {
            arch: args.arch.clone(),
            dir: args.dir.clone(),
            download_dir: config.download_dir.clone(),
            tag: args.tag.clone(),
            token: args.token.clone(),
            register_path: config.manage_path,
        };
        let report = nsis::nsis_install(&options).await?;
        log::info!(
            "Installed nsis/{}/{} in \"{}\"",
            report.arch,
            report.version,
            report.dir.display()
        );
    }

    if failed.is_empty() {
        Ok(0)
    } else {
        Err(CliError::UninstallFailed { dirs: failed }.into())
    }
}

/// Parse arguments without executing (for testing)
pub fn parse_args() -> Args {
    Args::parse_args()
}

async fn list() {
    let dirs = nsis::nsis_list();
    if dirs.is_empty() {
        log::info!("No NSIS installations found");
        return;
    }
    for dir in dirs {
        let install = Installation::inspect(dir).await;
        log::info!("Found {} in \"{}\"", install.describe(), install.dir.display());
    }
}

/// Uninstall every installation; returns the directories that failed.
async fn uninstall_all(config: &RuntimeConfig) -> Vec<String> {
    let dirs = nsis::nsis_list();
    if dirs.is_empty() {
        log::info!("No NSIS installations found to uninstall");
        return Vec::new();
    }

    let mut failed = Vec::new();
    for dir in dirs {
        match nsis::nsis_uninstall(&dir, config.manage_path).await {
            Ok(Some(0) | None) => {}
            Ok(Some(code)) => {
                log::warn!("Uninstaller in \"{}\" returned {}", dir.display(), code);
                failed.push(dir.display().to_string());
            }
            Err(e) => {
                log::warn!("nsis_uninstall(\"{}\"): {}", dir.display(), e);
                failed.push(dir.display().to_string());
            }
        }
    }
    failed
}
