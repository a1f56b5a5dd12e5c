//! Command line argument parsing and validation.

use clap::Parser;
use std::path::PathBuf;

/// Install, list and uninstall NSIS on CI runners
#[derive(Parser, Debug)]
#[command(
    name = "setup_nsis",
    version,
    about = "Install, list and uninstall NSIS on CI runners",
    long_about = "Lists existing NSIS installations, optionally uninstalls all of them, and
optionally installs the latest negrutiu/nsis release, registering it in PATH.

Usage:
  setup_nsis
  setup_nsis --uninstall
  setup_nsis --install --arch amd64
  setup_nsis --uninstall --install --arch x86 --dir \"C:\\NSIS\"

Debug logging is enabled with --verbose or RUNNER_DEBUG=1."
)]
pub struct Args {
    /// NSIS architecture (install only): x86, Win32, i386..i686, amd64, x64, x86_64
    #[arg(short, long, default_value = "x86", value_name = "ARCH")]
    pub arch: String,

    /// Custom installation directory (install only)
    #[arg(short, long, value_name = "DIR", requires = "install")]
    pub dir: Option<String>,

    /// Install NSIS
    #[arg(short, long)]
    pub install: bool,

    /// Uninstall all NSIS installations
    #[arg(short, long)]
    pub uninstall: bool,

    /// More verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Release tag to install
    #[arg(long, default_value = "latest", value_name = "TAG")]
    pub tag: String,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Directory receiving the downloaded installer [default: system temp dir]
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Leave PATH untouched when installing or uninstalling
    #[arg(long)]
    pub no_path: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.arch.trim().is_empty() {
            return Err("Architecture cannot be empty".to_string());
        }
        if self.tag.trim().is_empty() {
            return Err("Release tag cannot be empty".to_string());
        }
        Ok(())
    }

    /// One-line rendering for the log, with the token redacted.
    pub fn summary(&self) -> String {
        format!(
            "arch={:?} dir={:?} install={} uninstall={} verbose={} tag={:?} token={} download_dir={:?} no_path={}",
            self.arch,
            self.dir,
            self.install,
            self.uninstall,
            self.verbose,
            self.tag,
            if self.token.is_some() { "<set>" } else { "<unset>" },
            self.download_dir,
            self.no_path
        )
    }
}

/// Configuration derived from command line arguments and the runner environment
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Debug logging requested
    pub verbose: bool,
    /// Edit PATH on install/uninstall
    pub manage_path: bool,
    /// Download directory for installers
    pub download_dir: PathBuf,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            verbose: args.verbose || crate::nsis::environment::runner_debug(),
            manage_path: !args.no_path,
            download_dir: args.download_dir.clone().unwrap_or_else(std::env::temp_dir),
        }
    }
}
