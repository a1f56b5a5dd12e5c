//! setup_nsis - NSIS bootstrap for CI runners.
//!
//! Lists NSIS installations, optionally uninstalls them and installs the
//! latest release, keeping PATH consistent.

use setup_nsis::cli::{self, RuntimeConfig};
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::parse_args();
    let config = RuntimeConfig::from(&args);

    // Initialize logging
    let level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    // Run CLI and get exit code
    let exit_code = match cli::run(args, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
