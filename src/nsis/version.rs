//! makensis version probing.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// `v1.2[.3[.4]]` at the start of a line.
static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v(\d+\.\d+(\.\d+(\.\d+)?)?)").expect("version pattern is valid")
});

/// Compiler executable name inside an installation directory.
pub const MAKENSIS_EXE: &str = "makensis.exe";

/// Extract the version from `makensis /VERSION` output.
pub fn parse_version(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| VERSION_LINE.captures(line))
        .map(|caps| caps[1].to_string())
}

/// Version reported by makensis.
///
/// With `instdir`, runs `<instdir>\makensis.exe`; otherwise resolves
/// `makensis` through `PATH`. Failures are logged and yield `None`.
pub async fn nsis_version(instdir: Option<&Path>) -> Option<String> {
    let program = match instdir {
        Some(dir) => dir.join(MAKENSIS_EXE),
        None => match which::which("makensis") {
            Ok(path) => path,
            Err(e) => {
                log::warn!("makensis not found in PATH: {}", e);
                return None;
            }
        },
    };
    probe(&program).await
}

async fn probe(program: &Path) -> Option<String> {
    let output = match tokio::process::Command::new(program)
        .arg("/VERSION")
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            log::warn!("nsis_version(\"{}\"): {}", program.display(), e);
            return None;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = parse_version(&stdout);
    if version.is_none() {
        log::warn!(
            "nsis_version(\"{}\"): no version in output {:?} (exit code: {:?})",
            program.display(),
            stdout.trim(),
            output.status.code()
        );
    }
    version
}
