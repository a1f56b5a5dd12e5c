//! CPU architecture names used by NSIS release assets and PE images.

use super::error::{Error, Result};
use regex::RegexBuilder;
use std::fmt;
use std::path::PathBuf;

/// CPU architecture of an NSIS build.
///
/// Only [`Arch::X86`] and [`Arch::Amd64`] can be installed; the other variants
/// are reported when inspecting existing binaries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Arch {
    /// 32-bit Intel (`IMAGE_FILE_MACHINE_I386`)
    X86,
    /// 64-bit AMD/Intel (`IMAGE_FILE_MACHINE_AMD64`)
    Amd64,
    /// 64-bit ARM (`IMAGE_FILE_MACHINE_ARM64`)
    Arm64,
    /// Itanium (`IMAGE_FILE_MACHINE_IA64`)
    Ia64,
}

/// Accepted spellings per installable architecture, matched whole and case-insensitively.
const ALIASES: &[(Arch, &[&str])] = &[
    (Arch::X86, &["x86", "win32", "i[3-6]86"]),
    (Arch::Amd64, &["amd64", "x86(_|-)64", "x64"]),
];

impl Arch {
    /// Map a user-supplied architecture name to an installable architecture.
    ///
    /// `x86`, `Win32`, `i386`..`i686` become [`Arch::X86`];
    /// `amd64`, `x86_64`, `x86-64`, `x64` become [`Arch::Amd64`].
    pub fn normalize(input: &str) -> Result<Self> {
        for (arch, patterns) in ALIASES {
            for pattern in *patterns {
                let re = RegexBuilder::new(&format!("^(?:{pattern})$"))
                    .case_insensitive(true)
                    .build()?;
                if re.is_match(input) {
                    return Ok(*arch);
                }
            }
        }
        Err(Error::ArchError(format!("unsupported architecture \"{input}\"")))
    }

    /// Architecture for a COFF `Machine` field.
    pub fn from_machine(machine: u16) -> Option<Self> {
        use goblin::pe::header::{
            COFF_MACHINE_ARM64, COFF_MACHINE_IA64, COFF_MACHINE_X86, COFF_MACHINE_X86_64,
        };
        match machine {
            COFF_MACHINE_X86 => Some(Arch::X86),
            COFF_MACHINE_X86_64 => Some(Arch::Amd64),
            COFF_MACHINE_ARM64 => Some(Arch::Arm64),
            COFF_MACHINE_IA64 => Some(Arch::Ia64),
            _ => None,
        }
    }

    /// Name as used in release asset file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
            Arch::Ia64 => "ia64",
        }
    }

    /// Where the NSIS installer puts this architecture when no directory is given.
    pub fn default_install_dir(&self) -> PathBuf {
        match self {
            Arch::Amd64 => super::environment::expand_and_normalize(r"%ProgramFiles%\NSIS"),
            _ => super::environment::expand_and_normalize(r"%ProgramFiles(x86)%\NSIS"),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_x86_spellings() {
        for name in ["x86", "X86", "Win32", "i386", "i486", "I586", "i686"] {
            assert_eq!(Arch::normalize(name).unwrap(), Arch::X86, "{name}");
        }
    }

    #[test]
    fn normalizes_amd64_spellings() {
        for name in ["amd64", "AMD64", "x86_64", "x86-64", "x64", "X64"] {
            assert_eq!(Arch::normalize(name).unwrap(), Arch::Amd64, "{name}");
        }
    }

    #[test]
    fn rejects_unknown_and_partial_names() {
        for name in ["arm64", "i786", "x86_", "amd64 ", "", "x8664"] {
            let err = Arch::normalize(name).unwrap_err();
            assert!(err.to_string().contains("unsupported architecture"), "{name}");
        }
    }

    #[test]
    fn maps_machine_constants() {
        assert_eq!(Arch::from_machine(0x014c), Some(Arch::X86));
        assert_eq!(Arch::from_machine(0x8664), Some(Arch::Amd64));
        assert_eq!(Arch::from_machine(0xaa64), Some(Arch::Arm64));
        assert_eq!(Arch::from_machine(0x0200), Some(Arch::Ia64));
        assert_eq!(Arch::from_machine(0x01c4), None);
    }

    #[test]
    fn display_matches_asset_names() {
        assert_eq!(Arch::X86.to_string(), "x86");
        assert_eq!(Arch::Amd64.to_string(), "amd64");
    }

    #[test]
    fn default_dirs_differ_per_arch() {
        assert_ne!(Arch::X86.default_install_dir(), Arch::Amd64.default_install_dir());
    }
}
