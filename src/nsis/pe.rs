//! PE image inspection.
//!
//! Reads just enough of a Windows executable to learn which CPU it targets.

use super::{
    arch::Arch,
    error::{Error, ErrorExt, Result},
};
use goblin::pe::header::{CoffHeader, PE_MAGIC, SIZEOF_COFF_HEADER};
use std::path::Path;

/// Offset of `e_lfanew` inside the DOS header.
const E_LFANEW_OFFSET: usize = 0x3C;

/// Architecture of the PE image at `path`.
///
/// Returns `Ok(None)` for a well-formed image with an unrecognised machine type.
pub async fn pe_architecture(path: &Path) -> Result<Option<Arch>> {
    let bytes = tokio::fs::read(path)
        .await
        .fs_context("reading PE image", path)?;
    machine_of(&bytes)
        .map(Arch::from_machine)
        .map_err(|reason| Error::Pe {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        })
}

/// COFF `Machine` field of a PE image.
fn machine_of(bytes: &[u8]) -> std::result::Result<u16, &'static str> {
    let e_lfanew = bytes
        .get(E_LFANEW_OFFSET..E_LFANEW_OFFSET + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or("not a valid PE file (cannot read e_lfanew)")? as usize;

    let signature = bytes
        .get(e_lfanew..e_lfanew + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes);
    if signature != Some(PE_MAGIC) {
        return Err("PE signature not found");
    }

    let mut offset = e_lfanew + 4;
    if bytes.len() < offset + SIZEOF_COFF_HEADER {
        return Err("truncated COFF header");
    }
    let coff = CoffHeader::parse(bytes, &mut offset).map_err(|_| "truncated COFF header")?;
    Ok(coff.machine)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal image: DOS header pointing at 0x80, `PE\0\0`, COFF header.
    fn image(machine: u16) -> Vec<u8> {
        let mut bytes = vec![0u8; 0x80 + 4 + SIZEOF_COFF_HEADER];
        bytes[0] = b'M';
        bytes[1] = b'Z';
        bytes[E_LFANEW_OFFSET..E_LFANEW_OFFSET + 4].copy_from_slice(&0x80u32.to_le_bytes());
        bytes[0x80..0x84].copy_from_slice(b"PE\0\0");
        bytes[0x84..0x86].copy_from_slice(&machine.to_le_bytes());
        bytes
    }

    #[test]
    fn reads_machine_field() {
        assert_eq!(machine_of(&image(0x014c)), Ok(0x014c));
        assert_eq!(machine_of(&image(0x8664)), Ok(0x8664));
    }

    #[test]
    fn rejects_short_files() {
        assert_eq!(
            machine_of(&[0u8; 0x20]),
            Err("not a valid PE file (cannot read e_lfanew)")
        );
    }

    #[test]
    fn rejects_missing_signature() {
        let mut bytes = image(0x014c);
        bytes[0x80] = b'X';
        assert_eq!(machine_of(&bytes), Err("PE signature not found"));

        let mut bytes = image(0x014c);
        bytes[E_LFANEW_OFFSET..E_LFANEW_OFFSET + 4].copy_from_slice(&0xFFFFu32.to_le_bytes());
        assert_eq!(machine_of(&bytes), Err("PE signature not found"));
    }

    #[test]
    fn rejects_truncated_coff_header() {
        let mut bytes = image(0x014c);
        bytes.truncate(0x84 + 10);
        assert_eq!(machine_of(&bytes), Err("truncated COFF header"));
    }

    #[tokio::test]
    async fn inspects_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let amd64 = dir.path().join("makensis.exe");
        std::fs::write(&amd64, image(0x8664)).unwrap();
        assert_eq!(pe_architecture(&amd64).await.unwrap(), Some(Arch::Amd64));

        let unknown = dir.path().join("other.exe");
        std::fs::write(&unknown, image(0x01c4)).unwrap();
        assert_eq!(pe_architecture(&unknown).await.unwrap(), None);

        let junk = dir.path().join("junk.exe");
        std::fs::write(&junk, b"hello").unwrap();
        let err = pe_architecture(&junk).await.unwrap_err();
        assert!(err.to_string().contains("junk.exe"));
    }
}
