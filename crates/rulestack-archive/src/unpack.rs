use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::EntryType;

use crate::validate::{check_entry_path, validate_archive, MAX_FILE_SIZE};
use crate::ArchiveError;

/// Validates the archive, then extracts it into `dest_dir`.
///
/// `dest_dir` is created if it does not exist. This is the entry point for
/// any untrusted archive (one downloaded from a registry).
pub fn unpack(archive_path: &Path, dest_dir: &Path) -> Result<(), ArchiveError> {
    validate_archive(archive_path, dest_dir)?;
    unpack_validated(archive_path, dest_dir)
}

/// Extracts `archive_path` into `dest_dir`, re-checking every entry as it is
/// written rather than trusting a prior [`validate_archive`] call -- the
/// validation pass and the extraction pass both read the archive from
/// scratch, so there is no window for a caller to swap the file between the
/// two without both passes seeing the swapped content.
pub fn unpack_validated(archive_path: &Path, dest_dir: &Path) -> Result<(), ArchiveError> {
    std::fs::create_dir_all(dest_dir)?;
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    for entry in archive.entries()? {
        let mut entry = entry?;
        let header_size = entry.header().size()?;
        let entry_type = entry.header().entry_type();
        let path = entry.path()?.into_owned();
        check_entry_path(&path, dest_dir)?;
        if header_size > MAX_FILE_SIZE {
            return Err(ArchiveError::EntryTooLarge {
                path: path.display().to_string(),
                limit: MAX_FILE_SIZE,
            });
        }

        let dest_path = dest_dir.join(&path);
        match entry_type {
            EntryType::Directory => {
                std::fs::create_dir_all(&dest_path)?;
            }
            EntryType::Regular => {
                if let Some(parent) = dest_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mut limited = entry.take(MAX_FILE_SIZE);
                let mut out = File::create(&dest_path)?;
                std::io::copy(&mut limited, &mut out)?;
            }
            _ => return Err(ArchiveError::UnsupportedEntryType(path.display().to_string())),
        }
    }
    Ok(())
}

/// Reads the embedded `rulestack.json` entry out of an archive without
/// extracting the rest of it. Used to inspect a downloaded package's
/// manifest before committing to a full install.
pub fn read_manifest_bytes(archive_path: &Path) -> Result<Vec<u8>, ArchiveError> {
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        if path.file_name().and_then(|n| n.to_str()) == Some("rulestack.json") {
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf)?;
            return Ok(buf);
        }
    }
    Err(ArchiveError::ManifestMissing)
}
