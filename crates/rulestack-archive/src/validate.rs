use std::fs::File;
use std::path::{Component, Path};

use flate2::read::GzDecoder;
use tar::EntryType;

use crate::ArchiveError;

/// Per-entry byte ceiling enforced during validation and extraction. Guards
/// against decompression-bomb archives that claim a small compressed size but
/// expand to an unreasonable amount of data.
pub const MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Walks every entry in the archive at `archive_path` without writing
/// anything to disk, rejecting it if extracting into `dest_dir` would ever
/// write outside `dest_dir`, write a non-regular-file/non-directory entry, or
/// write an entry larger than [`MAX_FILE_SIZE`].
///
/// Called once before [`crate::unpack_validated`]. Cheap relative to
/// extraction: gzip-decodes the stream but never touches the filesystem.
pub fn validate_archive(archive_path: &Path, dest_dir: &Path) -> Result<(), ArchiveError> {
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    for entry in archive.entries()? {
        let entry = entry?;
        let header = entry.header();
        let path = entry.path()?;
        check_entry_path(&path, dest_dir)?;
        match header.entry_type() {
            EntryType::Regular | EntryType::Directory => {}
            _ => return Err(ArchiveError::UnsupportedEntryType(path.display().to_string())),
        }
        let size = header.size()?;
        if size > MAX_FILE_SIZE {
            return Err(ArchiveError::EntryTooLarge {
                path: path.display().to_string(),
                limit: MAX_FILE_SIZE,
            });
        }
    }
    Ok(())
}

/// Rejects absolute paths and any `..` component, then confirms the entry's
/// path joined onto `dest_dir` still lives under `dest_dir` -- the
/// path-traversal / zip-slip defense.
pub(crate) fn check_entry_path(entry_path: &Path, dest_dir: &Path) -> Result<(), ArchiveError> {
    for component in entry_path.components() {
        match component {
            Component::Normal(_) => {}
            _ => return Err(ArchiveError::PathTraversal(entry_path.display().to_string())),
        }
    }
    let joined = dest_dir.join(entry_path);
    if !joined.starts_with(dest_dir) {
        return Err(ArchiveError::PathTraversal(entry_path.display().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::pack_from_directory;

    #[test]
    fn accepts_well_formed_archive() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.mdc"), b"rule").unwrap();
        let archive_dir = tempfile::tempdir().unwrap();
        let archive_path = archive_dir.path().join("out.tgz");
        pack_from_directory(src.path(), &archive_path).unwrap();

        let dest = tempfile::tempdir().unwrap();
        assert!(validate_archive(&archive_path, dest.path()).is_ok());
    }

    #[test]
    fn rejects_parent_dir_component() {
        let dest = tempfile::tempdir().unwrap();
        let err = check_entry_path(Path::new("../evil"), dest.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::PathTraversal(_)));
    }

    #[test]
    fn rejects_absolute_path() {
        let dest = tempfile::tempdir().unwrap();
        let err = check_entry_path(Path::new("/etc/passwd"), dest.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::PathTraversal(_)));
    }
}
