use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use ignore::overrides::OverrideBuilder;
use sha2::{Digest, Sha256};

use crate::ArchiveError;

/// Result of a successful pack operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackResult {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: u64,
}

/// Pack every file under `base_dir` that matches one of `patterns` (doublestar
/// glob semantics, matched relative to `base_dir`) into a gzip-compressed tar
/// archive at `output`. Fails if no file matches any pattern.
pub fn pack(base_dir: &Path, patterns: &[String], output: &Path) -> Result<PackResult, ArchiveError> {
    let files = collect_matching_files(base_dir, patterns)?;
    if files.is_empty() {
        return Err(ArchiveError::NoFilesMatched(base_dir.display().to_string()));
    }
    write_archive(base_dir, &files, output)
}

/// Pack every regular file found by walking `src_dir`, storing names relative
/// to `src_dir` with forward slashes. Used when no glob patterns are
/// involved -- e.g. packing an already-staged install directory.
pub fn pack_from_directory(src_dir: &Path, output: &Path) -> Result<PackResult, ArchiveError> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(src_dir) {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.path().strip_prefix(src_dir).unwrap_or(entry.path()).to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(ArchiveError::NoFilesMatched(src_dir.display().to_string()));
    }
    write_archive(src_dir, &files, output)
}

fn collect_matching_files(base_dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut builder = OverrideBuilder::new(base_dir);
    for pattern in patterns {
        builder
            .add(pattern)
            .map_err(|e| ArchiveError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
    }
    let overrides = builder
        .build()
        .map_err(|e| ArchiveError::InvalidPattern {
            pattern: patterns.join(", "),
            reason: e.to_string(),
        })?;

    let mut matched = Vec::new();
    for entry in walkdir::WalkDir::new(base_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(base_dir).unwrap_or(entry.path());
        if overrides.matched(rel, false).is_whitelist() {
            matched.push(rel.to_path_buf());
        }
    }
    matched.sort();
    Ok(matched)
}

/// Writes `files` (paths relative to `base_dir`) into a deterministic
/// tar+gzip archive at `output`, hashing the compressed byte stream as it is
/// written.
fn write_archive(base_dir: &Path, files: &[PathBuf], output: &Path) -> Result<PackResult, ArchiveError> {
    let file = File::create(output)?;
    let hashing = HashingWriter::new(file);
    let mut encoder = GzEncoder::new(hashing, Compression::default());
    {
        let mut builder = tar::Builder::new(&mut encoder);
        for rel_path in files {
            let abs_path = base_dir.join(rel_path);
            let name = to_archive_name(rel_path);
            builder.append_path_with_name(&abs_path, name)?;
        }
        builder.finish()?;
    }
    let hashing = encoder.finish()?;
    let sha256 = hex::encode(hashing.hasher.finalize());
    let size_bytes = std::fs::metadata(output)?.len();
    Ok(PackResult {
        path: output.to_path_buf(),
        sha256,
        size_bytes,
    })
}

fn to_archive_name(rel_path: &Path) -> String {
    rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Streams the SHA-256 digest of a file on disk, independent of how it was
/// produced. Used to confirm the hash [`pack`] reports matches the bytes it
/// actually wrote.
pub fn calculate_sha256(path: &Path) -> Result<String, ArchiveError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(dir: &Path) {
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("a.mdc"), b"rule a").unwrap();
        std::fs::write(dir.join("nested/b.mdc"), b"rule b").unwrap();
        std::fs::write(dir.join("README.md"), b"not a rule").unwrap();
    }

    #[test]
    fn pack_matches_only_glob_pattern() {
        let dir = tempfile::tempdir().unwrap();
        stage(dir.path());
        let output = dir.path().join("out.tgz");

        let result = pack(dir.path(), &["**/*.mdc".to_string()], &output).unwrap();
        assert!(result.size_bytes > 0);
        assert_eq!(calculate_sha256(&output).unwrap(), result.sha256);
    }

    #[test]
    fn pack_fails_when_nothing_matches() {
        let dir = tempfile::tempdir().unwrap();
        stage(dir.path());
        let output = dir.path().join("out.tgz");

        let err = pack(dir.path(), &["**/*.nope".to_string()], &output).unwrap_err();
        assert!(matches!(err, ArchiveError::NoFilesMatched(_)));
    }

    #[test]
    fn pack_from_directory_includes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        stage(dir.path());
        let output = dir.path().join("out.tgz");

        let result = pack_from_directory(dir.path(), &output).unwrap();
        assert!(result.size_bytes > 0);
    }
}
