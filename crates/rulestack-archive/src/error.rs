#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("no files matched the given patterns under {0}")]
    NoFilesMatched(String),
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("archive entry '{0}' escapes the extraction root")]
    PathTraversal(String),
    #[error("archive entry '{0}' is not a regular file or directory")]
    UnsupportedEntryType(String),
    #[error("archive entry '{path}' exceeds the {limit}-byte size ceiling")]
    EntryTooLarge { path: String, limit: u64 },
    #[error("archive does not contain a rulestack.json manifest")]
    ManifestMissing,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
