#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manifest at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid manifest at index {index}: {reason}")]
    InvalidManifest { index: usize, reason: String },
    #[error("invalid package name '{0}'")]
    InvalidName(String),
    #[error("invalid version '{0}'")]
    InvalidVersion(String),
    #[error("invalid target '{0}': must be one of cursor, claude-code, windsurf, copilot")]
    InvalidTarget(String),
    #[error("project manifest is missing required field '{0}'")]
    MissingField(&'static str),
}
