use std::collections::BTreeMap;
use std::fmt;

/// A registry failure kind. Callers pattern-match on this, never on the
/// rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PackageNotFound,
    VersionNotFound,
    Unauthorized,
    RateLimited,
    NetworkError,
    InvalidManifest,
    PublishFailed,
    ConnectionFailed,
    InvalidRegistry,
    NotImplemented,
    NotFound,
    InvalidOperation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PackageNotFound => "package not found",
            Self::VersionNotFound => "version not found",
            Self::Unauthorized => "unauthorized",
            Self::RateLimited => "rate limited",
            Self::NetworkError => "network error",
            Self::InvalidManifest => "invalid manifest",
            Self::PublishFailed => "publish failed",
            Self::ConnectionFailed => "connection failed",
            Self::InvalidRegistry => "invalid registry",
            Self::NotImplemented => "not implemented",
            Self::NotFound => "not found",
            Self::InvalidOperation => "invalid operation",
        };
        f.write_str(s)
    }
}

/// A registry error: a [`kind`](ErrorKind) for pattern matching, an optional
/// human-readable message, and a free-form details map for diagnostics.
#[derive(Debug, Clone)]
pub struct RegistryError {
    kind: ErrorKind,
    message: Option<String>,
    details: BTreeMap<String, String>,
}

impl RegistryError {
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            details: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            details: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn details(&self) -> &BTreeMap<String, String> {
        &self.details
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<std::io::Error> for RegistryError {
    fn from(source: std::io::Error) -> Self {
        Self::with_message(ErrorKind::NetworkError, source.to_string())
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_timeout() || source.is_connect() {
            Self::with_message(ErrorKind::ConnectionFailed, source.to_string())
        } else {
            Self::with_message(ErrorKind::NetworkError, source.to_string())
        }
    }
}

impl From<rulestack_archive::ArchiveError> for RegistryError {
    fn from(source: rulestack_archive::ArchiveError) -> Self {
        Self::with_message(ErrorKind::InvalidManifest, source.to_string())
    }
}
