//! Error types for sw-core
//!
//! Provides a unified error type shared by every backend. Each variant maps
//! to a CLI exit code so front ends do not need to inspect messages.

use thiserror::Error;

/// Result type alias for sw-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for storage operations
#[derive(Error, Debug)]
pub enum Error {
    /// Item, container or profile does not exist, or the handle is unresolved
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad or missing configuration (auth type, credentials, options)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The underlying client or session could not be built
    #[error("{context}: {message}")]
    Construction { context: String, message: String },

    /// Kind name or URL scheme not present in the registry
    #[error("Unknown kind: {0}")]
    UnknownKind(String),

    /// A kind was registered twice
    #[error("Kind already registered: {0}")]
    KindExists(String),

    /// More than one registered matcher accepted the URL
    #[error("URL {url} is claimed by more than one kind: {}", .kinds.join(", "))]
    AmbiguousKind { url: String, kinds: Vec<String> },

    /// Malformed URL or URL that cannot be rewritten
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Metadata that the backend cannot store
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Failure reported by the client capability
    #[error("Network error: {0}")]
    Network(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Wrap a construction failure with the step that produced it
    pub fn construction(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Error::Construction {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// Whether this error means the addressed resource is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidUrl(_)
            | Error::InvalidMetadata(_)
            | Error::UnknownKind(_)
            | Error::AmbiguousKind { .. } => 2, // UsageError
            Error::Network(_) | Error::Construction { .. } => 3, // NetworkError
            Error::NotFound(_) => 5,                             // NotFound
            Error::KindExists(_) => 6,                           // Conflict
            _ => 1,                                              // GeneralError
        }
    }
}
