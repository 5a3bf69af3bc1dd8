//! Error types for Sharp Core.
//!
//! Every failure that crosses a component boundary is a value. The external
//! services are never allowed to take the session down.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for setup operations (configuration, clients, IO).
pub type Result<T> = std::result::Result<T, SharpError>;

/// Setup-level error type: configuration, client construction and IO.
#[derive(Debug, Error)]
pub enum SharpError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client could not be built.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Input rejected before any external service is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Requirement text is empty or whitespace only.
    #[error("Please enter requirements.")]
    EmptyRequirement,

    /// Repository identifier is not of the form `owner/name`.
    #[error("Invalid repository '{0}': expected owner/name")]
    InvalidRepository(String),

    /// Style label did not match any preset.
    #[error("Unknown design system '{0}'")]
    UnknownStyle(String),
}

/// Broad classes of generation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    /// Connection, DNS, TLS or timeout failure.
    Transport,
    /// Credential rejected by the service.
    Auth,
    /// Service asked us to slow down.
    RateLimited,
    /// Any other non-success response.
    Service,
    /// Response could not be understood.
    Malformed,
}

/// Failure of a single generation round trip.
///
/// `Display` yields the underlying message only, so callers can render it
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Transport, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Auth, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::RateLimited, message)
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Service, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Malformed, message)
    }
}

/// Classes of failure reported by a source-hosting backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostErrorKind {
    NotFound,
    Unauthorized,
    /// Revision marker no longer matches the remote file.
    Conflict,
    Transport,
    Service,
}

/// Error returned by a [`RepositoryHost`](crate::hosting::RepositoryHost).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    pub kind: HostErrorKind,
    pub message: String,
}

impl HostError {
    pub fn new(kind: HostErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::NotFound, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Unauthorized, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Conflict, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Transport, message)
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Service, message)
    }
}

/// Classes of deploy failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployErrorKind {
    /// Repository missing, malformed, or not writable with this token.
    RepoNotFound,
    /// Token rejected outright.
    Unauthorized,
    /// The target file changed remotely between read and update.
    Conflict,
    /// Any other failure while reading or writing the file.
    WriteFailure,
}

/// Failure of a deploy action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct DeployError {
    pub kind: DeployErrorKind,
    pub detail: String,
}

impl DeployError {
    pub fn new(kind: DeployErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Repository could not be resolved. The detail carries the remediation hint.
    pub fn repo_not_found(repository: &str, reason: &str) -> Self {
        Self::new(
            DeployErrorKind::RepoNotFound,
            format!(
                "Could not find repo: {} ({}). Check spelling or token permissions.",
                repository, reason
            ),
        )
    }

    pub fn write_failure(detail: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::WriteFailure, detail)
    }
}

/// Rejected workflow transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A generation or deploy is already in flight.
    #[error("Another request is still running")]
    Busy,

    /// Deploy requested with no successfully generated document.
    #[error("Nothing to deploy yet: generate a document first")]
    NoDocument,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_displays_message_only() {
        let err = GenerationError::rate_limited("rate limited");
        assert_eq!(err.to_string(), "rate limited");
        assert_eq!(err.kind, GenerationErrorKind::RateLimited);
    }

    #[test]
    fn test_repo_not_found_names_repository() {
        let err = DeployError::repo_not_found("acme/site", "not found");
        assert_eq!(err.kind, DeployErrorKind::RepoNotFound);
        assert!(err.detail.contains("acme/site"));
        assert!(err.detail.contains("Check spelling"));
    }
}
