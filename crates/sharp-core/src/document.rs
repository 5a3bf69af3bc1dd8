//! Transient data carried through one generate/deploy cycle.

use crate::{StyleMode, ValidationError};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Path of the deployed file inside the target repository.
pub const TARGET_FILE_PATH: &str = "public/index.html";

/// Commit message used for every deploy.
pub const COMMIT_MESSAGE: &str = "Sharp AI Update";

/// Format: owner/name, GitHub naming rules.
const REPOSITORY_PATTERN: &str = r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?/[A-Za-z0-9._-]+$";

static REPOSITORY_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_repository_regex() -> &'static Regex {
    REPOSITORY_REGEX
        .get_or_init(|| Regex::new(REPOSITORY_PATTERN).expect("Invalid repository pattern regex"))
}

/// A validated request to generate one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    requirement_text: String,
    style_mode: StyleMode,
}

impl GenerationRequest {
    /// Build a request, rejecting empty or whitespace-only requirements.
    ///
    /// The requirement text is kept exactly as typed.
    pub fn new(
        requirement_text: impl Into<String>,
        style_mode: StyleMode,
    ) -> Result<Self, ValidationError> {
        let requirement_text = requirement_text.into();
        if requirement_text.trim().is_empty() {
            return Err(ValidationError::EmptyRequirement);
        }
        Ok(Self {
            requirement_text,
            style_mode,
        })
    }

    pub fn requirement_text(&self) -> &str {
        &self.requirement_text
    }

    pub fn style_mode(&self) -> StyleMode {
        self.style_mode
    }
}

/// The document produced for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDocument {
    pub content: String,
    pub source_request: GenerationRequest,
}

impl GeneratedDocument {
    pub fn new(content: impl Into<String>, source_request: GenerationRequest) -> Self {
        Self {
            content: content.into(),
            source_request,
        }
    }
}

/// Where a deploy writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentTarget {
    pub repository: String,
    pub file_path: String,
    pub commit_message: String,
}

impl DeploymentTarget {
    /// Target the fixed path with the fixed commit message.
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into().trim().to_string(),
            file_path: TARGET_FILE_PATH.to_string(),
            commit_message: COMMIT_MESSAGE.to_string(),
        }
    }

    /// Override the commit message.
    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }
}

/// Split an `owner/name` identifier, rejecting anything else.
pub fn parse_repository(identifier: &str) -> Result<(&str, &str), ValidationError> {
    let identifier = identifier.trim();
    if !get_repository_regex().is_match(identifier) {
        return Err(ValidationError::InvalidRepository(identifier.to_string()));
    }
    identifier
        .split_once('/')
        .ok_or_else(|| ValidationError::InvalidRepository(identifier.to_string()))
}
