//! Deployment client.
//!
//! Writes one document to the fixed target path of a repository, updating
//! the file in place when it exists and creating it otherwise.

use crate::{
    document::parse_repository, DeployError, DeployErrorKind, DeploymentTarget, HostError,
    HostErrorKind, RepositoryHost,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How the target file was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployMode {
    Created,
    Updated,
}

/// Outcome of a successful deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploySuccess {
    pub mode: DeployMode,
    pub repository: String,
    pub file_path: String,
    pub commit_sha: Option<String>,
}

impl DeploySuccess {
    /// Human-readable summary of what happened.
    pub fn message(&self) -> String {
        match self.mode {
            DeployMode::Created => format!("Created new {}", self.file_path),
            DeployMode::Updated => format!("Updated existing {}", self.file_path),
        }
    }
}

/// Deploys documents through a [`RepositoryHost`].
pub struct Deployer<H: RepositoryHost> {
    host: Arc<H>,
}

impl<H: RepositoryHost> Clone for Deployer<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}

impl<H: RepositoryHost + 'static> Deployer<H> {
    /// Create a deployer over an authenticated host client.
    pub fn new(host: H) -> Self {
        Self {
            host: Arc::new(host),
        }
    }

    /// The underlying host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Write `document` to `public/index.html` in `repository`.
    pub async fn deploy(
        &self,
        document: &str,
        repository: &str,
        commit_message: &str,
    ) -> Result<DeploySuccess, DeployError> {
        let target = DeploymentTarget::new(repository).with_commit_message(commit_message);
        self.deploy_to(document, &target).await
    }

    /// Write `document` to an explicit target.
    ///
    /// The repository is resolved before anything else touches it; a
    /// repository that cannot be resolved never sees a write. A revision
    /// marker that went stale between read and update is reported as
    /// [`DeployErrorKind::Conflict`] and not retried.
    #[instrument(skip(self, document, target), fields(repo = %target.repository, path = %target.file_path))]
    pub async fn deploy_to(
        &self,
        document: &str,
        target: &DeploymentTarget,
    ) -> Result<DeploySuccess, DeployError> {
        let repository = target.repository.as_str();
        if let Err(e) = parse_repository(repository) {
            warn!("Rejected repository identifier");
            return Err(DeployError::repo_not_found(repository, &e.to_string()));
        }

        let repo = match self.host.resolve_repository(repository).await {
            Ok(repo) => repo,
            Err(e) if matches!(e.kind, HostErrorKind::NotFound | HostErrorKind::Unauthorized) => {
                warn!("Repository not resolvable: {}", e);
                return Err(DeployError::repo_not_found(repository, &e.message));
            }
            Err(e) => return Err(map_host_error(e)),
        };

        if repo.can_push == Some(false) {
            warn!("Token has no write access");
            return Err(DeployError::repo_not_found(repository, "no write access"));
        }

        let existing = self
            .host
            .read_file(&repo, &target.file_path)
            .await
            .map_err(map_host_error)?;

        let (mode, receipt) = match existing {
            Some(file) => {
                debug!(sha = %file.sha, "Updating existing file");
                let receipt = self
                    .host
                    .update_file(
                        &repo,
                        &target.file_path,
                        &target.commit_message,
                        document,
                        &file.sha,
                    )
                    .await
                    .map_err(map_host_error)?;
                (DeployMode::Updated, receipt)
            }
            None => {
                debug!("Creating new file");
                let receipt = self
                    .host
                    .create_file(&repo, &target.file_path, &target.commit_message, document)
                    .await
                    .map_err(map_host_error)?;
                (DeployMode::Created, receipt)
            }
        };

        info!(mode = ?mode, "Deploy finished");
        Ok(DeploySuccess {
            mode,
            repository: repo.full_name,
            file_path: target.file_path.clone(),
            commit_sha: receipt.commit_sha,
        })
    }
}

fn map_host_error(e: HostError) -> DeployError {
    let kind = match e.kind {
        HostErrorKind::Unauthorized => DeployErrorKind::Unauthorized,
        HostErrorKind::Conflict => DeployErrorKind::Conflict,
        HostErrorKind::NotFound | HostErrorKind::Transport | HostErrorKind::Service => {
            DeployErrorKind::WriteFailure
        }
    };
    DeployError::new(kind, e.message)
}
