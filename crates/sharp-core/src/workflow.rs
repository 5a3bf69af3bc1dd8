//! Workflow controller.
//!
//! Owns the session state: the current document, the phase of the
//! generate/deploy cycle and the last deploy banner. Each network call is
//! split into a `begin`/`finish` pair so the caller can run the round trip
//! elsewhere (a spawned task, a worker thread) and hand the result back.
//! At most one call is outstanding at any time.

use crate::{
    AiProvider, DeployError, DeployErrorKind, DeploySuccess, Deployer, DeploymentTarget,
    GeneratedDocument, GenerationError, GenerationRequest, Generator, ObserverPtr,
    RepositoryHost, StyleMode, WorkflowError, WorkflowObserver,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Phase of the generate/deploy cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No document yet.
    #[default]
    Idle,
    Generating,
    /// A generated document is available for preview and deploy.
    Ready,
    /// The last generation failed; the error text is the current document.
    GenerationFailed,
    Deploying,
}

impl Phase {
    /// True while a round trip is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Generating | Phase::Deploying)
    }
}

/// Outcome of the last deploy, shown until the next submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeployBanner {
    Success {
        repository: String,
        message: String,
        commit_sha: Option<String>,
    },
    Failure {
        repository: String,
        kind: DeployErrorKind,
        message: String,
    },
}

/// Snapshot of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub phase: Phase,
    pub document: Option<GeneratedDocument>,
    pub banner: Option<DeployBanner>,
}

/// Work handed out by [`Workflow::begin_deploy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployJob {
    pub target: DeploymentTarget,
    pub content: String,
}

/// The workflow state machine for one interactive session.
///
/// # Example
///
/// ```rust,ignore
/// let mut workflow = Workflow::new();
/// workflow.generate(&generator, "landing page for a bakery", StyleMode::MinimalSaas).await?;
/// workflow.deploy(&deployer, "acme/site").await?;
/// ```
#[derive(Default)]
pub struct Workflow {
    state: SessionState,
    observers: Vec<ObserverPtr>,
}

impl Workflow {
    /// Start in `Idle` with no document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn with_observer(mut self, observer: impl WorkflowObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The current document, whether generated or an error message.
    pub fn document(&self) -> Option<&GeneratedDocument> {
        self.state.document.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.state.phase.is_busy()
    }

    /// Accept a submit and move to `Generating`.
    ///
    /// Rejected submits leave the state untouched. The returned request is
    /// what the caller must generate and pass back to
    /// [`finish_generation`](Self::finish_generation).
    pub fn submit(
        &mut self,
        requirement_text: &str,
        style_mode: StyleMode,
    ) -> Result<GenerationRequest, WorkflowError> {
        if self.is_busy() {
            return Err(WorkflowError::Busy);
        }
        let request = GenerationRequest::new(requirement_text, style_mode)?;

        self.state.phase = Phase::Generating;
        self.state.banner = None;
        for observer in &self.observers {
            observer.on_generation_started(&request);
        }
        Ok(request)
    }

    /// Apply a generation result. The prior document is replaced.
    pub fn finish_generation(
        &mut self,
        request: GenerationRequest,
        result: Result<String, GenerationError>,
    ) {
        if self.state.phase != Phase::Generating {
            warn!(phase = ?self.state.phase, "Ignoring generation result outside Generating");
            return;
        }
        // A blank completion is not a document.
        let result = result.and_then(|text| {
            if text.trim().is_empty() {
                Err(GenerationError::malformed("Response contained no content"))
            } else {
                Ok(text)
            }
        });
        for observer in &self.observers {
            observer.on_generation_finished(&request, &result);
        }

        let (phase, content) = match result {
            Ok(text) => (Phase::Ready, text),
            Err(e) => (Phase::GenerationFailed, format!("Error: {}", e)),
        };
        debug!(phase = ?phase, "Generation applied");
        self.state.phase = phase;
        self.state.document = Some(GeneratedDocument::new(content, request));
    }

    /// Accept a deploy action and move to `Deploying`.
    ///
    /// Only a successfully generated document can be deployed.
    pub fn begin_deploy(&mut self, repository: &str) -> Result<DeployJob, WorkflowError> {
        if self.is_busy() {
            return Err(WorkflowError::Busy);
        }
        let content = match (&self.state.phase, &self.state.document) {
            (Phase::Ready, Some(document)) if !document.content.trim().is_empty() => {
                document.content.clone()
            }
            _ => return Err(WorkflowError::NoDocument),
        };

        let target = DeploymentTarget::new(repository);
        self.state.phase = Phase::Deploying;
        for observer in &self.observers {
            observer.on_deploy_started(&target);
        }
        Ok(DeployJob { target, content })
    }

    /// Apply a deploy result. The document is kept either way.
    pub fn finish_deploy(&mut self, job: &DeployJob, result: Result<DeploySuccess, DeployError>) {
        if self.state.phase != Phase::Deploying {
            warn!(phase = ?self.state.phase, "Ignoring deploy result outside Deploying");
            return;
        }
        for observer in &self.observers {
            observer.on_deploy_finished(&job.target, &result);
        }

        let repository = job.target.repository.clone();
        self.state.banner = Some(match result {
            Ok(success) => DeployBanner::Success {
                message: format!("{}. Live on {}.", success.message(), repository),
                repository,
                commit_sha: success.commit_sha,
            },
            Err(e) => DeployBanner::Failure {
                repository,
                kind: e.kind,
                message: format!("Error: {}", e.detail),
            },
        });
        self.state.phase = Phase::Ready;
    }

    /// Submit, generate and apply the result in one call.
    pub async fn generate<P: AiProvider + 'static>(
        &mut self,
        generator: &Generator<P>,
        requirement_text: &str,
        style_mode: StyleMode,
    ) -> Result<&SessionState, WorkflowError> {
        let request = self.submit(requirement_text, style_mode)?;
        let result = generator.generate(&request).await;
        self.finish_generation(request, result);
        Ok(&self.state)
    }

    /// Begin, deploy and apply the result in one call.
    pub async fn deploy<H: RepositoryHost + 'static>(
        &mut self,
        deployer: &Deployer<H>,
        repository: &str,
    ) -> Result<&SessionState, WorkflowError> {
        let job = self.begin_deploy(repository)?;
        let result = deployer.deploy_to(&job.content, &job.target).await;
        self.finish_deploy(&job, result);
        Ok(&self.state)
    }
}
