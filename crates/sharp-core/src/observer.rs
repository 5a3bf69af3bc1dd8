use crate::{DeployError, DeploySuccess, DeploymentTarget, GenerationError, GenerationRequest};
use std::sync::Arc;
use tracing::{info, warn};

/// Trait for observing workflow events (logging, activity feeds, UI).
pub trait WorkflowObserver: Send + Sync {
    /// Called when a generation round trip starts.
    fn on_generation_started(&self, request: &GenerationRequest);

    /// Called when a generation round trip finishes either way.
    fn on_generation_finished(
        &self,
        request: &GenerationRequest,
        result: &Result<String, GenerationError>,
    );

    /// Called when a deploy starts.
    fn on_deploy_started(&self, target: &DeploymentTarget);

    /// Called when a deploy finishes either way.
    fn on_deploy_finished(
        &self,
        target: &DeploymentTarget,
        result: &Result<DeploySuccess, DeployError>,
    );
}

pub type ObserverPtr = Arc<dyn WorkflowObserver>;

/// Observer that reports every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl WorkflowObserver for TracingObserver {
    fn on_generation_started(&self, request: &GenerationRequest) {
        info!(style = %request.style_mode(), "Architecting...");
    }

    fn on_generation_finished(
        &self,
        _request: &GenerationRequest,
        result: &Result<String, GenerationError>,
    ) {
        match result {
            Ok(text) => info!(chars = text.len(), "Document ready"),
            Err(e) => warn!(kind = ?e.kind, "Generation failed: {}", e),
        }
    }

    fn on_deploy_started(&self, target: &DeploymentTarget) {
        info!(repo = %target.repository, "Deploying to {}", target.file_path);
    }

    fn on_deploy_finished(
        &self,
        target: &DeploymentTarget,
        result: &Result<DeploySuccess, DeployError>,
    ) {
        match result {
            Ok(success) => info!(repo = %target.repository, "{}", success.message()),
            Err(e) => warn!(repo = %target.repository, kind = ?e.kind, "Deploy failed: {}", e),
        }
    }
}
