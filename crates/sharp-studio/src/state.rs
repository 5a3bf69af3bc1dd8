use crate::ActivityLog;
use serde::Serialize;
use sharp_core::{
    AiProvider, DeployBanner, Deployer, Generator, Phase, RepositoryHost, StyleMode,
    TracingObserver, Workflow,
};
use tokio::sync::Mutex;

/// Everything one studio session owns.
pub struct StudioState<P: AiProvider, H: RepositoryHost> {
    pub(crate) workflow: Mutex<Workflow>,
    /// Repository from the last accepted blueprint.
    pub(crate) repository: Mutex<String>,
    pub(crate) generator: Generator<P>,
    pub(crate) deployer: Deployer<H>,
    pub(crate) activity: ActivityLog,
}

impl<P: AiProvider + 'static, H: RepositoryHost + 'static> StudioState<P, H> {
    pub fn new(
        generator: Generator<P>,
        deployer: Deployer<H>,
        default_repo: impl Into<String>,
    ) -> Self {
        let activity = ActivityLog::new();
        let workflow = Workflow::new()
            .with_observer(TracingObserver)
            .with_observer(activity.clone());

        Self {
            workflow: Mutex::new(workflow),
            repository: Mutex::new(default_repo.into()),
            generator,
            deployer,
            activity,
        }
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Snapshot for the page.
    pub async fn view(&self) -> StateView {
        let repository = self.repository.lock().await.clone();
        let workflow = self.workflow.lock().await;
        let state = workflow.state();
        let document = state.document.as_ref();

        StateView {
            phase: state.phase,
            busy: state.phase.is_busy(),
            has_document: document.is_some(),
            deployable: state.phase == Phase::Ready && document.is_some(),
            requirement: document.map(|d| d.source_request.requirement_text().to_string()),
            style: document.map(|d| d.source_request.style_mode()),
            repository,
            banner: state.banner.clone(),
            styles: StyleMode::ALL
                .iter()
                .map(|s| StyleOption {
                    slug: s.slug(),
                    label: s.label(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StyleOption {
    pub slug: &'static str,
    pub label: &'static str,
}

/// What `/api/state` returns.
#[derive(Debug, Serialize)]
pub struct StateView {
    pub phase: Phase,
    pub busy: bool,
    pub has_document: bool,
    pub deployable: bool,
    pub requirement: Option<String>,
    pub style: Option<StyleMode>,
    pub repository: String,
    pub banner: Option<DeployBanner>,
    pub styles: Vec<StyleOption>,
}
