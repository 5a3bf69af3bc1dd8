use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sharp_core::{
    DeployError, DeploySuccess, DeploymentTarget, GenerationError, GenerationRequest,
    WorkflowObserver,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Generate,
    Deploy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Running,
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub kind: ActivityKind,
    pub summary: String,
    pub result: Option<String>,
    pub status: ActivityStatus,
}

/// Session activity feed, fed by workflow events.
#[derive(Clone, Default)]
pub struct ActivityLog {
    pub events: Arc<DashMap<String, ActivityEvent>>,
    current: Arc<Mutex<Option<String>>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events, newest first.
    pub fn list(&self) -> Vec<ActivityEvent> {
        let mut events: Vec<_> = self.events.iter().map(|e| e.value().clone()).collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events
    }

    fn start(&self, kind: ActivityKind, summary: String) {
        let id = uuid::Uuid::new_v4().to_string();
        self.events.insert(
            id.clone(),
            ActivityEvent {
                id: id.clone(),
                timestamp: Utc::now(),
                finished_at: None,
                kind,
                summary,
                result: None,
                status: ActivityStatus::Running,
            },
        );
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(id);
    }

    fn finish(&self, status: ActivityStatus, result: String) {
        let id = self.current.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(mut event) = id.and_then(|id| self.events.get_mut(&id)) {
            event.status = status;
            event.result = Some(result);
            event.finished_at = Some(Utc::now());
        }
    }
}

impl WorkflowObserver for ActivityLog {
    fn on_generation_started(&self, request: &GenerationRequest) {
        let mut summary: String = request.requirement_text().chars().take(80).collect();
        if summary.len() < request.requirement_text().len() {
            summary.push('…');
        }
        self.start(
            ActivityKind::Generate,
            format!("{} · {}", request.style_mode(), summary),
        );
    }

    fn on_generation_finished(
        &self,
        _request: &GenerationRequest,
        result: &Result<String, GenerationError>,
    ) {
        match result {
            Ok(text) => self.finish(ActivityStatus::Success, format!("{} characters", text.len())),
            Err(e) => self.finish(ActivityStatus::Failed, format!("Error: {}", e)),
        }
    }

    fn on_deploy_started(&self, target: &DeploymentTarget) {
        self.start(
            ActivityKind::Deploy,
            format!("{} → {}", target.repository, target.file_path),
        );
    }

    fn on_deploy_finished(
        &self,
        _target: &DeploymentTarget,
        result: &Result<DeploySuccess, DeployError>,
    ) {
        match result {
            Ok(success) => self.finish(ActivityStatus::Success, success.message()),
            Err(e) => self.finish(ActivityStatus::Failed, format!("Error: {}", e)),
        }
    }
}
