use crate::{
    state::{StateView, StudioState},
    ActivityEvent, ApiError,
};
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rust_embed::RustEmbed;
use serde::Deserialize;
use sharp_core::{
    AiProvider, DeployError, DeployJob, GenerationError, GenerationRequest, Phase, RepositoryHost,
    StyleMode,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(RustEmbed)]
#[folder = "ui/"]
struct Assets;

/// Preview documents may run their own scripts but get an opaque origin.
const PREVIEW_CSP: &str = "sandbox allow-scripts";

/// The blueprint form, submitted as one unit.
#[derive(Debug, Deserialize)]
pub struct Blueprint {
    pub repository: String,
    pub style: String,
    pub requirement: String,
}

pub struct StudioServer<P: AiProvider, H: RepositoryHost> {
    state: Arc<StudioState<P, H>>,
}

impl<P: AiProvider + 'static, H: RepositoryHost + 'static> StudioServer<P, H> {
    pub fn new(state: Arc<StudioState<P, H>>) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/state", get(get_state::<P, H>))
            .route("/api/generate", post(generate::<P, H>))
            .route("/api/deploy", post(deploy::<P, H>))
            .route("/api/activity", get(list_activity::<P, H>))
            .route("/preview", get(preview::<P, H>))
            .fallback(static_handler)
            .with_state(Arc::clone(&self.state))
    }

    pub async fn start(self, host: &str, port: u16) -> std::io::Result<()> {
        let listener = TcpListener::bind(format!("{}:{}", host, port)).await?;
        info!("Sharp Studio available at http://{}:{}", host, port);
        self.serve(listener).await
    }

    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        axum::serve(listener, self.router()).await
    }
}

async fn get_state<P: AiProvider + 'static, H: RepositoryHost + 'static>(
    State(state): State<Arc<StudioState<P, H>>>,
) -> Json<StateView> {
    Json(state.view().await)
}

/// Accept a blueprint and run the generation on a background task.
async fn generate<P: AiProvider + 'static, H: RepositoryHost + 'static>(
    State(state): State<Arc<StudioState<P, H>>>,
    Json(blueprint): Json<Blueprint>,
) -> Result<(StatusCode, Json<StateView>), ApiError> {
    let style: StyleMode = blueprint.style.parse()?;
    let request = state
        .workflow
        .lock()
        .await
        .submit(&blueprint.requirement, style)?;
    *state.repository.lock().await = blueprint.repository.trim().to_string();

    spawn_generation(Arc::clone(&state), request);
    Ok((StatusCode::ACCEPTED, Json(state.view().await)))
}

/// Deploy the current document to the blueprint's repository.
async fn deploy<P: AiProvider + 'static, H: RepositoryHost + 'static>(
    State(state): State<Arc<StudioState<P, H>>>,
) -> Result<(StatusCode, Json<StateView>), ApiError> {
    let repository = state.repository.lock().await.clone();
    let job = state.workflow.lock().await.begin_deploy(&repository)?;

    spawn_deploy(Arc::clone(&state), job);
    Ok((StatusCode::ACCEPTED, Json(state.view().await)))
}

/// Run the provider round trip on its own task. A panic there still
/// finishes the generation, as a failure.
fn spawn_generation<P: AiProvider + 'static, H: RepositoryHost + 'static>(
    state: Arc<StudioState<P, H>>,
    request: GenerationRequest,
) {
    tokio::spawn(async move {
        let generator = state.generator.clone();
        let task_request = request.clone();
        let result = tokio::spawn(async move { generator.generate(&task_request).await })
            .await
            .unwrap_or_else(|e| {
                error!("Generation task failed: {}", e);
                Err(GenerationError::service(format!("Generation task failed: {}", e)))
            });
        state.workflow.lock().await.finish_generation(request, result);
    });
}

/// Deploy counterpart of [`spawn_generation`].
fn spawn_deploy<P: AiProvider + 'static, H: RepositoryHost + 'static>(
    state: Arc<StudioState<P, H>>,
    job: DeployJob,
) {
    tokio::spawn(async move {
        let deployer = state.deployer.clone();
        let task_job = job.clone();
        let result = tokio::spawn(async move {
            deployer
                .deploy_to(&task_job.content, &task_job.target)
                .await
        })
        .await
        .unwrap_or_else(|e| {
            error!("Deploy task failed: {}", e);
            Err(DeployError::write_failure(format!("Deploy task failed: {}", e)))
        });
        state.workflow.lock().await.finish_deploy(&job, result);
    });
}

async fn list_activity<P: AiProvider + 'static, H: RepositoryHost + 'static>(
    State(state): State<Arc<StudioState<P, H>>>,
) -> Json<Vec<ActivityEvent>> {
    Json(state.activity.list())
}

/// The current document, for the sandboxed preview frame.
async fn preview<P: AiProvider + 'static, H: RepositoryHost + 'static>(
    State(state): State<Arc<StudioState<P, H>>>,
) -> Result<Response, ApiError> {
    let workflow = state.workflow.lock().await;
    let document = workflow
        .document()
        .ok_or_else(|| ApiError::NotFound("No document yet".to_string()))?;

    // A failed generation is shown as its error text, not rendered.
    let content_type = if workflow.phase() == Phase::GenerationFailed {
        "text/plain; charset=utf-8"
    } else {
        "text/html; charset=utf-8"
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_SECURITY_POLICY, PREVIEW_CSP),
            (header::CACHE_CONTROL, "no-store"),
        ],
        document.content.clone(),
    )
        .into_response())
}

async fn static_handler(uri: Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    if path.is_empty() || path == "index.html" {
        return index_html().await;
    }

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

async fn index_html() -> Response {
    match Assets::get("index.html") {
        Some(content) => Html(content.data).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubs::{GatedHost, GatedProvider, PanickingProvider};
    use serde_json::{json, Value};
    use sharp_core::{Deployer, Generator, GenerationError, MockHost, MockProvider};
    use std::time::Duration;

    async fn spawn_studio<P: AiProvider + 'static, H: RepositoryHost + 'static>(
        provider: P,
        host: H,
    ) -> (String, Arc<StudioState<P, H>>) {
        let state = Arc::new(StudioState::new(
            Generator::new(provider),
            Deployer::new(host),
            "acme/site",
        ));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = StudioServer::new(Arc::clone(&state));
        tokio::spawn(async move {
            server.serve(listener).await.unwrap();
        });
        (format!("http://{}", addr), state)
    }

    async fn wait_idle(client: &reqwest::Client, base: &str) -> Value {
        for _ in 0..100 {
            let view: Value = client
                .get(format!("{}/api/state", base))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            if view["busy"] == json!(false) {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("studio stayed busy");
    }

    fn blueprint(requirement: &str) -> Value {
        json!({
            "repository": "acme/site",
            "style": "minimal-saas",
            "requirement": requirement,
        })
    }

    #[tokio::test]
    async fn test_generate_preview_deploy() {
        let provider = MockProvider::new().with_response("<!DOCTYPE html><h1>Bakery</h1>");
        let (base, state) = spawn_studio(provider, MockHost::new().with_repository("acme/site")).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/api/generate", base))
            .json(&blueprint("landing page for a bakery"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

        let view = wait_idle(&client, &base).await;
        assert_eq!(view["phase"], json!("ready"));
        assert_eq!(view["deployable"], json!(true));
        assert_eq!(view["style"], json!("minimal-saas"));

        let preview = client.get(format!("{}/preview", base)).send().await.unwrap();
        assert_eq!(
            preview.headers()["content-security-policy"],
            "sandbox allow-scripts"
        );
        assert_eq!(preview.text().await.unwrap(), "<!DOCTYPE html><h1>Bakery</h1>");

        let response = client
            .post(format!("{}/api/deploy", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

        let view = wait_idle(&client, &base).await;
        assert_eq!(view["banner"]["status"], json!("success"));
        assert_eq!(view["phase"], json!("ready"));
        assert_eq!(
            state.deployer.host().file("acme/site", "public/index.html").as_deref(),
            Some("<!DOCTYPE html><h1>Bakery</h1>")
        );

        let activity: Vec<ActivityEvent> = client
            .get(format!("{}/api/activity", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(activity.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_requirement_is_rejected() {
        let (base, state) = spawn_studio(MockProvider::new(), MockHost::new()).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/api/generate", base))
            .json(&blueprint("   "))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], json!("Please enter requirements."));
        assert_eq!(state.generator.provider().call_count(), 0);

        let preview = client.get(format!("{}/preview", base)).send().await.unwrap();
        assert_eq!(preview.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deploy_without_document_conflicts() {
        let (base, state) = spawn_studio(MockProvider::new(), MockHost::new()).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/api/deploy", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);
        assert!(state.deployer.host().calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_generation_shown_as_text() {
        let provider = MockProvider::new().with_error(GenerationError::rate_limited("rate limited"));
        let (base, _state) = spawn_studio(provider, MockHost::new()).await;
        let client = reqwest::Client::new();

        client
            .post(format!("{}/api/generate", base))
            .json(&blueprint("bakery"))
            .send()
            .await
            .unwrap();
        let view = wait_idle(&client, &base).await;
        assert_eq!(view["phase"], json!("generation_failed"));
        assert_eq!(view["deployable"], json!(false));

        let preview = client.get(format!("{}/preview", base)).send().await.unwrap();
        assert!(preview.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(preview.text().await.unwrap(), "Error: rate limited");
    }

    #[tokio::test]
    async fn test_second_submit_while_generating_is_busy() {
        let provider = GatedProvider::default();
        let gate = provider.gate();
        let (base, state) = spawn_studio(provider, MockHost::new()).await;
        let client = reqwest::Client::new();

        let first = client
            .post(format!("{}/api/generate", base))
            .json(&blueprint("one"))
            .send()
            .await
            .unwrap();
        assert_eq!(first.status(), reqwest::StatusCode::ACCEPTED);

        let second = client
            .post(format!("{}/api/generate", base))
            .json(&blueprint("two"))
            .send()
            .await
            .unwrap();
        assert_eq!(second.status(), reqwest::StatusCode::CONFLICT);

        gate.notify_one();
        let view = wait_idle(&client, &base).await;
        assert_eq!(view["requirement"], json!("one"));
        assert_eq!(state.generator.provider().calls(), 1);
    }

    #[tokio::test]
    async fn test_requests_while_deploying_are_busy() {
        let provider = MockProvider::new().with_response("<html>v1</html>");
        let host = GatedHost::new(MockHost::new().with_repository("acme/site"));
        let gate = host.gate();
        let (base, state) = spawn_studio(provider, host).await;
        let client = reqwest::Client::new();

        client
            .post(format!("{}/api/generate", base))
            .json(&blueprint("bakery"))
            .send()
            .await
            .unwrap();
        wait_idle(&client, &base).await;

        let deploy = client
            .post(format!("{}/api/deploy", base))
            .send()
            .await
            .unwrap();
        assert_eq!(deploy.status(), reqwest::StatusCode::ACCEPTED);

        let view: Value = client
            .get(format!("{}/api/state", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view["phase"], json!("deploying"));
        assert_eq!(view["busy"], json!(true));

        let generate = client
            .post(format!("{}/api/generate", base))
            .json(&blueprint("another page"))
            .send()
            .await
            .unwrap();
        assert_eq!(generate.status(), reqwest::StatusCode::CONFLICT);

        let second_deploy = client
            .post(format!("{}/api/deploy", base))
            .send()
            .await
            .unwrap();
        assert_eq!(second_deploy.status(), reqwest::StatusCode::CONFLICT);

        gate.notify_one();
        let view = wait_idle(&client, &base).await;
        assert_eq!(view["banner"]["status"], json!("success"));
        assert_eq!(view["requirement"], json!("bakery"));
        assert_eq!(state.generator.provider().call_count(), 1);
        assert_eq!(state.deployer.host().inner().write_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_completion_cannot_be_deployed() {
        let provider = MockProvider::new().with_response("");
        let (base, state) =
            spawn_studio(provider, MockHost::new().with_repository("acme/site")).await;
        let client = reqwest::Client::new();

        client
            .post(format!("{}/api/generate", base))
            .json(&blueprint("bakery"))
            .send()
            .await
            .unwrap();
        let view = wait_idle(&client, &base).await;
        assert_eq!(view["phase"], json!("generation_failed"));
        assert_eq!(view["deployable"], json!(false));

        let response = client
            .post(format!("{}/api/deploy", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);
        assert!(state.deployer.host().calls().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_provider_releases_session() {
        let (base, _state) = spawn_studio(PanickingProvider, MockHost::new()).await;
        let client = reqwest::Client::new();

        client
            .post(format!("{}/api/generate", base))
            .json(&blueprint("bakery"))
            .send()
            .await
            .unwrap();
        let view = wait_idle(&client, &base).await;
        assert_eq!(view["phase"], json!("generation_failed"));

        let preview = client.get(format!("{}/preview", base)).send().await.unwrap();
        assert!(preview
            .text()
            .await
            .unwrap()
            .starts_with("Error: Generation task failed"));

        let retry = client
            .post(format!("{}/api/generate", base))
            .json(&blueprint("bakery"))
            .send()
            .await
            .unwrap();
        assert_eq!(retry.status(), reqwest::StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_index_served() {
        let (base, _state) = spawn_studio(MockProvider::new(), MockHost::new()).await;
        let body = reqwest::get(format!("{}/", base)).await.unwrap().text().await.unwrap();
        assert!(body.contains("Sharp Website"));
    }

    mod stubs {
        use sharp_core::{
            AiProvider, GenerationError, HostError, Instruction, MockHost, RemoteFile, RepoHandle,
            RepositoryHost, WriteReceipt,
        };
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tokio::sync::Notify;

        /// Provider that blocks until released.
        #[derive(Default)]
        pub struct GatedProvider {
            gate: Arc<Notify>,
            calls: AtomicUsize,
        }

        impl GatedProvider {
            pub fn gate(&self) -> Arc<Notify> {
                Arc::clone(&self.gate)
            }

            pub fn calls(&self) -> usize {
                self.calls.load(Ordering::SeqCst)
            }
        }

        #[async_trait::async_trait]
        impl AiProvider for GatedProvider {
            fn name(&self) -> &str {
                "gated"
            }

            async fn complete(&self, _instruction: &Instruction) -> Result<String, GenerationError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.gate.notified().await;
                Ok("<html>gated</html>".to_string())
            }
        }

        pub struct PanickingProvider;

        #[async_trait::async_trait]
        impl AiProvider for PanickingProvider {
            fn name(&self) -> &str {
                "panicking"
            }

            async fn complete(&self, _instruction: &Instruction) -> Result<String, GenerationError> {
                panic!("provider blew up");
            }
        }

        /// Host that holds every deploy at the repository lookup until released.
        pub struct GatedHost {
            gate: Arc<Notify>,
            inner: MockHost,
        }

        impl GatedHost {
            pub fn new(inner: MockHost) -> Self {
                Self {
                    gate: Arc::new(Notify::new()),
                    inner,
                }
            }

            pub fn gate(&self) -> Arc<Notify> {
                Arc::clone(&self.gate)
            }

            pub fn inner(&self) -> &MockHost {
                &self.inner
            }
        }

        #[async_trait::async_trait]
        impl RepositoryHost for GatedHost {
            fn name(&self) -> &str {
                "gated"
            }

            async fn resolve_repository(&self, identifier: &str) -> Result<RepoHandle, HostError> {
                self.gate.notified().await;
                self.inner.resolve_repository(identifier).await
            }

            async fn read_file(
                &self,
                repo: &RepoHandle,
                path: &str,
            ) -> Result<Option<RemoteFile>, HostError> {
                self.inner.read_file(repo, path).await
            }

            async fn create_file(
                &self,
                repo: &RepoHandle,
                path: &str,
                message: &str,
                content: &str,
            ) -> Result<WriteReceipt, HostError> {
                self.inner.create_file(repo, path, message, content).await
            }

            async fn update_file(
                &self,
                repo: &RepoHandle,
                path: &str,
                message: &str,
                content: &str,
                sha: &str,
            ) -> Result<WriteReceipt, HostError> {
                self.inner.update_file(repo, path, message, content, sha).await
            }
        }
    }
}
