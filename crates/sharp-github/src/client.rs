//! GitHub REST client for the repository contents API.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use sharp_core::{
    HostError, RemoteFile, RepoHandle, RepositoryHost, Result, SharpError, WriteReceipt,
};
use tracing::{debug, instrument};

const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("sharp-website/", env!("CARGO_PKG_VERSION"));

/// Repository host backed by the GitHub REST API.
///
/// Every request carries the token; there is no separate login step.
#[derive(Clone)]
pub struct GitHubHost {
    client: Client,
    token: String,
    api_url: String,
}

impl std::fmt::Debug for GitHubHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubHost")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    full_name: String,
    #[serde(default)]
    permissions: Option<Permissions>,
}

#[derive(Debug, Deserialize)]
struct Permissions {
    #[serde(default)]
    push: bool,
}

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    #[serde(default)]
    commit: Option<CommitRef>,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

impl GitHubHost {
    /// Create a client against an API root (api.github.com, GitHub Enterprise, tests).
    pub fn with_api_url(token: impl Into<String>, api_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SharpError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            token: token.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    async fn send(&self, builder: RequestBuilder) -> std::result::Result<Response, HostError> {
        let response = builder
            .send()
            .await
            .map_err(|e| HostError::transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }

    async fn put_contents(
        &self,
        repo: &RepoHandle,
        path: &str,
        body: &PutContents<'_>,
    ) -> std::result::Result<WriteReceipt, HostError> {
        let builder = self
            .request(reqwest::Method::PUT, &contents_path(repo, path))
            .json(body);
        let response = self.send(builder).await?;

        let put: PutResponse = response
            .json()
            .await
            .map_err(|e| HostError::service(format!("Unexpected response: {}", e)))?;
        Ok(WriteReceipt {
            commit_sha: put.commit.map(|c| c.sha),
        })
    }
}

fn contents_path(repo: &RepoHandle, path: &str) -> String {
    format!("/repos/{}/contents/{}", repo.full_name, path.trim_start_matches('/'))
}

/// Map a non-success response to a host error, preferring GitHub's own message.
fn classify_failure(status: StatusCode, body: &str) -> HostError {
    let detail = serde_json::from_str::<GitHubErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.to_string());
    let message = format!("GitHub API error {}: {}", status, detail);

    match status {
        StatusCode::NOT_FOUND => HostError::not_found(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HostError::unauthorized(message),
        StatusCode::CONFLICT => HostError::conflict(message),
        _ => HostError::service(message),
    }
}

#[async_trait]
impl RepositoryHost for GitHubHost {
    fn name(&self) -> &str {
        "github"
    }

    #[instrument(skip(self))]
    async fn resolve_repository(
        &self,
        identifier: &str,
    ) -> std::result::Result<RepoHandle, HostError> {
        let builder = self.request(reqwest::Method::GET, &format!("/repos/{}", identifier));
        let response = self.send(builder).await?;

        let repo: RepoResponse = response
            .json()
            .await
            .map_err(|e| HostError::service(format!("Unexpected response: {}", e)))?;
        debug!(full_name = %repo.full_name, "Repository resolved");

        Ok(RepoHandle {
            full_name: repo.full_name,
            can_push: repo.permissions.map(|p| p.push),
        })
    }

    #[instrument(skip(self, repo), fields(repo = %repo.full_name))]
    async fn read_file(
        &self,
        repo: &RepoHandle,
        path: &str,
    ) -> std::result::Result<Option<RemoteFile>, HostError> {
        let builder = self.request(reqwest::Method::GET, &contents_path(repo, path));
        let response = match self.send(builder).await {
            Ok(response) => response,
            Err(e) if e.kind == sharp_core::HostErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let entry: ContentsEntry = response
            .json()
            .await
            .map_err(|_| HostError::service(format!("{} is not a file", path)))?;
        if entry.kind != "file" {
            return Err(HostError::service(format!("{} is a {}, not a file", path, entry.kind)));
        }
        Ok(Some(RemoteFile { sha: entry.sha }))
    }

    #[instrument(skip(self, repo, message, content), fields(repo = %repo.full_name))]
    async fn create_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        message: &str,
        content: &str,
    ) -> std::result::Result<WriteReceipt, HostError> {
        let body = PutContents {
            message,
            content: STANDARD.encode(content),
            sha: None,
        };
        self.put_contents(repo, path, &body).await
    }

    #[instrument(skip(self, repo, message, content), fields(repo = %repo.full_name))]
    async fn update_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        message: &str,
        content: &str,
        sha: &str,
    ) -> std::result::Result<WriteReceipt, HostError> {
        let body = PutContents {
            message,
            content: STANDARD.encode(content),
            sha: Some(sha),
        };
        self.put_contents(repo, path, &body).await
    }
}
