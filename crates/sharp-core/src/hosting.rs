//! Source-hosting backend trait.
//!
//! The four operations the deployer needs from a Git hosting API: resolve a
//! repository, read a file's revision marker, create a file, and update a
//! file against a revision marker.

use crate::HostError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A repository the token can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoHandle {
    /// Canonical `owner/name`.
    pub full_name: String,
    /// Whether the token may write. `None` when the host does not say.
    pub can_push: Option<bool>,
}

/// An existing file at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Opaque revision marker required for an update.
    pub sha: String,
}

/// Result of a successful write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Commit created by the write, when the host reports one.
    pub commit_sha: Option<String>,
}

/// Trait that source-hosting backends must implement.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Get the host name.
    fn name(&self) -> &str;

    /// Look up a repository by `owner/name`.
    async fn resolve_repository(&self, identifier: &str) -> Result<RepoHandle, HostError>;

    /// Read the revision marker of `path`. `Ok(None)` means the file does not exist.
    async fn read_file(&self, repo: &RepoHandle, path: &str)
        -> Result<Option<RemoteFile>, HostError>;

    /// Create `path`. Fails if it already exists.
    async fn create_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        message: &str,
        content: &str,
    ) -> Result<WriteReceipt, HostError>;

    /// Replace `path`, which must currently be at revision `sha`.
    async fn update_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        message: &str,
        content: &str,
        sha: &str,
    ) -> Result<WriteReceipt, HostError>;
}

/// Kinds of call recorded by [`MockHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Resolve(String),
    Read(String),
    Create(String),
    Update(String),
}

#[derive(Debug, Default)]
struct MockState {
    /// repo -> (path -> (content, sha))
    repos: HashMap<String, HashMap<String, (String, String)>>,
    read_only: Vec<String>,
    next_revision: u64,
    calls: Vec<HostCall>,
    /// Revision to report on the next read instead of the real one.
    stale_read: Option<String>,
    fail_writes: Option<HostError>,
}

/// An in-memory repository host for testing.
#[derive(Debug, Default)]
pub struct MockHost {
    state: Mutex<MockState>,
}

impl MockHost {
    /// Create an empty host with no repositories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty, writable repository.
    pub fn with_repository(self, identifier: impl Into<String>) -> Self {
        self.lock().repos.entry(identifier.into()).or_default();
        self
    }

    /// Add a repository the token can see but not write to.
    pub fn with_read_only_repository(self, identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        {
            let mut state = self.lock();
            state.repos.entry(identifier.clone()).or_default();
            state.read_only.push(identifier);
        }
        self
    }

    /// Seed a file in an existing repository.
    pub fn with_file(
        self,
        identifier: &str,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        {
            let mut state = self.lock();
            state.next_revision += 1;
            let sha = format!("rev{}", state.next_revision);
            state
                .repos
                .entry(identifier.to_string())
                .or_default()
                .insert(path.into(), (content.into(), sha));
        }
        self
    }

    /// Make the next read report an outdated revision marker.
    pub fn with_stale_read(self, sha: impl Into<String>) -> Self {
        self.lock().stale_read = Some(sha.into());
        self
    }

    /// Fail every create and update with `error`.
    pub fn with_failing_writes(self, error: HostError) -> Self {
        self.lock().fail_writes = Some(error);
        self
    }

    /// Current content of a file.
    pub fn file(&self, identifier: &str, path: &str) -> Option<String> {
        self.lock()
            .repos
            .get(identifier)
            .and_then(|files| files.get(path))
            .map(|(content, _)| content.clone())
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<HostCall> {
        self.lock().calls.clone()
    }

    /// Number of create and update calls received so far.
    pub fn write_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, HostCall::Create(_) | HostCall::Update(_)))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RepositoryHost for MockHost {
    fn name(&self) -> &str {
        "mock"
    }

    async fn resolve_repository(&self, identifier: &str) -> Result<RepoHandle, HostError> {
        let mut state = self.lock();
        state.calls.push(HostCall::Resolve(identifier.to_string()));

        if !state.repos.contains_key(identifier) {
            return Err(HostError::not_found("Not Found"));
        }
        Ok(RepoHandle {
            full_name: identifier.to_string(),
            can_push: Some(!state.read_only.iter().any(|r| r == identifier)),
        })
    }

    async fn read_file(
        &self,
        repo: &RepoHandle,
        path: &str,
    ) -> Result<Option<RemoteFile>, HostError> {
        let mut state = self.lock();
        state.calls.push(HostCall::Read(path.to_string()));

        let current = state
            .repos
            .get(&repo.full_name)
            .and_then(|files| files.get(path))
            .map(|(_, sha)| sha.clone());

        Ok(current.map(|sha| RemoteFile {
            sha: state.stale_read.take().unwrap_or(sha),
        }))
    }

    async fn create_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        _message: &str,
        content: &str,
    ) -> Result<WriteReceipt, HostError> {
        let mut state = self.lock();
        state.calls.push(HostCall::Create(path.to_string()));
        if let Some(err) = state.fail_writes.clone() {
            return Err(err);
        }

        state.next_revision += 1;
        let sha = format!("rev{}", state.next_revision);
        let files = state.repos.entry(repo.full_name.clone()).or_default();
        if files.contains_key(path) {
            return Err(HostError::service("sha wasn't supplied"));
        }
        files.insert(path.to_string(), (content.to_string(), sha.clone()));
        Ok(WriteReceipt {
            commit_sha: Some(format!("commit-{}", sha)),
        })
    }

    async fn update_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        _message: &str,
        content: &str,
        sha: &str,
    ) -> Result<WriteReceipt, HostError> {
        let mut state = self.lock();
        state.calls.push(HostCall::Update(path.to_string()));
        if let Some(err) = state.fail_writes.clone() {
            return Err(err);
        }

        state.next_revision += 1;
        let next = format!("rev{}", state.next_revision);
        let files = state.repos.entry(repo.full_name.clone()).or_default();
        match files.get_mut(path) {
            Some((current, current_sha)) if current_sha.as_str() == sha => {
                *current = content.to_string();
                *current_sha = next.clone();
                Ok(WriteReceipt {
                    commit_sha: Some(format!("commit-{}", next)),
                })
            }
            Some(_) => Err(HostError::conflict(format!("{} does not match {}", path, sha))),
            None => Err(HostError::not_found("Not Found")),
        }
    }
}
