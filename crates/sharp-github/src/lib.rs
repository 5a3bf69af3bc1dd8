//! # Sharp GitHub
//!
//! [`RepositoryHost`](sharp_core::RepositoryHost) backed by the GitHub REST
//! contents API: resolve a repository, read a file's sha, create or update
//! the file.

pub mod client;

pub use client::GitHubHost;

/// Create a GitHub host from settings and credentials.
pub fn github(
    config: &sharp_core::SharpConfig,
    credentials: &sharp_core::Credentials,
) -> sharp_core::Result<GitHubHost> {
    GitHubHost::with_api_url(&credentials.github_token, &config.github_api_url)
}
