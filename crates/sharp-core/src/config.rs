//! # Sharp Configuration
//!
//! Credentials and runtime settings, read from environment variables.
//! Credentials are mandatory and checked before any client is built;
//! everything else falls back to defaults.

use crate::{Result, SharpError};
use std::env;

/// Env var holding the generation-service key.
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

/// Env var holding the hosting-service token.
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// The two secrets every interactive action needs.
#[derive(Clone)]
pub struct Credentials {
    pub anthropic_api_key: String,
    pub github_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("anthropic_api_key", &"<redacted>")
            .field("github_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read both credentials from the environment.
    ///
    /// Blank values count as missing. The error names every missing variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read both credentials through an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let anthropic_api_key = read(ANTHROPIC_API_KEY);
        let github_token = read(GITHUB_TOKEN);

        match (anthropic_api_key, github_token) {
            (Some(anthropic_api_key), Some(github_token)) => Ok(Self {
                anthropic_api_key,
                github_token,
            }),
            (a, g) => {
                let missing: Vec<&str> = [(a.is_none(), ANTHROPIC_API_KEY), (g.is_none(), GITHUB_TOKEN)]
                    .into_iter()
                    .filter_map(|(absent, key)| absent.then_some(key))
                    .collect();
                Err(SharpError::ConfigError(format!(
                    "Secrets missing: please set {} (environment or .env)",
                    missing.join(" and ")
                )))
            }
        }
    }
}

/// Runtime settings.
///
/// # Example
/// ```rust
/// use sharp_core::SharpConfig;
///
/// let config = SharpConfig::default()
///     .with_port(9000)
///     .with_default_repo("acme/site");
/// assert_eq!(config.port, 9000);
/// ```
#[derive(Debug, Clone)]
pub struct SharpConfig {
    /// Model used for generation.
    /// Default: claude-sonnet-4-20250514, Env: SHARP_MODEL
    pub model: String,

    /// Completion length bound.
    /// Default: 4000, Env: SHARP_MAX_TOKENS
    pub max_tokens: u32,

    /// Request timeout in seconds; `None` keeps the HTTP client default.
    /// Env: SHARP_TIMEOUT
    pub timeout_seconds: Option<u64>,

    /// Repository pre-filled in the blueprint form.
    /// Default: your-username/your-repo-name, Env: SHARP_DEFAULT_REPO
    pub default_repo: String,

    /// Studio bind address.
    /// Default: 127.0.0.1, Env: SHARP_HOST
    pub host: String,

    /// Studio port.
    /// Default: 8501, Env: SHARP_PORT
    pub port: u16,

    /// Override for the Anthropic endpoint. Env: ANTHROPIC_BASE_URL
    pub anthropic_base_url: Option<String>,

    /// GitHub REST API root.
    /// Default: https://api.github.com, Env: GITHUB_API_URL
    pub github_api_url: String,
}

impl Default for SharpConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4000,
            timeout_seconds: None,
            default_repo: "your-username/your-repo-name".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8501,
            anthropic_base_url: None,
            github_api_url: "https://api.github.com".to_string(),
        }
    }
}

impl SharpConfig {
    /// Create a new config from environment variables.
    /// Falls back to defaults for missing or unparsable variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create a config through an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("SHARP_MODEL") {
            config.model = v;
        }
        if let Some(v) = lookup("SHARP_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                config.max_tokens = n;
            }
        }
        if let Some(v) = lookup("SHARP_TIMEOUT") {
            if let Ok(n) = v.parse() {
                config.timeout_seconds = Some(n);
            }
        }
        if let Some(v) = lookup("SHARP_DEFAULT_REPO") {
            config.default_repo = v;
        }
        if let Some(v) = lookup("SHARP_HOST") {
            config.host = v;
        }
        if let Some(v) = lookup("SHARP_PORT") {
            if let Ok(n) = v.parse() {
                config.port = n;
            }
        }
        if let Some(v) = lookup("ANTHROPIC_BASE_URL") {
            config.anthropic_base_url = Some(v);
        }
        if let Some(v) = lookup("GITHUB_API_URL") {
            config.github_api_url = v;
        }

        config
    }

    /// Builder: Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder: Set the default repository.
    pub fn with_default_repo(mut self, repo: impl Into<String>) -> Self {
        self.default_repo = repo.into();
        self
    }

    /// Builder: Set the studio bind address.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Builder: Set the studio port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Provider settings for the generation client.
    pub fn provider_config(&self, credentials: &Credentials) -> crate::ProviderConfig {
        let mut config = crate::ProviderConfig::new(&credentials.anthropic_api_key, &self.model)
            .with_max_tokens(self.max_tokens);
        if let Some(url) = &self.anthropic_base_url {
            config = config.with_base_url(url);
        }
        if let Some(seconds) = self.timeout_seconds {
            config = config.with_timeout(seconds);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_credentials_present() {
        let creds =
            Credentials::from_lookup(lookup(&[(ANTHROPIC_API_KEY, "sk-live-1"), (GITHUB_TOKEN, "ghp_1")]))
                .unwrap();
        assert_eq!(creds.anthropic_api_key, "sk-live-1");
        assert_eq!(creds.github_token, "ghp_1");
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("sk-live-1"));
        assert!(!printed.contains("ghp_1"));
    }

    #[test]
    fn test_credentials_missing_names_both() {
        let err = Credentials::from_lookup(lookup(&[])).unwrap_err().to_string();
        assert!(err.contains(ANTHROPIC_API_KEY));
        assert!(err.contains(GITHUB_TOKEN));
    }

    #[test]
    fn test_blank_credential_is_missing() {
        let err = Credentials::from_lookup(lookup(&[(ANTHROPIC_API_KEY, "sk"), (GITHUB_TOKEN, "  ")]))
            .unwrap_err()
            .to_string();
        assert!(err.contains(GITHUB_TOKEN));
        assert!(!err.contains(ANTHROPIC_API_KEY));
    }

    #[test]
    fn test_default_config() {
        let config = SharpConfig::default();
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.port, 8501);
        assert!(config.timeout_seconds.is_none());
    }

    #[test]
    fn test_config_from_lookup() {
        let config = SharpConfig::from_lookup(lookup(&[
            ("SHARP_PORT", "9000"),
            ("SHARP_MAX_TOKENS", "not-a-number"),
            ("SHARP_DEFAULT_REPO", "acme/site"),
            ("GITHUB_API_URL", "http://localhost:1234"),
        ]));
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.default_repo, "acme/site");
        assert_eq!(config.github_api_url, "http://localhost:1234");
    }

    #[test]
    fn test_provider_config() {
        let creds =
            Credentials::from_lookup(lookup(&[(ANTHROPIC_API_KEY, "sk"), (GITHUB_TOKEN, "gh")]))
                .unwrap();
        let provider = SharpConfig::default()
            .with_model("claude-test")
            .provider_config(&creds);
        assert_eq!(provider.model, "claude-test");
        assert_eq!(provider.max_tokens, Some(4000));
        assert_eq!(provider.api_key, "sk");
    }
}
