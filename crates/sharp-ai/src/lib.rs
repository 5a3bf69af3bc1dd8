//! # Sharp AI
//!
//! Generation backend for Sharp Website, talking to the Anthropic Messages
//! API.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sharp_core::{Credentials, Generator, SharpConfig};
//!
//! let config = SharpConfig::from_env();
//! let generator = Generator::new(sharp_ai::anthropic(&config, &Credentials::from_env()?)?);
//! ```

pub mod anthropic;

pub use anthropic::AnthropicProvider;

/// Re-export core types for convenience.
pub use sharp_core::{AiProvider, GenerationError, Generator, ProviderConfig, Result, SharpError};

/// Create an Anthropic provider from settings and credentials.
///
/// # Example
///
/// ```rust,ignore
/// let provider = sharp_ai::anthropic(&SharpConfig::from_env(), &Credentials::from_env()?)?;
/// ```
pub fn anthropic(
    config: &sharp_core::SharpConfig,
    credentials: &sharp_core::Credentials,
) -> Result<AnthropicProvider> {
    AnthropicProvider::new(config.provider_config(credentials))
}
