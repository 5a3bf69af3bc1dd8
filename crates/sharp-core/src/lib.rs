//! # Sharp Core
//!
//! Core library for Sharp Website: describe a site, have a model write it as
//! one self-contained HTML file, preview it, and commit it to
//! `public/index.html` in a GitHub repository.
//!
//! ## Components
//!
//! - [`prompt`] composes the model instruction from a requirement and a
//!   [`StyleMode`]
//! - [`Generator`] makes the round trip through an [`AiProvider`]
//! - [`Deployer`] writes the document through a [`RepositoryHost`],
//!   updating in place or creating the file
//! - [`Workflow`] holds the session state and enforces one outstanding call
//!
//! ## Example
//!
//! ```rust,ignore
//! use sharp_core::{Deployer, Generator, StyleMode, Workflow};
//!
//! let mut workflow = Workflow::new();
//! workflow.generate(&generator, "landing page for a bakery", StyleMode::MinimalSaas).await?;
//! workflow.deploy(&deployer, "acme/site").await?;
//! ```

pub mod config;
pub mod deploy;
pub mod document;
pub mod error;
pub mod generator;
pub mod hosting;
pub mod observer;
pub mod prompt;
pub mod provider;
pub mod style;
pub mod workflow;

pub use config::{Credentials, SharpConfig};
pub use deploy::{DeployMode, DeploySuccess, Deployer};
pub use document::{
    DeploymentTarget, GeneratedDocument, GenerationRequest, COMMIT_MESSAGE, TARGET_FILE_PATH,
};
pub use error::{
    DeployError, DeployErrorKind, GenerationError, GenerationErrorKind, HostError, HostErrorKind,
    Result, SharpError, ValidationError, WorkflowError,
};
pub use generator::Generator;
pub use hosting::{HostCall, MockHost, RemoteFile, RepoHandle, RepositoryHost, WriteReceipt};
pub use observer::{ObserverPtr, TracingObserver, WorkflowObserver};
pub use prompt::Instruction;
pub use provider::{AiProvider, MockProvider, ProviderConfig};
pub use style::StyleMode;
pub use workflow::{DeployBanner, DeployJob, Phase, SessionState, Workflow};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        AiProvider, Deployer, Generator, RepositoryHost, SessionState, StyleMode, Workflow,
        WorkflowError,
    };
}
