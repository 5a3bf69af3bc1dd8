//! # Sharp Studio
//!
//! The interactive surface: a two-pane page with the blueprint form on the
//! left and the sandboxed preview plus deploy action on the right, backed
//! by a small JSON API over one [`Workflow`](sharp_core::Workflow).
//!
//! Generation and deploy round trips run on spawned tasks; the page polls
//! `/api/state` while one is in flight.

pub mod activity;
pub mod error;
pub mod server;
pub mod state;

pub use activity::{ActivityEvent, ActivityKind, ActivityLog, ActivityStatus};
pub use error::ApiError;
pub use server::{Blueprint, StudioServer};
pub use state::{StateView, StudioState};
