//! Release orchestration

pub mod orchestrator;
pub mod version;

pub use orchestrator::{ReleaseOrchestrator, ReleaseRequest};
pub use version::VersionPlan;
