//! Boot module
//!
//! Sequences the access gate, token validation, runtime start and
//! plugin/role loading.

pub mod banner;
pub mod orchestrator;

pub use orchestrator::{BootContext, BootOrchestrator, BootReport, BootedSystem};
