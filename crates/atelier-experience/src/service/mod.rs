//! Experience services
//!
//! Each service is a thin view over the shared session repository or the
//! analytics counters; the orchestrator composes them.

pub mod analytics;
pub mod engine;
pub mod janitor;
pub mod orchestrator;
pub mod renderer;
pub mod session_store;
