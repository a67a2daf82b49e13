//! # Atelier Common
//!
//! Shared errors, identifiers and constants for the Atelier virtual
//! fashion storefront.
//!
//! ## Core Types
//!
//! - [`SessionId`]: opaque identifier correlating session metadata,
//!   experience state and analytics records
//! - [`AtelierError`]: unified error type used across the workspace

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{AtelierError, Result};
pub use types::session_id::SessionId;

/// Idle age after which a session is swept (24 hours)
pub const SESSION_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Interval between two session sweeps (1 hour)
pub const SESSION_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

/// Default number of products returned by recommendation queries
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 4;
