//! # Atelier Experience
//!
//! Session lifecycle, event-driven shopping state and behavioural analytics
//! for the Atelier virtual fashion storefront.
//!
//! ## Key Concepts
//!
//! - **Session**: one shopping visit; metadata, experience state and event
//!   log live in a single repository record
//! - **Experience Event**: immutable record of a user action, replayed into
//!   state transitions through an exhaustive transition table
//! - **Analytics Event**: free-form typed record folded into global counters
//!   and per-session behavioural scores
//! - **Orchestrator**: façade sequencing action → event → analytics → render
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  StorefrontOrchestrator                  │
//! │  ┌────────────┐  ┌──────────────┐  ┌──────────────────┐  │
//! │  │  Catalog   │  │  Experience  │  │    Analytics     │  │
//! │  │  (static)  │  │    Engine    │  │     Tracker      │  │
//! │  └────────────┘  └──────┬───────┘  └────────┬─────────┘  │
//! │                         │                   │            │
//! │  ┌──────────────┐  ┌────┴─────────────┐     │            │
//! │  │ SessionStore ├──┤ SessionRepository│     │            │
//! │  └──────────────┘  │  (in-memory)     │     │            │
//! │                    └────┬─────────────┘     │            │
//! │                         │   SessionJanitor  │            │
//! │                         └───────(sweep)─────┘            │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod service;

// Re-export core types
pub use domain::event::{EventKind, ExperienceEvent};
pub use domain::insights::{CategoryPopularity, ProductPopularity, SessionInsights, SystemMetrics};
pub use domain::personalization::PersonalizedExperience;
pub use domain::state::{CartItem, ExperienceMode, ExperienceState, StateUpdate};

// Re-export infrastructure
pub use infra::session_repository::{
    InMemorySessionRepository, RepositoryStats, SessionEntry, SessionMetadata, SessionRepository,
    StoreError,
};

// Re-export services
pub use domain::analytics::AnalyticsEvent;
pub use service::analytics::AnalyticsTracker;
pub use service::engine::ExperienceEngine;
pub use service::janitor::{SessionJanitor, SweepReport};
pub use service::orchestrator::{SessionOverview, StorefrontOrchestrator};
pub use service::renderer::{ExperienceRenderer, RenderReceipt, Scene, TracingRenderer};
pub use service::session_store::{SessionStore, SessionUpdate};

/// Storefront service version
pub const STOREFRONT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of categories reported by personalization and insights
pub const TOP_CATEGORY_COUNT: usize = 3;

/// Number of favorites surfaced as recommended products
pub const RECOMMENDED_FAVORITES: usize = 4;

/// Number of products reported by system metrics
pub const POPULAR_PRODUCT_COUNT: usize = 10;
