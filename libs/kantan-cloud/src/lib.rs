//! Cloud adapter layer for the Kantan study app.
//!
//! Provides:
//! - Environment-driven backend configuration with a demo-mode fallback
//! - Record store client over the hosted REST surface
//! - Fail-soft progress store adapter (reads degrade, faults never
//!   propagate into the study flow)
//! - Authentication client with classified errors and auth state
//!   subscriptions
//! - Study coordinator owning the session lifecycle and progress cache

pub mod auth;
pub mod config;
pub mod coordinator;
pub mod provider;
pub mod records;
pub mod store;

pub use auth::{AuthClient, AuthError, AuthEvent, AuthSession, AuthSubscription};
pub use config::CloudConfig;
pub use coordinator::StudyCoordinator;
pub use provider::{PostgrestClient, ProviderError, RecordStore};
pub use store::ProgressStore;
