//! Core study library for the Kantan language-learning app.
//!
//! Provides:
//! - Immutable content catalog (words, kanji, phrases across JLPT tiers)
//! - Difficulty-weighted adaptive card selection
//! - Cumulative progress aggregation
//! - Study session lifecycle tracking
//!
//! All logic here is pure and I/O-free; persistence and authentication
//! live in the `kantan-cloud` crate.

pub mod catalog;
pub mod error;
pub mod progress;
pub mod selector;
pub mod session;
pub mod types;

pub use catalog::{Catalog, RawCatalogItem};
pub use error::{CatalogError, Result};
pub use progress::apply_feedback;
pub use selector::{effective_difficulty, select_card};
pub use session::SessionTracker;
pub use types::{
    CardContent, CardProgress, CatalogItem, Category, Difficulty, StudyProgress, StudySession,
    Tier,
};
