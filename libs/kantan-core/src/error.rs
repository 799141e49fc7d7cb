//! Error types for kantan-core.

use thiserror::Error;

/// Result type alias using CatalogError.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while loading a content catalog.
///
/// Individual malformed entries are repaired with safe defaults rather
/// than rejected; only a structurally unreadable document fails.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed catalog document: {0}")]
    Malformed(#[from] serde_json::Error),
}
