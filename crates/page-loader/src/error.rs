//! Error types for the page loader.
//!
//! Only two kinds exist: a route that fails validation, and a load that
//! failed (transport failure or an error reported by the loaded script).
//! Load failures are cached like successes, so a permanently broken route
//! fails fast until the cache entry is cleared.

use thiserror::Error;

/// Main error type for page loader operations.
///
/// Derives `Clone` because a cached failure is fanned out to every current
/// and future waiter for its route.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoaderError {
    #[error("Route name should start with a \"/\": {route:?}")]
    InvalidRoute { route: String },

    #[error("Error when loading route: {route}")]
    LoadFailed { route: String },
}

/// Result type alias for page loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;
