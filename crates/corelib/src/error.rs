//! Error types for the core library.

use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing or operating a [`crate::ring::Ring`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The configured load factor falls in the forbidden `(0, 1.0]` interval.
    ///
    /// `0` disables bounded loads entirely; anything above `1.0` is a valid
    /// bound. Values in between would make the admission predicate
    /// unsatisfiable for some endpoint.
    #[error("load factor {0} must be 0 (disabled) or greater than 1.0")]
    InvalidLoadFactor(f64),
}
