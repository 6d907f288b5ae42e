//! Error types for gramdex.
//!
//! Every invalid-argument condition is detected eagerly at the offending
//! call and is fatal to that call only; index state is never left
//! partially mutated by a rejected argument.

use thiserror::Error;

/// Result type alias for gramdex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building patterns or mutating an index.
///
/// Absent values on removal and searches that match nothing are normal
/// non-error outcomes (`Ok(false)` / empty iterators), not variants here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A pattern string was empty.
    #[error("pattern must not be empty")]
    EmptyPattern,

    /// A value passed to `add`/`remove` was empty.
    #[error("value must not be empty")]
    EmptyValue,

    /// Fragment length bounds were inverted or below the supported floor.
    #[error("invalid fragment bounds: min {min}, max {max} (min must be >= {floor} and <= max)", floor = crate::index::MIN_FRAGMENT_FLOOR)]
    InvalidFragmentBounds {
        /// Configured minimum fragment length.
        min: usize,
        /// Configured maximum fragment length.
        max: usize,
    },

    /// The two wildcard characters must be distinct ASCII characters.
    #[error("invalid wildcard characters: {one:?} and {many:?} must be distinct ASCII")]
    InvalidWildcards {
        /// Single-unknown wildcard character.
        one: char,
        /// Variable-length wildcard character.
        many: char,
    },
}
