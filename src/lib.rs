//! # Gramdex - Indexed Wildcard Substring Search
//!
//! Gramdex stores a set of strings and answers wildcard queries over them
//! without scanning everything: stored strings are decomposed into short
//! byte fragments, and a query's literal material selects candidates
//! through an inverted fragment table before a section-based matcher
//! verifies each one.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`pattern`] - Wildcard pattern compilation and text matching
//! - [`index`] - Fragment-indexed string storage and search planning
//! - [`error`] - Error type shared across the crate
//! - [`utils`] - Fragment decomposition helpers
//!
//! ## Quick Start
//!
//! ```
//! use gramdex::{MatchMode, NGramIndex};
//!
//! let mut index = NGramIndex::default();
//! index.add_range(["hello", "help", "held"]).unwrap();
//!
//! // `?` matches one byte, `*` matches any run of bytes
//! let matches: Vec<&str> = index.search("he*p", MatchMode::Contains).unwrap().collect();
//! assert_eq!(matches, vec!["help"]);
//! ```
//!
//! Patterns also work standalone against arbitrary text:
//!
//! ```
//! use gramdex::{MatchMode, WildcardPattern};
//!
//! let pattern = WildcardPattern::new("he??o", MatchMode::Contains).unwrap();
//! assert!(pattern.is_match("hello"));
//! assert!(!pattern.is_match("help"));
//! ```
//!
//! ## Matching model
//!
//! Two wildcard characters, both configurable per index:
//!
//! 1. **Single-unknown** (`?`) - exactly one byte
//! 2. **Variable** (`*`) - any run of bytes, including none
//!
//! Four match modes pin the pattern to the start, the end, both, or
//! neither end of the text. Matching is byte-oriented: `?` consumes one
//! byte, so a multi-byte character needs one `?` per byte.

pub mod error;
pub mod index;
pub mod pattern;
pub mod utils;

pub use error::{Error, Result};
pub use index::{IndexConfig, IndexStats, NGramIndex, Search, StrId};
pub use pattern::{MatchMode, Matches, Span, WildcardPattern};
