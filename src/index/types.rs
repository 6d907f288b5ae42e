use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pattern::{DEFAULT_WILDCARD_MANY, DEFAULT_WILDCARD_ONE};

/// Unique identifier for a stored string; arena slot, reused after removal
pub type StrId = u32;

/// Lower bound on `min_fragment_len`; 1-byte fragments select nearly
/// everything and make the table useless as a filter
pub const MIN_FRAGMENT_FLOOR: usize = 2;

/// One indexed fragment position: which string, and where in it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Occurrence {
    pub(crate) id: StrId,
    pub(crate) offset: u32,
}

/// Configuration for an [`NGramIndex`](crate::NGramIndex)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Shortest fragment recorded in the table; strings shorter than this
    /// are kept in the unindexed set and matched by scanning
    pub min_fragment_len: usize,
    /// Longest fragment recorded; affects table size and lookup
    /// selectivity, never which strings a search returns
    pub max_fragment_len: usize,
    /// Pattern character matching exactly one byte
    pub wildcard_one: char,
    /// Pattern character matching any run of bytes, including none
    pub wildcard_many: char,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            min_fragment_len: 2,
            max_fragment_len: 4, // longer fragments trade memory for rarer table entries
            wildcard_one: DEFAULT_WILDCARD_ONE,
            wildcard_many: DEFAULT_WILDCARD_MANY,
        }
    }
}

impl IndexConfig {
    /// Check fragment bounds and wildcard characters.
    pub fn validate(&self) -> Result<()> {
        if self.min_fragment_len < MIN_FRAGMENT_FLOOR
            || self.max_fragment_len < self.min_fragment_len
        {
            return Err(Error::InvalidFragmentBounds {
                min: self.min_fragment_len,
                max: self.max_fragment_len,
            });
        }
        if self.wildcard_one == self.wildcard_many
            || !self.wildcard_one.is_ascii()
            || !self.wildcard_many.is_ascii()
        {
            return Err(Error::InvalidWildcards {
                one: self.wildcard_one,
                many: self.wildcard_many,
            });
        }
        Ok(())
    }
}

/// Size and occupancy counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Stored strings, both sets
    pub items: usize,
    /// Strings long enough to be covered by the fragment table
    pub indexed_items: usize,
    /// Strings shorter than `min_fragment_len`, matched by scanning
    pub unindexed_items: usize,
    /// Distinct fragment values in the table
    pub distinct_fragments: usize,
    /// Occurrence records across all fragment entries
    pub total_occurrences: usize,
    /// Rough resident size of the index in bytes
    pub approx_bytes: usize,
}
