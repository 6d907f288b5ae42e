//! In-memory fragment index over a set of strings.
//!
//! Stored strings live in a slot arena and are shared with the
//! content-lookup map. Strings at least `min_fragment_len` long contribute
//! every fragment of an indexable length to the inverted table; shorter
//! strings go to the unindexed set and are matched by scanning.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;

use super::types::{IndexConfig, IndexStats, Occurrence, StrId};
use crate::error::{Error, Result};
use crate::utils::decompose;

/// Inverted n-gram index with duplicate-free string storage.
#[derive(Debug, Default)]
pub struct NGramIndex {
    config: IndexConfig,

    /// Arena of stored strings; `StrId` is the slot number.
    entries: Vec<Option<Arc<str>>>,

    /// Slots vacated by removals, reused before the arena grows.
    free_ids: Vec<StrId>,

    /// Content lookup; shares the arena's allocations.
    by_value: HashMap<Arc<str>, StrId, RandomState>,

    /// Fragment value to every position it occurs at.
    fragments: FxHashMap<Box<[u8]>, Vec<Occurrence>>,

    /// Ids covered by the fragment table.
    indexed_ids: RoaringBitmap,

    /// Ids too short to fragment, matched by scanning.
    unindexed_ids: RoaringBitmap,
}

impl NGramIndex {
    /// Create an empty index with the given configuration.
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// The configuration the index was built with.
    #[must_use]
    pub fn config(&self) -> IndexConfig {
        self.config
    }

    /// Number of stored strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    /// Whether the index stores nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }

    /// Whether `value` is stored. Never true for the empty string.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.by_value.contains_key(value)
    }

    /// Store `value`.
    ///
    /// Returns `Ok(false)` without touching anything when an equal string
    /// is already stored.
    pub fn add(&mut self, value: &str) -> Result<bool> {
        if value.is_empty() {
            return Err(Error::EmptyValue);
        }
        if self.by_value.contains_key(value) {
            return Ok(false);
        }

        let shared: Arc<str> = Arc::from(value);
        let id = self.alloc_id(shared.clone());
        self.by_value.insert(shared.clone(), id);

        if shared.len() >= self.config.min_fragment_len {
            self.insert_fragments(id, shared.as_bytes());
            self.indexed_ids.insert(id);
        } else {
            self.unindexed_ids.insert(id);
        }
        Ok(true)
    }

    /// Remove `value` and every fragment occurrence it contributed.
    ///
    /// Returns `Ok(false)` when the string is not stored.
    pub fn remove(&mut self, value: &str) -> Result<bool> {
        if value.is_empty() {
            return Err(Error::EmptyValue);
        }
        let Some((shared, id)) = self.by_value.remove_entry(value) else {
            return Ok(false);
        };
        self.entries[id as usize] = None;

        if shared.len() >= self.config.min_fragment_len {
            self.remove_fragments(id, shared.as_bytes());
            self.indexed_ids.remove(id);
        } else {
            self.unindexed_ids.remove(id);
        }
        self.free_ids.push(id);
        Ok(true)
    }

    /// Store every value in `values`; count of strings actually added.
    ///
    /// Stops at the first invalid value. Strings added before the error
    /// stay stored.
    pub fn add_range<I, S>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for value in values {
            if self.add(value.as_ref())? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Remove every value in `values`; count of strings actually removed.
    ///
    /// Stops at the first invalid value. Removals before the error stand.
    pub fn remove_range<I, S>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        for value in values {
            if self.remove(value.as_ref())? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Iterate over every stored string, both sets, in arena order.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|slot| slot.as_deref())
    }

    /// Drop every stored string and all backing storage.
    pub fn clear(&mut self) {
        self.entries = Vec::new();
        self.free_ids = Vec::new();
        self.by_value = HashMap::default();
        self.fragments = FxHashMap::default();
        self.indexed_ids = RoaringBitmap::new();
        self.unindexed_ids = RoaringBitmap::new();
    }

    /// Give back over-allocated capacity after bulk removals.
    pub fn trim_excess(&mut self) {
        self.entries.shrink_to_fit();
        self.free_ids.shrink_to_fit();
        self.by_value.shrink_to_fit();
        for list in self.fragments.values_mut() {
            list.shrink_to_fit();
        }
        self.fragments.shrink_to_fit();
    }

    /// Occupancy counters and a rough resident-size estimate.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        let total_occurrences: usize = self.fragments.values().map(Vec::len).sum();
        let string_bytes: usize = self.items().map(str::len).sum();
        let fragment_bytes: usize = self.fragments.keys().map(|key| key.len()).sum();
        let slot_bytes = (self.entries.len() + self.by_value.len() + self.fragments.len()) * 48;

        IndexStats {
            items: self.len(),
            indexed_items: self.indexed_ids.len() as usize,
            unindexed_items: self.unindexed_ids.len() as usize,
            distinct_fragments: self.fragments.len(),
            total_occurrences,
            approx_bytes: string_bytes
                + fragment_bytes
                + total_occurrences * std::mem::size_of::<Occurrence>()
                + slot_bytes,
        }
    }

    fn alloc_id(&mut self, value: Arc<str>) -> StrId {
        if let Some(id) = self.free_ids.pop() {
            self.entries[id as usize] = Some(value);
            id
        } else {
            assert!(
                self.entries.len() < StrId::MAX as usize,
                "string arena exhausted: {} slots in use",
                self.entries.len()
            );
            let id = self.entries.len() as StrId;
            self.entries.push(Some(value));
            id
        }
    }

    fn insert_fragments(&mut self, id: StrId, bytes: &[u8]) {
        debug_assert!(bytes.len() <= u32::MAX as usize);
        let (min, max) = (self.config.min_fragment_len, self.config.max_fragment_len);
        for (offset, fragment) in decompose(bytes, min, max) {
            let occurrence = Occurrence {
                id,
                offset: offset as u32,
            };
            // get_mut-then-insert avoids an owned key allocation per hit
            if let Some(list) = self.fragments.get_mut(fragment) {
                list.push(occurrence);
            } else {
                self.fragments.insert(fragment.into(), vec![occurrence]);
            }
        }
    }

    fn remove_fragments(&mut self, id: StrId, bytes: &[u8]) {
        let (min, max) = (self.config.min_fragment_len, self.config.max_fragment_len);
        let mut values: Vec<&[u8]> = decompose(bytes, min, max).map(|(_, f)| f).collect();
        values.sort_unstable();
        values.dedup();
        for fragment in values {
            if let Some(list) = self.fragments.get_mut(fragment) {
                list.retain(|occ| occ.id != id);
                if list.is_empty() {
                    self.fragments.remove(fragment);
                }
            }
        }
    }

    pub(crate) fn value(&self, id: StrId) -> &str {
        self.entries[id as usize]
            .as_deref()
            .expect("live id points at an occupied arena slot")
    }

    pub(crate) fn id_of(&self, value: &str) -> Option<StrId> {
        self.by_value.get(value).copied()
    }

    pub(crate) fn occurrences(&self, fragment: &[u8]) -> Option<&[Occurrence]> {
        self.fragments.get(fragment).map(Vec::as_slice)
    }

    pub(crate) fn indexed_ids(&self) -> &RoaringBitmap {
        &self.indexed_ids
    }

    pub(crate) fn unindexed_ids(&self) -> &RoaringBitmap {
        &self.unindexed_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> NGramIndex {
        NGramIndex::new(IndexConfig::default()).unwrap()
    }

    #[test]
    fn test_add_and_contains() {
        let mut idx = index();
        assert!(idx.add("hello").unwrap());
        assert!(idx.contains("hello"));
        assert!(!idx.contains("help"));
        assert_eq!(idx.len(), 1);

        // duplicate content is reported, not re-stored
        assert!(!idx.add("hello").unwrap());
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_empty_value_rejected() {
        let mut idx = index();
        assert_eq!(idx.add(""), Err(Error::EmptyValue));
        assert_eq!(idx.remove(""), Err(Error::EmptyValue));
        assert!(!idx.contains(""));
    }

    #[test]
    fn test_remove_absent_is_not_an_error() {
        let mut idx = index();
        assert!(!idx.remove("missing").unwrap());
    }

    #[test]
    fn test_remove_forgets_value() {
        let mut idx = index();
        idx.add("hello").unwrap();
        idx.add("help").unwrap();
        assert!(idx.remove("hello").unwrap());
        assert!(!idx.contains("hello"));
        assert!(idx.contains("help"));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_short_values_go_unindexed() {
        let mut idx = index();
        idx.add("a").unwrap();
        let stats = idx.stats();
        assert_eq!(stats.items, 1);
        assert_eq!(stats.unindexed_items, 1);
        assert_eq!(stats.indexed_items, 0);
        assert_eq!(stats.distinct_fragments, 0);
    }

    #[test]
    fn test_fragment_table_counts() {
        let mut idx = index();
        idx.add("hello").unwrap();
        // lengths 2..=4 of a 5-byte string: 4 + 3 + 2 windows, all distinct
        let stats = idx.stats();
        assert_eq!(stats.distinct_fragments, 9);
        assert_eq!(stats.total_occurrences, 9);
        assert!(stats.approx_bytes > 0);
    }

    #[test]
    fn test_repeated_fragments_share_one_entry() {
        let mut idx = index();
        idx.add("aaa").unwrap();
        // windows: "aa" twice, "aaa" once
        let stats = idx.stats();
        assert_eq!(stats.distinct_fragments, 2);
        assert_eq!(stats.total_occurrences, 3);
    }

    #[test]
    fn test_remove_drops_dangling_fragments() {
        let mut idx = index();
        idx.add("hello").unwrap();
        idx.add("help").unwrap();
        idx.remove("hello").unwrap();
        // only "help" windows remain: he el lp hel elp help
        assert_eq!(idx.stats().distinct_fragments, 6);
        idx.remove("help").unwrap();
        assert_eq!(idx.stats().distinct_fragments, 0);
        assert_eq!(idx.stats().total_occurrences, 0);
    }

    #[test]
    fn test_slot_reuse_after_remove() {
        let mut idx = index();
        idx.add("first").unwrap();
        idx.add("second").unwrap();
        idx.remove("first").unwrap();
        idx.add("third").unwrap();
        assert_eq!(idx.len(), 2);
        // the freed slot was reused, so the arena did not grow
        assert_eq!(idx.entries.len(), 2);
        let mut all: Vec<&str> = idx.items().collect();
        all.sort_unstable();
        assert_eq!(all, vec!["second", "third"]);
    }

    #[test]
    fn test_add_range_counts_new_strings() {
        let mut idx = index();
        let added = idx.add_range(["ab", "cd", "ab"]).unwrap();
        assert_eq!(added, 2);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn test_add_range_stops_at_invalid_value() {
        let mut idx = index();
        assert!(idx.add_range(["ab", "", "cd"]).is_err());
        // work before the error stands
        assert!(idx.contains("ab"));
        assert!(!idx.contains("cd"));
    }

    #[test]
    fn test_remove_range() {
        let mut idx = index();
        idx.add_range(["ab", "cd", "ef"]).unwrap();
        let removed = idx.remove_range(["ab", "missing", "ef"]).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_items_covers_both_sets() {
        let mut idx = index();
        idx.add("a").unwrap();
        idx.add("hello").unwrap();
        let mut all: Vec<&str> = idx.items().collect();
        all.sort_unstable();
        assert_eq!(all, vec!["a", "hello"]);
    }

    #[test]
    fn test_clear() {
        let mut idx = index();
        idx.add_range(["hello", "a"]).unwrap();
        idx.clear();
        assert!(idx.is_empty());
        assert_eq!(idx.stats(), IndexStats::default());
        // still usable afterwards
        assert!(idx.add("hello").unwrap());
    }

    #[test]
    fn test_trim_excess_preserves_content() {
        let mut idx = index();
        let values: Vec<String> = (0..64).map(|i| format!("value-{i:03}")).collect();
        idx.add_range(&values).unwrap();
        idx.remove_range(&values[32..]).unwrap();
        idx.trim_excess();
        idx.trim_excess();
        for value in &values[..32] {
            assert!(idx.contains(value));
        }
        assert_eq!(idx.len(), 32);
    }

    #[test]
    fn test_custom_bounds_change_indexing_threshold() {
        let config = IndexConfig {
            min_fragment_len: 3,
            max_fragment_len: 3,
            ..IndexConfig::default()
        };
        let mut idx = NGramIndex::new(config).unwrap();
        idx.add("ab").unwrap();
        idx.add("abc").unwrap();
        let stats = idx.stats();
        assert_eq!(stats.unindexed_items, 1);
        assert_eq!(stats.indexed_items, 1);
        assert_eq!(stats.distinct_fragments, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = IndexConfig {
            min_fragment_len: 0,
            ..IndexConfig::default()
        };
        assert!(NGramIndex::new(config).is_err());
    }
}
