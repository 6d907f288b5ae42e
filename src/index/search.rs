//! Candidate planning and lazy verification for index searches.
//!
//! A search never scans everything blindly: the pattern's literal material
//! decides between a direct membership probe, a fragment-table
//! intersection, or a scan of whichever id set could still hold a match.
//! Every candidate is verified with the compiled pattern before it is
//! yielded, so planning only has to be sound, not exact.

use roaring::bitmap::Iter as BitmapIter;
use rustc_hash::FxHashMap;

use super::store::NGramIndex;
use super::types::{Occurrence, StrId};
use crate::error::Result;
use crate::pattern::{MatchMode, WildcardPattern};
use crate::utils::{cover_windows, literal_runs};

impl NGramIndex {
    /// Find every stored string matching `pattern` under `mode`.
    ///
    /// The pattern is compiled with the index's wildcard characters.
    /// Results are lazy, duplicate-free, and in no particular order.
    pub fn search(&self, pattern: &str, mode: MatchMode) -> Result<Search<'_>> {
        let config = self.config();
        let matcher = WildcardPattern::with_wildcards(
            pattern,
            mode,
            config.wildcard_one,
            config.wildcard_many,
        )?;
        let candidates = self.plan(&matcher);
        Ok(Search {
            index: self,
            matcher,
            candidates,
        })
    }

    fn plan(&self, matcher: &WildcardPattern) -> Candidates<'_> {
        let min = self.config().min_fragment_len;

        // a literal Exact pattern is a membership probe
        if !matcher.has_wildcards() && matcher.mode() == MatchMode::Exact {
            let ids: Vec<StrId> = self.id_of(matcher.as_str()).into_iter().collect();
            return Candidates::Ids(ids.into_iter());
        }

        if matcher.required_len() < min {
            // too little literal material for any table lookup
            return if matcher.mode() == MatchMode::Exact && !matcher.has_variable() {
                // the match length is fixed below min, no indexed string is that short
                Candidates::Scan(self.unindexed_ids().iter())
            } else {
                Candidates::ScanBoth(
                    self.unindexed_ids().iter().chain(self.indexed_ids().iter()),
                )
            };
        }

        if matcher.longest_literal_run() < min {
            // no run is long enough to look up; unindexed strings are all
            // shorter than the required byte count, so skip them
            return Candidates::Scan(self.indexed_ids().iter());
        }

        Candidates::Ids(self.intersect_fragments(matcher).into_iter())
    }

    /// Intersect the occurrence lists of the pattern's fragment probes.
    ///
    /// Returns a superset of the matching indexed ids; verification trims
    /// the rest.
    fn intersect_fragments(&self, matcher: &WildcardPattern) -> Vec<StrId> {
        let config = self.config();
        let (min, max) = (config.min_fragment_len, config.max_fragment_len);
        let pattern = matcher.raw_bytes();
        let one = matcher.wildcard_one();

        // Probe values, each with the tightest lower bound on where it can
        // occur in a matching string: everything the pattern requires
        // before the window must fit in front of it.
        let mut probes: FxHashMap<&[u8], usize> = FxHashMap::default();
        let mut prefix = 0;
        for section in matcher.sections() {
            for (run_offset, run) in literal_runs(section.core(pattern), one) {
                for (window_offset, window) in cover_windows(run, min, max) {
                    let min_start = prefix + section.before + run_offset + window_offset;
                    probes
                        .entry(window)
                        .and_modify(|start| *start = (*start).max(min_start))
                        .or_insert(min_start);
                }
            }
            prefix += section.required();
        }

        let mut lists: Vec<(&[Occurrence], usize)> = Vec::with_capacity(probes.len());
        for (window, min_start) in probes {
            // the table is complete over indexed strings, so a missing
            // fragment proves nothing can match
            match self.occurrences(window) {
                Some(list) => lists.push((list, min_start)),
                None => return Vec::new(),
            }
        }
        lists.sort_unstable_by_key(|(list, _)| list.len());

        let Some(&(first, first_start)) = lists.first() else {
            return Vec::new();
        };
        let mut stamps: FxHashMap<StrId, u32> = FxHashMap::default();
        for occ in first {
            if occ.offset as usize >= first_start {
                stamps.insert(occ.id, 1);
            }
        }

        // Round r keeps a candidate iff it survived round r - 1 and occurs
        // in the current list, without ever clearing the map.
        let mut round = 1;
        let mut live = stamps.len();
        for &(list, min_start) in &lists[1..] {
            if live == 0 {
                break;
            }
            // walking a list much larger than the survivor set costs more
            // than verifying the survivors directly
            if list.len() > live.saturating_mul(4) {
                break;
            }
            let next = round + 1;
            live = 0;
            for occ in list {
                if (occ.offset as usize) < min_start {
                    continue;
                }
                if let Some(stamp) = stamps.get_mut(&occ.id) {
                    if *stamp == round {
                        *stamp = next;
                        live += 1;
                    }
                }
            }
            round = next;
        }

        stamps
            .into_iter()
            .filter_map(|(id, stamp)| (stamp == round).then_some(id))
            .collect()
    }
}

/// Lazy stream of stored strings matching a pattern, borrowed from the
/// index that produced it.
pub struct Search<'a> {
    index: &'a NGramIndex,
    matcher: WildcardPattern,
    candidates: Candidates<'a>,
}

impl Search<'_> {
    /// The compiled pattern driving this search.
    #[must_use]
    pub fn pattern(&self) -> &WildcardPattern {
        &self.matcher
    }
}

enum Candidates<'a> {
    /// Planned ids, already duplicate-free.
    Ids(std::vec::IntoIter<StrId>),
    /// Walk a single id set.
    Scan(BitmapIter<'a>),
    /// Walk the unindexed set, then the indexed set.
    ScanBoth(std::iter::Chain<BitmapIter<'a>, BitmapIter<'a>>),
}

impl Iterator for Candidates<'_> {
    type Item = StrId;

    fn next(&mut self) -> Option<StrId> {
        match self {
            Candidates::Ids(ids) => ids.next(),
            Candidates::Scan(ids) => ids.next(),
            Candidates::ScanBoth(ids) => ids.next(),
        }
    }
}

impl<'a> Iterator for Search<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let id = self.candidates.next()?;
            let value = self.index.value(id);
            if self.matcher.is_match(value) {
                return Some(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::IndexConfig;

    fn corpus(values: &[&str]) -> NGramIndex {
        let mut idx = NGramIndex::new(IndexConfig::default()).unwrap();
        idx.add_range(values).unwrap();
        idx
    }

    fn sorted(search: Search<'_>) -> Vec<&str> {
        let mut found: Vec<&str> = search.collect();
        found.sort_unstable();
        found
    }

    #[test]
    fn test_single_unknowns_with_prefix() {
        let idx = corpus(&["hello", "help", "held"]);
        let found = sorted(idx.search("he??", MatchMode::StartsWith).unwrap());
        assert_eq!(found, vec!["held", "hello", "help"]);
    }

    #[test]
    fn test_variable_gap() {
        let idx = corpus(&["hello", "help", "held"]);
        let found = sorted(idx.search("he*p", MatchMode::Contains).unwrap());
        assert_eq!(found, vec!["help"]);
    }

    #[test]
    fn test_exact_fixes_length() {
        let idx = corpus(&["hello", "help", "held"]);
        let found = sorted(idx.search("h???", MatchMode::Exact).unwrap());
        assert_eq!(found, vec!["held", "help"]);
    }

    #[test]
    fn test_literal_exact_is_membership() {
        let idx = corpus(&["hello", "help"]);
        let found = sorted(idx.search("hello", MatchMode::Exact).unwrap());
        assert_eq!(found, vec!["hello"]);
        assert_eq!(idx.search("helm", MatchMode::Exact).unwrap().count(), 0);
    }

    #[test]
    fn test_literal_contains_uses_fragments() {
        let idx = corpus(&["hello", "help", "shell"]);
        let found = sorted(idx.search("ell", MatchMode::Contains).unwrap());
        assert_eq!(found, vec!["hello", "shell"]);
    }

    #[test]
    fn test_literal_ends_with() {
        let idx = corpus(&["hello", "shell"]);
        let found = sorted(idx.search("ell", MatchMode::EndsWith).unwrap());
        assert_eq!(found, vec!["shell"]);
    }

    #[test]
    fn test_missing_fragment_short_circuits() {
        let idx = corpus(&["hello", "help"]);
        assert_eq!(idx.search("zz", MatchMode::Contains).unwrap().count(), 0);
    }

    #[test]
    fn test_greedy_trailing_gap_still_matches() {
        let idx = corpus(&["aabbb"]);
        let found = sorted(idx.search("aa*bb", MatchMode::Contains).unwrap());
        assert_eq!(found, vec!["aabbb"]);
    }

    #[test]
    fn test_short_pattern_falls_back_to_scan() {
        let config = IndexConfig {
            min_fragment_len: 3,
            max_fragment_len: 3,
            ..IndexConfig::default()
        };
        let mut idx = NGramIndex::new(config).unwrap();
        idx.add_range(["ab", "abc", "xy"]).unwrap();
        // required length 2 is below the fragment floor, both sets scanned
        let found = sorted(idx.search("a?", MatchMode::Contains).unwrap());
        assert_eq!(found, vec!["ab", "abc"]);
    }

    #[test]
    fn test_fixed_short_exact_skips_indexed_set() {
        let config = IndexConfig {
            min_fragment_len: 3,
            max_fragment_len: 3,
            ..IndexConfig::default()
        };
        let mut idx = NGramIndex::new(config).unwrap();
        idx.add_range(["ab", "abc"]).unwrap();
        // match length is exactly 2, no indexed string qualifies
        let found = sorted(idx.search("a?", MatchMode::Exact).unwrap());
        assert_eq!(found, vec!["ab"]);
    }

    #[test]
    fn test_short_runs_scan_indexed_only() {
        let idx = corpus(&["aXbYc", "ab", "c"]);
        // every literal run is a single byte, but five bytes are required
        let found = sorted(idx.search("a?b?c", MatchMode::Contains).unwrap());
        assert_eq!(found, vec!["aXbYc"]);
    }

    #[test]
    fn test_match_all() {
        let idx = corpus(&["hello", "a", "xy"]);
        for mode in [
            MatchMode::Exact,
            MatchMode::Contains,
            MatchMode::StartsWith,
            MatchMode::EndsWith,
        ] {
            let found = sorted(idx.search("*", mode).unwrap());
            assert_eq!(found, vec!["a", "hello", "xy"], "mode {mode:?}");
        }
    }

    #[test]
    fn test_offset_bound_prunes_impossible_candidates() {
        let idx = corpus(&["hello", "llo"]);
        // "llo" must sit at offset 2 of any match, so "llo" itself cannot
        let found = sorted(idx.search("??llo", MatchMode::StartsWith).unwrap());
        assert_eq!(found, vec!["hello"]);
    }

    #[test]
    fn test_repeated_fragment_value_yields_once() {
        let idx = corpus(&["ababab", "abab"]);
        let found = sorted(idx.search("ab?bab", MatchMode::Contains).unwrap());
        assert_eq!(found, vec!["ababab"]);
    }

    #[test]
    fn test_empty_pattern_is_an_error() {
        let idx = corpus(&["hello"]);
        assert!(idx.search("", MatchMode::Contains).is_err());
    }

    #[test]
    fn test_custom_wildcards() {
        let config = IndexConfig {
            wildcard_one: '_',
            wildcard_many: '%',
            ..IndexConfig::default()
        };
        let mut idx = NGramIndex::new(config).unwrap();
        idx.add_range(["hello", "help", "who?"]).unwrap();
        let found = sorted(idx.search("he%", MatchMode::StartsWith).unwrap());
        assert_eq!(found, vec!["hello", "help"]);
        // '?' is an ordinary byte under this configuration
        let found = sorted(idx.search("who?", MatchMode::Exact).unwrap());
        assert_eq!(found, vec!["who?"]);
    }

    #[test]
    fn test_search_reflects_removals() {
        let mut idx = corpus(&["hello", "help"]);
        idx.remove("help").unwrap();
        let found = sorted(idx.search("he", MatchMode::StartsWith).unwrap());
        assert_eq!(found, vec!["hello"]);
    }

    #[test]
    fn test_exact_with_interior_gap() {
        let idx = corpus(&["hello", "hero", "ho"]);
        let found = sorted(idx.search("h*o", MatchMode::Exact).unwrap());
        assert_eq!(found, vec!["hello", "hero", "ho"]);
    }

    #[test]
    fn test_pattern_accessor() {
        let idx = corpus(&["hello"]);
        let search = idx.search("he*", MatchMode::Contains).unwrap();
        assert_eq!(search.pattern().as_str(), "he*");
    }
}
