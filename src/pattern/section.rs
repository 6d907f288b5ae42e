//! Section model for compiled wildcard patterns.
//!
//! A section is a maximal run of the pattern with no variable-length
//! wildcard in it. Runs of single-unknown wildcards at the edges are
//! trimmed into counters; the remaining literal core may still contain
//! single-unknown wildcards in interior positions.

/// One compiled pattern section.
///
/// `core_start`/`core_len` index into the raw pattern string. `before` and
/// `after` count the single-unknown wildcards that must be satisfied
/// immediately around the core. When the section borders a variable-length
/// wildcard those counters act as minimum gap widths instead of exact
/// offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Section {
    /// Byte offset of the literal core within the pattern.
    pub core_start: usize,
    /// Byte length of the literal core (zero for counter-only sections).
    pub core_len: usize,
    /// Single-unknown wildcards required before the core.
    pub before: usize,
    /// Single-unknown wildcards required after the core.
    pub after: usize,
    /// Offset of the search anchor within the core.
    pub anchor_start: usize,
    /// Length of the search anchor.
    pub anchor_len: usize,
}

impl Section {
    /// Total bytes this section consumes in any match.
    #[inline]
    pub fn required(&self) -> usize {
        self.before + self.core_len + self.after
    }

    /// Literal core slice, taken from the raw pattern bytes.
    #[inline]
    pub fn core<'p>(&self, pattern: &'p [u8]) -> &'p [u8] {
        &pattern[self.core_start..self.core_start + self.core_len]
    }

    /// Anchor slice, taken from the raw pattern bytes.
    #[inline]
    pub fn anchor<'p>(&self, pattern: &'p [u8]) -> &'p [u8] {
        let start = self.core_start + self.anchor_start;
        &pattern[start..start + self.anchor_len]
    }
}

/// Pick the best substring-search anchor inside a literal core.
///
/// The core is split on single-unknown wildcards and each wildcard-free run
/// is scored. The score counts positions that differ from their predecessor,
/// so a run of repeated characters scores like a much shorter one: repeated
/// characters produce dense false hits during scanning and make a poor
/// anchor. Ties go to the longest run, then the earliest.
///
/// Returns `(offset, len)` relative to the core; `(0, 0)` if the core has
/// no literal characters.
pub(crate) fn choose_anchor(core: &[u8], wildcard_one: u8) -> (usize, usize) {
    let mut best = (0usize, 0usize);
    let mut best_score = 0usize;
    let mut run_start = 0usize;

    for i in 0..=core.len() {
        let at_break = i == core.len() || core[i] == wildcard_one;
        if !at_break {
            continue;
        }
        let len = i - run_start;
        if len > 0 {
            let score = variation_score(&core[run_start..i]);
            if score > best_score || (score == best_score && len > best.1) {
                best = (run_start, len);
                best_score = score;
            }
        }
        run_start = i + 1;
    }
    best
}

/// Length of a run discounted for immediately repeated characters.
#[inline]
fn variation_score(run: &[u8]) -> usize {
    let mut score = 1;
    for pair in run.windows(2) {
        if pair[0] != pair[1] {
            score += 1;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_whole_core_when_no_unknowns() {
        assert_eq!(choose_anchor(b"abc", b'?'), (0, 3));
    }

    #[test]
    fn test_anchor_prefers_longer_run() {
        assert_eq!(choose_anchor(b"ab?cde", b'?'), (3, 3));
    }

    #[test]
    fn test_anchor_discounts_repeated_characters() {
        // "aaaa" scores 1, "abc" scores 3
        assert_eq!(choose_anchor(b"aaaa?abc", b'?'), (5, 3));
    }

    #[test]
    fn test_anchor_tie_on_score_takes_longer_run() {
        // both runs score 1; the longer repeated run still wins the tie
        assert_eq!(choose_anchor(b"bb?aaaa", b'?'), (3, 4));
    }

    #[test]
    fn test_anchor_tie_takes_earliest() {
        assert_eq!(choose_anchor(b"ab?ab", b'?'), (0, 2));
    }

    #[test]
    fn test_anchor_single_characters() {
        assert_eq!(choose_anchor(b"a?b", b'?'), (0, 1));
    }

    #[test]
    fn test_anchor_empty_core() {
        assert_eq!(choose_anchor(b"", b'?'), (0, 0));
    }

    #[test]
    fn test_required_counts_counters_and_core() {
        let s = Section {
            core_start: 0,
            core_len: 3,
            before: 2,
            after: 1,
            anchor_start: 0,
            anchor_len: 3,
        };
        assert_eq!(s.required(), 6);
    }
}
