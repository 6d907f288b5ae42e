//! Compiled wildcard patterns and the matching engine.
//!
//! A pattern is compiled once into sections (see the parser) and then
//! matched against arbitrary text. Matching is byte-oriented: a
//! single-unknown wildcard consumes exactly one byte, and all reported
//! spans are byte offsets. Three paths cover the work: a direct comparison
//! when the single section sits at a fixed offset, one substring search
//! when it floats freely, and the general section walk for everything else.

use std::ops::Range;

use memchr::memmem;
use serde::{Deserialize, Serialize};

use super::parser;
use super::section::Section;
use crate::error::{Error, Result};

/// Default single-unknown wildcard.
pub const DEFAULT_WILDCARD_ONE: char = '?';
/// Default variable-length wildcard.
pub const DEFAULT_WILDCARD_MANY: char = '*';

/// How a pattern binds to the candidate text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMode {
    /// The whole text must match the pattern.
    Exact,
    /// The pattern may match anywhere inside the text.
    Contains,
    /// The match must begin at the start of the text.
    StartsWith,
    /// The match must end at the end of the text.
    EndsWith,
}

/// A matched byte range, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Matched length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for a zero-length match (a variable-only pattern on empty text).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The span as a standard range, usable for slicing.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A compiled wildcard pattern.
///
/// Compilation is eager and infallible after construction; matching never
/// allocates. The same compiled form drives both the matcher and the
/// index's fragment planner.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    raw: Box<str>,
    mode: MatchMode,
    one: u8,
    many: u8,
    sections: Vec<Section>,
    must_match_start: bool,
    must_match_end: bool,
    expand_to_start: bool,
    expand_to_end: bool,
    required_len: usize,
    has_wildcards: bool,
    has_variable: bool,
    longest_literal_run: usize,
}

impl WildcardPattern {
    /// Compile a pattern with the default `?`/`*` wildcards.
    pub fn new(pattern: &str, mode: MatchMode) -> Result<Self> {
        Self::with_wildcards(pattern, mode, DEFAULT_WILDCARD_ONE, DEFAULT_WILDCARD_MANY)
    }

    /// Compile a pattern with caller-chosen wildcard characters.
    ///
    /// # Arguments
    /// * `pattern` - the wildcard expression, must be non-empty
    /// * `mode` - how the pattern binds to candidate text
    /// * `one` - single-unknown wildcard, distinct ASCII
    /// * `many` - variable-length wildcard, distinct ASCII
    pub fn with_wildcards(pattern: &str, mode: MatchMode, one: char, many: char) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::EmptyPattern);
        }
        if one == many || !one.is_ascii() || !many.is_ascii() {
            return Err(Error::InvalidWildcards { one, many });
        }
        let compiled = parser::compile(pattern.as_bytes(), mode, one as u8, many as u8);
        Ok(Self {
            raw: pattern.into(),
            mode,
            one: one as u8,
            many: many as u8,
            sections: compiled.sections,
            must_match_start: compiled.must_match_start,
            must_match_end: compiled.must_match_end,
            expand_to_start: compiled.expand_to_start,
            expand_to_end: compiled.expand_to_end,
            required_len: compiled.required_len,
            has_wildcards: compiled.has_wildcards,
            has_variable: compiled.has_variable,
            longest_literal_run: compiled.longest_literal_run,
        })
    }

    /// The raw pattern string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The query mode this pattern was compiled for.
    #[inline]
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Minimum bytes any match must consume.
    #[inline]
    pub fn required_len(&self) -> usize {
        self.required_len
    }

    /// True when the whole text matches per the pattern's mode.
    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// `is_match` restricted to a byte range of the text.
    pub fn is_match_in(&self, text: &str, range: Range<usize>) -> bool {
        self.find_in(text, range).is_some()
    }

    /// First match in the text, or `None`.
    pub fn find(&self, text: &str) -> Option<Span> {
        self.find_window(text.as_bytes(), 0, text.len())
    }

    /// First match within a byte range of the text.
    ///
    /// The range is the probed window: start/end pins and span widening
    /// apply to its boundaries, not the boundaries of `text`.
    pub fn find_in(&self, text: &str, range: Range<usize>) -> Option<Span> {
        assert!(
            range.start <= range.end && range.end <= text.len(),
            "probed range {}..{} out of bounds for text of {} bytes",
            range.start,
            range.end,
            text.len()
        );
        self.find_window(text.as_bytes(), range.start, range.end)
    }

    /// Lazy left-to-right iteration over non-overlapping matches.
    ///
    /// A pattern pinned at either boundary can match at most once, so the
    /// iterator stops after the first hit in that case.
    pub fn find_iter<'p, 't>(&'p self, text: &'t str) -> Matches<'p, 't> {
        Matches {
            pattern: self,
            text,
            at: 0,
            done: false,
        }
    }

    #[inline]
    pub(crate) fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[inline]
    pub(crate) fn raw_bytes(&self) -> &[u8] {
        self.raw.as_bytes()
    }

    #[inline]
    pub(crate) fn wildcard_one(&self) -> u8 {
        self.one
    }

    #[inline]
    pub(crate) fn has_wildcards(&self) -> bool {
        self.has_wildcards
    }

    #[inline]
    pub(crate) fn has_variable(&self) -> bool {
        self.has_variable
    }

    #[inline]
    pub(crate) fn longest_literal_run(&self) -> usize {
        self.longest_literal_run
    }

    #[inline]
    pub(crate) fn is_pinned(&self) -> bool {
        self.must_match_start || self.must_match_end
    }

    pub(crate) fn expand_flags(&self) -> (bool, bool) {
        (self.expand_to_start, self.expand_to_end)
    }

    /// Match inside the probed window `[lo, hi)`.
    fn find_window(&self, text: &[u8], lo: usize, hi: usize) -> Option<Span> {
        if hi - lo < self.required_len {
            return None;
        }
        let n = self.sections.len();
        if n == 0 {
            // variable wildcards only: the whole probed range matches
            return Some(Span { start: lo, end: hi });
        }
        if n == 1 {
            let s = self.sections[0];
            if s.core_len == 0 {
                return self.match_counter_only(&s, lo, hi);
            }
            if s.anchor_len == s.core_len {
                if self.must_match_start {
                    return self.match_pinned_single(text, &s, lo, hi);
                }
                if !self.must_match_end {
                    return self.match_floating_single(text, &s, lo, hi);
                }
            }
        }
        self.match_general(text, lo, hi)
    }

    /// Single-unknown wildcards only: pure bounds arithmetic.
    fn match_counter_only(&self, s: &Section, lo: usize, hi: usize) -> Option<Span> {
        let need = s.before + s.after;
        if self.must_match_start && self.must_match_end && lo + need != hi {
            return None;
        }
        let span = if self.must_match_end {
            Span { start: hi - need, end: hi }
        } else {
            Span { start: lo, end: lo + need }
        };
        Some(self.expand(span, lo, hi))
    }

    /// Exact-compare fast path: one section at a fixed offset from the
    /// probe start, no interior single-unknowns.
    fn match_pinned_single(&self, text: &[u8], s: &Section, lo: usize, hi: usize) -> Option<Span> {
        if self.must_match_end && lo + self.required_len != hi {
            return None;
        }
        let core_start = lo + s.before;
        if &text[core_start..core_start + s.core_len] != s.core(self.raw_bytes()) {
            return None;
        }
        let span = Span { start: lo, end: core_start + s.core_len + s.after };
        Some(self.expand(span, lo, hi))
    }

    /// Single-anchor fast path: one unpinned section, one substring search.
    /// A leading variable wildcard expands greedily, so that case takes the
    /// last occurrence instead of the first.
    fn match_floating_single(&self, text: &[u8], s: &Section, lo: usize, hi: usize) -> Option<Span> {
        let core = s.core(self.raw_bytes());
        let w_lo = lo + s.before;
        let w_hi = hi - s.after;
        let hay = &text[w_lo..w_hi];
        let found = if self.expand_to_start {
            memmem::rfind(hay, core)
        } else {
            memmem::find(hay, core)
        }? + w_lo;
        let span = Span {
            start: found - s.before,
            end: found + s.core_len + s.after,
        };
        Some(self.expand(span, lo, hi))
    }

    /// General path: pinned sections verified at fixed offsets, interior
    /// sections located by anchor search left to right, and the final
    /// unpinned section located right to left when a variable wildcard
    /// precedes it, so a trailing expansion is greedy.
    fn match_general(&self, text: &[u8], lo: usize, hi: usize) -> Option<Span> {
        let pat = self.raw.as_bytes();
        let n = self.sections.len();
        let mut pos = lo;
        let mut end_limit = hi;
        let mut span_start = lo;
        let mut first = 0;
        let mut last = n;

        if self.must_match_start {
            let s = &self.sections[0];
            let core_start = lo + s.before;
            if !self.core_eq(text, s, core_start) {
                return None;
            }
            pos = core_start + s.core_len + s.after;
            first = 1;
        }

        if self.must_match_end {
            let t = &self.sections[n - 1];
            if n == 1 && self.must_match_start {
                // one section pinned at both ends must consume the window
                if lo + self.required_len != hi {
                    return None;
                }
            } else {
                let core_start = hi - t.after - t.core_len;
                if !self.core_eq(text, t, core_start) {
                    return None;
                }
                end_limit = core_start - t.before;
                last = n - 1;
                if n == 1 {
                    span_start = end_limit;
                }
            }
        }

        for idx in first..last {
            let s = &self.sections[idx];
            if pos + s.required() > end_limit {
                return None;
            }
            let reverse = idx == last - 1
                && !self.must_match_end
                && (idx > 0 || self.expand_to_start);
            let anchor = s.anchor(pat);
            let tail = s.core_len - s.anchor_start - s.anchor_len;
            let a_lo = pos + s.before + s.anchor_start;
            let a_hi = end_limit - s.after - tail;
            let core_start = if reverse {
                self.locate_reverse(text, s, anchor, a_lo, a_hi)?
            } else {
                self.locate_forward(text, s, anchor, a_lo, a_hi)?
            };
            if idx == first && !self.must_match_start {
                span_start = core_start - s.before;
            }
            pos = core_start + s.core_len + s.after;
        }

        // every located section advanced `pos` past its trailing unknowns,
        // so it doubles as the minimal span end
        let end = if self.must_match_end { hi } else { pos };
        Some(self.expand(Span { start: span_start, end }, lo, hi))
    }

    /// Leftmost anchor occurrence whose surrounding core validates.
    /// Returns the core start.
    fn locate_forward(
        &self,
        text: &[u8],
        s: &Section,
        anchor: &[u8],
        a_lo: usize,
        a_hi: usize,
    ) -> Option<usize> {
        let finder = memmem::Finder::new(anchor);
        let mut from = a_lo;
        while from + anchor.len() <= a_hi {
            let p = finder.find(&text[from..a_hi])? + from;
            let core_start = p - s.anchor_start;
            if self.core_eq(text, s, core_start) {
                return Some(core_start);
            }
            from = p + 1;
        }
        None
    }

    /// Rightmost anchor occurrence whose surrounding core validates.
    /// Occurrences overlap, so each retry shrinks the window by one byte
    /// past the failed position rather than by a whole anchor.
    fn locate_reverse(
        &self,
        text: &[u8],
        s: &Section,
        anchor: &[u8],
        a_lo: usize,
        a_hi: usize,
    ) -> Option<usize> {
        let finder = memmem::FinderRev::new(anchor);
        let mut until = a_hi;
        while until >= a_lo + anchor.len() {
            let p = finder.rfind(&text[a_lo..until])? + a_lo;
            let core_start = p - s.anchor_start;
            if self.core_eq(text, s, core_start) {
                return Some(core_start);
            }
            until = p + anchor.len() - 1;
        }
        None
    }

    /// Compare a section core at a fixed position; single-unknown bytes in
    /// the core match any text byte.
    #[inline]
    fn core_eq(&self, text: &[u8], s: &Section, at: usize) -> bool {
        let core = s.core(self.raw.as_bytes());
        core.iter()
            .zip(&text[at..at + s.core_len])
            .all(|(&p, &t)| p == self.one || p == t)
    }

    /// Widen a span to the probed boundaries where a variable wildcard
    /// demands it.
    #[inline]
    fn expand(&self, span: Span, lo: usize, hi: usize) -> Span {
        Span {
            start: if self.expand_to_start { lo } else { span.start },
            end: if self.expand_to_end { hi } else { span.end },
        }
    }
}

/// Iterator over non-overlapping matches, scanned left to right.
pub struct Matches<'p, 't> {
    pattern: &'p WildcardPattern,
    text: &'t str,
    at: usize,
    done: bool,
}

impl Iterator for Matches<'_, '_> {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        if self.done {
            return None;
        }
        let hi = self.text.len();
        let span = match self.pattern.find_window(self.text.as_bytes(), self.at, hi) {
            Some(span) => span,
            None => {
                self.done = true;
                return None;
            }
        };
        // resume after the match; a zero-length match still advances
        self.at = if span.is_empty() { span.end + 1 } else { span.end };
        if self.pattern.is_pinned() || span.end >= hi {
            self.done = true;
        }
        Some(span)
    }
}
