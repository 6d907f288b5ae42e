//! Wildcard grammar compilation.
//!
//! Turns a raw wildcard string into the section list the matcher and the
//! index planner both run on: split on the variable-length wildcard, trim
//! single-unknown runs into counters, fold counter-only sections into their
//! neighbors, and normalize leading counters onto the previous section.

use super::matcher::MatchMode;
use super::section::{Section, choose_anchor};

/// Output of a pattern compilation pass.
#[derive(Debug, Clone)]
pub(crate) struct Compiled {
    pub sections: Vec<Section>,
    /// Candidate matches must begin at the probed range start.
    pub must_match_start: bool,
    /// Candidate matches must end at the probed range end.
    pub must_match_end: bool,
    /// A variable wildcard precedes the first literal character, so a
    /// reported span widens to the range start.
    pub expand_to_start: bool,
    /// A variable wildcard follows the last literal character.
    pub expand_to_end: bool,
    /// Minimum bytes any match must consume.
    pub required_len: usize,
    /// The pattern contains at least one wildcard character.
    pub has_wildcards: bool,
    /// The pattern contains at least one variable-length wildcard.
    pub has_variable: bool,
    /// Longest run of bytes that are not wildcards.
    pub longest_literal_run: usize,
}

/// Raw section span before folding, with its trimmed counters.
struct RawRun {
    before: usize,
    core_start: usize,
    core_len: usize,
    after: usize,
}

pub(crate) fn compile(pattern: &[u8], mode: MatchMode, one: u8, many: u8) -> Compiled {
    let runs = split_runs(pattern, one, many);
    let starts_variable = pattern.first() == Some(&many);
    let ends_variable = pattern.last() == Some(&many);

    // Fold counter-only runs into a neighbor. A leading counter-only run
    // folds forward into the next section's leading counter; any other
    // folds backward into the previous section's trailing counter. Either
    // fold crosses a variable wildcard, which breaks the absolute pin that
    // boundary would otherwise carry.
    let mut sections: Vec<Section> = Vec::with_capacity(runs.len());
    let mut pending_before = 0usize;
    let mut broke_start_pin = false;
    let mut broke_end_pin = false;
    let last_run = runs.len().saturating_sub(1);

    for (i, run) in runs.iter().enumerate() {
        if run.core_len == 0 {
            let count = run.before + run.after;
            if let Some(prev) = sections.last_mut() {
                prev.after += count;
                if i == last_run {
                    broke_end_pin = true;
                }
            } else {
                pending_before += count;
                if i < last_run {
                    broke_start_pin = true;
                }
            }
        } else {
            let core = &pattern[run.core_start..run.core_start + run.core_len];
            let (anchor_start, anchor_len) = choose_anchor(core, one);
            sections.push(Section {
                core_start: run.core_start,
                core_len: run.core_len,
                before: run.before + pending_before,
                after: run.after,
                anchor_start,
                anchor_len,
            });
            pending_before = 0;
        }
    }

    // A pattern with no literal characters at all keeps one counter-only
    // section so its length requirement survives.
    if sections.is_empty() && pending_before > 0 {
        sections.push(Section {
            core_start: 0,
            core_len: 0,
            before: pending_before,
            after: 0,
            anchor_start: 0,
            anchor_len: 0,
        });
    }

    // Leading counters on interior sections move to the previous section's
    // trailing counter. `?*` and `*?` consume the same text, so this cannot
    // change what matches, and it puts every fixed-offset check on one side
    // of the anchor search.
    for i in 1..sections.len() {
        let moved = sections[i].before;
        sections[i].before = 0;
        sections[i - 1].after += moved;
    }

    let begins_variable = starts_variable || broke_start_pin;
    let finishes_variable = ends_variable || broke_end_pin;
    let must_match_start = matches!(mode, MatchMode::Exact | MatchMode::StartsWith) && !begins_variable;
    let must_match_end = matches!(mode, MatchMode::Exact | MatchMode::EndsWith) && !finishes_variable;

    let (expand_to_start, expand_to_end) = expand_flags(pattern, one, many);
    let required_len = sections.iter().map(Section::required).sum();
    let has_variable = pattern.contains(&many);
    let has_wildcards = has_variable || pattern.contains(&one);

    Compiled {
        sections,
        must_match_start,
        must_match_end,
        expand_to_start,
        expand_to_end,
        required_len,
        has_wildcards,
        has_variable,
        longest_literal_run: longest_literal_run(pattern, one, many),
    }
}

/// Split on the variable wildcard and trim single-unknown edges.
/// Zero-length runs from adjacent variable wildcards are discarded.
fn split_runs(pattern: &[u8], one: u8, many: u8) -> Vec<RawRun> {
    let mut runs = Vec::new();
    let mut start = 0usize;
    for i in 0..=pattern.len() {
        if i < pattern.len() && pattern[i] != many {
            continue;
        }
        if i > start {
            let run = &pattern[start..i];
            let before = run.iter().take_while(|&&b| b == one).count();
            let after = if before == run.len() {
                0
            } else {
                run.iter().rev().take_while(|&&b| b == one).count()
            };
            runs.push(RawRun {
                before,
                core_start: start + before,
                core_len: run.len() - before - after,
                after,
            });
        }
        start = i + 1;
    }
    runs
}

/// Span-widening flags: whether a variable wildcard sits before the first
/// literal character and after the last one. A literal-free pattern widens
/// on both ends when it contains a variable wildcard at all.
fn expand_flags(pattern: &[u8], one: u8, many: u8) -> (bool, bool) {
    let first_literal = pattern.iter().position(|&b| b != one && b != many);
    match first_literal {
        Some(first) => {
            let last = pattern
                .iter()
                .rposition(|&b| b != one && b != many)
                .unwrap_or(first);
            let before = pattern[..first].contains(&many);
            let after = pattern[last + 1..].contains(&many);
            (before, after)
        }
        None => {
            let any = pattern.contains(&many);
            (any, any)
        }
    }
}

/// Longest run of non-wildcard bytes anywhere in the pattern.
fn longest_literal_run(pattern: &[u8], one: u8, many: u8) -> usize {
    let mut longest = 0usize;
    let mut current = 0usize;
    for &b in pattern {
        if b == one || b == many {
            current = 0;
        } else {
            current += 1;
            longest = longest.max(current);
        }
    }
    longest
}
