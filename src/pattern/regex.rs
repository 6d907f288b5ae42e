//! Regex emission for compiled patterns.
//!
//! Produces an equivalent expression in the regex crate's syntax for
//! interoperability and debugging. The matching engine never runs these;
//! single-unknown wildcards become `.` under `(?s)`, so the equivalence is
//! per character and holds exactly for ASCII text.

use super::matcher::{MatchMode, WildcardPattern};

impl WildcardPattern {
    /// Emit an equivalent regular expression string.
    ///
    /// The pattern's mode is encoded with `^`/`$` anchors, the variable
    /// wildcard becomes `.*`, and literal metacharacters are escaped.
    pub fn to_regex(&self) -> String {
        let (expand_start, expand_end) = self.expand_flags();
        let mut out = String::with_capacity(self.as_str().len() + 8);
        out.push_str("(?s)");
        if matches!(self.mode(), MatchMode::Exact | MatchMode::StartsWith) {
            out.push('^');
        }
        if expand_start {
            out.push_str(".*");
        }
        let one = self.wildcard_one() as char;
        for (i, s) in self.sections().iter().enumerate() {
            if i > 0 {
                out.push_str(".*");
            }
            for _ in 0..s.before {
                out.push('.');
            }
            let core = &self.as_str()[s.core_start..s.core_start + s.core_len];
            for ch in core.chars() {
                if ch == one {
                    out.push('.');
                } else {
                    push_literal(&mut out, ch);
                }
            }
            for _ in 0..s.after {
                out.push('.');
            }
        }
        if expand_end {
            out.push_str(".*");
        }
        if matches!(self.mode(), MatchMode::Exact | MatchMode::EndsWith) {
            out.push('$');
        }
        out
    }

    /// `to_regex` wrapped as a SQL string literal, embedded quotes doubled.
    pub fn to_regex_sql_quoted(&self) -> String {
        let regex = self.to_regex();
        let mut out = String::with_capacity(regex.len() + 2);
        out.push('\'');
        for ch in regex.chars() {
            if ch == '\'' {
                out.push('\'');
            }
            out.push(ch);
        }
        out.push('\'');
        out
    }
}

#[inline]
fn push_literal(out: &mut String, ch: char) {
    if is_meta(ch) {
        out.push('\\');
    }
    out.push(ch);
}

/// Characters the regex syntax reserves outside character classes.
const fn is_meta(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '.'
            | '+'
            | '*'
            | '?'
            | '('
            | ')'
            | '|'
            | '['
            | ']'
            | '{'
            | '}'
            | '^'
            | '$'
            | '#'
            | '&'
            | '-'
            | '~'
    )
}
