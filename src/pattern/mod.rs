pub mod matcher;
mod parser;
mod regex;
mod section;

pub use matcher::{
    MatchMode, Matches, Span, WildcardPattern, DEFAULT_WILDCARD_MANY, DEFAULT_WILDCARD_ONE,
};
