//! Shared helpers for fragment extraction.

pub mod fragment;

pub(crate) use fragment::{cover_windows, decompose, literal_runs};
