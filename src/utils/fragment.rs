//! Fragment extraction for indexing and query planning.
//!
//! A fragment is a contiguous byte window of a stored value. Indexing records
//! every window whose length falls inside the configured bounds; planning
//! extracts the widest windows it can from a pattern's literal runs.

/// Enumerate every `(offset, window)` of `bytes` with a length in
/// `min..=max`, shortest lengths first.
///
/// Yields nothing when `bytes` is shorter than `min`.
pub(crate) fn decompose(
    bytes: &[u8],
    min: usize,
    max: usize,
) -> impl Iterator<Item = (usize, &[u8])> {
    debug_assert!(min >= 1 && min <= max);
    let len = bytes.len();
    (min..=max.min(len))
        .flat_map(move |size| (0..=len - size).map(move |start| (start, &bytes[start..start + size])))
}

/// Widest indexable windows covering `run`: every `(offset, window)` of a
/// `min(run.len(), max)`-byte window, or nothing if `run` is shorter
/// than `min`.
///
/// Longer windows hit rarer table entries, so planning always takes the
/// widest length the table can hold.
pub(crate) fn cover_windows(
    run: &[u8],
    min: usize,
    max: usize,
) -> impl Iterator<Item = (usize, &[u8])> {
    let size = run.len().min(max);
    let count = if size < min { 0 } else { run.len() - size + 1 };
    run.windows(size.max(1)).take(count).enumerate()
}

/// Maximal literal runs of `bytes` as `(offset, run)`, splitting at the
/// single-unknown marker.
pub(crate) fn literal_runs(bytes: &[u8], one: u8) -> impl Iterator<Item = (usize, &[u8])> + '_ {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while pos < bytes.len() && bytes[pos] == one {
            pos += 1;
        }
        if pos == bytes.len() {
            return None;
        }
        let start = pos;
        while pos < bytes.len() && bytes[pos] != one {
            pos += 1;
        }
        Some((start, &bytes[start..pos]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<'a>(it: impl Iterator<Item = (usize, &'a [u8])>) -> Vec<(usize, &'a [u8])> {
        it.collect()
    }

    #[test]
    fn test_decompose_counts_per_length() {
        // len 5 with bounds 2..=4: 4 + 3 + 2 windows
        let all = collect(decompose(b"hello", 2, 4));
        assert_eq!(all.len(), 9);
        assert_eq!(all[0], (0, b"he".as_slice()));
        assert_eq!(all[3], (3, b"lo".as_slice()));
        assert_eq!(all[4], (0, b"hel".as_slice()));
        assert_eq!(all[8], (1, b"ello".as_slice()));
    }

    #[test]
    fn test_decompose_short_value() {
        assert_eq!(collect(decompose(b"a", 2, 4)).len(), 0);
        assert_eq!(collect(decompose(b"", 2, 4)).len(), 0);
        // exactly min long: the one window
        assert_eq!(collect(decompose(b"ab", 2, 4)), vec![(0, b"ab".as_slice())]);
    }

    #[test]
    fn test_decompose_caps_at_value_len() {
        // bounds 2..=8 on a 3-byte value never yields a window past len 3
        let all = collect(decompose(b"abc", 2, 8));
        assert_eq!(
            all,
            vec![
                (0, b"ab".as_slice()),
                (1, b"bc".as_slice()),
                (0, b"abc".as_slice()),
            ]
        );
    }

    #[test]
    fn test_cover_windows_takes_widest() {
        let windows: Vec<(usize, &[u8])> = cover_windows(b"hello", 2, 4).collect();
        assert_eq!(windows, vec![(0, b"hell".as_slice()), (1, b"ello".as_slice())]);

        // run shorter than max: the run itself
        let windows: Vec<(usize, &[u8])> = cover_windows(b"abc", 2, 4).collect();
        assert_eq!(windows, vec![(0, b"abc".as_slice())]);
    }

    #[test]
    fn test_cover_windows_short_run() {
        assert_eq!(cover_windows(b"a", 2, 4).count(), 0);
        assert_eq!(cover_windows(b"", 2, 4).count(), 0);
    }

    #[test]
    fn test_literal_runs_split_at_marker() {
        let runs: Vec<(usize, &[u8])> = literal_runs(b"ab?c??de", b'?').collect();
        assert_eq!(
            runs,
            vec![
                (0, b"ab".as_slice()),
                (3, b"c".as_slice()),
                (6, b"de".as_slice()),
            ]
        );
    }

    #[test]
    fn test_literal_runs_all_markers() {
        assert_eq!(literal_runs(b"???", b'?').count(), 0);
        assert_eq!(literal_runs(b"", b'?').count(), 0);
    }
}
