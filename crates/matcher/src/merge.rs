//! Collapsing of sorted overlap ranges.

use crate::types::{MatchError, Range};

/// Merge every range that touches or overlaps its predecessor.
///
/// The input must already be sorted by `start`; anything else means an
/// upstream step is broken and is reported as [`MatchError::NotSorted`]
/// rather than repaired. On error `ranges` is left unchanged.
pub fn merge_ranges(ranges: &mut Vec<Range>) -> Result<(), MatchError> {
    if let Some(pair) = ranges.windows(2).find(|w| w[0].start > w[1].start) {
        return Err(MatchError::NotSorted {
            previous: pair[0],
            current: pair[1],
        });
    }

    let mut merged: Vec<Range> = Vec::with_capacity(ranges.len());
    for &range in ranges.iter() {
        match merged.last_mut() {
            Some(prev) if prev.end >= range.start => prev.end = prev.end.max(range.end),
            _ => merged.push(range),
        }
    }
    *ranges = merged;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn r(start: usize, end: usize) -> Range {
        Range::new(start, end)
    }

    #[test]
    fn merges_touching_and_nested() {
        let mut v = vec![r(0, 4), r(4, 6), r(5, 5), r(8, 9), r(10, 12)];
        merge_ranges(&mut v).unwrap();
        assert_eq!(v, vec![r(0, 6), r(8, 9), r(10, 12)]);
    }

    #[test]
    fn empty_and_single() {
        let mut v: Vec<Range> = Vec::new();
        merge_ranges(&mut v).unwrap();
        assert!(v.is_empty());

        let mut v = vec![r(3, 7)];
        merge_ranges(&mut v).unwrap();
        assert_eq!(v, vec![r(3, 7)]);
    }

    #[test]
    fn unsorted_input_is_fatal() {
        let mut v = vec![r(5, 9), r(2, 3)];
        let err = merge_ranges(&mut v).unwrap_err();
        assert_eq!(
            err,
            MatchError::NotSorted {
                previous: r(5, 9),
                current: r(2, 3)
            }
        );
        assert_eq!(v, vec![r(5, 9), r(2, 3)]);
    }

    #[test]
    fn equal_starts_are_sorted() {
        let mut v = vec![r(2, 3), r(2, 8)];
        merge_ranges(&mut v).unwrap();
        assert_eq!(v, vec![r(2, 8)]);
    }

    proptest! {
        #[test]
        fn merged_ranges_are_strictly_separated(
            raw in proptest::collection::vec((0usize..200, 0usize..20), 0..40)
        ) {
            let mut v: Vec<Range> = raw.iter().map(|&(s, l)| r(s, s + l)).collect();
            v.sort_by_key(|x| x.start);
            let covered: Vec<usize> = (0..240).filter(|&i| v.iter().any(|x| x.contains(i))).collect();

            merge_ranges(&mut v).unwrap();

            prop_assert!(v.windows(2).all(|w| w[0].end < w[1].start));
            let after: Vec<usize> = (0..240).filter(|&i| v.iter().any(|x| x.contains(i))).collect();
            prop_assert_eq!(covered, after);
        }
    }
}
