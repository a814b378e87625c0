//! Deterministic result ordering
//!
//! Rows rank by a metric, largest first. Equal metrics fall back to the
//! row's zone-id key, ascending, so every ordering is total.

use std::cmp::Ordering;

/// Sorts aggregated rows before they become result rows
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts `rows` by `metric` descending, then `key` ascending.
    ///
    /// Float metrics compare with `total_cmp`, so NaN never makes the order
    /// depend on input position.
    pub fn rank_desc<T, K, M, F>(rows: &mut [T], metric: M, key: F)
    where
        K: Ord,
        M: Fn(&T) -> f64,
        F: Fn(&T) -> K,
    {
        rows.sort_by(|a, b| {
            Self::compare_metric(metric(a), metric(b))
                .reverse()
                .then_with(|| key(a).cmp(&key(b)))
        });
    }

    fn compare_metric(a: f64, b: f64) -> Ordering {
        a.total_cmp(&b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_descending() {
        let mut rows = vec![(1, 3.0), (2, 9.0), (3, 5.0)];
        ResultSorter::rank_desc(&mut rows, |r| r.1, |r| r.0);
        assert_eq!(rows, vec![(2, 9.0), (3, 5.0), (1, 3.0)]);
    }

    #[test]
    fn test_ties_break_by_key() {
        let mut rows = vec![((7, 2), 4.0), ((3, 9), 4.0), ((3, 1), 4.0)];
        ResultSorter::rank_desc(&mut rows, |r| r.1, |r| r.0);
        assert_eq!(rows, vec![((3, 1), 4.0), ((3, 9), 4.0), ((7, 2), 4.0)]);
    }

    #[test]
    fn test_order_independent_of_input() {
        let mut a = vec![(5, 1.0), (4, 1.0), (9, 2.0)];
        let mut b = vec![(9, 2.0), (4, 1.0), (5, 1.0)];
        ResultSorter::rank_desc(&mut a, |r| r.1, |r| r.0);
        ResultSorter::rank_desc(&mut b, |r| r.1, |r| r.0);
        assert_eq!(a, b);
    }
}
