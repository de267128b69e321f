//! Interruptible sorting algorithms.
//!
//! Every algorithm sorts a private working copy, reports settled elements through
//! [`SortControl::progress`] and calls [`SortControl::checkpoint`] inside its innermost loop,
//! so a pause or stop takes effect within one comparison/merge step.

mod bubble;
mod insertion;
mod merge;

pub use bubble::bubble_sort;
pub use insertion::insertion_sort;
pub use merge::merge_sort;

use crate::model::{Algorithm, Record, SortColumn, SortKey, SortOrder};
use thiserror::Error;

/// Returned instead of a sorted sequence when a run was stopped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("sort cancelled")]
pub struct Cancelled;

/// Hooks an algorithm drives while it runs.
pub trait SortControl {
    /// `processed` of `total` elements are settled.
    fn progress(&mut self, processed: usize, total: usize);

    /// Blocks while the run is paused. Returns `Err(Cancelled)` once a stop was requested.
    fn checkpoint(&mut self) -> Result<(), Cancelled>;
}

impl Algorithm {
    /// Run this algorithm over `data` without mutating it.
    pub fn sort<T, F, C>(self, data: &[T], is_less: &mut F, ctl: &mut C) -> Result<Vec<T>, Cancelled>
    where
        T: Clone,
        F: FnMut(&T, &T) -> bool,
        C: SortControl + ?Sized,
    {
        match self {
            Algorithm::Bubble => bubble_sort(data, is_less, ctl),
            Algorithm::Insertion => insertion_sort(data, is_less, ctl),
            Algorithm::Merge => merge_sort(data, is_less, ctl),
        }
    }
}

/// Sort records by `column`, extracting each key once.
///
/// The algorithm permutes indices into the memoised key table; the permutation is then
/// mapped back onto cloned records.
pub fn sort_records<C>(
    records: &[Record],
    algorithm: Algorithm,
    column: SortColumn,
    order: SortOrder,
    ctl: &mut C,
) -> Result<Vec<Record>, Cancelled>
where
    C: SortControl + ?Sized,
{
    let keys: Vec<SortKey> = records.iter().map(|r| column.key(r)).collect();
    let indices: Vec<usize> = (0..records.len()).collect();
    let mut is_less = |a: &usize, b: &usize| order.is_less(&keys[*a], &keys[*b]);

    let sorted = algorithm.sort(&indices, &mut is_less, ctl)?;
    Ok(sorted.into_iter().map(|i| records[i].clone()).collect())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{Cancelled, SortControl};

    /// Records progress and cancels after a fixed number of checkpoints.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub events: Vec<(usize, usize)>,
        pub checkpoints: usize,
        pub cancel_after: Option<usize>,
    }

    impl Recorder {
        pub(crate) fn cancelling_after(n: usize) -> Self {
            Self {
                cancel_after: Some(n),
                ..Default::default()
            }
        }
    }

    impl SortControl for Recorder {
        fn progress(&mut self, processed: usize, total: usize) {
            self.events.push((processed, total));
        }

        fn checkpoint(&mut self) -> Result<(), Cancelled> {
            self.checkpoints += 1;
            match self.cancel_after {
                Some(n) if self.checkpoints > n => Err(Cancelled),
                _ => Ok(()),
            }
        }
    }

    pub(crate) fn assert_monotonic_and_final(events: &[(usize, usize)], total: usize) {
        assert!(!events.is_empty(), "no progress emitted");
        assert!(
            events.windows(2).all(|w| w[0].0 <= w[1].0),
            "progress went backwards: {events:?}"
        );
        assert!(events.iter().all(|&(_, t)| t == total));
        assert_eq!(events.last(), Some(&(total, total)));
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Recorder;
    use super::*;

    fn people() -> Vec<Record> {
        vec![
            Record::new(3, "carol", "Young"),
            Record::new(1, "Alice", "smith"),
            Record::new(2, "bob", "Smith"),
            Record::new(4, "alice", "Adams"),
        ]
    }

    #[test]
    fn sort_records_by_each_column() {
        for algorithm in Algorithm::ALL {
            let mut rec = Recorder::default();
            let by_id = sort_records(&people(), algorithm, SortColumn::Id, SortOrder::Ascending, &mut rec)
                .unwrap();
            let ids: Vec<i64> = by_id.iter().map(|r| r.id).collect();
            assert_eq!(ids, vec![1, 2, 3, 4], "{algorithm}");

            let by_last = sort_records(
                &people(),
                algorithm,
                SortColumn::LastName,
                SortOrder::Descending,
                &mut rec,
            )
            .unwrap();
            assert_eq!(by_last[0].last_name, "Young");
            assert_eq!(by_last[3].last_name, "Adams");
        }
    }

    #[test]
    fn stable_algorithms_keep_case_insensitive_ties_in_input_order() {
        for algorithm in [Algorithm::Insertion, Algorithm::Merge] {
            let mut rec = Recorder::default();
            let sorted = sort_records(
                &people(),
                algorithm,
                SortColumn::FirstName,
                SortOrder::Ascending,
                &mut rec,
            )
            .unwrap();
            // "Alice" (id 1) precedes "alice" (id 4) in the input.
            assert_eq!(sorted[0].id, 1);
            assert_eq!(sorted[1].id, 4);
        }
    }

    #[test]
    fn input_is_left_untouched() {
        let input = people();
        let before = input.clone();
        let mut rec = Recorder::default();
        let _ = sort_records(&input, Algorithm::Bubble, SortColumn::Id, SortOrder::Ascending, &mut rec);
        assert_eq!(input, before);
    }
}
