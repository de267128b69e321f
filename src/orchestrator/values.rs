//! Plain integer datasets, sorted directly through the algorithm library.
//!
//! No controller is involved: the caller runs [`sort_values`] on a blocking thread and may
//! interrupt it through the shared `cancel` flag.

use crate::engine::{Cancelled, SortControl};
use crate::model::{Algorithm, SortEvent, SortOrder};
use crate::orchestrator::stopwatch::Stopwatch;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRun {
    pub algorithm: Algorithm,
    pub order: SortOrder,
    pub count: usize,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<i64>,
}

struct ValueControl<'a> {
    cancel: &'a AtomicBool,
    progress: Option<&'a UnboundedSender<SortEvent>>,
    stopwatch: Stopwatch,
}

impl SortControl for ValueControl<'_> {
    fn progress(&mut self, processed: usize, total: usize) {
        if let Some(tx) = self.progress {
            let _ = tx.send(SortEvent::Progress {
                processed,
                total,
                elapsed: self.stopwatch.elapsed(),
            });
        }
    }

    fn checkpoint(&mut self) -> Result<(), Cancelled> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(Cancelled);
        }
        Ok(())
    }
}

/// Sort `values` with `algorithm`, timing the call. Blocks until done or `cancel` is raised.
pub fn sort_values(
    values: &[i64],
    algorithm: Algorithm,
    order: SortOrder,
    cancel: &AtomicBool,
    progress: Option<&UnboundedSender<SortEvent>>,
) -> Result<ValueRun, Cancelled> {
    let mut ctl = ValueControl {
        cancel,
        progress,
        stopwatch: Stopwatch::start(),
    };
    let sorted = algorithm.sort(values, &mut |a: &i64, b: &i64| order.is_less(a, b), &mut ctl)?;
    Ok(ValueRun {
        algorithm,
        order,
        count: values.len(),
        elapsed: ctl.stopwatch.elapsed(),
        values: sorted,
    })
}

/// Sort the same values with each algorithm in turn.
pub fn compare_values(
    values: &[i64],
    algorithms: &[Algorithm],
    order: SortOrder,
    cancel: &AtomicBool,
    progress: Option<&UnboundedSender<SortEvent>>,
) -> Result<Vec<ValueRun>, Cancelled> {
    algorithms
        .iter()
        .map(|&algorithm| sort_values(values, algorithm, order, cancel, progress))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const SAMPLE: [i64; 7] = [64, 34, 25, 12, 22, 11, 90];

    #[test]
    fn sorts_descending_like_the_lab_example() {
        let cancel = AtomicBool::new(false);
        let runs =
            compare_values(&SAMPLE, &Algorithm::ALL, SortOrder::Descending, &cancel, None).unwrap();
        assert_eq!(runs.len(), 3);
        for run in &runs {
            assert_eq!(run.values, vec![90, 64, 34, 25, 22, 12, 11], "{}", run.algorithm);
            assert_eq!(run.count, 7);
        }
    }

    #[test]
    fn reports_final_progress() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = AtomicBool::new(false);
        sort_values(&SAMPLE, Algorithm::Merge, SortOrder::Ascending, &cancel, Some(&tx)).unwrap();

        let mut last = None;
        while let Ok(SortEvent::Progress { processed, total, .. }) = rx.try_recv() {
            last = Some((processed, total));
        }
        assert_eq!(last, Some((7, 7)));
    }

    #[test]
    fn raised_flag_cancels() {
        let cancel = AtomicBool::new(true);
        for algorithm in Algorithm::ALL {
            assert_eq!(
                sort_values(&SAMPLE, algorithm, SortOrder::Ascending, &cancel, None).unwrap_err(),
                Cancelled
            );
        }
    }
}
