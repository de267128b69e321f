use super::{Cancelled, SortControl};

/// Number of progress updates a large merge sort aims for.
const PROGRESS_UPDATES: usize = 100;

/// Top-down recursive merge sort. Stable.
///
/// Progress counts elements that reached a leaf (length <= 1). Emission is throttled to every
/// `max(1, n / 100)` completed elements, followed by a forced `(n, n)` once the sort is done.
pub fn merge_sort<T, F, C>(data: &[T], is_less: &mut F, ctl: &mut C) -> Result<Vec<T>, Cancelled>
where
    T: Clone,
    F: FnMut(&T, &T) -> bool,
    C: SortControl + ?Sized,
{
    let mut v = data.to_vec();
    let n = v.len();
    if n <= 1 {
        ctl.progress(n, n);
        return Ok(v);
    }

    let mut run = MergeRun {
        is_less,
        ctl: &mut *ctl,
        completed: 0,
        total: n,
        interval: (n / PROGRESS_UPDATES).max(1),
    };
    let mut buf = Vec::with_capacity(n / 2);
    run.sort(&mut v, &mut buf)?;

    ctl.progress(n, n);
    Ok(v)
}

struct MergeRun<'a, F, C: ?Sized> {
    is_less: &'a mut F,
    ctl: &'a mut C,
    completed: usize,
    total: usize,
    interval: usize,
}

impl<F, C: SortControl + ?Sized> MergeRun<'_, F, C> {
    fn sort<T: Clone>(&mut self, v: &mut [T], buf: &mut Vec<T>) -> Result<(), Cancelled>
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.ctl.checkpoint()?;
        if v.len() <= 1 {
            self.completed += v.len();
            if self.completed % self.interval == 0 {
                self.ctl.progress(self.completed, self.total);
            }
            return Ok(());
        }

        let mid = v.len() / 2;
        self.sort(&mut v[..mid], buf)?;
        self.sort(&mut v[mid..], buf)?;
        self.merge(v, mid, buf)
    }

    /// Merge the sorted halves `v[..mid]` and `v[mid..]` in place, using `buf` for the left run.
    fn merge<T: Clone>(&mut self, v: &mut [T], mid: usize, buf: &mut Vec<T>) -> Result<(), Cancelled>
    where
        F: FnMut(&T, &T) -> bool,
    {
        buf.clear();
        buf.extend_from_slice(&v[..mid]);

        let (mut i, mut j, mut out) = (0, mid, 0);
        while i < buf.len() && j < v.len() {
            self.ctl.checkpoint()?;
            // Left wins ties.
            if (self.is_less)(&v[j], &buf[i]) {
                v[out] = v[j].clone();
                j += 1;
            } else {
                v[out] = buf[i].clone();
                i += 1;
            }
            out += 1;
        }

        // Any right-hand tail is already in place.
        if i < buf.len() {
            self.ctl.checkpoint()?;
            v[out..out + buf.len() - i].clone_from_slice(&buf[i..]);
        }
        Ok(())
    }
}
