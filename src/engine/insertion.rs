use super::{Cancelled, SortControl};

/// Shift-based insertion sort. Stable; one progress event per inserted element.
pub fn insertion_sort<T, F, C>(data: &[T], is_less: &mut F, ctl: &mut C) -> Result<Vec<T>, Cancelled>
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

    for i in 1..n {
        ctl.checkpoint()?;
        // Strict comparison stops at equal keys, which keeps the sort stable.
        let mut j = i;
        while j > 0 && is_less(&v[i], &v[j - 1]) {
            ctl.checkpoint()?;
            j -= 1;
        }
        v[j..=i].rotate_right(1);
        ctl.progress(i + 1, n);
    }
    Ok(v)
}
