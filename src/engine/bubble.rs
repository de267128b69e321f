use super::{Cancelled, SortControl};

/// Adjacent-swap bubble sort.
///
/// Always runs all `n - 1` passes (no early exit when a pass makes no swap), so it serves as a
/// worst-case stress benchmark. Progress is one event per completed pass plus a final `(n, n)`.
/// Stability on equal keys is incidental.
pub fn bubble_sort<T, F, C>(data: &[T], is_less: &mut F, ctl: &mut C) -> Result<Vec<T>, Cancelled>
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

    for pass in 0..n - 1 {
        for j in 0..n - 1 - pass {
            ctl.checkpoint()?;
            if is_less(&v[j + 1], &v[j]) {
                v.swap(j, j + 1);
            }
        }
        ctl.progress(pass + 1, n);
    }
    ctl.progress(n, n);
    Ok(v)
}
