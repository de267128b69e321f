use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Elapsed-time statistics over repeated runs of one algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingSummary {
    pub runs: u64,
    #[serde(with = "humantime_serde")]
    pub min: Duration,
    #[serde(with = "humantime_serde")]
    pub mean: Duration,
    #[serde(with = "humantime_serde")]
    pub median: Duration,
    #[serde(with = "humantime_serde")]
    pub p95: Duration,
    #[serde(with = "humantime_serde")]
    pub max: Duration,
}

/// Compute timing metrics (min, mean, max exactly; median and p95 from an HDR histogram with
/// three significant figures). `None` for an empty sample set.
pub fn compute_timing_metrics(samples: &[Duration]) -> Option<TimingSummary> {
    let (&first, rest) = samples.split_first()?;
    let mut hist = Histogram::<u64>::new(3).ok()?;
    let mut min = first;
    let mut max = first;
    let mut sum = Duration::ZERO;

    for &s in samples {
        hist.record(nanos(s)).ok()?;
        sum += s;
    }
    for &s in rest {
        min = min.min(s);
        max = max.max(s);
    }

    // Quantised percentiles may land just outside the exact range.
    let clamp = |d: Duration| d.clamp(min, max);
    Some(TimingSummary {
        runs: hist.len(),
        min,
        mean: sum / samples.len() as u32,
        median: clamp(Duration::from_nanos(hist.value_at_quantile(0.5))),
        p95: clamp(Duration::from_nanos(hist.value_at_quantile(0.95))),
        max,
    })
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
