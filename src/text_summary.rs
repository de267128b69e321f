//! Text summary builder for CLI output.
//!
//! Formats human-readable lines for completed runs, comparisons, history and progress.

use crate::model::RunResult;
use crate::orchestrator::{Comparison, ValueRun};
use std::time::Duration;

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

/// Summarise a completed run and preview its first `preview` records.
pub fn build_text_summary(result: &RunResult, preview: usize) -> TextSummary {
    let mut lines = Vec::new();

    lines.push(format!(
        "{} completed: {} records by {} ({})",
        result.algorithm,
        group_thousands(result.record_count),
        result.column,
        result.order.label()
    ));
    if let Some(source) = result.source.as_deref() {
        lines.push(format!("Source: {source}"));
    }
    lines.push(format!(
        "Total execution time: {:.4} s ({})",
        result.elapsed.as_secs_f64(),
        humantime::format_duration(round_micros(result.elapsed))
    ));

    let shown = preview.min(result.records.len());
    if shown > 0 {
        lines.push(String::new());
        lines.push(format!(
            "{:>6}  {:>10}  {:<20} {:<20}",
            "Rank", "ID", "First Name", "Last Name"
        ));
        for (i, r) in result.records.iter().take(shown).enumerate() {
            lines.push(format!(
                "{:>6}  {:>10}  {:<20} {:<20}",
                i + 1,
                r.id,
                r.first_name,
                r.last_name
            ));
        }
        if result.records.len() > shown {
            lines.push(format!(
                "        … {} more",
                group_thousands(result.records.len() - shown)
            ));
        }
    }

    TextSummary { lines }
}

/// Performance comparison table in algorithm order, followed by a line naming the fastest.
pub fn build_comparison_summary(cmp: &Comparison) -> TextSummary {
    let mut lines = vec![format!(
        "Comparing {} records by {} ({}), {} run(s) each",
        group_thousands(cmp.record_count),
        cmp.column,
        cmp.order.label(),
        cmp.repeat
    )];
    lines.push(format!(
        "{:<16} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Algorithm", "mean (s)", "median (s)", "p95 (s)", "min (s)", "max (s)"
    ));
    lines.push("-".repeat(16 + 5 * 13));
    for row in &cmp.rows {
        let t = &row.timing;
        lines.push(format!(
            "{:<16} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>12.6}",
            row.algorithm.label(),
            t.mean.as_secs_f64(),
            t.median.as_secs_f64(),
            t.p95.as_secs_f64(),
            t.min.as_secs_f64(),
            t.max.as_secs_f64()
        ));
    }
    if let Some(fastest) = cmp.fastest() {
        lines.push(format!(
            "Fastest algorithm: {} ({:.6} seconds)",
            fastest.algorithm,
            fastest.timing.mean.as_secs_f64()
        ));
    }
    TextSummary { lines }
}

/// Timings of integer sorts, then a preview of the sorted values of the first run.
pub fn build_values_summary(runs: &[ValueRun], preview: usize) -> TextSummary {
    let mut lines = Vec::new();
    for run in runs {
        let secs = run.elapsed.as_secs_f64();
        lines.push(format!(
            "{:<16} {} values ({})  {:.6} s ({:.3} ms)",
            run.algorithm.label(),
            group_thousands(run.count),
            run.order.label(),
            secs,
            secs * 1000.0
        ));
    }
    if runs.len() > 1 {
        if let Some(fastest) = runs.iter().min_by_key(|r| r.elapsed) {
            lines.push(format!(
                "Fastest algorithm: {} ({:.6} seconds)",
                fastest.algorithm,
                fastest.elapsed.as_secs_f64()
            ));
        }
    }

    if let Some(values) = runs.first().map(|r| &r.values).filter(|v| !v.is_empty()) {
        if preview > 0 {
            lines.push(String::new());
            if values.len() <= 2 * preview {
                lines.push(format!("Sorted: {values:?}"));
            } else {
                lines.push(format!("First {preview}: {:?}", &values[..preview]));
                lines.push(format!("Last {preview}: {:?}", &values[values.len() - preview..]));
            }
        }
    }
    TextSummary { lines }
}

/// One line per saved run, newest first.
pub fn build_history_summary(runs: &[RunResult]) -> TextSummary {
    if runs.is_empty() {
        return TextSummary {
            lines: vec!["No saved runs".into()],
        };
    }
    let lines = runs
        .iter()
        .map(|r| {
            format!(
                "{}  {:<15} {:<10} {:>10} records  {:.4} s",
                r.timestamp_utc,
                r.algorithm.label(),
                r.column.label(),
                group_thousands(r.record_count),
                r.elapsed.as_secs_f64()
            )
        })
        .collect();
    TextSummary { lines }
}

pub fn format_progress(processed: usize, total: usize, elapsed: Duration) -> String {
    format!(
        "Processing... {:.1}% | Elapsed: {:.2}s",
        percent(processed, total),
        elapsed.as_secs_f64()
    )
}

pub fn percent(processed: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        processed as f64 * 100.0 / total as f64
    }
}

fn round_micros(d: Duration) -> Duration {
    Duration::from_micros(d.as_micros() as u64)
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Algorithm, Record, SortColumn, SortOrder};

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn progress_line() {
        assert_eq!(
            format_progress(45, 100, Duration::from_millis(1234)),
            "Processing... 45.0% | Elapsed: 1.23s"
        );
        assert_eq!(percent(0, 0), 100.0);
    }

    #[test]
    fn comparison_keeps_algorithm_order_and_names_fastest_last() {
        let timing = |ms: u64| crate::metrics::TimingSummary {
            runs: 1,
            min: Duration::from_millis(ms),
            mean: Duration::from_millis(ms),
            median: Duration::from_millis(ms),
            p95: Duration::from_millis(ms),
            max: Duration::from_millis(ms),
        };
        let cmp = Comparison {
            column: SortColumn::Id,
            order: SortOrder::Ascending,
            record_count: 100,
            repeat: 1,
            rows: vec![
                crate::orchestrator::ComparisonRow {
                    algorithm: Algorithm::Bubble,
                    timing: timing(30),
                },
                crate::orchestrator::ComparisonRow {
                    algorithm: Algorithm::Insertion,
                    timing: timing(20),
                },
                crate::orchestrator::ComparisonRow {
                    algorithm: Algorithm::Merge,
                    timing: timing(5),
                },
            ],
        };
        let lines = build_comparison_summary(&cmp).lines;
        assert!(lines[3].starts_with("Bubble Sort"));
        assert!(lines[5].starts_with("Merge Sort"));
        assert_eq!(lines.last().unwrap(), "Fastest algorithm: Merge Sort (0.005000 seconds)");
    }

    #[test]
    fn values_summary_previews_head_and_tail() {
        let run = |algorithm, ms| ValueRun {
            algorithm,
            order: SortOrder::Descending,
            count: 6,
            elapsed: Duration::from_millis(ms),
            values: vec![6, 5, 4, 3, 2, 1],
        };
        let lines = build_values_summary(&[run(Algorithm::Bubble, 3), run(Algorithm::Merge, 1)], 2).lines;
        assert!(lines[0].starts_with("Bubble Sort"));
        assert_eq!(lines[2], "Fastest algorithm: Merge Sort (0.001000 seconds)");
        assert_eq!(lines[4], "First 2: [6, 5]");
        assert_eq!(lines[5], "Last 2: [2, 1]");

        let single = build_values_summary(&[run(Algorithm::Insertion, 1)], 10).lines;
        assert_eq!(single.last().unwrap(), "Sorted: [6, 5, 4, 3, 2, 1]");
    }

    #[test]
    fn summary_previews_top_rows() {
        let result = RunResult {
            timestamp_utc: "2026-01-01T00:00:00Z".into(),
            run_id: "abc".into(),
            algorithm: Algorithm::Merge,
            column: SortColumn::LastName,
            order: SortOrder::Ascending,
            record_count: 3,
            elapsed: Duration::from_millis(5),
            source: Some("people.csv".into()),
            records: vec![
                Record::new(2, "Ann", "Adams"),
                Record::new(1, "Bo", "Brown"),
                Record::new(3, "Cy", "Cole"),
            ],
        };
        let summary = build_text_summary(&result, 2);
        assert!(summary.lines[0].starts_with("Merge Sort completed: 3 records by LastName"));
        assert!(summary.lines.iter().any(|l| l.contains("Adams")));
        assert!(!summary.lines.iter().any(|l| l.contains("Cole")));
        assert_eq!(summary.lines.last().unwrap().trim(), "… 1 more");
    }
}
