//! Application-level orchestration.
//!
//! This module owns the execution controller and everything layered on top of it: the
//! command-driven session, algorithm comparison, plain integer sorts and post-run processing
//! such as exports and auto-save. UI/CLI layers call into this module to keep responsibilities
//! separated.

mod compare;
mod controller;
mod post_process;
mod session;
mod stopwatch;
mod values;

pub use compare::{run_comparison, Comparison, ComparisonRow};
pub use controller::SortController;
pub use post_process::{process_run_completion, ProcessedRun};
pub use session::{run_session, SessionOptions, UiCommand};
pub use stopwatch::Stopwatch;
pub use values::{compare_values, sort_values, ValueRun};
