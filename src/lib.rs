//! Interruptible sorting benchmark.
//!
//! Bubble, insertion and merge sort over person records, driven by an execution controller that
//! streams progress and supports pause, resume and stop at fine-grained checkpoints.

pub mod cli;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod orchestrator;
pub mod storage;
pub mod text_summary;

pub use error::{Result, SortError};
