//! Post-run processing utilities.
//!
//! Handles auto-save and exports after a run completes, without failing the session.

use crate::cli::Cli;
use crate::model::RunResult;
use crate::storage;

/// Result of post-run processing, ready for presentation layers.
pub struct ProcessedRun {
    pub export_messages: Vec<String>,
    pub auto_saved_path: Option<std::path::PathBuf>,
}

/// Process a completed run: auto-save its summary and write the requested exports.
/// Failures are reported as messages rather than errors.
pub fn process_run_completion(args: &Cli, run: &RunResult) -> ProcessedRun {
    let auto_saved_path = if args.auto_save {
        storage::save_run(run).ok()
    } else {
        None
    };

    let mut export_messages = Vec::new();
    if let Some(export_path) = args.export_json.as_deref() {
        match storage::export_json(export_path, run) {
            Ok(_) => export_messages.push(format!("Exported JSON: {}", export_path.display())),
            Err(e) => export_messages.push(format!("Export JSON failed: {e:#}")),
        }
    }
    if let Some(export_path) = args.export_csv.as_deref() {
        match storage::export_csv(export_path, run) {
            Ok(_) => export_messages.push(format!("Exported CSV: {}", export_path.display())),
            Err(e) => export_messages.push(format!("Export CSV failed: {e:#}")),
        }
    }

    ProcessedRun {
        export_messages,
        auto_saved_path,
    }
}
