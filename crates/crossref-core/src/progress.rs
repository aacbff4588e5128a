/// Trait for reporting analysis progress.
///
/// The CLI implements it with indicatif; library callers and tests use
/// [`SilentReporter`]. Tree hooks are called from rayon worker threads.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self, _total_trees: usize) {}
    fn on_tree_scanned(&self, _label: &str, _files: usize, _duration_secs: f64) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_analysis_complete(&self, _duplicate_groups: usize, _files_with_lineage: usize) {}
    fn on_report_written(&self, _output_dir: &str) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
