use crossref_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// CLI progress reporter using an indicatif bar over the scanned trees.
/// Tree callbacks arrive from the scan pool, hence the lock.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self, total_trees: usize) {
        let pb = ProgressBar::new(total_trees as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Scanning [{bar:30.cyan/dim}] {pos}/{len} trees {msg}",
        ) {
            pb.set_style(
                style
                    .progress_chars("━╸─")
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
            );
        }
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.replace(pb) {
                old.finish_and_clear();
            }
        }
    }

    fn on_tree_scanned(&self, label: &str, files: usize, _duration_secs: f64) {
        self.with_bar(|pb| {
            pb.set_message(format!("{} ({} files)", label, files));
            pb.inc(1);
        });
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files in {:.2}s",
            total_files, duration_secs
        );
    }

    fn on_analysis_complete(&self, duplicate_groups: usize, files_with_lineage: usize) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m Analysis complete: {} duplicate groups, {} files with lineage",
            duplicate_groups, files_with_lineage
        );
    }

    fn on_report_written(&self, output_dir: &str) {
        eprintln!("  \x1b[32m✓\x1b[0m Reports saved to {}", output_dir);
    }
}
