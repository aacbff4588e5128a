pub mod exclude;
pub mod sources;
pub mod walk;

pub use exclude::ExclusionRules;
pub use sources::{discover_archive_versions, ScanSource};
pub use walk::{scan_tree, ScanOptions, ScannedTree};

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Caller-supplied cut-off for scanning. Once expired it stays expired, so
/// every worker sees the same answer.
#[derive(Debug, Default)]
pub struct Deadline {
    at: Option<Instant>,
    tripped: AtomicBool,
}

impl Deadline {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn after(duration: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(duration),
            tripped: AtomicBool::new(false),
        }
    }

    /// Expire immediately.
    pub fn cancel(&self) {
        self.tripped.store(true, Ordering::SeqCst);
    }

    pub fn expired(&self) -> bool {
        if self.tripped.load(Ordering::SeqCst) {
            return true;
        }
        match self.at {
            Some(at) if Instant::now() >= at => {
                self.tripped.store(true, Ordering::SeqCst);
                true
            }
            _ => false,
        }
    }
}
