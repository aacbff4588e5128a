pub mod completeness;
pub mod duplicates;
pub mod lineage;

pub use completeness::{check_completeness, critical_items, is_critical};
pub use duplicates::find_duplicates;
pub use lineage::trace_lineage;
