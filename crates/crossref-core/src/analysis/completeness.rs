use crate::model::{MissingItem, MissingKind};
use std::path::Path;

/// Check each expected entry directly under `root`. Entries are joined onto the
/// root as given, so `core/src` means that exact nested path, not a search.
/// Directories are reported before files, each in the order given.
pub fn check_completeness(
    root: &Path,
    expected_dirs: &[String],
    expected_files: &[String],
) -> Vec<MissingItem> {
    let dirs = expected_dirs.iter().map(|name| (MissingKind::Directory, name));
    let files = expected_files.iter().map(|name| (MissingKind::File, name));

    dirs.chain(files)
        .filter(|(_, name)| !root.join(name.as_str()).exists())
        .map(|(kind, name)| MissingItem {
            kind,
            name: name.clone(),
        })
        .collect()
}

/// A descriptor is critical when it contains any marker substring.
pub fn is_critical(descriptor: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .any(|marker| !marker.is_empty() && descriptor.contains(marker.as_str()))
}

/// Descriptors of the critical subset, in input order.
pub fn critical_items(missing: &[MissingItem], markers: &[String]) -> Vec<String> {
    missing
        .iter()
        .map(MissingItem::descriptor)
        .filter(|descriptor| is_critical(descriptor, markers))
        .collect()
}
