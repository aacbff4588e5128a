use crate::model::PRODUCTION_LABEL;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One root to scan and the label its files are reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSource {
    pub label: String,
    pub root: PathBuf,
}

impl ScanSource {
    pub fn production(root: &Path) -> Self {
        Self {
            label: PRODUCTION_LABEL.to_string(),
            root: root.to_path_buf(),
        }
    }

    pub fn archive(version: &str, root: &Path) -> Self {
        Self {
            label: version.to_string(),
            root: root.to_path_buf(),
        }
    }
}

/// Every immediate subdirectory of `archive_root` is one version, labeled by
/// its directory name and returned in label order. A missing archive root
/// yields no versions. `only` restricts the result when non-empty.
pub fn discover_archive_versions(archive_root: &Path, only: &[String]) -> Vec<ScanSource> {
    let entries = match fs::read_dir(archive_root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("Archive root {} does not exist", archive_root.display());
            return Vec::new();
        }
        Err(err) => {
            warn!(
                "Error reading archive root {}: {}",
                archive_root.display(),
                err
            );
            return Vec::new();
        }
    };

    let mut versions: Vec<ScanSource> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| {
            let label = entry.file_name().to_string_lossy().into_owned();
            ScanSource::archive(&label, &entry.path())
        })
        .filter(|source| only.is_empty() || only.contains(&source.label))
        .collect();

    versions.sort_by(|a, b| a.label.cmp(&b.label));
    versions
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_discovers_sorted_directories_only() {
        let dir = tempdir().unwrap();
        for version in ["v3", "v1", "v2"] {
            fs::create_dir_all(dir.path().join(version)).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "not a version").unwrap();

        let labels: Vec<String> = discover_archive_versions(dir.path(), &[])
            .into_iter()
            .map(|s| s.label)
            .collect();
        assert_eq!(labels, vec!["v1", "v2", "v3"]);
    }

    #[test]
    fn test_missing_archive_root_is_empty() {
        let dir = tempdir().unwrap();
        assert!(discover_archive_versions(&dir.path().join("archive"), &[]).is_empty());
    }

    #[test]
    fn test_allow_list() {
        let dir = tempdir().unwrap();
        for version in ["v1", "v2"] {
            fs::create_dir_all(dir.path().join(version)).unwrap();
        }
        let only = vec!["v2".to_string()];
        let sources = discover_archive_versions(dir.path(), &only);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].label, "v2");
    }
}
