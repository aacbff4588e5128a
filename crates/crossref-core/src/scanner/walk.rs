use super::{Deadline, ExclusionRules, ScanSource};
use crate::hasher;
use crate::model::{FileRecord, Tree};
use crate::paths;
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Settings shared by every tree scan in one run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub rules: ExclusionRules,
    pub hash_buffer_size: usize,
}

/// Result of scanning one root. `complete` is false when the deadline cut
/// the scan short; the tree then only holds what was hashed before that.
#[derive(Debug, Clone)]
pub struct ScannedTree {
    pub label: String,
    pub tree: Tree,
    pub complete: bool,
    /// Walk entries examined, directories included.
    pub entries_visited: usize,
    pub duration: Duration,
}

/// Walk `source.root`, prune excluded paths, then hash the remaining files in
/// parallel. A root that does not exist yields an empty, complete tree.
/// Symlinked directories are not descended into; a symlink that resolves to a
/// regular file is recorded under its own path and hashed through the link.
/// The deadline is checked per walk entry and per file hashed.
pub fn scan_tree(source: &ScanSource, options: &ScanOptions, deadline: &Deadline) -> ScannedTree {
    let start = Instant::now();
    let root = &source.root;

    if !root.is_dir() {
        debug!("Root {} for '{}' is absent, using empty tree", root.display(), source.label);
        return ScannedTree {
            label: source.label.clone(),
            tree: Tree::new(),
            complete: true,
            entries_visited: 0,
            duration: start.elapsed(),
        };
    }

    let mut walk_complete = true;
    let mut entries_visited = 0usize;
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| match paths::relative_slash_path(root, entry.path()) {
            Some(relative) => !options.rules.is_excluded(&relative),
            None => true,
        });

    for entry_result in walker {
        if deadline.expired() {
            walk_complete = false;
            break;
        }
        entries_visited += 1;

        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error walking {} for '{}': {}", root.display(), source.label, err);
                continue;
            }
        };
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        if let Some(relative) = paths::relative_slash_path(root, entry.path()) {
            files.push((relative, entry.into_path()));
        }
    }

    // Lossy path conversion can give two files the same key; sorting makes
    // the one that survives independent of directory order
    files.sort_by(|a, b| a.1.cmp(&b.1));

    let records: Vec<Option<FileRecord>> = files
        .par_iter()
        .map(|(relative, absolute)| {
            if deadline.expired() {
                return None;
            }
            let id = hasher::identify(absolute, options.hash_buffer_size);
            let name = paths::file_name(relative).to_string();
            Some(FileRecord {
                path: relative.clone(),
                extension: paths::extension_of(&name),
                name,
                size_bytes: id.size_bytes,
                digest: id.digest,
                modified_at: id.modified_at,
            })
        })
        .collect();

    let complete = walk_complete && records.iter().all(Option::is_some);
    let mut tree = Tree::new();
    for record in records.into_iter().flatten() {
        insert_record(&mut tree, record, &source.label);
    }

    let duration = start.elapsed();
    debug!(
        "Scanned '{}' in {:.2}s: {} files{}",
        source.label,
        duration.as_secs_f64(),
        tree.len(),
        if complete { "" } else { " (incomplete)" },
    );

    ScannedTree {
        label: source.label.clone(),
        tree,
        complete,
        entries_visited,
        duration,
    }
}

/// Insert unless the key is taken, which only happens when distinct
/// non-UTF-8 names collapse to the same lossy path. The first record stays.
fn insert_record(tree: &mut Tree, record: FileRecord, label: &str) -> bool {
    if tree.contains_key(&record.path) {
        warn!(
            "Path '{}' in '{}' collides with another file after name conversion; keeping the first",
            record.path, label
        );
        return false;
    }
    tree.insert(record.path.clone(), record);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::fs;
    use tempfile::tempdir;

    fn options() -> ScanOptions {
        let config = AppConfig::default();
        ScanOptions {
            rules: ExclusionRules::new(&config.exclude_patterns, &config.ignore_globs),
            hash_buffer_size: 1024,
        }
    }

    #[test]
    fn test_scan_builds_relative_records() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("core/src")).unwrap();
        fs::write(root.join("core/src/Lib.RS"), "fn main() {}").unwrap();
        fs::write(root.join("README.md"), "# readme").unwrap();

        let scanned = scan_tree(&ScanSource::production(root), &options(), &Deadline::none());
        assert!(scanned.complete);
        assert_eq!(scanned.tree.len(), 2);

        let record = &scanned.tree["core/src/Lib.RS"];
        assert_eq!(record.name, "Lib.RS");
        assert_eq!(record.extension, ".rs");
        assert_eq!(record.size_bytes, 12);
        assert_eq!(record.digest.len(), 64);
    }

    #[test]
    fn test_scan_prunes_excluded_paths() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join("target/release")).unwrap();
        fs::write(root.join(".git/objects/abc"), "blob").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "js").unwrap();
        fs::write(root.join("target/release/app"), "bin").unwrap();
        fs::write(root.join("mod.pyc"), "pyc").unwrap();
        fs::write(root.join("keep.py"), "py").unwrap();

        let scanned = scan_tree(&ScanSource::production(root), &options(), &Deadline::none());
        let paths: Vec<&String> = scanned.tree.keys().collect();
        assert_eq!(paths, vec!["keep.py"]);
    }

    #[test]
    fn test_scan_missing_root_is_empty_and_complete() {
        let dir = tempdir().unwrap();
        let source = ScanSource::archive("v1", &dir.path().join("missing"));
        let scanned = scan_tree(&source, &options(), &Deadline::none());
        assert!(scanned.complete);
        assert!(scanned.tree.is_empty());
        assert_eq!(scanned.label, "v1");
    }

    #[test]
    fn test_cancelled_deadline_stops_the_walk() {
        let dir = tempdir().unwrap();
        for i in 0..50 {
            let sub = dir.path().join(format!("d{i:02}"));
            fs::create_dir_all(&sub).unwrap();
            fs::write(sub.join("f.txt"), "x").unwrap();
        }

        let open = scan_tree(&ScanSource::production(dir.path()), &options(), &Deadline::none());
        // root + 50 directories + 50 files
        assert_eq!(open.entries_visited, 101);
        assert!(open.complete);

        let deadline = Deadline::none();
        deadline.cancel();
        let cut = scan_tree(&ScanSource::production(dir.path()), &options(), &deadline);
        assert_eq!(cut.entries_visited, 0);
        assert!(!cut.complete);
        assert!(cut.tree.is_empty());
    }

    #[test]
    fn test_insert_record_keeps_first_on_collision() {
        let record = |digest: &str| FileRecord {
            path: "caf\u{FFFD}.txt".to_string(),
            name: "caf\u{FFFD}.txt".to_string(),
            size_bytes: 1,
            digest: digest.to_string(),
            extension: ".txt".to_string(),
            modified_at: String::new(),
        };
        let mut tree = Tree::new();
        assert!(insert_record(&mut tree, record("first"), "v1"));
        assert!(!insert_record(&mut tree, record("second"), "v1"));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.values().next().unwrap().digest, "first");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_collapsing_to_one_key() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.txt")), "one").unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"caf\xff.txt")), "two").unwrap();

        let scanned = scan_tree(&ScanSource::production(dir.path()), &options(), &Deadline::none());
        assert_eq!(scanned.tree.len(), 1);
        // 0xE9 sorts before 0xFF, so that file is the one kept
        let kept = scanned.tree.values().next().unwrap();
        assert_eq!(kept.digest, blake3::hash(b"one").to_hex().to_string());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_recorded_but_directory_link_is_not_followed() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("real")).unwrap();
        fs::write(root.join("real/data.txt"), "payload").unwrap();
        symlink(root.join("real/data.txt"), root.join("alias.txt")).unwrap();
        symlink(root.join("real"), root.join("linked_dir")).unwrap();

        let scanned = scan_tree(&ScanSource::production(&root), &options(), &Deadline::none());
        let paths: Vec<&str> = scanned.tree.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["alias.txt", "real/data.txt"]);
        assert_eq!(
            scanned.tree["alias.txt"].digest,
            scanned.tree["real/data.txt"].digest
        );
    }

    #[test]
    fn test_expired_deadline_marks_tree_incomplete() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        let deadline = Deadline::none();
        deadline.cancel();
        let scanned = scan_tree(&ScanSource::production(dir.path()), &options(), &deadline);
        assert!(!scanned.complete);
        assert!(scanned.tree.is_empty());
    }
}
