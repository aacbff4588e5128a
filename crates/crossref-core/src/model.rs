use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Source label of the current tree in duplicate locations.
pub const PRODUCTION_LABEL: &str = "production";

/// One scanned file. `digest` is empty when the content could not be read;
/// such records are never compared with anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub name: String,
    pub size_bytes: u64,
    pub digest: String,
    pub extension: String,
    pub modified_at: String,
}

impl FileRecord {
    pub fn is_comparable(&self) -> bool {
        !self.digest.is_empty()
    }
}

/// Files under one scanned root, keyed by slash-normalized relative path.
pub type Tree = BTreeMap<String, FileRecord>;

/// Archive trees keyed by version label. Iteration is label-sorted.
pub type ArchiveSet = BTreeMap<String, Tree>;

/// A `(source_label, path)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub source: String,
    pub path: String,
}

/// Every location sharing one digest. Always holds at least two locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// 16-character display prefix of the digest.
    pub hash: String,
    pub digest: String,
    pub locations: Vec<Location>,
}

/// A same-named file found in one archive version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageEntry {
    pub version: String,
    pub path: String,
    pub hash_match: bool,
}

/// Production path to its lineage entries, in version order. Production files
/// with no same-named archive file have no key at all.
pub type LineageMap = BTreeMap<String, Vec<LineageEntry>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingKind {
    Directory,
    File,
}

/// An expected path absent from the production root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingItem {
    pub kind: MissingKind,
    pub name: String,
}

impl MissingItem {
    pub fn descriptor(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MissingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MissingKind::Directory => write!(f, "directory: {}", self.name),
            MissingKind::File => write!(f, "file: {}", self.name),
        }
    }
}
