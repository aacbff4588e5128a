use crate::model::{ArchiveSet, FileRecord, LineageEntry, LineageMap, Tree};
use ahash::AHashMap;

/// Trace each production file back through the archive versions by file name.
///
/// Matching is by `name` only, since files move between directories across
/// versions. Each version contributes at most one entry per production file;
/// when a version holds several files with that name, the smallest path wins.
/// Production files with no match anywhere get no key in the result.
/// Unreadable files (empty digest) take no part on either side.
pub fn trace_lineage(production: &Tree, archives: &ArchiveSet) -> LineageMap {
    let indexes: Vec<(&str, AHashMap<&str, &FileRecord>)> = archives
        .iter()
        .map(|(version, tree)| (version.as_str(), index_by_name(tree)))
        .collect();

    let mut lineage = LineageMap::new();
    for (prod_path, prod_record) in production {
        if !prod_record.is_comparable() {
            continue;
        }
        let entries: Vec<LineageEntry> = indexes
            .iter()
            .filter_map(|(version, index)| {
                index.get(prod_record.name.as_str()).map(|archived| LineageEntry {
                    version: version.to_string(),
                    path: archived.path.clone(),
                    hash_match: prod_record.digest == archived.digest,
                })
            })
            .collect();

        if !entries.is_empty() {
            lineage.insert(prod_path.clone(), entries);
        }
    }
    lineage
}

/// Name to record, keeping the first readable record per name in path order.
fn index_by_name(tree: &Tree) -> AHashMap<&str, &FileRecord> {
    let mut index: AHashMap<&str, &FileRecord> = AHashMap::with_capacity(tree.len());
    // Tree iterates in path order, so the first insert is the smallest path
    for record in tree.values().filter(|record| record.is_comparable()) {
        index.entry(record.name.as_str()).or_insert(record);
    }
    index
}
