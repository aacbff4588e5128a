use crate::hasher::DISPLAY_HASH_LENGTH;
use crate::model::{ArchiveSet, DuplicateGroup, Location, Tree, PRODUCTION_LABEL};
use std::collections::BTreeMap;

/// Group every comparable file in the corpus by digest.
///
/// Locations are collected production first, then archive versions in label
/// order, each tree in path order. Groups come out sorted by digest. Records
/// with an empty digest are skipped; zero-byte files are not.
pub fn find_duplicates(production: &Tree, archives: &ArchiveSet) -> Vec<DuplicateGroup> {
    let mut digest_to_locations: BTreeMap<&str, Vec<Location>> = BTreeMap::new();

    let sources = std::iter::once((PRODUCTION_LABEL, production))
        .chain(archives.iter().map(|(version, tree)| (version.as_str(), tree)));

    for (label, tree) in sources {
        for (path, record) in tree {
            if !record.is_comparable() {
                continue;
            }
            digest_to_locations
                .entry(record.digest.as_str())
                .or_default()
                .push(Location {
                    source: label.to_string(),
                    path: path.clone(),
                });
        }
    }

    digest_to_locations
        .into_iter()
        .filter(|(_, locations)| locations.len() > 1)
        .map(|(digest, locations)| DuplicateGroup {
            hash: digest.chars().take(DISPLAY_HASH_LENGTH).collect(),
            digest: digest.to_string(),
            locations,
        })
        .collect()
}
