pub mod markdown;
pub mod writer;

pub use markdown::render_markdown;
pub use writer::{write_report, ReportPaths, REPORT_JSON, REPORT_MARKDOWN};

use crate::analysis;
use crate::model::{ArchiveSet, DuplicateGroup, LineageMap, MissingItem, Tree};
use serde::{Deserialize, Serialize};

/// Exact counts, independent of how much of each sample is embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub production_files: usize,
    pub archive_versions: usize,
    pub archive_files: usize,
    pub duplicates_found: usize,
    pub files_with_lineage: usize,
    pub missing_components: usize,
    #[serde(default)]
    pub unreadable_files: usize,
    #[serde(default)]
    pub lineage_content_matches: usize,
    #[serde(default)]
    pub incomplete: bool,
}

/// The structured report. Readers must tolerate fields they do not know, and
/// new fields are only ever added, so nothing here uses `deny_unknown_fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: ReportSummary,
    pub duplicates: Vec<DuplicateGroup>,
    pub lineage_sample: LineageMap,
    pub missing: Vec<String>,
    pub critical_missing: Vec<String>,
    #[serde(default)]
    pub incomplete_sources: Vec<String>,
}

impl AnalysisReport {
    /// True when any critical item is missing. Duplicates and non-critical
    /// missing items never set this.
    pub fn has_critical_findings(&self) -> bool {
        !self.critical_missing.is_empty()
    }

    pub fn to_json(&self) -> Result<String, crate::Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Everything the report is assembled from.
pub struct ReportInputs<'a> {
    pub production: &'a Tree,
    pub archives: &'a ArchiveSet,
    pub duplicates: Vec<DuplicateGroup>,
    pub lineage: LineageMap,
    pub missing: Vec<MissingItem>,
    pub critical_markers: &'a [String],
    pub duplicate_sample_limit: usize,
    pub lineage_sample_limit: usize,
    pub incomplete_sources: Vec<String>,
}

pub fn build_report(inputs: ReportInputs<'_>) -> AnalysisReport {
    let ReportInputs {
        production,
        archives,
        duplicates,
        lineage,
        missing,
        critical_markers,
        duplicate_sample_limit,
        lineage_sample_limit,
        mut incomplete_sources,
    } = inputs;

    let archive_files = archives.values().map(|tree| tree.len()).sum();
    let unreadable_files = std::iter::once(production)
        .chain(archives.values())
        .flat_map(|tree| tree.values())
        .filter(|record| !record.is_comparable())
        .count();
    let lineage_content_matches = lineage
        .values()
        .flatten()
        .filter(|entry| entry.hash_match)
        .count();
    incomplete_sources.sort();

    let summary = ReportSummary {
        production_files: production.len(),
        archive_versions: archives.len(),
        archive_files,
        duplicates_found: duplicates.len(),
        files_with_lineage: lineage.len(),
        missing_components: missing.len(),
        unreadable_files,
        lineage_content_matches,
        incomplete: !incomplete_sources.is_empty(),
    };

    let critical_missing = analysis::critical_items(&missing, critical_markers);

    AnalysisReport {
        summary,
        duplicates: duplicates.into_iter().take(duplicate_sample_limit).collect(),
        lineage_sample: lineage.into_iter().take(lineage_sample_limit).collect(),
        missing: missing.iter().map(MissingItem::descriptor).collect(),
        critical_missing,
        incomplete_sources,
    }
}
