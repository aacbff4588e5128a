use super::AnalysisReport;
use std::fmt::Write as _;

/// Render the human-readable summary. Derived purely from `report`; the
/// `generated_at` stamp is the only input that is not in the JSON.
pub fn render_markdown(report: &AnalysisReport, generated_at: &str) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "# Cross-Reference Analysis Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "**Generated:** {}", generated_at);
    let _ = writeln!(out);

    if summary.incomplete {
        let _ = writeln!(
            out,
            "> **Incomplete scan:** the deadline expired before these sources finished: {}",
            report.incomplete_sources.join(", ")
        );
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Production files: {}", summary.production_files);
    let _ = writeln!(out, "- Archive versions: {}", summary.archive_versions);
    let _ = writeln!(out, "- Archive files: {}", summary.archive_files);
    let _ = writeln!(out, "- Duplicates found: {}", summary.duplicates_found);
    let _ = writeln!(out, "- Files with lineage: {}", summary.files_with_lineage);
    let _ = writeln!(out, "- Lineage content matches: {}", summary.lineage_content_matches);
    let _ = writeln!(out, "- Unreadable files: {}", summary.unreadable_files);
    let _ = writeln!(out, "- Missing components: {}", summary.missing_components);
    let _ = writeln!(out);

    let _ = writeln!(out, "## Critical Findings");
    let _ = writeln!(out);
    if report.critical_missing.is_empty() {
        let _ = writeln!(out, "*No critical findings*");
    } else {
        for item in &report.critical_missing {
            let _ = writeln!(out, "- {}", item);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Missing Components");
    let _ = writeln!(out);
    if report.missing.is_empty() {
        let _ = writeln!(out, "*No missing components*");
    } else {
        for item in &report.missing {
            let _ = writeln!(out, "- {}", item);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Duplicates");
    let _ = writeln!(out);
    if report.duplicates.is_empty() {
        let _ = writeln!(out, "*No duplicates*");
    } else {
        if report.duplicates.len() < summary.duplicates_found {
            let _ = writeln!(
                out,
                "Showing {} of {} groups.",
                report.duplicates.len(),
                summary.duplicates_found
            );
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "| Hash | Locations |");
        let _ = writeln!(out, "|------|-----------|");
        for group in &report.duplicates {
            let locations: Vec<String> = group
                .locations
                .iter()
                .map(|l| format!("`{}:{}`", l.source, l.path))
                .collect();
            let _ = writeln!(out, "| `{}` | {} |", group.hash, locations.join("<br>"));
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Lineage Sample");
    let _ = writeln!(out);
    if report.lineage_sample.is_empty() {
        let _ = writeln!(out, "*No lineage found*");
    } else {
        for (path, entries) in &report.lineage_sample {
            let _ = writeln!(out, "- `{}`", path);
            for entry in entries {
                let marker = if entry.hash_match { "identical" } else { "changed" };
                let _ = writeln!(out, "  - {}: `{}` ({})", entry.version, entry.path, marker);
            }
        }
    }

    out
}
