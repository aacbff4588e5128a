use crate::analysis;
use crate::config::AppConfig;
use crate::error::Error;
use crate::model::{ArchiveSet, Tree, PRODUCTION_LABEL};
use crate::paths;
use crate::progress::ProgressReporter;
use crate::report::{self, AnalysisReport, ReportInputs, ReportPaths};
use crate::scanner::{self, Deadline, ExclusionRules, ScanOptions, ScanSource, ScannedTree};
use chrono::{SecondsFormat, Utc};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Inputs of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub production_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Stop scanning after this long. Trees not finished by then are left out
    /// of the analysis and listed as incomplete.
    pub deadline: Option<Duration>,
}

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub report: AnalysisReport,
    pub paths: ReportPaths,
    pub scan_duration: Duration,
    pub analysis_duration: Duration,
}

impl AnalysisOutcome {
    pub fn has_critical_findings(&self) -> bool {
        self.report.has_critical_findings()
    }
}

pub struct AnalysisEngine {
    config: AppConfig,
}

impl AnalysisEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the full pipeline and persist the report:
    /// 1. Parallel scan of production and every archive version
    /// 2. Duplicate detection and lineage tracing over the scanned trees
    /// 3. Completeness check against the production root
    /// 4. Write `report.json` and `report.md`
    pub fn run(
        &self,
        request: &AnalysisRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<AnalysisOutcome, Error> {
        let (report, scan_duration, analysis_duration) = self.analyze_timed(request, reporter)?;

        let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let paths = report::write_report(&report, &request.output_dir, &generated_at)?;
        reporter.on_report_written(&request.output_dir.to_string_lossy());
        info!("Reports saved to {}", request.output_dir.display());

        Ok(AnalysisOutcome {
            report,
            paths,
            scan_duration,
            analysis_duration,
        })
    }

    /// Scan and analyze without writing anything.
    pub fn analyze(
        &self,
        request: &AnalysisRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<AnalysisReport, Error> {
        self.analyze_timed(request, reporter).map(|(report, _, _)| report)
    }

    fn analyze_timed(
        &self,
        request: &AnalysisRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<(AnalysisReport, Duration, Duration), Error> {
        if paths::roots_overlap(&request.production_dir, &request.archive_dir) {
            warn!(
                "Production root {} and archive root {} overlap; shared files will be counted twice",
                request.production_dir.display(),
                request.archive_dir.display()
            );
        }

        let deadline = match request.deadline {
            Some(limit) => Deadline::after(limit),
            None => Deadline::none(),
        };

        let mut sources = vec![ScanSource::production(&request.production_dir)];
        sources.extend(scanner::discover_archive_versions(
            &request.archive_dir,
            &self.config.archive_versions,
        ));
        if sources.iter().skip(1).any(|s| s.label == PRODUCTION_LABEL) {
            warn!(
                "An archive version is named '{}'; its duplicate locations share the production label",
                PRODUCTION_LABEL
            );
        }
        info!(
            "Scanning production and {} archive versions...",
            sources.len() - 1
        );

        // Phase 1: Scan
        let scan_start = Instant::now();
        let scanned = self.scan_all(&sources, &deadline, reporter)?;
        let scan_duration = scan_start.elapsed();

        let (production, archives, incomplete_sources) = split_scanned(scanned);
        let total_files = production.len() + archives.values().map(|t| t.len()).sum::<usize>();
        reporter.on_scan_complete(total_files, scan_duration.as_secs_f64());
        debug!(
            "Scan completed in {:.2}s: {} files across {} trees",
            scan_duration.as_secs_f64(),
            total_files,
            archives.len() + 1,
        );
        if !incomplete_sources.is_empty() {
            warn!("Deadline expired; incomplete sources: {:?}", incomplete_sources);
        }

        // Phase 2: Analyze
        let analysis_start = Instant::now();
        info!("Analyzing duplicates and tracing file lineage...");
        let (duplicates, lineage) = rayon::join(
            || analysis::find_duplicates(&production, &archives),
            || analysis::trace_lineage(&production, &archives),
        );

        info!("Identifying missing components...");
        let missing = analysis::check_completeness(
            &request.production_dir,
            &self.config.expected_dirs,
            &self.config.expected_files,
        );
        reporter.on_analysis_complete(duplicates.len(), lineage.len());

        let report = report::build_report(ReportInputs {
            production: &production,
            archives: &archives,
            duplicates,
            lineage,
            missing,
            critical_markers: &self.config.critical_markers,
            duplicate_sample_limit: self.config.duplicate_sample_limit,
            lineage_sample_limit: self.config.lineage_sample_limit,
            incomplete_sources,
        });
        let analysis_duration = analysis_start.elapsed();
        debug!(
            "Analysis completed in {:.2}s: {} duplicate groups, {} files with lineage, {} missing",
            analysis_duration.as_secs_f64(),
            report.summary.duplicates_found,
            report.summary.files_with_lineage,
            report.summary.missing_components,
        );

        Ok((report, scan_duration, analysis_duration))
    }

    /// One task per tree on a pool capped at `max_workers`; results are only
    /// merged after every task has returned.
    fn scan_all(
        &self,
        sources: &[ScanSource],
        deadline: &Deadline,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<ScannedTree>, Error> {
        let options = ScanOptions {
            rules: ExclusionRules::new(&self.config.exclude_patterns, &self.config.ignore_globs),
            hash_buffer_size: self.config.hash_buffer_size,
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .thread_name(|i| format!("crossref-scan-{i}"))
            .build()?;

        reporter.on_scan_start(sources.len());
        let scanned = pool.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    let tree = scanner::scan_tree(source, &options, deadline);
                    reporter.on_tree_scanned(
                        &tree.label,
                        tree.tree.len(),
                        tree.duration.as_secs_f64(),
                    );
                    tree
                })
                .collect::<Vec<_>>()
        });

        Ok(scanned)
    }
}

/// Separate the production tree (always first) from the archive versions.
/// Trees cut short by the deadline contribute nothing but their label.
fn split_scanned(scanned: Vec<ScannedTree>) -> (Tree, ArchiveSet, Vec<String>) {
    let mut production = Tree::new();
    let mut archives = ArchiveSet::new();
    let mut incomplete = Vec::new();

    for (idx, scanned_tree) in scanned.into_iter().enumerate() {
        if !scanned_tree.complete {
            incomplete.push(scanned_tree.label);
        } else if idx == 0 {
            production = scanned_tree.tree;
        } else {
            archives.insert(scanned_tree.label, scanned_tree.tree);
        }
    }

    (production, archives, incomplete)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned(label: &str, files: &[&str], complete: bool) -> ScannedTree {
        let tree = files
            .iter()
            .map(|path| {
                (
                    path.to_string(),
                    crate::model::FileRecord {
                        path: path.to_string(),
                        name: paths::file_name(path).to_string(),
                        size_bytes: 0,
                        digest: "d".to_string(),
                        extension: String::new(),
                        modified_at: String::new(),
                    },
                )
            })
            .collect();
        ScannedTree {
            label: label.to_string(),
            tree,
            complete,
            entries_visited: 0,
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_split_keeps_only_complete_trees() {
        let (production, archives, incomplete) = split_scanned(vec![
            scanned(PRODUCTION_LABEL, &["a"], true),
            scanned("v1", &["a", "b"], true),
            scanned("v2", &["c"], false),
        ]);
        assert_eq!(production.len(), 1);
        assert_eq!(archives.len(), 1);
        assert_eq!(archives["v1"].len(), 2);
        assert_eq!(incomplete, vec!["v2"]);
    }

    #[test]
    fn test_archive_named_production_stays_an_archive() {
        let (production, archives, _) = split_scanned(vec![
            scanned(PRODUCTION_LABEL, &["a"], true),
            scanned(PRODUCTION_LABEL, &["x", "y"], true),
        ]);
        assert_eq!(production.len(), 1);
        assert_eq!(archives[PRODUCTION_LABEL].len(), 2);
    }
}
