use super::{render_markdown, AnalysisReport};
use crate::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error};

pub const REPORT_JSON: &str = "report.json";
pub const REPORT_MARKDOWN: &str = "report.md";

#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

/// Persist `report.json` and `report.md` into `output_dir`, creating it if
/// needed.
///
/// Both artifacts are fully written and synced to temp files before either
/// is renamed into place, and the JSON is renamed last. Any failure removes
/// the temp files and returns [`Error::ReportWrite`]. If the JSON cannot be
/// put in place, the new `report.md` and any earlier `report.json` are removed
/// as well, so the directory never pairs this run's summary with an older
/// verdict.
pub fn write_report(
    report: &AnalysisReport,
    output_dir: &Path,
    generated_at: &str,
) -> Result<ReportPaths, Error> {
    fs::create_dir_all(output_dir).map_err(|source| Error::ReportWrite {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let paths = ReportPaths {
        json: output_dir.join(REPORT_JSON),
        markdown: output_dir.join(REPORT_MARKDOWN),
    };

    let json = report.to_json()?;
    let markdown = render_markdown(report, generated_at);

    let result = StagedArtifact::stage(&paths.markdown, markdown.as_bytes()).and_then(|md| {
        let json = StagedArtifact::stage(&paths.json, json.as_bytes())?;
        md.commit()?;
        json.commit().map_err(|e| {
            let _ = fs::remove_file(&paths.markdown);
            let _ = fs::remove_file(&paths.json);
            e
        })
    });

    if let Err(e) = &result {
        error!("Report write failed: {}", e);
    }
    result?;

    debug!("Wrote {} and {}", paths.json.display(), paths.markdown.display());
    Ok(paths)
}

/// A fully written temp file waiting to be renamed over its target. Dropping
/// it without committing removes the temp file.
struct StagedArtifact {
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedArtifact {
    fn stage(target: &Path, contents: &[u8]) -> Result<Self, Error> {
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = target.with_file_name(format!(".{}.{}.tmp", file_name, process::id()));

        let staged = Self {
            temp,
            target: target.to_path_buf(),
            committed: false,
        };

        {
            let mut file = File::create(&staged.temp).map_err(|e| staged.write_error(e))?;
            file.write_all(contents).map_err(|e| staged.write_error(e))?;
            file.flush().map_err(|e| staged.write_error(e))?;
            file.sync_all().map_err(|e| staged.write_error(e))?;
        }

        Ok(staged)
    }

    fn commit(mut self) -> Result<(), Error> {
        fs::rename(&self.temp, &self.target).map_err(|e| self.write_error(e))?;
        self.committed = true;
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> Error {
        Error::ReportWrite {
            path: self.target.clone(),
            source,
        }
    }
}

impl Drop for StagedArtifact {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineageMap;
    use crate::report::ReportSummary;
    use tempfile::tempdir;

    fn report() -> AnalysisReport {
        AnalysisReport {
            summary: ReportSummary {
                production_files: 0,
                archive_versions: 0,
                archive_files: 0,
                duplicates_found: 0,
                files_with_lineage: 0,
                missing_components: 0,
                unreadable_files: 0,
                lineage_content_matches: 0,
                incomplete: false,
            },
            duplicates: Vec::new(),
            lineage_sample: LineageMap::new(),
            missing: Vec::new(),
            critical_missing: Vec::new(),
            incomplete_sources: Vec::new(),
        }
    }

    #[test]
    fn test_writes_both_artifacts_in_nested_dir() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("reports/run1");

        let paths = write_report(&report(), &out, "t").unwrap();
        let json = fs::read_to_string(&paths.json).unwrap();
        assert_eq!(AnalysisReport::from_json(&json).unwrap(), report());
        assert!(fs::read_to_string(&paths.markdown).unwrap().contains("**Generated:** t"));

        let leftovers: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_output_dir_blocked_by_file_is_write_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("out");
        fs::write(&blocker, "not a directory").unwrap();

        let err = write_report(&report(), &blocker, "t").unwrap_err();
        assert!(matches!(err, Error::ReportWrite { .. }));
    }

    #[test]
    fn test_failed_json_commit_rolls_back_markdown() {
        let dir = tempdir().unwrap();
        // A directory where report.json should go makes the final rename fail
        fs::create_dir_all(dir.path().join(REPORT_JSON).join("occupied")).unwrap();

        let err = write_report(&report(), dir.path(), "t").unwrap_err();
        assert!(matches!(err, Error::ReportWrite { .. }));
        assert!(!dir.path().join(REPORT_MARKDOWN).exists());

        let temps: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(temps.is_empty());
    }

    #[test]
    fn test_rewrite_replaces_previous_artifacts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(REPORT_JSON), "{\"stale\": true}").unwrap();
        fs::write(dir.path().join(REPORT_MARKDOWN), "stale").unwrap();

        let mut critical = report();
        critical.critical_missing = vec!["directory: security".to_string()];
        let paths = write_report(&critical, dir.path(), "t").unwrap();

        let json = fs::read_to_string(&paths.json).unwrap();
        assert!(AnalysisReport::from_json(&json).unwrap().has_critical_findings());
        assert!(fs::read_to_string(&paths.markdown).unwrap().contains("directory: security"));
    }
}
