use glob::Pattern;
use tracing::error;

/// Path exclusion applied before any file is opened.
///
/// `substrings` match anywhere in the slash-normalized relative path, so
/// `.git` drops the whole `.git/` subtree and `.pyc` drops compiled files.
/// `globs` are matched against the same relative path.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    substrings: Vec<String>,
    globs: Vec<Pattern>,
}

impl ExclusionRules {
    pub fn new(substrings: &[String], ignore_globs: &[String]) -> Self {
        let globs = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Self {
            substrings: substrings
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect(),
            globs,
        }
    }

    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.substrings
            .iter()
            .any(|pattern| relative_path.contains(pattern.as_str()))
            || self
                .globs
                .iter()
                .any(|pattern| pattern.matches(relative_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn default_rules() -> ExclusionRules {
        let config = AppConfig::default();
        ExclusionRules::new(&config.exclude_patterns, &config.ignore_globs)
    }

    #[test]
    fn test_default_exclusions() {
        let rules = default_rules();
        assert!(rules.is_excluded(".git/HEAD"));
        assert!(rules.is_excluded("pkg/__pycache__/mod.cpython-311.pyc"));
        assert!(rules.is_excluded("web/node_modules/left-pad/index.js"));
        assert!(rules.is_excluded("target/debug/build.log"));
        assert!(rules.is_excluded("assets/.DS_Store"));
        assert!(!rules.is_excluded("target/doc/index.html"));
        assert!(!rules.is_excluded("src/main.rs"));
    }

    #[test]
    fn test_globs_and_invalid_globs() {
        let rules = ExclusionRules::new(&[], &["*.log".to_string(), "[".to_string()]);
        assert!(rules.is_excluded("logs/run.log"));
        assert!(!rules.is_excluded("logs/run.txt"));
    }

    #[test]
    fn test_empty_substring_is_ignored() {
        let rules = ExclusionRules::new(&[String::new()], &[]);
        assert!(!rules.is_excluded("anything"));
    }
}
