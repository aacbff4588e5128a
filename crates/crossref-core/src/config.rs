use ::config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::Path;

const ENV_PREFIX: &str = "CROSSREF";
const LIST_KEYS: [&str; 6] = [
    "exclude_patterns",
    "ignore_globs",
    "expected_dirs",
    "expected_files",
    "critical_markers",
    "archive_versions",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Substrings that exclude a path (relative to its tree root) from scanning.
    pub exclude_patterns: Vec<String>,
    /// Extra glob patterns matched against the relative path.
    pub ignore_globs: Vec<String>,
    /// Directories expected directly under the production root.
    pub expected_dirs: Vec<String>,
    /// Files expected directly under the production root.
    pub expected_files: Vec<String>,
    /// A missing item whose descriptor contains any of these is critical.
    pub critical_markers: Vec<String>,
    /// Restrict analysis to these archive versions. Empty means every
    /// subdirectory of the archive root.
    pub archive_versions: Vec<String>,
    pub duplicate_sample_limit: usize,
    pub lineage_sample_limit: usize,
    /// Scan worker threads. 0 lets rayon pick.
    pub max_workers: usize,
    pub hash_buffer_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: to_strings(&[
                ".git",
                "__pycache__",
                ".pyc",
                "node_modules",
                "target/debug",
                "target/release",
                ".DS_Store",
            ]),
            ignore_globs: Vec::new(),
            expected_dirs: to_strings(&[
                "core/src",
                "services",
                "tests",
                "docs",
                "deploy",
                "security",
                "dashboards",
                "alerts",
                "slo",
            ]),
            expected_files: to_strings(&["Cargo.toml", "README.md", "CHANGELOG.md", ".todo"]),
            critical_markers: to_strings(&["core", "security"]),
            archive_versions: Vec::new(),
            duplicate_sample_limit: 50,
            lineage_sample_limit: 20,
            max_workers: 0,
            hash_buffer_size: 64 * 1024,
        }
    }
}

impl AppConfig {
    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Load configuration from `Config.toml` (optional) or an explicit file
/// (required), then `CROSSREF_*` environment variables, over built-in defaults.
pub fn load_configuration(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let file_source = match path {
        Some(path) => ConfigFile::from(path).required(true),
        None => ConfigFile::with_name("Config").required(false),
    };

    let mut env = Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(",");
    for key in LIST_KEYS {
        env = env.with_list_parse_key(key);
    }

    let builder = Config::builder()
        .add_source(file_source)
        .add_source(env)
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
