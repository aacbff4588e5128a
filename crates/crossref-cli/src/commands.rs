use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "crossref")]
#[command(
    about = "Cross-reference a production tree against archived versions",
    long_about = "Finds exact duplicates across production and archive trees, traces each \
                  production file's lineage through the archive versions, and checks the \
                  production root for expected components. Exits 1 when a critical component \
                  is missing, 2 when the analysis or report could not be completed."
)]
pub struct Cli {
    /// Current (production) tree to analyze
    #[arg(long, value_name = "DIR", required_unless_present = "print_config")]
    pub production_dir: Option<PathBuf>,

    /// Directory holding one subdirectory per archived version
    #[arg(long, value_name = "DIR", required_unless_present = "print_config")]
    pub archive_dir: Option<PathBuf>,

    /// Where report.json and report.md are written
    #[arg(long, value_name = "DIR", required_unless_present = "print_config")]
    pub output_dir: Option<PathBuf>,

    /// Configuration file (defaults to ./Config.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the number of scan worker threads
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Stop scanning after this many seconds and report what finished
    #[arg(long, value_name = "SECS")]
    pub deadline_secs: Option<u64>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}
