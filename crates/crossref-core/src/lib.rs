pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod model;
pub mod paths;
pub mod progress;
pub mod report;
pub mod scanner;

pub use crate::config::AppConfig;
pub use engine::{AnalysisEngine, AnalysisOutcome, AnalysisRequest};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use report::AnalysisReport;
