//! Finds reclaimable space in well-known Windows junk locations and orphaned
//! per-user uninstall entries, then removes what the user selects.

pub mod allowlist;
pub mod catalog;
pub mod cleaner;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod format;
pub mod model;
pub mod registry;
pub mod scanner;
pub mod ui;

pub use config::SweepConfig;
pub use engine::Sweeper;
pub use error::CleanError;
pub use model::{DeleteReport, ScanResult, ScanResults, Selection, Target};
