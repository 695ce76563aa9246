use crate::error::CleanError;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// One catalog location eligible for scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub label: String,
    /// Empty when the environment variable it derives from is unset.
    pub path: PathBuf,
}

impl Target {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }

    /// A target is scannable only when its path is non-empty and is a directory right now.
    pub fn is_scannable(&self) -> bool {
        !self.path.as_os_str().is_empty() && self.path.is_dir()
    }
}

/// File count and byte total for one directory tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirStats {
    pub file_count: u64,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub label: String,
    pub path: PathBuf,
    pub file_count: u64,
    /// Measured for directories; an estimate for the registry pseudo-target.
    pub size_bytes: u64,
    pub size_human: String,
    pub details: Option<Vec<String>>,
}

impl ScanResult {
    pub fn is_estimate(&self) -> bool {
        self.details.is_some()
    }
}

/// Scan results keyed by label. Keyed storage keeps the merge order-independent.
pub type ScanResults = BTreeMap<String, ScanResult>;

/// Which labels the user ticked after seeing the scan results.
pub type Selection = HashMap<String, bool>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    pub label: String,
    pub completed: usize,
    pub total: usize,
}

/// Outcome of one delete invocation.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub bytes_freed: u64,
    pub registry_entries_removed: usize,
    /// Target-level failures surfaced to the presentation layer.
    pub errors: Vec<CleanError>,
}

impl DeleteReport {
    pub fn permission_denied(&self) -> impl Iterator<Item = &CleanError> {
        self.errors
            .iter()
            .filter(|e| matches!(e, CleanError::PermissionDenied { .. }))
    }
}
