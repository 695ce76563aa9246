use crate::allowlist::Allowlist;
use crate::constants::DEFAULT_SCAN_WORKERS;

/// Settings built once at startup and passed by reference into the engine.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Width of the directory-scan worker pool.
    pub workers: usize,
    pub allowlist: Allowlist,
}

impl SweepConfig {
    pub fn new(workers: usize, allowlist: Allowlist) -> Self {
        Self {
            workers: workers.max(1),
            allowlist,
        }
    }

    /// Default width plus the user's allowlist file.
    pub fn load(workers: Option<usize>) -> Self {
        Self::new(workers.unwrap_or(DEFAULT_SCAN_WORKERS), Allowlist::load())
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_WORKERS, Allowlist::default())
    }
}
