//! Entry points used by the presentation layer.

use crate::catalog;
use crate::cleaner::{DeletionEngine, MarkerFileProbe, PermissionProbe};
use crate::config::SweepConfig;
use crate::model::{DeleteReport, ScanProgress, ScanResults, Selection, Target};
use crate::registry::ConfigStore;
use crate::scanner::ScanCoordinator;
use std::collections::HashSet;

pub struct Sweeper<'a> {
    config: &'a SweepConfig,
    store: &'a dyn ConfigStore,
    probe: &'a dyn PermissionProbe,
}

impl<'a> Sweeper<'a> {
    pub fn new(config: &'a SweepConfig, store: &'a dyn ConfigStore) -> Self {
        Self {
            config,
            store,
            probe: &MarkerFileProbe,
        }
    }

    pub fn with_probe(mut self, probe: &'a dyn PermissionProbe) -> Self {
        self.probe = probe;
        self
    }

    /// The catalog as the environment resolves it right now.
    pub fn enumerate_targets(&self) -> Vec<Target> {
        catalog::resolve()
    }

    /// Scans the catalog targets whose labels are in `selected`, plus the registry.
    pub fn scan(
        &self,
        selected: &HashSet<String>,
        progress_cb: Option<&dyn Fn(ScanProgress)>,
    ) -> ScanResults {
        let targets: Vec<Target> = self
            .enumerate_targets()
            .into_iter()
            .filter(|t| selected.contains(&t.label))
            .collect();
        self.scan_targets(&targets, progress_cb)
    }

    pub fn scan_targets(
        &self,
        targets: &[Target],
        progress_cb: Option<&dyn Fn(ScanProgress)>,
    ) -> ScanResults {
        ScanCoordinator::new(self.config).run(targets, self.store, progress_cb)
    }

    /// Deletes the selected results. Pure with respect to user interaction:
    /// confirmation happens before this is called.
    pub fn delete(&self, results: &ScanResults, selection: &Selection) -> DeleteReport {
        DeletionEngine::new(&self.config.allowlist, self.store, self.probe)
            .delete(results, selection)
    }
}
