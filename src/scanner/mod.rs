pub mod directory;

use crate::config::SweepConfig;
use crate::constants::{REGISTRY_LABEL, UNINSTALL_DISPLAY_PATH};
use crate::format::format_size;
use crate::model::{DirStats, ScanProgress, ScanResult, ScanResults, Target};
use crate::registry::{self, ConfigStore};
use directory::scan_directory;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

type Outcome = (Target, std::thread::Result<DirStats>);

/// Scans directory targets on a bounded pool, then the configuration store.
pub struct ScanCoordinator<'a> {
    config: &'a SweepConfig,
}

impl<'a> ScanCoordinator<'a> {
    pub fn new(config: &'a SweepConfig) -> Self {
        Self { config }
    }

    /// Full scan: every scannable target, followed by the registry pseudo-target.
    pub fn run(
        &self,
        targets: &[Target],
        store: &dyn ConfigStore,
        progress_cb: Option<&dyn Fn(ScanProgress)>,
    ) -> ScanResults {
        let allowlist = &self.config.allowlist;
        let mut results =
            self.scan_targets_with(targets, |path| scan_directory(path, allowlist), progress_cb);

        let junk = registry::scan_for_junk(store);
        if junk.count() > 0 {
            results.insert(
                REGISTRY_LABEL.to_string(),
                ScanResult {
                    label: REGISTRY_LABEL.to_string(),
                    path: PathBuf::from(UNINSTALL_DISPLAY_PATH),
                    file_count: junk.count() as u64,
                    size_bytes: junk.estimated_bytes,
                    size_human: format_size(junk.estimated_bytes),
                    details: Some(junk.entries),
                },
            );
        }

        results
    }

    /// Runs `scan` once per scannable target on the worker pool and merges the
    /// outcomes on the calling thread, in whatever order they finish.
    ///
    /// Targets with an empty or missing path are skipped. A scan that panics is
    /// logged and left out; the rest still complete.
    pub fn scan_targets_with<F>(
        &self,
        targets: &[Target],
        scan: F,
        progress_cb: Option<&dyn Fn(ScanProgress)>,
    ) -> ScanResults
    where
        F: Fn(&Path) -> DirStats + Sync,
    {
        let pending: Vec<Target> = targets
            .iter()
            .filter(|t| t.is_scannable())
            .filter(|t| !self.config.allowlist.is_allowed(&t.path))
            .cloned()
            .collect();
        let total = pending.len();
        tracing::info!("Scanning {total} targets with {} workers", self.config.workers);

        let scan = &scan;
        let run_one = move |target: Target| -> Outcome {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| scan(&target.path)));
            (target, outcome)
        };

        let mut results = ScanResults::new();
        let mut completed = 0;
        let mut aggregate = |(target, outcome): Outcome| {
            completed += 1;
            if let Some(cb) = progress_cb {
                cb(ScanProgress {
                    label: target.label.clone(),
                    completed,
                    total,
                });
            }
            merge(&mut results, target, outcome);
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .thread_name(|i| format!("winsweep-scan-{i}"))
            .build()
        {
            Ok(pool) => {
                let (tx, rx) = mpsc::channel();
                pool.in_place_scope(|s| {
                    for target in pending {
                        let tx = tx.clone();
                        s.spawn(move |_| {
                            let _ = tx.send(run_one(target));
                        });
                    }
                    drop(tx);
                    for outcome in rx {
                        aggregate(outcome);
                    }
                });
            }
            Err(err) => {
                tracing::warn!("Worker pool unavailable ({err}), scanning sequentially");
                pending.into_iter().map(run_one).for_each(&mut aggregate);
            }
        }

        results
    }
}

fn merge(results: &mut ScanResults, target: Target, outcome: std::thread::Result<DirStats>) {
    match outcome {
        Ok(stats) if stats.size_bytes > 0 => {
            tracing::debug!(
                "{}: {} files, {} bytes",
                target.label,
                stats.file_count,
                stats.size_bytes
            );
            results.insert(
                target.label.clone(),
                ScanResult {
                    label: target.label,
                    path: target.path,
                    file_count: stats.file_count,
                    size_bytes: stats.size_bytes,
                    size_human: format_size(stats.size_bytes),
                    details: None,
                },
            );
        }
        Ok(_) => tracing::debug!("{}: nothing to reclaim", target.label),
        Err(panic) => {
            tracing::warn!(
                "Scanning {} failed: {}",
                target.label,
                panic_reason(panic.as_ref())
            );
        }
    }
}

/// Message carried by a panic payload, for `panic!` with a literal or a
/// formatted string.
pub fn panic_reason(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowlist::Allowlist;
    use crate::constants::REGISTRY_ENTRY_ESTIMATE;
    use crate::registry::UnsupportedStore;
    use crate::registry::memory::MemoryStore;
    use anyhow::Result;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs::{self, File};
    use std::io::Write;
    use std::thread;
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};

    fn write_file(path: &Path, len: usize) -> Result<()> {
        let mut f = File::create(path)?;
        f.write_all(&vec![0u8; len])?;
        Ok(())
    }

    /// Five existing target directories, each with one file of `(i + 1) * 10` bytes.
    fn fixture() -> Result<(TempDir, Vec<Target>)> {
        let dir = tempdir()?;
        let mut targets = Vec::new();
        for i in 0..5 {
            let path = dir.path().join(format!("t{i}"));
            fs::create_dir(&path)?;
            write_file(&path.join("junk.tmp"), (i + 1) * 10)?;
            targets.push(Target::new(format!("Target {i}"), path));
        }
        Ok((dir, targets))
    }

    #[test]
    fn scenario_three_files_in_one_target() -> Result<()> {
        let dir = tempdir()?;
        for (name, len) in [("a", 100), ("b", 200), ("c", 300)] {
            write_file(&dir.path().join(name), len)?;
        }
        let config = SweepConfig::default();
        let targets = vec![Target::new("Temp", dir.path())];

        let results = ScanCoordinator::new(&config).run(&targets, &UnsupportedStore, None);

        let result = &results["Temp"];
        assert_eq!(result.file_count, 3);
        assert_eq!(result.size_bytes, 600);
        assert_eq!(result.size_human, "600.00 B");
        assert_eq!(result.details, None);
        Ok(())
    }

    #[test]
    fn absent_and_empty_paths_produce_no_results() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("temp_is_a_file");
        write_file(&file, 77)?;
        let config = SweepConfig::default();
        let targets = vec![
            Target::new("Empty", PathBuf::new()),
            Target::new("Missing", "/winsweep/no/such/target/dir"),
            Target::new("File", &file),
        ];

        let results = ScanCoordinator::new(&config).run(&targets, &UnsupportedStore, None);
        assert!(results.is_empty());
        Ok(())
    }

    #[test]
    fn zero_byte_targets_are_dropped() -> Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("empty.tmp"))?;
        let config = SweepConfig::default();
        let targets = vec![Target::new("Zero", dir.path())];

        let results = ScanCoordinator::new(&config).run(&targets, &UnsupportedStore, None);
        assert!(results.is_empty());
        Ok(())
    }

    #[test]
    fn completion_order_does_not_change_results() -> Result<()> {
        let (_dir, targets) = fixture()?;
        let config = SweepConfig::default();
        let coordinator = ScanCoordinator::new(&config);

        let run_with_delays = |delays: HashMap<PathBuf, u64>| {
            coordinator.scan_targets_with(
                &targets,
                |path| {
                    thread::sleep(Duration::from_millis(delays[path]));
                    scan_directory(path, &Allowlist::default())
                },
                None,
            )
        };

        let ascending: HashMap<PathBuf, u64> = targets
            .iter()
            .enumerate()
            .map(|(i, t)| (t.path.clone(), i as u64 * 15))
            .collect();
        let descending: HashMap<PathBuf, u64> = targets
            .iter()
            .enumerate()
            .map(|(i, t)| (t.path.clone(), (4 - i as u64) * 15))
            .collect();

        let first = run_with_delays(ascending);
        let second = run_with_delays(descending);
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
        assert_eq!(first["Target 4"].size_bytes, 50);
        Ok(())
    }

    #[test]
    fn single_worker_still_completes() -> Result<()> {
        let (_dir, targets) = fixture()?;
        let config = SweepConfig::new(1, Allowlist::default());

        let results = ScanCoordinator::new(&config).run(&targets, &UnsupportedStore, None);
        assert_eq!(results.len(), 5);
        Ok(())
    }

    #[test]
    fn panicking_task_is_excluded_without_aborting_siblings() -> Result<()> {
        let (_dir, targets) = fixture()?;
        let config = SweepConfig::default();
        let poisoned = targets[2].path.clone();

        let results = ScanCoordinator::new(&config).scan_targets_with(
            &targets,
            |path| {
                assert!(path != poisoned, "simulated scan failure");
                scan_directory(path, &Allowlist::default())
            },
            None,
        );

        assert_eq!(results.len(), 4);
        assert!(!results.contains_key("Target 2"));
        Ok(())
    }

    fn payload_of(f: fn()) -> Box<dyn Any + Send> {
        panic::catch_unwind(f).err().unwrap_or_else(|| Box::new(()))
    }

    #[test]
    fn panic_reason_reads_literal_and_formatted_messages() {
        let literal = payload_of(|| panic!("literal"));
        let formatted = payload_of(|| panic!("target {}", 3));
        let opaque = payload_of(|| panic::panic_any(7_u8));

        assert_eq!(panic_reason(literal.as_ref()), "literal");
        assert_eq!(panic_reason(formatted.as_ref()), "target 3");
        assert_eq!(panic_reason(opaque.as_ref()), "unknown panic");
    }

    #[test]
    fn progress_reports_every_finished_target() -> Result<()> {
        let (_dir, targets) = fixture()?;
        let config = SweepConfig::default();
        let seen = RefCell::new(Vec::new());
        let cb = |p: ScanProgress| seen.borrow_mut().push(p);

        ScanCoordinator::new(&config).run(&targets, &UnsupportedStore, Some(&cb));

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 5);
        assert!(seen.iter().all(|p| p.total == 5));
        assert_eq!(
            seen.iter().map(|p| p.completed).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        Ok(())
    }

    #[test]
    fn registry_junk_is_appended_with_details() -> Result<()> {
        let (_dir, targets) = fixture()?;
        let config = SweepConfig::default();
        let store = MemoryStore::default().with_child(
            "{foo}",
            &[("DisplayName", "Foo"), ("InstallLocation", "/winsweep/gone")],
        );

        let results = ScanCoordinator::new(&config).run(&targets, &store, None);

        assert_eq!(results.len(), 6);
        let junk = &results[REGISTRY_LABEL];
        assert_eq!(junk.file_count, 1);
        assert_eq!(junk.size_bytes, REGISTRY_ENTRY_ESTIMATE);
        assert!(junk.is_estimate());
        let details = junk.details.as_deref().unwrap_or_default();
        assert_eq!(details.len(), 1);
        assert!(details[0].contains("Foo"));
        Ok(())
    }

    #[test]
    fn allowlisted_target_is_not_scanned() -> Result<()> {
        let (_dir, targets) = fixture()?;
        let config = SweepConfig::new(6, Allowlist::new(vec![targets[0].path.clone()]));

        let results = ScanCoordinator::new(&config).run(&targets, &UnsupportedStore, None);
        assert_eq!(results.len(), 4);
        assert!(!results.contains_key("Target 0"));
        Ok(())
    }
}
