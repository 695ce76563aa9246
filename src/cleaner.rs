use crate::allowlist::Allowlist;
use crate::constants::{PROBE_FILE_NAME, REGISTRY_LABEL};
use crate::error::CleanError;
use crate::model::{DeleteReport, ScanResults, Selection};
use crate::registry::{self, ConfigStore};
use jwalk::{Parallelism, WalkDir};
use std::fs::{self, FileType};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Decides whether a target directory may be modified at all.
pub trait PermissionProbe {
    fn can_write(&self, dir: &Path) -> bool;
}

/// Creates and immediately removes a marker file inside the directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerFileProbe;

impl PermissionProbe for MarkerFileProbe {
    fn can_write(&self, dir: &Path) -> bool {
        let marker = dir.join(PROBE_FILE_NAME);
        match fs::File::create(&marker).and_then(|_| fs::remove_file(&marker)) {
            Ok(()) => true,
            Err(err) if matches!(err.kind(), ErrorKind::PermissionDenied | ErrorKind::NotFound) => {
                tracing::debug!("No write access to {}: {err}", dir.display());
                false
            }
            Err(err) => {
                tracing::warn!("Permission check failed for {}: {err}", dir.display());
                false
            }
        }
    }
}

/// Removes the selected scan results: directory contents from disk, registry
/// junk through [`registry::prune`].
pub struct DeletionEngine<'a> {
    allowlist: &'a Allowlist,
    store: &'a dyn ConfigStore,
    probe: &'a dyn PermissionProbe,
}

impl<'a> DeletionEngine<'a> {
    pub fn new(
        allowlist: &'a Allowlist,
        store: &'a dyn ConfigStore,
        probe: &'a dyn PermissionProbe,
    ) -> Self {
        Self {
            allowlist,
            store,
            probe,
        }
    }

    /// Deletes every result whose label is selected. Never fails: target-level
    /// problems are collected in [`DeleteReport::errors`] and the remaining
    /// targets are still processed.
    pub fn delete(&self, results: &ScanResults, selection: &Selection) -> DeleteReport {
        let mut report = DeleteReport::default();

        let selected = results
            .values()
            .filter(|r| selection.get(&r.label).copied().unwrap_or(false));

        for result in selected {
            if result.label == REGISTRY_LABEL {
                let details = result.details.as_deref().unwrap_or_default();
                let removed = registry::prune(self.store, details);
                tracing::info!("[{REGISTRY_LABEL}] Deleted {removed} orphaned registry keys");
                report.registry_entries_removed += removed;
                continue;
            }

            match self.empty_directory(&result.label, &result.path) {
                Ok(freed) => {
                    tracing::info!("{}: freed {freed} bytes", result.label);
                    report.bytes_freed += freed;
                }
                Err(err) => {
                    tracing::warn!("{err}");
                    report.errors.push(err);
                }
            }
        }

        report
    }

    /// Removes everything below `path` bottom-up and returns the bytes of the
    /// regular files removed. The directory itself is kept.
    fn empty_directory(&self, label: &str, path: &Path) -> Result<u64, CleanError> {
        if !path.is_dir() {
            return Ok(0);
        }
        if self.allowlist.is_allowed(path) {
            tracing::debug!("{label}: {} is allowlisted", path.display());
            return Ok(0);
        }
        if !self.probe.can_write(path) {
            return Err(CleanError::PermissionDenied {
                label: label.to_string(),
                path: path.to_path_buf(),
            });
        }

        fs::read_dir(path).map_err(|source| CleanError::Walk {
            label: label.to_string(),
            path: path.to_path_buf(),
            source,
        })?;

        let mut freed = 0;
        // Pre-order walk reversed: children always come before their parent.
        for (entry, file_type) in self.collect_entries(path).into_iter().rev() {
            if file_type.is_dir() {
                if self.allowlist.protects_within(&entry) {
                    continue;
                }
                if let Err(err) = fs::remove_dir_all(&entry) {
                    log_failure("directory", &entry, &err);
                }
                continue;
            }

            let size = if file_type.is_file() {
                fs::symlink_metadata(&entry).map_or(0, |m| m.len())
            } else {
                0
            };
            match remove_link_or_file(&entry, file_type) {
                Ok(()) => freed += size,
                Err(err) => log_failure("file", &entry, &err),
            }
        }

        Ok(freed)
    }

    fn collect_entries(&self, root: &Path) -> Vec<(PathBuf, FileType)> {
        let allowlist = self.allowlist.clone();
        WalkDir::new(root)
            .skip_hidden(false)
            .follow_links(false)
            .parallelism(Parallelism::Serial)
            .process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|child| {
                    child
                        .as_ref()
                        .map_or(true, |entry| !allowlist.is_allowed(&entry.path()))
                });
            })
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.depth == 0 => None,
                Ok(entry) => Some((entry.path(), entry.file_type())),
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry under {}: {err}", root.display());
                    None
                }
            })
            .collect()
    }
}

/// Directory symlinks and junctions on Windows are removed as directories.
fn remove_link_or_file(path: &Path, file_type: FileType) -> io::Result<()> {
    #[cfg(windows)]
    {
        use std::os::windows::fs::FileTypeExt;
        if file_type.is_symlink_dir() {
            return fs::remove_dir(path);
        }
    }
    #[cfg(not(windows))]
    let _ = file_type;
    fs::remove_file(path)
}

fn log_failure(what: &str, path: &Path, err: &io::Error) {
    match err.kind() {
        ErrorKind::NotFound => tracing::debug!("Already gone: {}", path.display()),
        ErrorKind::PermissionDenied => {
            tracing::warn!("Failed to delete {what} {}: {err}", path.display());
        }
        _ => tracing::warn!("Unexpected error deleting {what} {}: {err}", path.display()),
    }
}
