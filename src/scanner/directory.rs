use crate::allowlist::Allowlist;
use crate::model::DirStats;
use jwalk::{Parallelism, WalkDir};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Counts regular files below `root` and sums their sizes.
///
/// Symlinks and special files are ignored, and a root that is not a directory
/// counts as empty. Entries that vanish or deny access mid-walk are skipped;
/// the walk itself never fails, so an unreadable tree reports zero files and
/// zero bytes.
pub fn scan_directory(root: &Path, allowlist: &Allowlist) -> DirStats {
    let mut stats = DirStats::default();
    if !root.is_dir() || allowlist.is_allowed(root) {
        return stats;
    }

    for entry in walker(root, allowlist) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log_skipped(root, err.io_error().map(std::io::Error::kind), &err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => {
                stats.file_count += 1;
                stats.size_bytes += metadata.len();
            }
            Err(err) => log_skipped(
                &entry.path(),
                err.io_error().map(std::io::Error::kind),
                &err,
            ),
        }
    }

    stats
}

/// Serial walk that prunes allowlisted entries and never descends into the same
/// directory twice.
fn walker(root: &Path, allowlist: &Allowlist) -> WalkDir {
    // The root arrives as the only child of the first (depth `None`) read, so
    // it is recorded there like any other directory.
    let seen: Arc<Mutex<HashSet<PathBuf>>> = Arc::default();

    let allowlist = allowlist.clone();
    WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(Parallelism::Serial)
        .process_read_dir(move |_depth, _path, _state, children| {
            if !allowlist.is_empty() {
                children.retain(|child| {
                    child
                        .as_ref()
                        .map_or(true, |entry| !allowlist.is_allowed(&entry.path()))
                });
            }

            let mut seen = seen.lock().unwrap_or_else(PoisonError::into_inner);
            for child in children.iter_mut().flatten() {
                if child.file_type().is_dir() && !seen.insert(dir_identity(&child.path())) {
                    child.read_children_path = None;
                }
            }
        })
}

fn dir_identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn log_skipped(path: &Path, kind: Option<ErrorKind>, err: &dyn std::fmt::Display) {
    match kind {
        Some(ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
            tracing::debug!("Skipping {}: {err}", path.display());
        }
        _ => tracing::warn!("File access failed for {}: {err}", path.display()),
    }
}
