//! Target-level failures that are reported back instead of swallowed.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Cannot delete from {}: insufficient permissions", path.display())]
    PermissionDenied { label: String, path: PathBuf },

    #[error("Deletion of {label} stopped at {}: {source}", path.display())]
    Walk {
        label: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CleanError {
    pub fn label(&self) -> &str {
        match self {
            Self::PermissionDenied { label, .. } | Self::Walk { label, .. } => label,
        }
    }
}
