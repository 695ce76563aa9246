use crate::constants::{ALLOWLIST_FILE, APP_DIR};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Paths the user never wants scanned or deleted.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    rules: Vec<PathBuf>,
}

impl Allowlist {
    pub fn new(rules: Vec<PathBuf>) -> Self {
        Self { rules }
    }

    /// Loads the allowlist from the default configuration path.
    /// Returns an empty allowlist if the file doesn't exist or errors.
    pub fn load() -> Self {
        dirs::config_dir()
            .map(|dir| Self::load_from(&dir.join(APP_DIR).join(ALLOWLIST_FILE)))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(file) = fs::File::open(path) else {
            return Self::default();
        };

        let rules = BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| {
                let trimmed = line.trim();
                // Skip empty lines and comments
                (!trimmed.is_empty() && !trimmed.starts_with('#')).then(|| PathBuf::from(trimmed))
            })
            .collect::<Vec<_>>();

        tracing::debug!("Loaded {} allowlist rules from {}", rules.len(), path.display());
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True if `path` is a rule or lies below one.
    pub fn is_allowed(&self, path: &Path) -> bool {
        self.rules.iter().any(|rule| path.starts_with(rule))
    }

    /// True if some protected path lies strictly inside `dir`, so `dir` must not be
    /// removed wholesale.
    pub fn protects_within(&self, dir: &Path) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.starts_with(dir) && rule.as_path() != dir)
    }
}
