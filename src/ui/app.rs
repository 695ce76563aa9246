use crate::config::SweepConfig;
use crate::constants::REGISTRY_LABEL;
use crate::engine::Sweeper;
use crate::format::format_size;
use crate::model::{DeleteReport, ScanProgress, ScanResult, ScanResults, Selection};
use crate::registry::ConfigStore;
use crossterm::event::KeyCode;
use ratatui::widgets::ListState;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use sysinfo::Disks;

pub enum AppState {
    Scanning,
    Browsing,
    Confirming,
    Cleaning,
    Done(String),
}

/// One line in the results list.
pub struct ResultRow {
    pub result: ScanResult,
    pub is_selected: bool,
}

pub enum ScanUpdate {
    Progress(ScanProgress),
    Finished(ScanResults),
}

pub struct App {
    pub rows: Vec<ResultRow>,
    pub list_state: ListState,
    pub state: AppState,
    pub disks: Disks,
    pub cleaning_rx: Option<mpsc::Receiver<DeleteReport>>,
    pub scan_rx: Option<mpsc::Receiver<ScanUpdate>>,
    pub scan_progress: Option<ScanProgress>,
    pub finished_targets: Vec<String>,
    config: Arc<SweepConfig>,
    store: Arc<dyn ConfigStore>,
}

impl App {
    pub fn new_scanning(config: Arc<SweepConfig>, store: Arc<dyn ConfigStore>) -> Self {
        let disks = Disks::new_with_refreshed_list();
        Self {
            rows: Vec::new(),
            list_state: ListState::default(),
            state: AppState::Scanning,
            disks,
            cleaning_rx: None,
            scan_rx: None,
            scan_progress: None,
            finished_targets: Vec::new(),
            config,
            store,
        }
    }

    pub fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn toggle(&mut self) {
        if let Some(i) = self.list_state.selected()
            && let Some(row) = self.rows.get_mut(i)
        {
            row.is_selected = !row.is_selected;
        }
    }

    pub fn selected_row(&self) -> Option<&ResultRow> {
        self.list_state.selected().and_then(|i| self.rows.get(i))
    }

    pub fn total_selected_size(&self) -> u64 {
        self.rows
            .iter()
            .filter(|r| r.is_selected)
            .map(|r| r.result.size_bytes)
            .sum()
    }

    pub fn has_selection(&self) -> bool {
        self.rows.iter().any(|r| r.is_selected)
    }

    /// `(files, bytes, registry issues)` over all rows.
    pub fn totals(&self) -> (u64, u64, u64) {
        self.rows
            .iter()
            .fold((0, 0, 0), |(files, bytes, registry), row| {
                if row.result.label == REGISTRY_LABEL {
                    (files, bytes, registry + row.result.file_count)
                } else {
                    (
                        files + row.result.file_count,
                        bytes + row.result.size_bytes,
                        registry,
                    )
                }
            })
    }

    /// Applies one key press. Returns `true` when the user asked to quit.
    ///
    /// Deletion only starts from the confirmation dialog; keys are ignored
    /// while it runs.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.state {
            AppState::Browsing => match code {
                KeyCode::Char('q') => return true,
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => self.previous(),
                KeyCode::Char(' ') => self.toggle(),
                KeyCode::Char('r') => self.start_scan(),
                KeyCode::Enter if self.has_selection() => self.state = AppState::Confirming,
                _ => {}
            },
            AppState::Confirming => match code {
                KeyCode::Char('y') => self.clean_selected(),
                KeyCode::Char('n' | 'q') | KeyCode::Esc => self.state = AppState::Browsing,
                _ => {}
            },
            AppState::Scanning => return matches!(code, KeyCode::Char('q') | KeyCode::Esc),
            AppState::Cleaning => {}
            AppState::Done(_) => {
                if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ' | 'q')) {
                    self.state = AppState::Browsing;
                }
            }
        }
        false
    }

    /// Drains whichever background job is running.
    pub fn poll_background(&mut self) {
        match self.state {
            AppState::Scanning => self.check_scan_status(),
            AppState::Cleaning => self.check_cleaning_status(),
            _ => {}
        }
    }

    pub fn start_scan(&mut self) {
        if matches!(self.state, AppState::Scanning) && self.scan_rx.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel();
        self.scan_rx = Some(rx);
        self.state = AppState::Scanning;
        self.rows.clear();
        self.list_state.select(None);
        self.scan_progress = None;
        self.finished_targets.clear();

        let config = Arc::clone(&self.config);
        let store = Arc::clone(&self.store);
        thread::spawn(move || {
            let sweeper = Sweeper::new(&config, store.as_ref());
            let labels: HashSet<String> = sweeper
                .enumerate_targets()
                .into_iter()
                .map(|t| t.label)
                .collect();

            let tx_progress = tx.clone();
            let cb = move |progress: ScanProgress| {
                let _ = tx_progress.send(ScanUpdate::Progress(progress));
            };

            let results = sweeper.scan(&labels, Some(&cb));
            let _ = tx.send(ScanUpdate::Finished(results));
        });
    }

    pub fn check_scan_status(&mut self) {
        let Some(rx) = &self.scan_rx else {
            return;
        };

        let mut finished = None;
        // Non-blocking check for all available messages
        while let Ok(update) = rx.try_recv() {
            match update {
                ScanUpdate::Progress(progress) => {
                    self.finished_targets.push(progress.label.clone());
                    self.scan_progress = Some(progress);
                }
                ScanUpdate::Finished(results) => finished = Some(results),
            }
        }

        if let Some(results) = finished {
            self.rows = results
                .into_values()
                .map(|result| ResultRow {
                    result,
                    is_selected: true,
                })
                .collect();
            self.rows
                .sort_by(|a, b| b.result.size_bytes.cmp(&a.result.size_bytes));

            if !self.rows.is_empty() {
                self.list_state.select(Some(0));
            }
            self.state = AppState::Browsing;
            self.scan_rx = None;
        }
    }

    pub fn clean_selected(&mut self) {
        if !self.has_selection() {
            self.state = AppState::Done("Nothing selected to clean.".to_string());
            return;
        }

        self.state = AppState::Cleaning;

        let results: ScanResults = self
            .rows
            .iter()
            .map(|r| (r.result.label.clone(), r.result.clone()))
            .collect();
        let selection: Selection = self
            .rows
            .iter()
            .map(|r| (r.result.label.clone(), r.is_selected))
            .collect();

        let (tx, rx) = mpsc::channel();
        self.cleaning_rx = Some(rx);

        let config = Arc::clone(&self.config);
        let store = Arc::clone(&self.store);
        thread::spawn(move || {
            let report = Sweeper::new(&config, store.as_ref()).delete(&results, &selection);
            let _ = tx.send(report);
        });
    }

    pub fn check_cleaning_status(&mut self) {
        if let Some(rx) = &self.cleaning_rx
            && let Ok(report) = rx.try_recv()
        {
            let failed: HashSet<&str> = report.errors.iter().map(|e| e.label()).collect();
            self.rows
                .retain(|r| !r.is_selected || failed.contains(r.result.label.as_str()));
            if self.rows.is_empty() {
                self.list_state.select(None);
            } else {
                self.list_state.select(Some(0));
            }

            self.state = AppState::Done(summarize(&report));
            self.cleaning_rx = None; // Detach receiver

            // Refresh disk info after cleaning
            self.disks.refresh(true);
        }
    }
}

pub fn summarize(report: &DeleteReport) -> String {
    let mut summary = format!("Cleaned: {}", format_size(report.bytes_freed));
    if report.registry_entries_removed > 0 {
        let _ = write!(
            summary,
            " | {} registry keys deleted",
            report.registry_entries_removed
        );
    }
    for err in &report.errors {
        let _ = write!(summary, "\n{err}");
    }
    summary
}
