use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use indicatif::{ProgressBar, ProgressStyle};
use ratatui::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use winsweep::constants::{APP_DIR, LOG_FILE, REGISTRY_LABEL};
use winsweep::format::format_size;
use winsweep::registry::{self, ConfigStore};
use winsweep::ui::{self, app::App};
use winsweep::{SweepConfig, Sweeper};

#[derive(Parser)]
#[command(version, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Print version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Number of directories scanned in parallel
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Scan once, print what could be reclaimed and exit without deleting
    #[arg(long)]
    report: bool,

    /// Print the resolved scan locations and exit
    #[arg(long)]
    list_targets: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = Arc::new(SweepConfig::load(cli.workers));
    let store: Arc<dyn ConfigStore> = Arc::from(registry::platform_store());

    if cli.list_targets {
        list_targets(&config, store.as_ref());
        return Ok(());
    }
    if cli.report {
        report(&config, store.as_ref());
        return Ok(());
    }

    ui::install_panic_hook();
    enable_raw_mode()?;
    let mut stderr = io::stderr();
    execute!(stderr, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new_scanning(config, store);
    app.start_scan();

    let res = ui::run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Logs go to a file because the TUI owns the terminal.
fn init_logging() {
    let writer = dirs::cache_dir()
        .map(|dir| dir.join(APP_DIR))
        .and_then(|dir| {
            fs::create_dir_all(&dir).ok()?;
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(LOG_FILE))
                .ok()
        })
        .map_or_else(
            || BoxMakeWriter::new(io::sink),
            |file| BoxMakeWriter::new(Mutex::new(file)),
        );

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("winsweep=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

fn list_targets(config: &SweepConfig, store: &dyn ConfigStore) {
    for target in Sweeper::new(config, store).enumerate_targets() {
        let status = if target.path.as_os_str().is_empty() {
            "unset"
        } else if target.path.exists() {
            "found"
        } else {
            "missing"
        };
        println!(
            "{:<24} {:<8} {}",
            target.label,
            status,
            target.path.display()
        );
    }
}

fn report(config: &SweepConfig, store: &dyn ConfigStore) {
    let sweeper = Sweeper::new(config, store);
    let labels: HashSet<String> = sweeper
        .enumerate_targets()
        .into_iter()
        .map(|t| t.label)
        .collect();

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let cb = |progress: winsweep::model::ScanProgress| {
        bar.set_length(progress.total as u64);
        bar.set_position(progress.completed as u64);
        bar.set_message(progress.label);
    };
    let results = sweeper.scan(&labels, Some(&cb));
    bar.finish_and_clear();

    if results.is_empty() {
        println!("Nothing to clean.");
        return;
    }

    let mut files = 0;
    let mut bytes = 0;
    for result in results.values() {
        if result.label == REGISTRY_LABEL {
            println!(
                "{:<24} {} entries, {} (estimated)",
                result.label, result.file_count, result.size_human
            );
            for entry in result.details.iter().flatten() {
                println!("    {entry}");
            }
        } else {
            println!(
                "{:<24} {} files, {}",
                result.label, result.file_count, result.size_human
            );
            files += result.file_count;
            bytes += result.size_bytes;
        }
    }
    println!("Total: {files} files, {}", format_size(bytes));
}
