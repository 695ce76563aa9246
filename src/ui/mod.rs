pub mod app;
pub mod components;

use crate::scanner::panic_reason;
use crate::ui::app::{App, AppState};
use crate::ui::components::{
    render_details, render_footer, render_header, render_popup, render_results_list,
    render_scanning,
};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::prelude::*;
use std::panic::{self, PanicHookInfo};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Header, body and footer, with any modal drawn last on top.
pub fn ui(f: &mut Frame, app: &mut App) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(f.area());

    render_header(f, app, header);
    match app.state {
        AppState::Scanning => render_scanning(f, app, body),
        _ => {
            let [list, details] =
                Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                    .areas(body);
            render_results_list(f, app, list);
            render_details(f, app, details);
        }
    }
    render_footer(f, app, footer);
    render_popup(f, app);
}

/// Redraws every tick while background scans or deletions report in, until
/// the user quits.
pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stderr>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;
        app.poll_background();

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && app.handle_key(key.code)
        {
            return Ok(());
        }
    }
}

/// Sends panic messages to the log instead of stderr, which the TUI draws on.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info: &PanicHookInfo<'_>| {
        let thread = std::thread::current();
        let location = info
            .location()
            .map_or_else(String::new, |l| format!(" at {}:{}", l.file(), l.line()));
        tracing::error!(
            "Thread '{}' panicked{location}: {}",
            thread.name().unwrap_or("<unnamed>"),
            panic_reason(info.payload())
        );
    }));
}
