use crate::format::format_size;
use crate::ui::app::{App, AppState};
use humansize::{BINARY, format_size as format_disk_size};
use ratatui::{
    prelude::*,
    widgets::{BarChart, Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
};
use std::fmt::Write as _;

pub fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let disk_info = app.disks.list().iter().max_by_key(|d| d.total_space());

    let version = env!("CARGO_PKG_VERSION");
    let header_text = if let Some(disk) = disk_info {
        let total = disk.total_space();
        let available = disk.available_space();
        let used = total.saturating_sub(available);
        let percent = if total > 0 {
            #[allow(clippy::cast_precision_loss)]
            {
                (used as f64 / total as f64) * 100.0
            }
        } else {
            0.0
        };

        format!(
            "winsweep v{version} | Disk {}: {} / {} ({percent:.1}% Used)",
            disk.mount_point().display(),
            format_disk_size(used, BINARY),
            format_disk_size(total, BINARY)
        )
    } else {
        format!("winsweep v{version} | Disk: N/A")
    };

    let title = Paragraph::new(header_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

pub fn render_scanning(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let (completed, total) = app
        .scan_progress
        .as_ref()
        .map_or((0, 0), |p| (p.completed, p.total));
    let ratio = if total == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        {
            completed as f64 / total as f64
        }
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Scanning"))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio)
        .label(format!("{completed}/{total} locations"));
    f.render_widget(gauge, chunks[0]);

    let items: Vec<ListItem> = app
        .finished_targets
        .iter()
        .map(|label| ListItem::new(format!("  done  {label}")))
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Finished (registry is checked last)"),
    );
    f.render_widget(list, chunks[1]);
}

pub fn render_results_list(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|r| {
            let checkbox = if r.is_selected { "[x]" } else { "[ ]" };
            let content = format!(
                "{checkbox} {:<24}  {:>12}",
                r.result.label, r.result.size_human
            );
            ListItem::new(content)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Scan Results"))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Yellow),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.list_state);
}

pub fn render_usage_chart(f: &mut Frame, app: &App, area: Rect) {
    let short_data: Vec<(String, u64)> = app
        .rows
        .iter()
        .map(|r| {
            let label: String = r.result.label.chars().take(8).collect();
            (label, r.result.size_bytes / 1024 / 1024)
        })
        .collect();
    let data: Vec<(&str, u64)> = short_data.iter().map(|(l, v)| (l.as_str(), *v)).collect();

    let barchart = BarChart::default()
        .block(
            Block::default()
                .title("Reclaimable (MB)")
                .borders(Borders::ALL),
        )
        .data(&data)
        .bar_width(8)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::White).bg(Color::Cyan));

    f.render_widget(barchart, area);
}

pub fn render_details_text(f: &mut Frame, app: &App, area: Rect) {
    let Some(row) = app.selected_row() else {
        f.render_widget(
            Block::default().borders(Borders::ALL).title("Details"),
            area,
        );
        return;
    };
    let result = &row.result;

    let mut details_text = format!("Path: {}\n", result.path.display());
    if let Some(entries) = &result.details {
        let _ = writeln!(
            details_text,
            "Entries: {}\nSize: {} (estimated)\n\nOrphaned entries:",
            result.file_count, result.size_human
        );
        for entry in entries {
            let _ = writeln!(details_text, " - {entry}");
        }
    } else {
        let _ = writeln!(
            details_text,
            "Files: {}\nSize: {}",
            result.file_count, result.size_human
        );
    }

    let details = Paragraph::new(details_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Details: {}", result.label)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(details, area);
}

pub fn render_details(f: &mut Frame, app: &App, area: Rect) {
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_usage_chart(f, app, right_chunks[0]);
    render_details_text(f, app, right_chunks[1]);
}

pub fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let total_selected = format_size(app.total_selected_size());
    let (files, bytes, registry) = app.totals();
    let totals = if registry > 0 {
        format!("Total: {files} files, {} | {registry} registry keys", format_size(bytes))
    } else {
        format!("Total: {files} files, {}", format_size(bytes))
    };

    let footer_text = match app.state {
        AppState::Browsing => format!(
            "{totals} | Selected: {total_selected} | [Space] Toggle [Enter] Clean [r] Rescan [q] Quit"
        ),
        AppState::Confirming => format!(
            "Permanently delete the selected files and registry entries? Selected: {total_selected} | [y] Confirm [n/Esc] Cancel"
        ),
        AppState::Cleaning => "Cleaning... (This may take a while)".to_string(),
        AppState::Scanning => "Scanning... [q] Quit".to_string(),
        AppState::Done(_) => "Done! [Press key to continue]".to_string(),
    };

    let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

pub fn render_popup(f: &mut Frame, app: &App) {
    if let AppState::Done(ref msg) = app.state {
        let block = Block::default()
            .title("Cleanup Complete")
            .borders(Borders::ALL);
        let area = centered_rect(60, 30, f.area());
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(msg.clone())
                .block(block)
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
