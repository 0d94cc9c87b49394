use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table};

use crate::app::SortMode;
use crate::format::{format_bytes, format_cpu_time, truncate_unicode};
use crate::system::process::ProcessInfo;
use crate::ui::theme::Theme;

const HEADERS: [&str; 9] = ["PID", "Name", "CPU%", "TIME", "VIRT", "RES", "PRI", "S", "Command"];
const NAME_WIDTH: u16 = 16;

fn widths() -> [Constraint; 9] {
    [
        Constraint::Length(7),
        Constraint::Length(NAME_WIDTH),
        Constraint::Length(6),
        Constraint::Length(9),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Min(10),
    ]
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    processes: &[&ProcessInfo],
    scroll: usize,
    sort_mode: SortMode,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title(Line::from(vec![
            Span::styled(
                format!(" Processes ({}) ", processes.len()),
                Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("sort: {} ", sort_mode.label()),
                Style::default().fg(theme.text_secondary),
            ),
        ]));

    let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h))).style(
        Style::default()
            .fg(theme.table_header)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = processes
        .iter()
        .skip(scroll)
        .enumerate()
        .map(|(i, process)| process_row(process, i % 2 == 1, theme))
        .collect();

    let table = Table::new(rows, widths())
        .header(header)
        .block(block)
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn process_row<'a>(process: &ProcessInfo, alternate: bool, theme: &Theme) -> Row<'a> {
    let cpu_style = Style::default().fg(theme.usage_color(process.cpu_percent));
    let text = Style::default().fg(theme.text_primary);
    let dim = Style::default().fg(theme.text_secondary);

    let row = Row::new(vec![
        Cell::from(process.pid.to_string()).style(dim),
        Cell::from(truncate_unicode(&process.name, NAME_WIDTH as usize)).style(text),
        Cell::from(format!("{:.1}", process.cpu_percent)).style(cpu_style),
        Cell::from(format_cpu_time(process.cpu_time)).style(dim),
        Cell::from(format_bytes(process.memory_bytes)).style(text),
        Cell::from(format_bytes(process.resident_bytes)).style(text),
        Cell::from(process.priority.to_string()).style(dim),
        Cell::from(process.state.clone()).style(dim),
        Cell::from(process.command.clone()).style(dim),
    ]);

    if alternate {
        row.style(Style::default().bg(theme.row_alt_bg))
    } else {
        row
    }
}
