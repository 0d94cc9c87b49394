use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::system::snapshot::{CoreUsage, CpuStats};
use crate::ui::theme::Theme;

pub const CPU_COLUMNS: usize = 4;

/// Panel rows needed for `cores` entries, borders included.
pub fn required_height(cores: usize) -> u16 {
    (cores.div_ceil(CPU_COLUMNS).max(1) + 2) as u16
}

pub fn render(frame: &mut Frame, area: Rect, cpu: &CpuStats, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title(Line::from(vec![
            Span::styled(
                " CPU ",
                Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{:.1}% ", cpu.usage),
                Style::default()
                    .fg(theme.usage_color(cpu.usage))
                    .add_modifier(Modifier::BOLD),
            ),
        ]));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if cpu.per_core.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "no per-core data",
                Style::default().fg(theme.text_secondary),
            )),
            inner,
        );
        return;
    }

    let columns = Layout::horizontal([Constraint::Ratio(1, CPU_COLUMNS as u32); CPU_COLUMNS])
        .split(inner);

    // Cores fill the grid row-major: the first four cores on the first line.
    for (col, column_area) in columns.iter().enumerate() {
        let lines: Vec<Line> = cpu
            .per_core
            .iter()
            .skip(col)
            .step_by(CPU_COLUMNS)
            .map(|core| core_line(core, theme))
            .collect();
        frame.render_widget(Paragraph::new(lines), *column_area);
    }
}

fn core_line(core: &CoreUsage, theme: &Theme) -> Line<'static> {
    let CoreUsage { index, usage } = *core;
    Line::from(vec![
        Span::styled(
            format!("cpu{index:<3}"),
            Style::default().fg(theme.text_secondary),
        ),
        Span::styled(
            format!("{usage:>5.1}%"),
            Style::default().fg(theme.usage_color(usage)),
        ),
    ])
}
