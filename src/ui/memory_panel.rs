use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

use crate::format::format_bytes;
use crate::system::snapshot::MemoryStats;
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, memory: &MemoryStats, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(
            " Memory ",
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [gauge_area, lines_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

    let percent = memory.used_percent();
    let gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(theme.usage_color(percent))
                .bg(theme.gauge_unfilled),
        )
        .ratio(percent / 100.0)
        .label(format!(
            "{}/{} ({percent:.0}%)",
            format_bytes(memory.used),
            format_bytes(memory.total)
        ));
    frame.render_widget(gauge, gauge_area);

    let lines = vec![
        pair_line(
            ("Used", memory.used),
            ("Free", memory.free),
            theme,
        ),
        pair_line(
            ("Avail", memory.available),
            ("Shared", memory.shared),
            theme,
        ),
        pair_line(
            ("Buffers", memory.buffers),
            ("Cached", memory.cached),
            theme,
        ),
        pair_line(
            ("Swap", memory.swap_used()),
            ("SwapTot", memory.swap_total),
            theme,
        ),
    ];
    frame.render_widget(Paragraph::new(lines), lines_area);
}

fn pair_line(left: (&str, u64), right: (&str, u64), theme: &Theme) -> Line<'static> {
    let label = Style::default().fg(theme.text_secondary);
    let value = Style::default().fg(theme.text_primary);
    Line::from(vec![
        Span::styled(format!("{:<8}", left.0), label),
        Span::styled(format!("{:>8}", format_bytes(left.1)), value),
        Span::raw("  "),
        Span::styled(format!("{:<8}", right.0), label),
        Span::styled(format!("{:>8}", format_bytes(right.1)), value),
    ])
}
