use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{ResolvedKeybinds, SortMode, key_label};
use crate::ui::theme::Theme;

pub struct StatusInfo<'a> {
    pub keybinds: &'a ResolvedKeybinds,
    pub sort_mode: SortMode,
    pub show_kernel_threads: bool,
    pub process_count: usize,
}

pub fn render(frame: &mut Frame, area: Rect, info: &StatusInfo, theme: &Theme) {
    let bg_style = Style::default().bg(theme.statusbar_bg);
    let kb = info.keybinds;

    let kernel = if info.show_kernel_threads {
        "Hide kthreads"
    } else {
        "Show kthreads"
    };

    let mut spans = Vec::new();
    spans.extend(pill_spans(key_label(kb.quit), "Quit".to_string(), theme));
    spans.extend(pill_spans(
        key_label(kb.sort),
        format!("Sort: {}", info.sort_mode.label()),
        theme,
    ));
    spans.extend(pill_spans(
        key_label(kb.toggle_kernel),
        kernel.to_string(),
        theme,
    ));
    spans.extend(pill_spans(key_label(kb.refresh), "Refresh".to_string(), theme));
    spans.extend(pill_spans(key_label(kb.help), "Help".to_string(), theme));
    spans.push(Span::styled(
        format!("  {} procs", info.process_count),
        Style::default()
            .fg(theme.text_secondary)
            .add_modifier(Modifier::ITALIC),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn pill_spans(key: String, desc: String, theme: &Theme) -> Vec<Span<'static>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
