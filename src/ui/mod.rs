pub mod cpu_panel;
pub mod help;
pub mod memory_panel;
pub mod process_table;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;
use crate::system::source::ProcSource;

const MEMORY_PANEL_HEIGHT: u16 = 7;

pub fn draw<S: ProcSource>(frame: &mut Frame, app: &App<S>) {
    let snapshot = &app.snapshot;
    let top_height =
        cpu_panel::required_height(snapshot.cpu.per_core.len()).max(MEMORY_PANEL_HEIGHT);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(top_height),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[0]);

    cpu_panel::render(frame, top[0], &snapshot.cpu, &app.theme);
    memory_panel::render(frame, top[1], &snapshot.memory, &app.theme);

    let processes = app.visible_processes();
    process_table::render(
        frame,
        chunks[1],
        &processes,
        app.scroll,
        app.sort_mode,
        &app.theme,
    );

    statusbar::render(
        frame,
        chunks[2],
        &statusbar::StatusInfo {
            keybinds: &app.keybinds,
            sort_mode: app.sort_mode,
            show_kernel_threads: app.show_kernel_threads,
            process_count: snapshot.process_count,
        },
        &app.theme,
    );

    // Help overlay, rendered last to appear on top
    if app.show_help() {
        help::render(frame, frame.area(), &app.help_entries(), &app.theme);
    }
}
