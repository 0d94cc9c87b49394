use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Scroll};
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::system::collector::Collector;
use crate::system::process::ProcessInfo;
use crate::system::snapshot::SystemSnapshot;
use crate::system::source::{ProcFs, ProcSource};
use crate::ui::theme::{ColorSupport, HeatOverrides, Theme, resolve_color_support};

const PAGE_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub sort: KeyCode,
    pub help: KeyCode,
    pub refresh: KeyCode,
    pub toggle_kernel: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            sort: parse_key(&kb.sort).unwrap_or(KeyCode::Char('s')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::Char('r')),
            toggle_kernel: parse_key(&kb.toggle_kernel).unwrap_or(KeyCode::Char('k')),
        }
    }

    /// Returns (key_label, description) pairs for all keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.sort), "Cycle sort mode"),
            (key_label(self.toggle_kernel), "Toggle kernel threads"),
            (key_label(self.refresh), "Refresh now"),
            (key_label(self.help), "Toggle help"),
            ("↑↓".to_string(), "Scroll"),
            ("PgUp/Dn".to_string(), "Scroll page"),
            ("Home".to_string(), "Scroll to top"),
            ("Esc".to_string(), "Quit"),
            ("Ctrl+C".to_string(), "Quit (always)"),
        ]
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        _ => "?".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Cpu,
    Memory,
    Pid,
    Name,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::Cpu => SortMode::Memory,
            SortMode::Memory => SortMode::Pid,
            SortMode::Pid => SortMode::Name,
            SortMode::Name => SortMode::Cpu,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Cpu => "CPU",
            SortMode::Memory => "Memory",
            SortMode::Pid => "PID",
            SortMode::Name => "Name",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => SortMode::Memory,
            "pid" => SortMode::Pid,
            "name" => SortMode::Name,
            _ => SortMode::Cpu,
        }
    }
}

pub struct App<S = ProcFs> {
    pub running: bool,
    pub collector: Collector<S>,
    pub snapshot: SystemSnapshot,
    pub input_mode: InputMode,
    pub sort_mode: SortMode,
    pub scroll: usize,
    pub show_kernel_threads: bool,
    pub max_processes: usize,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
}

impl App {
    pub fn new(config: Config) -> Self {
        App::with_collector(config, Collector::new())
    }
}

impl<S: ProcSource> App<S> {
    pub fn with_collector(config: Config, mut collector: Collector<S>) -> Self {
        let snapshot = collector.collect();

        let color_support = resolve_color_support(&config.colors.color_support);
        let heat_overrides = HeatOverrides::from_config(&config.colors);
        let theme_name = if color_support == ColorSupport::Mono {
            "mono"
        } else {
            config.colors.theme.as_str()
        };
        let theme = Theme::from_config(theme_name, &heat_overrides, color_support);

        App {
            running: true,
            collector,
            snapshot,
            input_mode: InputMode::Normal,
            sort_mode: SortMode::from_str_config(&config.general.default_sort),
            scroll: 0,
            show_kernel_threads: config.general.show_kernel_threads,
            max_processes: config.general.max_processes,
            theme,
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
        }
    }

    pub fn refresh_data(&mut self) {
        self.snapshot = self.collector.collect();
        self.clamp_scroll();
    }

    /// Processes in display order, filtered and capped at `max_processes`
    /// (0 means no cap).
    pub fn visible_processes(&self) -> Vec<&ProcessInfo> {
        let mut processes: Vec<&ProcessInfo> = self
            .snapshot
            .processes
            .iter()
            .filter(|p| self.show_kernel_threads || !p.kernel_thread)
            .collect();

        match self.sort_mode {
            SortMode::Cpu => processes.sort_by(|a, b| {
                b.cpu_percent
                    .total_cmp(&a.cpu_percent)
                    .then(b.cpu_ticks.cmp(&a.cpu_ticks))
                    .then(a.pid.cmp(&b.pid))
            }),
            SortMode::Memory => processes.sort_by(|a, b| {
                b.memory_bytes
                    .cmp(&a.memory_bytes)
                    .then(a.pid.cmp(&b.pid))
            }),
            SortMode::Pid => processes.sort_by_key(|p| p.pid),
            SortMode::Name => processes.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then(a.pid.cmp(&b.pid))
            }),
        }

        if self.max_processes > 0 {
            processes.truncate(self.max_processes);
        }
        processes
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Navigation keys are hardwired (not configurable)
        match code {
            KeyCode::Up => return Action::Scroll(Scroll::Up),
            KeyCode::Down => return Action::Scroll(Scroll::Down),
            KeyCode::PageUp => return Action::Scroll(Scroll::PageUp),
            KeyCode::PageDown => return Action::Scroll(Scroll::PageDown),
            KeyCode::Home => return Action::Scroll(Scroll::Top),
            KeyCode::Esc => return Action::Quit,
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.sort {
            return Action::CycleSortMode;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        if code == kb.refresh {
            return Action::Refresh;
        }
        if code == kb.toggle_kernel {
            return Action::ToggleKernelThreads;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Scroll(scroll) => self.scroll_by(scroll),
            Action::CycleSortMode => {
                self.sort_mode = self.sort_mode.next();
                self.scroll = 0;
            }
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::ToggleKernelThreads => {
                self.show_kernel_threads = !self.show_kernel_threads;
                self.clamp_scroll();
            }
            Action::Refresh => self.refresh_data(),
            Action::None => {}
        }
    }

    fn scroll_by(&mut self, scroll: Scroll) {
        self.scroll = match scroll {
            Scroll::Up => self.scroll.saturating_sub(1),
            Scroll::Down => self.scroll.saturating_add(1),
            Scroll::PageUp => self.scroll.saturating_sub(PAGE_ROWS),
            Scroll::PageDown => self.scroll.saturating_add(PAGE_ROWS),
            Scroll::Top => 0,
        };
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let last = self.visible_processes().len().saturating_sub(1);
        self.scroll = self.scroll.min(last);
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::process::fixtures::stat_line;
    use crate::system::source::InMemorySource;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_test_app(config: Config) -> App<InMemorySource> {
        let mut source = InMemorySource::new();
        source.set_file("stat", "cpu 10 0 10 80 0 0 0 0 0 0\n");
        source.set_process(1, &stat_line(1, "init", 900, 100, 4 << 20), b"/sbin/init\0");
        source.set_process(2, &stat_line(2, "kthreadd", 0, 0, 0), b"");
        source.set_process(30, &stat_line(30, "Zsh", 10, 5, 64 << 20), b"-zsh\0");
        source.set_process(31, &stat_line(31, "awk", 300, 0, 1 << 20), b"awk\0{}\0");
        let collector = Collector::with_source(source).with_host_constants(100, 4096);
        App::with_collector(config, collector)
    }

    fn pids(app: &App<InMemorySource>) -> Vec<u32> {
        app.visible_processes().iter().map(|p| p.pid).collect()
    }

    #[test]
    fn sort_mode_cycles_through_all_variants() {
        let mut mode = SortMode::Cpu;
        for _ in 0..4 {
            mode = mode.next();
        }
        assert_eq!(mode, SortMode::Cpu);
        assert_eq!(SortMode::Cpu.next(), SortMode::Memory);
    }

    #[test]
    fn cpu_sort_falls_back_to_cumulative_ticks_on_first_tick() {
        let app = make_test_app(Config::default());
        assert_eq!(pids(&app), vec![1, 31, 30, 2]);
    }

    #[test]
    fn memory_pid_and_name_sorts() {
        let mut app = make_test_app(Config::default());
        app.dispatch(Action::CycleSortMode);
        assert_eq!(app.sort_mode, SortMode::Memory);
        assert_eq!(pids(&app), vec![30, 1, 31, 2]);

        app.dispatch(Action::CycleSortMode);
        assert_eq!(pids(&app), vec![1, 2, 30, 31]);

        app.dispatch(Action::CycleSortMode);
        assert_eq!(pids(&app), vec![31, 1, 2, 30]);
    }

    #[test]
    fn kernel_threads_can_be_hidden() {
        let mut app = make_test_app(Config::default());
        app.dispatch(Action::ToggleKernelThreads);
        assert!(!pids(&app).contains(&2));
        assert_eq!(pids(&app).len(), 3);
    }

    #[test]
    fn max_processes_caps_rows() {
        let mut config = Config::default();
        config.general.max_processes = 2;
        let app = make_test_app(config);
        assert_eq!(pids(&app), vec![1, 31]);
    }

    #[test]
    fn scroll_is_clamped_to_rows() {
        let mut app = make_test_app(Config::default());
        app.dispatch(Action::Scroll(Scroll::PageDown));
        assert_eq!(app.scroll, 3);
        app.dispatch(Action::Scroll(Scroll::Up));
        assert_eq!(app.scroll, 2);
        app.dispatch(Action::Scroll(Scroll::Top));
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn default_keybinds() {
        let app = make_test_app(Config::default());
        assert_eq!(app.map_key(press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.map_key(press(KeyCode::Esc)), Action::Quit);
        assert_eq!(app.map_key(press(KeyCode::Char('s'))), Action::CycleSortMode);
        assert_eq!(app.map_key(press(KeyCode::Char('?'))), Action::ToggleHelp);
        assert_eq!(app.map_key(press(KeyCode::Char('r'))), Action::Refresh);
        assert_eq!(
            app.map_key(press(KeyCode::Char('k'))),
            Action::ToggleKernelThreads
        );
        assert_eq!(
            app.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(app.map_key(press(KeyCode::Char('z'))), Action::None);
    }

    #[test]
    fn custom_keybind_remap_works() {
        let mut config = Config::default();
        config.keybinds.quit = "x".to_string();
        let app = make_test_app(config);
        assert_eq!(app.map_key(press(KeyCode::Char('x'))), Action::Quit);
        assert_eq!(app.map_key(press(KeyCode::Char('q'))), Action::None);
    }

    #[test]
    fn help_mode_blocks_other_keys() {
        let mut app = make_test_app(Config::default());
        app.dispatch(Action::ToggleHelp);
        assert!(app.show_help());
        assert_eq!(app.map_key(press(KeyCode::Char('q'))), Action::None);
        assert_eq!(app.map_key(press(KeyCode::Esc)), Action::ToggleHelp);
        app.dispatch(Action::ToggleHelp);
        assert!(!app.show_help());
    }

    #[test]
    fn quit_stops_running() {
        let mut app = make_test_app(Config::default());
        let action = app.map_key(press(KeyCode::Char('q')));
        app.dispatch(action);
        assert!(!app.running);
    }

    #[test]
    fn refresh_replaces_snapshot() {
        let mut app = make_test_app(Config::default());
        app.collector.source_mut().remove_process(31);
        app.dispatch(Action::Refresh);
        assert_eq!(app.snapshot.processes.len(), 3);
    }
}
