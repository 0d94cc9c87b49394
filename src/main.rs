use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use crossterm::event::KeyEventKind;

use procviz::app::App;
use procviz::config::{self, Config, load_config, load_config_from_path};
use procviz::event::{Event, EventHandler};
use procviz::logging;
use procviz::system::collector::Collector;
use procviz::ui;

#[derive(Parser)]
#[command(name = "procviz", about = "Terminal dashboard for Linux CPU, memory and process load")]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Initial sort: cpu, memory, pid, name
    #[arg(long)]
    sort: Option<String>,

    /// Write tracing output to this file (filter from RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print one snapshot as JSON and exit, without a terminal UI.
    #[arg(long, default_value_t = false)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    if let Some(path) = &cli.log_file {
        logging::init_file_logging(path, config.general.log_json)
            .wrap_err_with(|| format!("cannot log to {}", path.display()))?;
    }

    let tick_rate = refresh_interval(&config)?;

    if cli.once {
        return print_once(tick_rate).await;
    }

    let mut terminal = ratatui::try_init().wrap_err("cannot take over the terminal")?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, config, tick_rate).await;

    ratatui::restore();

    result
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    config: Config,
    tick_rate: Duration,
) -> Result<()> {
    let mut app = App::new(config);
    let mut events = EventHandler::new(tick_rate);
    tracing::info!(interval_ms = tick_rate.as_millis() as u64, "sampling started");

    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        let mut should_draw = false;
        match event {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    let action = app.map_key(key);
                    app.dispatch(action);
                    should_draw = true;
                }
            }
            Event::Tick => {
                app.refresh_data();
                should_draw = true;
            }
            Event::Resize => should_draw = true,
            Event::Quit => app.running = false,
        }
        if should_draw && app.running {
            terminal.draw(|frame| ui::draw(frame, &app))?;
        }
    }

    tracing::info!("sampling stopped");
    Ok(())
}

/// Two samples one interval apart, so rates are real, then the second one as JSON.
async fn print_once(interval: Duration) -> Result<()> {
    let mut collector = Collector::new();
    collector.collect();
    tokio::time::sleep(interval).await;
    let snapshot = collector.collect();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn refresh_interval(config: &Config) -> Result<Duration> {
    match config.general.refresh_rate_ms {
        0 => Err(eyre!("refresh rate must be greater than 0")),
        ms => Ok(Duration::from_millis(ms)),
    }
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(ref sort) = cli.sort {
        config.general.default_sort = sort.clone();
    }

    config
}
