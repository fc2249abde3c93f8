use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::{io, time::Duration};
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, fmt};

mod app;
mod app_event;
mod config;
mod explorer;
mod ui;

use app::App;
use config::{AppConfig, ConfigManager};
use explorer::{CommandDispatcher, HttpTransport};

/// Browse and pull files from a remote agent session
#[derive(Debug, Parser)]
#[command(name = "fsbridge", version, about)]
struct Cli {
    /// Config file to use instead of the per-user one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the session backend
    #[arg(long)]
    backend_url: Option<String>,

    /// Bearer token for the backend
    #[arg(long, env = "FSBRIDGE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Session to interact with
    #[arg(short, long)]
    session: Option<String>,

    /// Where downloaded files are written
    #[arg(short, long)]
    download_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if let Some(url) = self.backend_url {
            config.backend_url = url;
        }
        if let Some(token) = self.token {
            config.token = Some(token);
        }
        if let Some(session) = self.session {
            config.session_id = Some(session);
        }
        if let Some(dir) = self.download_dir {
            config.download_dir = dir.to_string_lossy().into_owned();
        }
    }
}

fn init_logging(log_dir: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(log_dir).context("Failed to create log directory")?;

    let log_file = PathBuf::from(log_dir).join(format!(
        "fsbridge_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = File::create(&log_file).context("Failed to create log file")?;

    fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(EnvFilter::from_default_env().add_directive("fsbridge=debug".parse()?))
        .with_ansi(false)
        .with_writer(file)
        .init();

    Ok(log_file)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_file(path.clone()),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_config()?;
    cli.apply(&mut config);

    let log_file = init_logging(&config.log_dir)?;
    debug!("Logging to {:?}", log_file);
    info!("Using config {:?}", manager.config_path());

    let transport = HttpTransport::new(&config.http_options())?;
    info!(
        "Backend {} (session {})",
        transport.url(),
        config.session_id.as_deref().unwrap_or("-")
    );
    let dispatcher = CommandDispatcher::new(Arc::new(transport));
    let mut app = App::new(dispatcher, config.download_path());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }
    if let Some(reason) = &app.exit_reason {
        eprintln!("{}", reason);
    }
    info!("Exiting");

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.process_events();
        if app.should_quit {
            return Ok(());
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }

        // Let spawned requests make progress between frames
        tokio::task::yield_now().await;
    }
}
