mod client;
mod conductor;
mod config;
mod models;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use client::{DirectoryClient, DirectorySource};
use conductor::Conductor;
use config::{AppConfig, ScreenLayout, APP_NAME};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{env, io, sync::Arc};
use tracing_subscriber::EnvFilter;
use tui::{app::App, event::EventHandler, ui};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory host, e.g. https://reqres.in
    #[arg(long, env("USER_DIRECTORY_BASE_URL"))]
    base_url: Option<String>,

    /// Path of the users resource relative to the base URL
    #[arg(long)]
    path: Option<String>,

    /// Screen layout (tabbed or single)
    #[arg(long, value_enum)]
    layout: Option<ScreenLayout>,

    /// Fetch once, print the directory to stdout and exit
    #[arg(long)]
    dump: bool,

    /// With --dump, print the decoded directory as JSON
    #[arg(long, requires = "dump")]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let mut config = AppConfig::load().context("Failed to load configuration")?;

    // Setup logging
    let log_name = format!("{}.log", APP_NAME);
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, log_name);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    // Priority: CLI flags > env vars > config.toml > defaults
    if let Some(base_url) = args
        .base_url
        .or_else(|| env::var("USER_DIRECTORY_BASE_URL").ok())
    {
        config.base_url = base_url;
    }
    if let Some(path) = args.path {
        config.users_path = path;
    }
    if let Some(layout) = args.layout {
        config.layout = layout;
    }

    // One client for the whole process, handed to everything that needs it.
    let client = DirectoryClient::new(
        config.base_url.clone(),
        config.users_path.clone(),
        config.request_timeout(),
    )?;
    tracing::info!(url = %client.users_url(), layout = ?config.layout, "starting");

    if args.dump {
        return run_headless(&client, args.json).await;
    }

    run_tui(Arc::new(client), config).await
}

async fn run_tui(source: Arc<dyn DirectorySource>, config: AppConfig) -> Result<()> {
    let mut event_handler = EventHandler::new(config.tick_rate());
    let conductor = Conductor::new(source, event_handler.sender());

    // Setup Terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(conductor, config);
    let result = event_loop(&mut terminal, &mut app, &mut event_handler).await;
    event_handler.stop();

    // Restore Terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        match event_handler.next().await {
            Some(event) => app.handle_event(event),
            None => break,
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

async fn run_headless(client: &DirectoryClient, json: bool) -> Result<()> {
    let directory = client
        .fetch_directory()
        .await
        .with_context(|| format!("Failed to fetch {}", client.users_url()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&directory)?);
        return Ok(());
    }

    if directory.is_empty() {
        println!("No users returned by {}", client.users_url());
        return Ok(());
    }

    println!("{} users from {}", directory.len(), client.users_url());
    for user in &directory.entries {
        println!("  {:>4}  {:<30}  {}", user.id, user.display_name(), user.email);
    }
    Ok(())
}
