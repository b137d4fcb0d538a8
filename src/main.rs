use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use persondesk::api::PersonClient;
use persondesk::app::{App, DetailsForm, PersonManager, Screen};
use persondesk::config::AppConfig;
use persondesk::theme::Theme;
use persondesk::ui;

#[derive(Parser, Debug)]
#[command(name = "persondesk")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "Capture and manage personal details records over a REST API")]
struct Args {
    /// Show only the submit-once details form
    #[arg(short, long)]
    simple: bool,

    /// Print saved persons as JSON and exit
    #[arg(short, long)]
    list: bool,

    /// Base URL of the API (overrides the config file)
    #[arg(short, long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, filtered by RUST_LOG)
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load().unwrap_or_default();
    if let Some(endpoint) = args.endpoint {
        config.base_url = endpoint.trim_end_matches('/').to_string();
    }

    let client = PersonClient::new(&config.base_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    let client = Arc::new(client);
    tracing::info!("Using API at {}", client.base_url());

    if args.list {
        return print_persons(&client).await;
    }

    ui::init_theme(Theme::load(config.theme_file.as_deref()));

    let screen = if args.simple {
        Screen::Simple(DetailsForm::new(client))
    } else {
        Screen::Manager(PersonManager::new(client))
    };

    run_tui(App::new(screen, config.notifications)).await
}

async fn print_persons(client: &PersonClient) -> Result<()> {
    let persons = client
        .list()
        .await
        .with_context(|| format!("Could not fetch saved persons from {}", client.base_url()))?;

    println!("{}", serde_json::to_string_pretty(&persons)?);
    Ok(())
}

async fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }

        // Apply finished requests
        app.tick();

        // Let spawned requests make progress between polls
        tokio::task::yield_now().await;
    }
}
