//! Wikilens TUI - terminal explorer for Wikidata entities
//!
//! This TUI provides:
//! - Free-text entity search with image-aware result cards
//! - A force-directed graph of the results with pan, zoom and drag
//! - AI-generated entity profiles with web sources
//! - Pairwise comparison and corpus-level semantic clusters

mod app;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};

use wikilens_core::config::Config;
use wikilens_core::error::Error;
use wikilens_core::explorer::{Effect, Outcome};
use wikilens_core::insight::{GeminiClient, InsightService};
use wikilens_core::visualization::Theme;
use wikilens_core::wikidata::{EntityRepository, WikidataClient};

use crate::app::{App, UnconfiguredInsight};

const LOG_FILE: &str = "wikilens.log";

#[derive(Parser)]
#[command(name = "wikilens")]
#[command(author, version, about = "Explore Wikidata entities with AI insight", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Search to run on startup
    query: Vec<String>,

    /// Colour theme (overrides ui.theme)
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,

    /// Delete the config file before starting
    #[arg(long)]
    reset_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Light => Theme::Light,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(Commands::Config { action }) = cli.command {
        return cmd_config(action);
    }

    if cli.reset_config {
        Config::reset()?;
    }
    let config = Config::load().context("Failed to load configuration")?;
    let log_path = init_logging()?;
    info!(log = %log_path.display(), "Wikilens starting");

    let theme = match cli.theme {
        Some(arg) => arg.into(),
        None => config.ui.theme.parse::<Theme>()?,
    };

    let repository: Arc<dyn EntityRepository> = Arc::new(
        WikidataClient::new(config.wikidata.clone()).context("Failed to create Wikidata client")?,
    );
    let mut app = match GeminiClient::from_env(config.insight.clone()) {
        Ok(client) => App::new(repository, Arc::new(client), &config, theme),
        Err(Error::ApiKeyMissing) => {
            warn!("No generative AI key found, insight features disabled");
            let insight: Arc<dyn InsightService> = Arc::new(UnconfiguredInsight);
            App::new(repository, insight, &config, theme).without_insight()
        }
        Err(e) => return Err(e.into()),
    };

    let query = cli.query.join(" ");
    let initial = (!query.trim().is_empty()).then_some(query);
    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms.max(10));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app, tick_rate, initial);
    app.teardown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("Wikilens stopped");
    result
}

/// Send logs to a file in the config directory so the terminal stays clean
fn init_logging() -> anyhow::Result<PathBuf> {
    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wikilens=info".parse()?),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(path)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick_rate: Duration,
    initial: Option<String>,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();

    if let Some(query) = initial {
        let effects = app.search(&query);
        spawn_effects(app, effects, &tx);
    }

    loop {
        while let Ok(outcome) = rx.try_recv() {
            let effects = app.apply(outcome);
            spawn_effects(app, effects, &tx);
        }

        app.graph.tick();
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Handle input
        if event::poll(tick_rate)? {
            let effects = match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => Vec::new(),
            };
            spawn_effects(app, effects, &tx);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Run each effect on the runtime and report its outcome to the loop
fn spawn_effects(app: &App, effects: Vec<Effect>, tx: &UnboundedSender<Outcome>) {
    for effect in effects {
        let dispatcher = app.explorer.dispatcher();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = dispatcher.run(effect).await;
            // Receiver is gone once the loop has exited
            let _ = tx.send(outcome);
        });
    }
}

fn cmd_config(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            println!("Configuration reset to defaults.");
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
