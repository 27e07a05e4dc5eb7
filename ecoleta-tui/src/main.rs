//! Terminal UI for ecoleta: pick recycling categories and browse collection points on a map.

mod app;
mod input;
mod ui;

use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration as StdDuration,
};

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ecoleta_core::{Config, EcoletaService, LocationConfig, Position};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::input::Action;

#[derive(Debug, Parser)]
#[command(name = "ecoleta", version, about = "Find recycling collection points near you")]
struct Cli {
    /// Configuration file (defaults to `<config dir>/ecoleta/config.yaml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL.
    #[arg(long)]
    api_url: Option<String>,

    /// State abbreviation to search in.
    #[arg(long)]
    uf: Option<String>,

    /// City to search in.
    #[arg(long)]
    city: Option<String>,

    /// Fixed device position as `LAT,LON`.
    #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
    location: Option<Position>,

    /// Log file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api_base_url.clone_from(url);
        }
        if let Some(position) = self.location {
            config.location = LocationConfig::from(position);
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    cli.apply(&mut config);

    let _log_guard = init_logging(&config.log_file())?;
    info!(api = %config.api_base_url, location = ?config.location, "starting ecoleta");

    // HTTP + service setup
    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .build()?;

    let api = ecoleta_api::collection_api(client.clone(), &config.api_base_url);
    let location = ecoleta_api::location_port(client, &config.location);
    let service = Arc::new(EcoletaService::new(api, location));

    // App state
    let mut app = App::new(service, cli.uf, cli.city);
    if app.has_prefilled_route() {
        app.open_points();
    }

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("ecoleta stopped");
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Apply finished requests before drawing
        app.pump();
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (small timeout so request results show up promptly)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
            && input::handle_key_event(key, &mut app) == Action::Quit
        {
            break;
        }
    }

    Ok(())
}

// The terminal owns stdout, so logs go to a file.
fn init_logging(path: &Path) -> Result<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("creating log directory {}", dir.display()))?;
    let file_name = path
        .file_name()
        .map_or_else(|| OsString::from("ecoleta.log"), ToOwned::to_owned);

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    Ok(guard)
}

fn parse_position(input: &str) -> Result<Position, String> {
    let (lat, lon) = input
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got `{input}`"))?;
    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|err| format!("invalid latitude `{lat}`: {err}"))?;
    let longitude: f64 = lon
        .trim()
        .parse()
        .map_err(|err| format!("invalid longitude `{lon}`: {err}"))?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("coordinates out of range: {input}"));
    }
    Ok(Position::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_argument_accepts_negative_pairs() {
        assert_eq!(
            parse_position("-23.55, -46.63"),
            Ok(Position::new(-23.55, -46.63)),
            "parsed"
        );
        assert!(parse_position("-23.55").is_err(), "missing longitude");
        assert!(parse_position("91,0").is_err(), "latitude out of range");
    }

    #[test]
    fn cli_overrides_config_file_values() {
        let cli = Cli::parse_from([
            "ecoleta",
            "--api-url",
            "http://10.0.0.5:3333",
            "--location",
            "-27.2,-49.6",
            "--uf",
            "SC",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.api_base_url, "http://10.0.0.5:3333", "url overridden");
        assert_eq!(
            config.location,
            LocationConfig::Fixed {
                latitude: -27.2,
                longitude: -49.6
            },
            "fixed location"
        );
        assert_eq!(cli.uf.as_deref(), Some("SC"), "uf kept for the home page");
    }
}
