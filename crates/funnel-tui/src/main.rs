//! Funnel TUI - interactive search box over the Sales Funnel lists
//!
//! Type to search (debounced), press Enter to search immediately, switch
//! the searched field with Ctrl-F and narrow the results by list with the
//! arrow keys.

mod app;
mod ui;

use std::fs::{self, File};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use funnel_core::config::Config;
use funnel_core::search::SearchService;
use funnel_core::sharepoint::SharePointClient;
use funnel_core::view::SearchView;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;

/// Log file inside the config directory; stderr belongs to the terminal UI
const LOG_FILE: &str = "funnel-tui.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging()?;

    let config = Config::load().context("Failed to load configuration")?;
    let site = std::env::var("FUNNEL_SITE_URL").ok();
    let client = SharePointClient::from_config(&config, site.as_deref())?;
    let service = SearchService::new(Arc::new(client))
        .with_page_size(config.search.page_size)
        .with_min_query_len(config.search.min_query_len);
    let view = SearchView::with_settings(Arc::new(service), config.search.clone().into());
    let mut app = App::new(view, &config.web_part.title, &config.web_part.placeholder);

    info!("Starting funnel-tui");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging() -> anyhow::Result<()> {
    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir).context("Failed to create config directory")?;
    let file = File::create(dir.join(LOG_FILE)).context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("funnel=info".parse()?),
        )
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    while !app.should_quit {
        let state = app.view.current_state();
        terminal.draw(|frame| ui::draw(frame, app, &state))?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}
