//! customer-manager binary entry point.
//!
//! Loads config, starts logging and the request runtime, then runs the TUI in
//! raw mode and restores the terminal on exit.
//!
use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use customer_manager::api::{CustomerClient, Dispatcher};
use customer_manager::app::keymap::Keymap;
use customer_manager::app::settings::Settings;
use customer_manager::app::{self, AppState, Theme};
use customer_manager::cli::Cli;
use customer_manager::logging;

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_dir = cli.config_dir.clone().unwrap_or_else(app::config_dir);
    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| config_dir.join("customer-manager.log"));
    logging::init(&log_path, &cli.log_level).map_err(|e| anyhow!(e))?;

    let mut settings = Settings::load_or_init(config_dir.join("settings.conf"));
    settings.apply_cli(&cli);
    tracing::info!(api_url = %settings.api_url, config_dir = %config_dir.display(), "starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("build request runtime")?;
    let client = CustomerClient::new(&settings.api_url, settings.request_timeout())
        .map_err(|e| anyhow!(e))?;
    let mut dispatcher = Dispatcher::new(client, runtime.handle().clone());

    let mut state = AppState::new(
        Theme::load_or_init(config_dir.join("theme.conf")),
        Keymap::load_or_init(config_dir.join("keybinds.conf")),
        settings.toast_duration(),
        settings.api_url.clone(),
    );

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, &mut state, &mut dispatcher);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err:#}");
    }
    Ok(())
}
