use anyhow::Result;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod app;
mod backend;
mod composer;
mod config;
mod dispatch;
mod handler;
mod session;
mod transcript;
mod tui;
mod ui;

use app::App;
use config::Config;

/// Log to a file under the config dir; the terminal belongs to the TUI.
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = Config::data_dir()?;
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(dir, "docchat.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_logging()?;

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!("could not load config, using defaults: {err:#}");
        Config::new()
    });
    tracing::info!(
        backend = config.backend_url(),
        user = config.user_id(),
        "starting session"
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(&config, tx);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    // One loop owns all state: input events and dispatch outcomes are
    // applied one at a time, each against the session as it currently
    // stands. In-flight requests never hold the transcript.
    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        tokio::select! {
            Some(event) = events.next() => handler::handle_event(&mut app, event)?,
            Some(outcome) = rx.recv() => app.apply_outcome(outcome),
            else => break,
        }
    }

    tui::restore()?;
    Ok(())
}
