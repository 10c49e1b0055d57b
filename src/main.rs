//! gitlab-kiosk, a full-screen GitLab activity display for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  PollMsg   ┌──────────┐  draw()  ┌──────────┐
//! │  poll.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (thread) │  (channel) │ (state)  │          │ (render) │
//! └──────────┘            └──────────┘          └──────────┘
//!      │                       ▲
//!      │ owns                  │ handle_key_event()
//!      ▼                       │
//! ┌────────────────┐      ┌──────────┐
//! │ coordinator.rs │      │ input.rs │
//! └────────────────┘      └──────────┘
//!   │ source/ (fetch + Atom parse)
//!   │ activity.rs + summary.rs (classify)
//! ```
//!
//! * **`source/`**: the `FeedFetcher` trait, the HTTPS fetcher and the Atom
//!   parser.
//! * **`activity`**: turns entry titles into typed activities.
//! * **`coordinator`**: one poll plus the state kept between polls.
//! * **`poll`**: runs the coordinator on a timer on a background thread.
//! * **`app`** / **`ui`** / **`input`**: display state, drawing, keys.
//! * **`main`**: parse args, set up logging and the terminal, run the loop.

mod activity;
mod app;
mod config;
mod coordinator;
mod error;
mod input;
mod poll;
mod source;
mod summary;
mod ui;

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use app::App;
use config::{Cli, Config};
use coordinator::PollCoordinator;
use source::HttpFetcher;

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Enters raw mode + alternate screen on construction and restores the
/// terminal on [`Drop`], including during unwinding.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log to `log_file` when given; otherwise to stderr in one-shot mode and
/// nowhere in live mode, where stderr would scribble over the display.
fn init_logging(log_file: Option<&Path>, once: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if once => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref(), cli.once)?;

    let config = Config::resolve(&cli)?;
    tracing::info!(
        url = %config.feed_url,
        interval_ms = config.poll_interval.as_millis() as u64,
        verify_tls = config.verify_tls,
        "starting"
    );

    let fetcher = HttpFetcher::new(
        config.feed_url.clone(),
        config.request_timeout,
        !config.verify_tls,
    )?;
    let coordinator = PollCoordinator::new(fetcher, config.poll_policy()?);

    if cli.once {
        run_once(coordinator)
    } else {
        run_live(coordinator, &config)
    }
}

/// Poll once and print the list as plain text.
fn run_once(mut coordinator: PollCoordinator<HttpFetcher>) -> Result<()> {
    match coordinator.poll() {
        Ok(outcome) => {
            for record in &outcome.records {
                let text = ui::entry_text(record);
                let badge = if record.is_recent { " NEW!" } else { "" };
                println!("{}", text.heading);
                println!("  {}{badge}", text.meta);
                if let Some(detail) = text.detail {
                    println!("  {detail}");
                }
            }
            Ok(())
        }
        Err(err) => {
            eprintln!(
                "{}",
                coordinator.status().banner().unwrap_or_else(|| err.to_string())
            );
            Err(err.into())
        }
    }
}

/// Full-screen display with the poller on a background thread.
fn run_live(coordinator: PollCoordinator<HttpFetcher>, config: &Config) -> Result<()> {
    install_panic_hook();

    let poller = poll::spawn(coordinator, config.poll_interval);

    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(config.highlight_duration);

    // ~10 fps: drain poller messages, draw, wait briefly for a key.
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(msg) = poller.rx.try_recv() {
            app.apply(msg, Instant::now());
        }

        guard
            .terminal
            .draw(|f| ui::draw(&mut app, f, Instant::now()))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // Give the terminal back first; joining the poller can wait out an
    // in-flight request.
    drop(guard);
    poller.shutdown();
    Ok(())
}
