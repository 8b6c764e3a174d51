//! Terminal User Interface for qmon
//!
//! Interactive live view of the coordinator's query list:
//! - Polls once a second and merges snapshots without reshuffling the list
//! - Dual-channel event architecture (priority input, data channel)
//! - Keyboard-driven filtering, sorting, and search

pub mod app;
pub mod event;
pub mod runtime;
pub mod theme;
pub mod ui;

use std::io::{self, stdout, IsTerminal};
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::client::CoordinatorClient;
use crate::models::Config;
use crate::tui::app::App;
use crate::tui::runtime::{
    create_channels, run_event_loop, spawn_input_task, spawn_query_fetcher, QmonRuntime,
};

/// Terminal capability requirements for TUI mode
#[derive(Debug)]
pub struct TerminalCapabilities {
    pub is_tty: bool,
    pub term_type: String,
    pub supports_alternate_screen: bool,
}

impl TerminalCapabilities {
    /// Detect terminal capabilities
    pub fn detect() -> Self {
        let is_tty = stdout().is_terminal();
        let term_type = std::env::var("TERM").unwrap_or_default();

        let supports_alternate_screen = !matches!(term_type.as_str(), "dumb" | "" | "unknown");

        Self {
            is_tty,
            term_type,
            supports_alternate_screen,
        }
    }

    /// Check if terminal is suitable for TUI mode
    pub fn is_suitable(&self) -> bool {
        self.is_tty && self.supports_alternate_screen
    }

    /// Get error message for unsuitable terminal
    pub fn error_message(&self) -> String {
        if !self.is_tty {
            "TUI mode requires an interactive terminal (stdout is not a TTY).\n\
             Hint: Use 'qmon queries' for one-shot output instead."
                .to_string()
        } else if !self.supports_alternate_screen {
            format!(
                "Terminal type '{}' may not support TUI mode.\n\
                 Hint: Set TERM to a supported value (e.g., xterm-256color) or use 'qmon queries'.",
                if self.term_type.is_empty() {
                    "(unset)"
                } else {
                    &self.term_type
                }
            )
        } else {
            "Unknown terminal capability issue.".to_string()
        }
    }
}

/// Run the TUI application
pub async fn run_tui(config: Config) -> Result<()> {
    let capabilities = TerminalCapabilities::detect();
    if !capabilities.is_suitable() {
        bail!("{}", capabilities.error_message());
    }

    let client = CoordinatorClient::new(
        &config.server.url,
        Duration::from_millis(config.server.request_timeout_ms),
    )?;
    let poll_interval = Duration::from_millis(config.refresh.poll_interval_ms);

    let mut terminal = setup_terminal()?;

    let app = App::new(config);

    let (input_tx, input_rx, data_tx, data_rx) = create_channels();

    let mut runtime = QmonRuntime::new();
    runtime.track(spawn_input_task(input_tx, runtime.cancel_token()));
    runtime.track(spawn_query_fetcher(
        client,
        data_tx,
        runtime.cancel_token(),
        poll_interval,
    ));

    let result = run_event_loop(app, input_rx, data_rx, |app| {
        terminal.draw(|frame| ui::render(app, frame))?;
        Ok(())
    })
    .await;

    runtime.shutdown().await;

    restore_terminal(&mut terminal)?;

    result
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI with the tokio runtime (entry point from main)
pub fn run(config: Config) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_tui(config))
}
