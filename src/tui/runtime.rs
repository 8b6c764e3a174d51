//! Async runtime and task management for the TUI
//!
//! This module implements the dual-channel event-driven architecture:
//! - Input channel (priority): User input events that are never dropped
//! - Data channel: Poll results that may be dropped under backpressure
//!
//! The main loop uses `tokio::select!` with bias toward the input channel to
//! prevent input starvation, plus a deadline branch that fires the search
//! debounce. The poll task schedules each fetch a fixed delay after the
//! previous one completes, so slow responses self-throttle and responses are
//! consumed in issuance order.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::CoordinatorClient;
use crate::tui::app::App;
use crate::tui::event::{DataEvent, EventResult, InputEvent};

/// Channel capacities
const INPUT_CHANNEL_CAPACITY: usize = 16;
const DATA_CHANNEL_CAPACITY: usize = 8;

/// TUI runtime managing all background tasks
pub struct QmonRuntime {
    cancel_token: CancellationToken,
    task_handles: Vec<JoinHandle<()>>,
}

impl QmonRuntime {
    /// Create a new TUI runtime
    pub fn new() -> Self {
        Self {
            cancel_token: CancellationToken::new(),
            task_handles: Vec::new(),
        }
    }

    /// Get a clone of the cancellation token for spawning tasks
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Add a task handle to track
    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.task_handles.push(handle);
    }

    /// Signal shutdown and wait for tasks to complete
    pub async fn shutdown(self) {
        self.cancel_token.cancel();

        let shutdown = async {
            for handle in self.task_handles {
                let _ = handle.await;
            }
        };

        tokio::select! {
            _ = shutdown => {}
            _ = tokio::time::sleep(Duration::from_secs(2)) => {
                // Tasks did not stop in time; they will be dropped
            }
        }
    }
}

/// Spawn the input event reader task
pub fn spawn_input_task(tx: mpsc::Sender<InputEvent>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = EventStream::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                maybe_event = reader.next() => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            let input_event = match event {
                                Event::Key(key) => Some(InputEvent::Key(key)),
                                Event::Resize(w, h) => Some(InputEvent::Resize(w, h)),
                                _ => None,
                            };

                            if let Some(evt) = input_event
                                && tx.send(evt).await.is_err()
                            {
                                break; // Receiver dropped
                            }
                        }
                        Some(Err(e)) => {
                            let is_fatal = matches!(
                                e.kind(),
                                std::io::ErrorKind::BrokenPipe
                                    | std::io::ErrorKind::ConnectionReset
                                    | std::io::ErrorKind::UnexpectedEof
                            );

                            if is_fatal {
                                tracing::info!("Terminal disconnected: {:?}", e);
                                break;
                            } else {
                                tracing::warn!("Terminal event read error: {:?}", e);
                            }
                        }
                        None => break, // Stream ended
                    }
                }
            }
        }
    })
}

/// Spawn the query poll task.
///
/// Fetches immediately on start, then waits `poll_interval` after each
/// completion before the next fetch. There is never more than one request in
/// flight; a failed fetch is reported and the cadence carries on.
pub fn spawn_query_fetcher(
    client: CoordinatorClient,
    tx: mpsc::Sender<DataEvent>,
    cancel: CancellationToken,
    poll_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        fetch_and_send(&client, &tx).await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(poll_interval) => {
                    fetch_and_send(&client, &tx).await;
                }
            }
        }
    })
}

async fn fetch_and_send(client: &CoordinatorClient, tx: &mpsc::Sender<DataEvent>) {
    let event = match client.fetch_queries().await {
        Ok(queries) => DataEvent::QueriesUpdated(queries),
        Err(e) => {
            tracing::warn!("query fetch failed: {}", e);
            DataEvent::FetchError {
                error: e.to_string(),
            }
        }
    };

    if tx.try_send(event).is_err() {
        tracing::debug!("data channel full, dropping poll result");
    }
}

/// Run the main TUI event loop
pub async fn run_event_loop(
    mut app: App,
    mut input_rx: mpsc::Receiver<InputEvent>,
    mut data_rx: mpsc::Receiver<DataEvent>,
    mut render_fn: impl FnMut(&App) -> Result<()>,
) -> Result<()> {
    let mut needs_render = true;

    loop {
        if needs_render {
            render_fn(&app)?;
            needs_render = false;
        }

        if !app.running {
            break;
        }

        let search_deadline = app.search_deadline();

        tokio::select! {
            // Bias toward input channel to prevent input starvation
            biased;

            Some(input) = input_rx.recv() => {
                match app.handle_input(input) {
                    EventResult::Continue => needs_render = true,
                    EventResult::Unchanged => {}
                    EventResult::Quit => break,
                }
            }

            Some(data) = data_rx.recv() => {
                match app.handle_data(data) {
                    EventResult::Continue => needs_render = true,
                    EventResult::Unchanged => {}
                    EventResult::Quit => break,
                }
            }

            // Search debounce: sleep until the deadline, if one is armed.
            // A new keystroke supersedes it on the next loop iteration.
            _ = sleep_until_deadline(search_deadline) => {
                if app.settle_search() == EventResult::Continue {
                    needs_render = true;
                }
            }
        }
    }

    Ok(())
}

/// Sleep until the given instant, or forever when there is no deadline.
async fn sleep_until_deadline(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        }
        None => std::future::pending().await,
    }
}

/// Create the dual channels for the TUI
pub fn create_channels() -> (
    mpsc::Sender<InputEvent>,
    mpsc::Receiver<InputEvent>,
    mpsc::Sender<DataEvent>,
    mpsc::Receiver<DataEvent>,
) {
    let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
    let (data_tx, data_rx) = mpsc::channel(DATA_CHANNEL_CAPACITY);
    (input_tx, input_rx, data_tx, data_rx)
}
