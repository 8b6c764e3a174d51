//! Application state and core logic for the TUI
//!
//! The App struct owns the query list view-model and maps input/data events
//! onto its command methods. All mutation happens here, sequentially, driven
//! by the event loop.

// Submodules
pub mod filter;
pub mod reconcile;
pub mod sort;
mod state;

// Re-export public types
pub use state::{Debouncer, ListState, QueryListState, SortMenuState, ViewCriteria};

use std::time::{Duration, Instant};

use crate::models::{Config, QueryInfo};
use crate::tui::event::{DataEvent, EventResult, InputEvent, KeyAction};

use filter::{ErrorTypeFilter, StateFilter};

/// Reorder interval choices cycled by the `i` key (zero disables).
const REORDER_INTERVALS: [Duration; 5] = [
    Duration::from_millis(1_000),
    Duration::from_millis(5_000),
    Duration::from_millis(10_000),
    Duration::from_millis(30_000),
    Duration::ZERO,
];

/// Display cap choices cycled by the `m` key (zero means all).
const MAX_QUERIES_CHOICES: [usize; 4] = [20, 50, 100, 0];

/// Overlay / input mode state
#[derive(Debug, Default)]
pub enum ModalState {
    #[default]
    None,
    Help,
    Sort {
        menu: SortMenuState,
    },
    Detail,
    Search,
}

impl ModalState {
    #[must_use]
    pub fn is_search(&self) -> bool {
        matches!(self, ModalState::Search)
    }
}

/// Transient status-line feedback
#[derive(Debug, Default)]
pub struct FeedbackState {
    pub last_error: Option<String>,
    pub notice: Option<String>,
}

impl FeedbackState {
    pub fn set_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    pub fn set_notice(&mut self, message: String) {
        self.notice = Some(message);
    }
}

/// Main application state
pub struct App {
    // Lifecycle
    pub running: bool,

    // Overlay / input mode
    pub modal: ModalState,

    // The query list view-model
    pub list: QueryListState,
    pub list_state: ListState,

    // Search debounce
    search_debounce: Debouncer,

    // Feedback
    pub feedback: FeedbackState,

    // Configuration
    pub config: Config,
}

impl App {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let list = QueryListState::new(&config);
        let search_debounce =
            Debouncer::new(Duration::from_millis(config.behavior.search_debounce_ms));

        Self {
            running: true,
            modal: ModalState::None,
            list,
            list_state: ListState::default(),
            search_debounce,
            feedback: FeedbackState::default(),
            config,
        }
    }

    /// The query the selection cursor is on, if any.
    #[must_use]
    pub fn selected_query(&self) -> Option<&QueryInfo> {
        self.list.displayed.get(self.list_state.selected)
    }

    /// Deadline for the pending search settle, if one is armed. The event
    /// loop sleeps on this and calls [`App::settle_search`].
    #[must_use]
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search_debounce.deadline()
    }

    /// Fire the debounce if its quiet period has elapsed: one full
    /// re-derivation with the final search text.
    pub fn settle_search(&mut self) -> EventResult {
        if self.search_debounce.fire(Instant::now()) {
            self.list.settle_search();
            self.list_state.clamp(self.list.displayed.len());
            EventResult::Continue
        } else {
            EventResult::Unchanged
        }
    }

    /// Handle an input event
    pub fn handle_input(&mut self, event: InputEvent) -> EventResult {
        match event {
            InputEvent::Key(key_event) => {
                let action = KeyAction::from_key_event(key_event, self.modal.is_search());
                self.handle_action(action)
            }
            InputEvent::Resize(_, _) => EventResult::Continue,
        }
    }

    /// Handle a data event
    pub fn handle_data(&mut self, event: DataEvent) -> EventResult {
        match event {
            DataEvent::QueriesUpdated(queries) => {
                let mode = self.list.apply_snapshot(queries, Instant::now());
                self.list_state.clamp(self.list.displayed.len());
                self.feedback.last_error = None;
                tracing::trace!(?mode, displayed = self.list.displayed.len(), "refresh");
                EventResult::Continue
            }
            DataEvent::FetchError { error } => {
                self.list.apply_fetch_error();
                self.feedback.set_error(error);
                EventResult::Continue
            }
        }
    }

    /// Handle a key action
    fn handle_action(&mut self, action: KeyAction) -> EventResult {
        // Help overlay takes priority
        if matches!(self.modal, ModalState::Help) {
            return match action {
                KeyAction::Escape | KeyAction::ShowHelp | KeyAction::Quit => {
                    self.modal = ModalState::None;
                    EventResult::Continue
                }
                _ => EventResult::Unchanged,
            };
        }

        // Modal modes take priority over normal navigation
        match &self.modal {
            ModalState::Search => return self.handle_search_action(action),
            ModalState::Sort { .. } => return self.handle_sort_action(action),
            ModalState::Detail => return self.handle_detail_action(action),
            _ => {}
        }

        if let Some(result) = self.handle_navigation(&action) {
            return result;
        }

        if let Some(result) = self.handle_filter_toggle(&action) {
            return result;
        }

        match action {
            KeyAction::Quit => {
                self.running = false;
                EventResult::Quit
            }

            KeyAction::OpenSearch => {
                self.modal = ModalState::Search;
                EventResult::Continue
            }
            KeyAction::OpenSort => {
                self.modal = ModalState::Sort {
                    menu: SortMenuState::open_at(self.list.criteria.sort_type),
                };
                EventResult::Continue
            }
            KeyAction::CycleReorderInterval => {
                let next = next_choice(&REORDER_INTERVALS, self.list.reorder_interval);
                self.list.set_reorder_interval(next);
                self.list_state.clamp(self.list.displayed.len());
                EventResult::Continue
            }
            KeyAction::CycleMaxQueries => {
                let next = next_choice(&MAX_QUERIES_CHOICES, self.list.criteria.max_queries);
                self.list.set_max_queries(next);
                self.list_state.clamp(self.list.displayed.len());
                EventResult::Continue
            }

            KeyAction::Select => {
                if self.selected_query().is_some() {
                    self.modal = ModalState::Detail;
                }
                EventResult::Continue
            }
            KeyAction::YankQueryId => {
                self.yank_selected(|query| query.query_id.clone(), "query id");
                EventResult::Continue
            }
            KeyAction::YankQueryText => {
                self.yank_selected(|query| query.query.clone(), "query text");
                EventResult::Continue
            }

            KeyAction::ShowHelp => {
                self.modal = ModalState::Help;
                EventResult::Continue
            }
            KeyAction::Escape => {
                // Clear the active search when pressing escape
                if !self.list.criteria.search.is_empty() {
                    self.search_debounce.cancel();
                    self.list.set_search_text(String::new());
                    self.list.settle_search();
                    self.list_state.clamp(self.list.displayed.len());
                }
                EventResult::Continue
            }

            _ => EventResult::Unchanged,
        }
    }

    /// Handle navigation actions (returns Some if action was handled)
    fn handle_navigation(&mut self, action: &KeyAction) -> Option<EventResult> {
        let len = self.list.displayed.len();
        match action {
            KeyAction::MoveUp => self.list_state.move_up(len),
            KeyAction::MoveDown => self.list_state.move_down(len),
            KeyAction::MoveToTop => self.list_state.move_to_top(),
            KeyAction::MoveToBottom => self.list_state.move_to_bottom(len),
            KeyAction::PageUp => self.list_state.page_up(len),
            KeyAction::PageDown => self.list_state.page_down(len),
            _ => return None,
        }
        Some(EventResult::Continue)
    }

    /// Handle filter-toggle actions (returns Some if action was handled)
    fn handle_filter_toggle(&mut self, action: &KeyAction) -> Option<EventResult> {
        match action {
            KeyAction::ToggleRunning => self.list.toggle_state_filter(StateFilter::Running),
            KeyAction::ToggleQueued => self.list.toggle_state_filter(StateFilter::Queued),
            KeyAction::ToggleFinished => self.list.toggle_state_filter(StateFilter::Finished),
            KeyAction::ToggleUserError => {
                self.list.toggle_error_type_filter(ErrorTypeFilter::User)
            }
            KeyAction::ToggleInternalError => {
                self.list.toggle_error_type_filter(ErrorTypeFilter::Internal)
            }
            KeyAction::ToggleResourcesError => self
                .list
                .toggle_error_type_filter(ErrorTypeFilter::InsufficientResources),
            KeyAction::ToggleExternalError => {
                self.list.toggle_error_type_filter(ErrorTypeFilter::External)
            }
            _ => return None,
        }
        self.list_state.clamp(self.list.displayed.len());
        Some(EventResult::Continue)
    }

    fn handle_search_action(&mut self, action: KeyAction) -> EventResult {
        match action {
            KeyAction::Escape => {
                // Leave search entry; pending settle (if any) still fires
                self.modal = ModalState::None;
                EventResult::Continue
            }
            KeyAction::Select => {
                // Enter applies immediately without waiting for the debounce
                self.search_debounce.cancel();
                self.list.settle_search();
                self.list_state.clamp(self.list.displayed.len());
                self.modal = ModalState::None;
                EventResult::Continue
            }
            KeyAction::SearchChar(c) => {
                let mut search = self.list.criteria.search.clone();
                search.push(c);
                self.list.set_search_text(search);
                self.search_debounce.poke(Instant::now());
                EventResult::Continue
            }
            KeyAction::SearchBackspace => {
                let mut search = self.list.criteria.search.clone();
                search.pop();
                self.list.set_search_text(search);
                self.search_debounce.poke(Instant::now());
                EventResult::Continue
            }
            KeyAction::SearchClear => {
                self.list.set_search_text(String::new());
                self.search_debounce.poke(Instant::now());
                EventResult::Continue
            }
            KeyAction::Quit => {
                self.running = false;
                EventResult::Quit
            }
            _ => EventResult::Unchanged,
        }
    }

    fn handle_sort_action(&mut self, action: KeyAction) -> EventResult {
        let ModalState::Sort { menu } = &mut self.modal else {
            return EventResult::Unchanged;
        };

        match action {
            KeyAction::MoveUp => {
                menu.move_up();
                EventResult::Continue
            }
            KeyAction::MoveDown => {
                menu.move_down();
                EventResult::Continue
            }
            KeyAction::Select => {
                let sort_type = menu.current();
                self.list.select_sort(sort_type);
                self.list_state.clamp(self.list.displayed.len());
                self.modal = ModalState::None;
                EventResult::Continue
            }
            KeyAction::Escape | KeyAction::OpenSort | KeyAction::Quit => {
                self.modal = ModalState::None;
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    fn handle_detail_action(&mut self, action: KeyAction) -> EventResult {
        match action {
            KeyAction::Escape | KeyAction::Select | KeyAction::Quit => {
                self.modal = ModalState::None;
                EventResult::Continue
            }
            KeyAction::YankQueryId => {
                self.yank_selected(|query| query.query_id.clone(), "query id");
                EventResult::Continue
            }
            KeyAction::YankQueryText => {
                self.yank_selected(|query| query.query.clone(), "query text");
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    /// Copy a field of the selected query to the system clipboard.
    fn yank_selected(&mut self, extract: impl Fn(&QueryInfo) -> String, label: &str) {
        let Some(text) = self.selected_query().map(extract) else {
            return;
        };

        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => self.feedback.set_notice(format!("Copied {label}")),
            Err(e) => self.feedback.set_error(format!("Clipboard error: {e}")),
        }
    }
}

/// Next element after `current` in a cycle of choices, wrapping around.
fn next_choice<T: Copy + PartialEq>(choices: &[T], current: T) -> T {
    let pos = choices.iter().position(|c| *c == current);
    match pos {
        Some(i) => choices[(i + 1) % choices.len()],
        None => choices[0],
    }
}
