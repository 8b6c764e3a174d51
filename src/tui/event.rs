//! Event types for the TUI
//!
//! This module implements a dual-channel event architecture:
//! - InputEvent: Priority channel for user input (never dropped)
//! - DataEvent: Data channel for poll results (may be dropped under load)

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::QueryInfo;

/// Input events from the terminal (priority channel - never dropped)
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Keyboard input
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
}

/// Data events from the poll task (data channel - may be dropped under load)
#[derive(Debug)]
pub enum DataEvent {
    /// A poll completed with a full snapshot of the query collection
    QueriesUpdated(Vec<QueryInfo>),

    /// A poll failed; prior data is kept and the cadence retries
    FetchError { error: String },
}

/// Result of processing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue running, UI needs redraw
    Continue,
    /// Continue running, no UI change needed
    Unchanged,
    /// Quit the application
    Quit,
}

/// Key action mappings for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Navigation
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    PageUp,
    PageDown,

    // Filter toggles (1-3 states, 4-7 error types)
    ToggleRunning,
    ToggleQueued,
    ToggleFinished,
    ToggleUserError,
    ToggleInternalError,
    ToggleResourcesError,
    ToggleExternalError,

    // View criteria
    OpenSearch,
    OpenSort,
    CycleReorderInterval,
    CycleMaxQueries,

    // Actions
    Select,
    YankQueryId,
    YankQueryText,

    // UI
    ShowHelp,
    Escape,
    Quit,

    // Search mode specific
    SearchClear,
    SearchBackspace,
    SearchChar(char),

    // Unknown/unhandled
    Unknown,
}

impl KeyAction {
    /// Map a key event to an action based on current mode
    pub fn from_key_event(event: KeyEvent, in_search_mode: bool) -> Self {
        let KeyEvent {
            code, modifiers, ..
        } = event;

        // Search mode captures printable characters
        if in_search_mode {
            return match code {
                KeyCode::Esc => KeyAction::Escape,
                KeyCode::Enter => KeyAction::Select,
                KeyCode::Backspace => KeyAction::SearchBackspace,
                KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
                    KeyAction::SearchClear
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
                KeyCode::Char(c) => KeyAction::SearchChar(c),
                _ => KeyAction::Unknown,
            };
        }

        // Normal mode mappings
        match code {
            // Quit
            KeyCode::Char('q') => KeyAction::Quit,

            // Ctrl+ combinations must come before bare character matches
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
            KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::PageDown,
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::PageUp,

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => KeyAction::MoveDown,
            KeyCode::Char('k') | KeyCode::Up => KeyAction::MoveUp,
            KeyCode::Char('g') | KeyCode::Home => KeyAction::MoveToTop,
            KeyCode::Char('G') | KeyCode::End => KeyAction::MoveToBottom,
            KeyCode::PageDown => KeyAction::PageDown,
            KeyCode::PageUp => KeyAction::PageUp,

            // Filter toggles
            KeyCode::Char('1') => KeyAction::ToggleRunning,
            KeyCode::Char('2') => KeyAction::ToggleQueued,
            KeyCode::Char('3') => KeyAction::ToggleFinished,
            KeyCode::Char('4') => KeyAction::ToggleInternalError,
            KeyCode::Char('5') => KeyAction::ToggleExternalError,
            KeyCode::Char('6') => KeyAction::ToggleResourcesError,
            KeyCode::Char('7') => KeyAction::ToggleUserError,

            // View criteria
            KeyCode::Char('/') => KeyAction::OpenSearch,
            KeyCode::Char('s') => KeyAction::OpenSort,
            KeyCode::Char('i') => KeyAction::CycleReorderInterval,
            KeyCode::Char('m') => KeyAction::CycleMaxQueries,

            // Actions
            KeyCode::Enter => KeyAction::Select,
            KeyCode::Char('y') => KeyAction::YankQueryId,
            KeyCode::Char('Y') => KeyAction::YankQueryText,

            // Help
            KeyCode::Char('?') | KeyCode::F(1) => KeyAction::ShowHelp,
            KeyCode::Esc => KeyAction::Escape,

            _ => KeyAction::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_action_quit() {
        let event = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(KeyAction::from_key_event(event, false), KeyAction::Quit);
    }

    #[test]
    fn test_key_action_navigation() {
        let event = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(KeyAction::from_key_event(event, false), KeyAction::MoveDown);

        let event = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE);
        assert_eq!(KeyAction::from_key_event(event, false), KeyAction::MoveUp);
    }

    #[test]
    fn test_search_mode_captures_characters() {
        let event = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        // 'q' quits in normal mode but is text in search mode
        assert_eq!(
            KeyAction::from_key_event(event, true),
            KeyAction::SearchChar('q')
        );
    }

    #[test]
    fn test_search_mode_ctrl_u() {
        let event = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(
            KeyAction::from_key_event(event, true),
            KeyAction::SearchClear
        );
        assert_eq!(KeyAction::from_key_event(event, false), KeyAction::PageUp);
    }
}
