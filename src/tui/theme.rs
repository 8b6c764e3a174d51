//! Theme definitions for the TUI
//!
//! Colorblind-safe themes for dark and light terminals. The default is
//! "dark"; users can pick "light" via config file or the QMON_THEME
//! environment variable.

use ratatui::style::Color;

use crate::models::{ErrorType, QueryInfo, QueryState};

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl ThemeName {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "light" => ThemeName::Light,
            _ => ThemeName::Dark,
        }
    }
}

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub fg: Color,
    pub border: Color,
    pub border_focused: Color,

    // Query state colors
    pub queued: Color,
    pub running: Color,
    pub blocked: Color,
    pub finished: Color,
    pub failed: Color,
    pub user_error: Color,

    // UI elements
    pub selected_bg: Color,
    pub header_fg: Color,
    pub toolbar_active: Color,
    pub toolbar_inactive: Color,
    pub error_fg: Color,
    pub notice_fg: Color,
}

impl Theme {
    #[must_use]
    pub fn new(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    fn dark() -> Self {
        Self {
            fg: Color::Gray,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            queued: Color::Yellow,
            running: Color::Green,
            blocked: Color::Magenta,
            finished: Color::Blue,
            failed: Color::Red,
            user_error: Color::LightRed,

            selected_bg: Color::Rgb(40, 60, 80),
            header_fg: Color::Cyan,
            toolbar_active: Color::Cyan,
            toolbar_inactive: Color::DarkGray,
            error_fg: Color::Red,
            notice_fg: Color::Green,
        }
    }

    fn light() -> Self {
        Self {
            fg: Color::Black,
            border: Color::Gray,
            border_focused: Color::Blue,

            queued: Color::Rgb(160, 120, 0),
            running: Color::Rgb(0, 120, 0),
            blocked: Color::Rgb(140, 0, 140),
            finished: Color::Blue,
            failed: Color::Red,
            user_error: Color::Rgb(180, 60, 60),

            selected_bg: Color::Rgb(200, 220, 240),
            header_fg: Color::Blue,
            toolbar_active: Color::Blue,
            toolbar_inactive: Color::Gray,
            error_fg: Color::Red,
            notice_fg: Color::Rgb(0, 120, 0),
        }
    }

    /// Color for a query row's state cell.
    #[must_use]
    pub fn query_state_color(&self, query: &QueryInfo) -> Color {
        match query.state {
            QueryState::Queued | QueryState::WaitingForResources => self.queued,
            QueryState::Running if query.query_stats.fully_blocked => self.blocked,
            QueryState::Running
            | QueryState::Dispatching
            | QueryState::Planning
            | QueryState::Starting
            | QueryState::Finishing => self.running,
            QueryState::Finished => self.finished,
            QueryState::Failed => match query.error_type {
                Some(ErrorType::User) => self.user_error,
                _ => self.failed,
            },
            QueryState::Unknown => self.fg,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeName::Dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_name_parsing() {
        assert_eq!(ThemeName::from_str("light"), ThemeName::Light);
        assert_eq!(ThemeName::from_str("LIGHT"), ThemeName::Light);
        assert_eq!(ThemeName::from_str("dark"), ThemeName::Dark);
        assert_eq!(ThemeName::from_str("anything"), ThemeName::Dark);
    }

    #[test]
    fn test_blocked_color_overrides_running() {
        let theme = Theme::default();
        let mut query = QueryInfo {
            state: QueryState::Running,
            ..QueryInfo::default()
        };
        assert_eq!(theme.query_state_color(&query), theme.running);

        query.query_stats.fully_blocked = true;
        assert_eq!(theme.query_state_color(&query), theme.blocked);
    }
}
