//! Small shared rendering helpers

use ratatui::prelude::*;
use ratatui::widgets::Row;

use crate::tui::theme::Theme;

/// Build a styled header row for a table
pub fn create_table_header<'a>(columns: &'a [&'a str], theme: &Theme) -> Row<'a> {
    Row::new(columns.iter().map(|c| Span::styled(*c, Style::default().fg(theme.header_fg).bold())))
}

/// Calculate the scroll offset needed to keep the selection visible
#[must_use]
pub fn calculate_scroll_offset(selected: usize, visible_height: usize, total: usize) -> usize {
    if total <= visible_height || visible_height == 0 {
        return 0;
    }
    if selected < visible_height {
        return 0;
    }
    (selected + 1 - visible_height).min(total - visible_height)
}

/// Centered sub-rectangle for overlays, sized in percent of the parent
#[must_use]
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}
