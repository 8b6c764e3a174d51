//! Query list rendering
//!
//! The list shows the controller's `displayed` sequence as-is: the order is
//! the reconciliation engine's output and is never re-derived here.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::formatting::{format_short_time, truncate_string};
use crate::models::QueryInfo;
use crate::tui::app::App;
use crate::tui::theme::Theme;

use super::widgets::{calculate_scroll_offset, create_table_header};

pub fn render_query_list(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(format!(" Queries ({}) ", app.list.displayed.len()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.list.displayed.is_empty() {
        let label = if !app.list.initialized {
            "Loading..."
        } else if app.list.all_queries.is_empty() {
            "No queries"
        } else {
            "No queries matched filters"
        };
        let para = Paragraph::new(label)
            .style(Style::default().fg(theme.border))
            .alignment(Alignment::Center);
        frame.render_widget(para, inner);
        return;
    }

    let header = create_table_header(
        &["ID", "Created", "User", "State", "Elapsed", "CPU", "Mem", "%", "Query"],
        theme,
    );

    let available_height = inner.height.saturating_sub(1) as usize; // -1 for header
    let selected = app.list_state.selected;
    let scroll_offset =
        calculate_scroll_offset(selected, available_height, app.list.displayed.len());

    let rows: Vec<Row> = app
        .list
        .displayed
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(available_height)
        .map(|(idx, query)| query_to_row(query, idx == selected, theme))
        .collect();

    let widths = [
        Constraint::Length(26), // ID
        Constraint::Length(9),  // Created
        Constraint::Length(10), // User
        Constraint::Length(14), // State
        Constraint::Length(8),  // Elapsed
        Constraint::Length(8),  // CPU
        Constraint::Length(9),  // Memory
        Constraint::Length(4),  // Percent
        Constraint::Min(20),    // Query text
    ];

    let table = Table::new(rows, widths).header(header);
    frame.render_widget(table, inner);
}

fn query_to_row<'a>(query: &'a QueryInfo, is_selected: bool, theme: &Theme) -> Row<'a> {
    let state_color = theme.query_state_color(query);

    let created = query
        .query_stats
        .create_time
        .map(format_short_time)
        .unwrap_or_else(|| "-".to_string());

    // One line of normalized query text per row
    let snippet = truncate_string(
        query.query.split_whitespace().collect::<Vec<_>>().join(" ").as_str(),
        80,
    );

    let cells = vec![
        Cell::from(query.query_id.clone()),
        Cell::from(created),
        Cell::from(truncate_string(&query.session.user, 10)),
        Cell::from(query.human_readable_state())
            .style(Style::default().fg(state_color)),
        Cell::from(query.query_stats.elapsed_time.clone()),
        Cell::from(query.query_stats.total_cpu_time.clone()),
        Cell::from(query.query_stats.user_memory_reservation.clone()),
        Cell::from(format!("{}%", query.progress_percent())),
        Cell::from(snippet),
    ];

    let row = Row::new(cells);
    if is_selected {
        row.style(Style::default().bg(theme.selected_bg))
    } else {
        row
    }
}
