//! TUI rendering
//!
//! Pure presentation: everything here reads the App state and paints it.
//! Ordering, filtering, and timing decisions all happen in the app layer.

pub mod overlays;
pub mod queries;
pub mod widgets;

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::tui::app::filter::{ErrorTypeFilter, StateFilter};
use crate::tui::app::{App, ModalState};
use crate::tui::theme::{Theme, ThemeName};

/// Render the whole frame
pub fn render(app: &App, frame: &mut Frame) {
    let theme = Theme::new(ThemeName::from_str(&app.config.display.theme));

    let chunks = Layout::vertical([
        Constraint::Length(2), // toolbar
        Constraint::Min(3),    // query list
        Constraint::Length(1), // status line
    ])
    .split(frame.area());

    render_toolbar(app, frame, chunks[0], &theme);
    queries::render_query_list(app, frame, chunks[1], &theme);
    render_status_line(app, frame, chunks[2], &theme);

    match &app.modal {
        ModalState::Help => overlays::render_help_overlay(frame, frame.area(), &theme),
        ModalState::Sort { menu } => {
            overlays::render_sort_overlay(app, menu, frame, frame.area(), &theme)
        }
        ModalState::Detail => {
            if let Some(query) = app.selected_query() {
                overlays::render_detail_overlay(query, frame, frame.area(), &theme);
            }
        }
        _ => {}
    }
}

fn render_toolbar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

    // Line 1: search box
    let search_label = if app.modal.is_search() {
        format!("Search: {}_", app.list.criteria.search)
    } else if app.list.criteria.search.is_empty() {
        "Search (/): user, source, query id, resource group, or query text".to_string()
    } else {
        format!("Search: {}", app.list.criteria.search)
    };
    let search_style = if app.modal.is_search() || !app.list.criteria.search.is_empty() {
        Style::default().fg(theme.toolbar_active)
    } else {
        Style::default().fg(theme.toolbar_inactive)
    };
    frame.render_widget(Paragraph::new(search_label).style(search_style), rows[0]);

    // Line 2: filter chips, sort, cadence settings
    let mut spans: Vec<Span> = vec![Span::styled("State:", Style::default().fg(theme.fg))];
    for filter in StateFilter::ALL {
        spans.push(Span::raw(" "));
        spans.push(chip(
            filter.label(),
            app.list.has_state_filter(filter),
            theme,
        ));
    }

    spans.push(Span::styled("  Failed:", Style::default().fg(theme.fg)));
    for filter in ErrorTypeFilter::ALL {
        spans.push(Span::raw(" "));
        spans.push(chip(
            filter.label(),
            app.list.has_error_type_filter(filter),
            theme,
        ));
    }

    spans.push(Span::styled(
        format!(
            "  Sort: {} {}",
            app.list.criteria.sort_type.label(),
            app.list.criteria.sort_order.indicator()
        ),
        Style::default().fg(theme.toolbar_active),
    ));
    spans.push(Span::styled(
        format!("  Reorder: {}", format_interval(app)),
        Style::default().fg(theme.fg),
    ));
    spans.push(Span::styled(
        format!("  Show: {}", format_max(app)),
        Style::default().fg(theme.fg),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), rows[1]);
}

fn chip<'a>(label: &'a str, active: bool, theme: &Theme) -> Span<'a> {
    if active {
        Span::styled(format!("[{label}]"), Style::default().fg(theme.toolbar_active))
    } else {
        Span::styled(
            format!(" {label} "),
            Style::default().fg(theme.toolbar_inactive),
        )
    }
}

fn format_interval(app: &App) -> String {
    let interval = app.list.reorder_interval;
    if interval.is_zero() {
        "off".to_string()
    } else {
        format!("{}s", interval.as_secs_f64())
    }
}

fn format_max(app: &App) -> String {
    match app.list.criteria.max_queries {
        0 => "all".to_string(),
        n => n.to_string(),
    }
}

fn render_status_line(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let (message, style) = if let Some(error) = &app.feedback.last_error {
        (
            format!("Fetch failed: {error} (retrying)"),
            Style::default().fg(theme.error_fg),
        )
    } else if let Some(notice) = &app.feedback.notice {
        (notice.clone(), Style::default().fg(theme.notice_fg))
    } else if !app.list.initialized {
        ("Connecting...".to_string(), Style::default().fg(theme.fg))
    } else {
        (
            format!(
                "{} queries fetched, {} shown",
                app.list.all_queries.len(),
                app.list.displayed.len()
            ),
            Style::default().fg(theme.fg),
        )
    };

    let line = Line::from(vec![
        Span::styled(message, style),
        Span::styled("  |  ? help  q quit", Style::default().fg(theme.toolbar_inactive)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
