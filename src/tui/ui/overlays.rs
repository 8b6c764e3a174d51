//! Overlay rendering: help, sort menu, query detail

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};

use crate::formatting::{format_count, strip_query_text_whitespace, QUERY_SNIPPET_MAX_LEN};
use crate::models::units::format_data_size;
use crate::models::QueryInfo;
use crate::tui::app::sort::SortType;
use crate::tui::app::{App, SortMenuState};
use crate::tui::theme::Theme;

use super::widgets::centered_rect;

pub fn render_help_overlay(frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup);

    let lines = vec![
        "  j/k, Up/Down     Move selection",
        "  g/G              Jump to top/bottom",
        "  Ctrl+d/Ctrl+u    Page down/up",
        "",
        "  /                Search (debounced as you type)",
        "  Enter            Open query detail / apply",
        "  Esc              Clear search / close overlay",
        "",
        "  1/2/3            Toggle Running/Queued/Finished",
        "  4/5/6/7          Toggle Internal/External/Resources/User errors",
        "  s                Sort menu",
        "  i                Cycle reorder interval (1s/5s/10s/30s/off)",
        "  m                Cycle shown queries (20/50/100/all)",
        "",
        "  y / Y            Copy query id / query text",
        "  q, Ctrl+C        Quit",
    ];

    let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    let help = Paragraph::new(text)
        .style(Style::default().fg(theme.fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focused))
                .title(" Help "),
        );
    frame.render_widget(help, popup);
}

pub fn render_sort_overlay(
    app: &App,
    menu: &SortMenuState,
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
) {
    let popup = centered_rect(40, 40, area);
    frame.render_widget(Clear, popup);

    let items: Vec<ListItem> = SortType::ALL
        .iter()
        .enumerate()
        .map(|(i, sort_type)| {
            let is_active = app.list.criteria.sort_type == *sort_type;
            let is_cursor = menu.selected == i;

            let label = if is_active {
                format!(
                    " {} {} ",
                    sort_type.label(),
                    app.list.criteria.sort_order.indicator()
                )
            } else {
                format!(" {} ", sort_type.label())
            };

            let mut style = Style::default().fg(if is_active {
                theme.toolbar_active
            } else {
                theme.fg
            });
            if is_cursor {
                style = style.bg(theme.selected_bg);
            }
            ListItem::new(label).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_focused))
            .title(" Sort by "),
    );
    frame.render_widget(list, popup);
}

pub fn render_detail_overlay(query: &QueryInfo, frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup = centered_rect(80, 80, area);
    frame.render_widget(Clear, popup);

    let stats = &query.query_stats;
    let progress = query.progress();

    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled("State:    ", Style::default().fg(theme.header_fg)),
            Span::styled(
                query.human_readable_state(),
                Style::default().fg(theme.query_state_color(query)),
            ),
        ]),
        detail_line("User:     ", query.session.user.clone(), theme),
        detail_line(
            "Source:   ",
            query.session.source.clone().unwrap_or_else(|| "-".to_string()),
            theme,
        ),
        detail_line(
            "Group:    ",
            query.resource_group_path().unwrap_or_else(|| "-".to_string()),
            theme,
        ),
        detail_line(
            "Elapsed:  ",
            format!(
                "{}  (execution {}, cpu {})",
                stats.elapsed_time, stats.execution_time, stats.total_cpu_time
            ),
            theme,
        ),
        detail_line(
            "Memory:   ",
            format!(
                "{}  (total {}, peak {})",
                stats.user_memory_reservation,
                stats.total_memory_reservation,
                stats.peak_total_memory_reservation
            ),
            theme,
        ),
        detail_line(
            "Cumulative: ",
            format_data_size(query.cumulative_user_memory()),
            theme,
        ),
        detail_line(
            "Units:    ",
            format!(
                "{} completed, {} running, {} queued",
                format_count(progress.completed),
                format_count(progress.running),
                format_count(progress.queued)
            ),
            theme,
        ),
        Line::from(""),
    ];

    for text_line in strip_query_text_whitespace(&query.query, QUERY_SNIPPET_MAX_LEN).lines() {
        lines.push(Line::from(text_line.to_string()));
    }

    let detail = Paragraph::new(lines)
        .style(Style::default().fg(theme.fg))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focused))
                .title(format!(" {} ", query.query_id)),
        );
    frame.render_widget(detail, popup);
}

fn detail_line(label: &str, value: String, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(label.to_string(), Style::default().fg(theme.header_fg)),
        Span::raw(value),
    ])
}
