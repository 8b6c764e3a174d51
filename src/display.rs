//! Display and formatting functions for one-shot query listings

use owo_colors::OwoColorize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::formatting::{format_short_time, truncate_string};
use crate::models::units::format_duration;
use crate::models::{ErrorType, QueryInfo, QueryState};

/// Format a query state with color for terminal output
pub fn format_query_state(query: &QueryInfo) -> String {
    let label = query.human_readable_state();

    match query.state {
        QueryState::Queued | QueryState::WaitingForResources => label.yellow().to_string(),
        QueryState::Running if query.query_stats.fully_blocked => label.magenta().to_string(),
        QueryState::Running
        | QueryState::Dispatching
        | QueryState::Planning
        | QueryState::Starting
        | QueryState::Finishing => label.green().to_string(),
        QueryState::Finished => label.blue().to_string(),
        QueryState::Failed => match query.error_type {
            Some(ErrorType::User) => label.bright_red().to_string(),
            _ => label.red().to_string(),
        },
        QueryState::Unknown => label.white().to_string(),
    }
}

#[derive(Tabled)]
struct QueryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Elapsed")]
    elapsed: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Query")]
    query: String,
}

/// Render a query list as a table plus a one-line summary.
///
/// `total_fetched` is the size of the unfiltered snapshot, shown so a
/// filtered listing makes clear how much it hides.
pub fn render_queries_list(queries: &[QueryInfo], total_fetched: usize) -> String {
    if queries.is_empty() {
        return if total_fetched == 0 {
            "No queries".to_string()
        } else {
            format!("No queries matched filters ({} fetched)", total_fetched)
        };
    }

    let rows: Vec<QueryRow> = queries
        .iter()
        .map(|query| QueryRow {
            id: query.query_id.clone(),
            created: query
                .query_stats
                .create_time
                .map(format_short_time)
                .unwrap_or_else(|| "-".to_string()),
            user: truncate_string(&query.session.user, 16),
            state: format_query_state(query),
            elapsed: query.query_stats.elapsed_time.clone(),
            cpu: query.query_stats.total_cpu_time.clone(),
            memory: query.query_stats.user_memory_reservation.clone(),
            query: truncate_string(
                &query.query.split_whitespace().collect::<Vec<_>>().join(" "),
                48,
            ),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()));

    format!(
        "{}\n{}",
        table,
        render_queries_summary(queries, total_fetched)
    )
}

/// One-line count summary by state category
pub fn render_queries_summary(queries: &[QueryInfo], total_fetched: usize) -> String {
    let queued = queries
        .iter()
        .filter(|q| q.state == QueryState::Queued)
        .count();
    let finished = queries
        .iter()
        .filter(|q| q.state == QueryState::Finished)
        .count();
    let failed = queries
        .iter()
        .filter(|q| q.state == QueryState::Failed)
        .count();
    let active = queries.len() - queued - finished - failed;
    let total_cpu: f64 = queries.iter().map(QueryInfo::cpu_millis).sum();

    format!(
        "{} shown of {} fetched: {} {}, {} {}, {} {}, {} {} | {} total CPU",
        queries.len(),
        total_fetched,
        active,
        "active".green(),
        queued,
        "queued".yellow(),
        finished,
        "finished".blue(),
        failed,
        "failed".red(),
        format_duration(total_cpu),
    )
}
