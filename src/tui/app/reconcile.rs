//! Reconciliation engine: merge a fresh snapshot into the displayed list.
//!
//! Polls are frequent (about one per second) and a full re-sort on every
//! cycle would reshuffle the list constantly. Instead, each cycle runs in one
//! of two modes, decided once from the time since the last full reorder:
//!
//! - `Incremental`: queries already displayed keep their positions (with
//!   refreshed statistics); newly admitted queries are sorted among
//!   themselves and appended at the end.
//! - `Reorder`: the survivors are re-checked against the current filters and
//!   the whole list is re-sorted.
//!
//! Either way the result is truncated to the display cap. Survivors are NOT
//! re-filtered in incremental mode: a query that stops matching mid-interval
//! stays visible until the next reorder tick.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::QueryInfo;

use super::filter::query_matches;
use super::sort::sort_and_limit;
use super::state::ViewCriteria;

/// How a refresh cycle treats the existing display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Keep the current order; only new queries are sorted and appended.
    Incremental,
    /// Re-filter everything and fully re-sort.
    Reorder,
}

impl RefreshMode {
    /// Decide the mode for this cycle. A zero interval means never reorder.
    #[must_use]
    pub fn decide(reorder_interval: Duration, last_reorder: Instant, now: Instant) -> Self {
        if !reorder_interval.is_zero() && now.duration_since(last_reorder) >= reorder_interval {
            Self::Reorder
        } else {
            Self::Incremental
        }
    }
}

/// Merge a fresh full snapshot against the previously displayed list.
///
/// Walks `previous` in order, emitting the fresh version of every query that
/// is still present (statistics may have changed, identity and position have
/// not). Queries in `fresh` that were not displayed before are filtered
/// against the current criteria and either folded into a full re-sort
/// (`Reorder`) or appended in their own sorted order (`Incremental`).
/// Unconsumed fresh queries keep their fetch order before sorting, so equal
/// sort keys resolve deterministically.
#[must_use]
pub fn merge_snapshot(
    previous: &[QueryInfo],
    fresh: &[QueryInfo],
    criteria: &ViewCriteria,
    mode: RefreshMode,
) -> Vec<QueryInfo> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(fresh.len());
    for (i, query) in fresh.iter().enumerate() {
        index.insert(query.query_id.as_str(), i);
    }

    let mut consumed = vec![false; fresh.len()];
    let mut updated: Vec<QueryInfo> = Vec::with_capacity(previous.len());
    for old in previous {
        if let Some(&i) = index.get(old.query_id.as_str())
            && !consumed[i]
        {
            updated.push(fresh[i].clone());
            consumed[i] = true;
        }
    }

    let mut new_queries: Vec<QueryInfo> = fresh
        .iter()
        .zip(&consumed)
        .filter(|&(_, &was_displayed)| !was_displayed)
        .map(|(query, _)| query.clone())
        .collect();
    new_queries.retain(|query| query_matches(query, criteria));

    match mode {
        RefreshMode::Reorder => {
            updated.retain(|query| query_matches(query, criteria));
            updated.append(&mut new_queries);
            sort_and_limit(&mut updated, criteria.sort_type, criteria.sort_order, 0);
        }
        RefreshMode::Incremental => {
            sort_and_limit(&mut new_queries, criteria.sort_type, criteria.sort_order, 0);
            updated.append(&mut new_queries);
        }
    }

    if criteria.max_queries != 0 && updated.len() > criteria.max_queries {
        updated.truncate(criteria.max_queries);
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QueryState, SessionInfo};
    use crate::tui::app::filter::StateFilter;
    use crate::tui::app::sort::{SortOrder, SortType};
    use chrono::DateTime;

    fn make_query(id: &str, state: QueryState, create_millis: i64) -> QueryInfo {
        let mut query = QueryInfo {
            query_id: id.to_string(),
            state,
            session: SessionInfo {
                user: "alice".to_string(),
                ..SessionInfo::default()
            },
            ..QueryInfo::default()
        };
        query.query_stats.create_time = DateTime::from_timestamp_millis(create_millis);
        query
    }

    fn running_criteria() -> ViewCriteria {
        ViewCriteria {
            state_filters: vec![StateFilter::Running, StateFilter::Queued],
            error_type_filters: vec![],
            search: String::new(),
            sort_type: SortType::Created,
            sort_order: SortOrder::Descending,
            max_queries: 0,
        }
    }

    fn ids(queries: &[QueryInfo]) -> Vec<&str> {
        queries.iter().map(|q| q.query_id.as_str()).collect()
    }

    #[test]
    fn test_mode_decision() {
        let start = Instant::now();
        let interval = Duration::from_millis(5_000);

        assert_eq!(
            RefreshMode::decide(interval, start, start + Duration::from_millis(1_000)),
            RefreshMode::Incremental
        );
        assert_eq!(
            RefreshMode::decide(interval, start, start + Duration::from_millis(5_000)),
            RefreshMode::Reorder
        );
        // Zero interval never reorders
        assert_eq!(
            RefreshMode::decide(Duration::ZERO, start, start + Duration::from_secs(3600)),
            RefreshMode::Incremental
        );
    }

    #[test]
    fn test_incremental_preserves_order_when_unchanged() {
        let criteria = running_criteria();
        let displayed = vec![
            make_query("a", QueryState::Running, 3_000),
            make_query("b", QueryState::Running, 1_000),
            make_query("c", QueryState::Running, 2_000),
        ];

        let next = merge_snapshot(&displayed, &displayed, &criteria, RefreshMode::Incremental);
        assert_eq!(ids(&next), ids(&displayed));

        // And again: byte-stable across repeated unchanged cycles
        let again = merge_snapshot(&next, &displayed, &criteria, RefreshMode::Incremental);
        assert_eq!(ids(&again), ids(&displayed));
    }

    #[test]
    fn test_incremental_refreshes_stats_in_place() {
        let criteria = running_criteria();
        let displayed = vec![make_query("a", QueryState::Running, 1_000)];

        let mut fresh = make_query("a", QueryState::Running, 1_000);
        fresh.query_stats.total_cpu_time = "9s".to_string();

        let next = merge_snapshot(
            &displayed,
            std::slice::from_ref(&fresh),
            &criteria,
            RefreshMode::Incremental,
        );
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].query_stats.total_cpu_time, "9s");
    }

    #[test]
    fn test_incremental_appends_sorted_new_queries() {
        let criteria = running_criteria();
        let displayed = vec![make_query("old", QueryState::Running, 5_000)];
        let fresh = vec![
            make_query("old", QueryState::Running, 5_000),
            make_query("new-early", QueryState::Running, 1_000),
            make_query("new-late", QueryState::Running, 2_000),
        ];

        let next = merge_snapshot(&displayed, &fresh, &criteria, RefreshMode::Incremental);
        // Existing entry keeps position; newcomers are sorted among
        // themselves (created desc) and appended after it
        assert_eq!(ids(&next), vec!["old", "new-late", "new-early"]);
    }

    #[test]
    fn test_incremental_filters_new_but_not_survivors() {
        let criteria = running_criteria();
        // "done" was admitted under earlier filters and already displayed
        let displayed = vec![
            make_query("done", QueryState::Finished, 2_000),
            make_query("live", QueryState::Running, 1_000),
        ];
        let fresh = vec![
            make_query("done", QueryState::Finished, 2_000),
            make_query("live", QueryState::Running, 1_000),
            make_query("new-done", QueryState::Finished, 3_000),
        ];

        let next = merge_snapshot(&displayed, &fresh, &criteria, RefreshMode::Incremental);
        // The finished survivor stays visible until the next reorder; the
        // finished newcomer is never admitted
        assert_eq!(ids(&next), vec!["done", "live"]);
    }

    #[test]
    fn test_reorder_refilters_survivors() {
        let criteria = running_criteria();
        let displayed = vec![
            make_query("done", QueryState::Finished, 2_000),
            make_query("live", QueryState::Running, 1_000),
        ];
        let fresh = displayed.clone();

        let next = merge_snapshot(&displayed, &fresh, &criteria, RefreshMode::Reorder);
        assert_eq!(ids(&next), vec!["live"]);
    }

    #[test]
    fn test_reorder_restores_global_order() {
        let criteria = running_criteria();

        // Simulate out-of-order admission across incremental cycles: t3
        // first, then t1, then t2
        let t3 = make_query("t3", QueryState::Running, 3_000);
        let t1 = make_query("t1", QueryState::Running, 1_000);
        let t2 = make_query("t2", QueryState::Running, 2_000);

        let mut displayed = merge_snapshot(
            &[],
            std::slice::from_ref(&t3),
            &criteria,
            RefreshMode::Incremental,
        );
        displayed = merge_snapshot(
            &displayed,
            &[t3.clone(), t1.clone()],
            &criteria,
            RefreshMode::Incremental,
        );
        displayed = merge_snapshot(
            &displayed,
            &[t3.clone(), t1.clone(), t2.clone()],
            &criteria,
            RefreshMode::Incremental,
        );
        assert_eq!(ids(&displayed), vec!["t3", "t1", "t2"]);

        // The next reorder cycle restores creation-descending order
        let reordered = merge_snapshot(
            &displayed,
            &[t3, t1, t2],
            &criteria,
            RefreshMode::Reorder,
        );
        assert_eq!(ids(&reordered), vec!["t3", "t2", "t1"]);
    }

    #[test]
    fn test_departed_queries_drop_out() {
        let criteria = running_criteria();
        let displayed = vec![
            make_query("a", QueryState::Running, 1_000),
            make_query("b", QueryState::Running, 2_000),
        ];
        let fresh = vec![make_query("b", QueryState::Running, 2_000)];

        let next = merge_snapshot(&displayed, &fresh, &criteria, RefreshMode::Incremental);
        assert_eq!(ids(&next), vec!["b"]);
    }

    #[test]
    fn test_truncation_applies_in_both_modes() {
        let mut criteria = running_criteria();
        criteria.max_queries = 2;

        let fresh: Vec<QueryInfo> = (0..5)
            .map(|i| make_query(&format!("q{i}"), QueryState::Running, i * 1_000))
            .collect();

        let incremental = merge_snapshot(&[], &fresh, &criteria, RefreshMode::Incremental);
        assert_eq!(ids(&incremental), vec!["q4", "q3"]);

        let reordered = merge_snapshot(&[], &fresh, &criteria, RefreshMode::Reorder);
        assert_eq!(ids(&reordered), vec!["q4", "q3"]);
    }

    #[test]
    fn test_no_duplicate_ids() {
        let criteria = running_criteria();
        let displayed = vec![make_query("a", QueryState::Running, 1_000)];
        let fresh = vec![
            make_query("a", QueryState::Running, 1_000),
            make_query("b", QueryState::Running, 2_000),
        ];

        let next = merge_snapshot(&displayed, &fresh, &criteria, RefreshMode::Incremental);
        let mut seen = std::collections::HashSet::new();
        assert!(next.iter().all(|q| seen.insert(q.query_id.clone())));
    }
}
