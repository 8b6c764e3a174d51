//! Sort key library and the sort/limit engine.
//!
//! Sort keys are derived f64 values in canonical units (epoch milliseconds,
//! duration milliseconds, bytes). Values that fail to parse key as 0.0, so
//! sorting is total and never aborts a refresh. The sort is Rust's stable
//! `sort_by`, which keeps equal keys in their prior relative order - the
//! reconciliation engine relies on that determinism.

use std::cmp::Ordering;

use crate::models::QueryInfo;

/// Named sort keys offered by the sort menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortType {
    #[default]
    Created,
    Elapsed,
    Execution,
    Cpu,
    CurrentMemory,
    CumulativeMemory,
}

impl SortType {
    pub const ALL: [SortType; 6] = [
        Self::Created,
        Self::Elapsed,
        Self::Cpu,
        Self::Execution,
        Self::CurrentMemory,
        Self::CumulativeMemory,
    ];

    /// Extract the numeric key this sort orders by.
    #[must_use]
    pub fn key(&self, query: &QueryInfo) -> f64 {
        match self {
            Self::Created => query.create_time_millis(),
            Self::Elapsed => query.elapsed_millis(),
            Self::Execution => query.execution_millis(),
            Self::Cpu => query.cpu_millis(),
            Self::CurrentMemory => query.current_memory_bytes(),
            Self::CumulativeMemory => query.cumulative_user_memory(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "Creation Time",
            Self::Elapsed => "Elapsed Time",
            Self::Execution => "Execution Time",
            Self::Cpu => "CPU Time",
            Self::CurrentMemory => "Current Memory",
            Self::CumulativeMemory => "Cumulative User Memory",
        }
    }
}

/// Sort direction transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Apply the direction to an ascending comparison.
    #[must_use]
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    /// Arrow glyph for menu/status display.
    #[must_use]
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Ascending => "^",
            Self::Descending => "v",
        }
    }
}

/// The sort/limit engine: order in place, then truncate.
///
/// `max_queries == 0` means unbounded. Keys that compare as NaN (not
/// producible by the key extractors, which substitute 0.0) would tie rather
/// than panic.
pub fn sort_and_limit(
    queries: &mut Vec<QueryInfo>,
    sort_type: SortType,
    sort_order: SortOrder,
    max_queries: usize,
) {
    queries.sort_by(|a, b| {
        let ordering = sort_type
            .key(a)
            .partial_cmp(&sort_type.key(b))
            .unwrap_or(Ordering::Equal);
        sort_order.apply(ordering)
    });

    if max_queries != 0 && queries.len() > max_queries {
        queries.truncate(max_queries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn make_query(id: &str, create_millis: i64) -> QueryInfo {
        let mut query = QueryInfo {
            query_id: id.to_string(),
            ..QueryInfo::default()
        };
        query.query_stats.create_time = DateTime::from_timestamp_millis(create_millis);
        query
    }

    fn ids(queries: &[QueryInfo]) -> Vec<&str> {
        queries.iter().map(|q| q.query_id.as_str()).collect()
    }

    #[test]
    fn test_sort_descending_by_creation() {
        let mut queries = vec![
            make_query("a", 1_000),
            make_query("b", 3_000),
            make_query("c", 2_000),
        ];
        sort_and_limit(&mut queries, SortType::Created, SortOrder::Descending, 0);
        assert_eq!(ids(&queries), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_ascending_by_creation() {
        let mut queries = vec![
            make_query("a", 1_000),
            make_query("b", 3_000),
            make_query("c", 2_000),
        ];
        sort_and_limit(&mut queries, SortType::Created, SortOrder::Ascending, 0);
        assert_eq!(ids(&queries), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut queries = vec![
            make_query("first", 1_000),
            make_query("second", 1_000),
            make_query("third", 1_000),
        ];
        sort_and_limit(&mut queries, SortType::Created, SortOrder::Descending, 0);
        assert_eq!(ids(&queries), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_truncation_keeps_top_ranked() {
        let mut queries = vec![
            make_query("a", 1_000),
            make_query("b", 5_000),
            make_query("c", 3_000),
            make_query("d", 4_000),
            make_query("e", 2_000),
        ];
        sort_and_limit(&mut queries, SortType::Created, SortOrder::Descending, 2);
        assert_eq!(ids(&queries), vec!["b", "d"]);
    }

    #[test]
    fn test_zero_max_is_unbounded() {
        let mut queries = (0..10)
            .map(|i| make_query(&i.to_string(), i * 100))
            .collect::<Vec<_>>();
        sort_and_limit(&mut queries, SortType::Created, SortOrder::Descending, 0);
        assert_eq!(queries.len(), 10);
    }

    #[test]
    fn test_duration_sort_uses_parse_sentinel() {
        let mut fast = make_query("fast", 0);
        fast.query_stats.total_cpu_time = "2s".to_string();
        let mut slow = make_query("slow", 0);
        slow.query_stats.total_cpu_time = "1m".to_string();
        let mut broken = make_query("broken", 0);
        broken.query_stats.total_cpu_time = "???".to_string();

        let mut queries = vec![fast, broken, slow];
        sort_and_limit(&mut queries, SortType::Cpu, SortOrder::Descending, 0);
        // Unparseable CPU time sorts as zero, last under descending
        assert_eq!(ids(&queries), vec!["slow", "fast", "broken"]);
    }

    #[test]
    fn test_current_memory_sort() {
        let mut small = make_query("small", 0);
        small.query_stats.user_memory_reservation = "10MB".to_string();
        let mut large = make_query("large", 0);
        large.query_stats.user_memory_reservation = "2GB".to_string();

        let mut queries = vec![small, large];
        sort_and_limit(&mut queries, SortType::CurrentMemory, SortOrder::Descending, 0);
        assert_eq!(ids(&queries), vec!["large", "small"]);
    }
}
