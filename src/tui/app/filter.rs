//! Query filtering logic: the predicate library and the filter engine.
//!
//! Inclusion is two-staged: a query must match at least one active state
//! filter or error-type filter, and - when a search term is set - must also
//! contain the term in one of its searchable fields. With no filters active
//! nothing matches; an empty view is a valid selection.

use crate::models::{ErrorType, QueryInfo, QueryState};

use super::state::ViewCriteria;

/// Named state predicates offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    /// Anything actively progressing: not queued, not finished, not failed.
    Running,
    Queued,
    Finished,
}

impl StateFilter {
    pub const ALL: [StateFilter; 3] = [Self::Running, Self::Queued, Self::Finished];

    /// Whether the query's state satisfies this predicate.
    ///
    /// `Running` is exclusion-based so planning/dispatching/finishing (and
    /// states this build does not know about) count as running-equivalent.
    #[must_use]
    pub fn matches(&self, query: &QueryInfo) -> bool {
        match self {
            Self::Running => !matches!(
                query.state,
                QueryState::Queued | QueryState::Finished | QueryState::Failed
            ),
            Self::Queued => query.state == QueryState::Queued,
            Self::Finished => query.state == QueryState::Finished,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Queued => "Queued",
            Self::Finished => "Finished",
        }
    }
}

/// Named error-type predicates for the Failed dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTypeFilter {
    User,
    Internal,
    InsufficientResources,
    External,
}

impl ErrorTypeFilter {
    pub const ALL: [ErrorTypeFilter; 4] = [
        Self::Internal,
        Self::External,
        Self::InsufficientResources,
        Self::User,
    ];

    /// The error category this filter admits.
    #[must_use]
    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::User => ErrorType::User,
            Self::Internal => ErrorType::Internal,
            Self::InsufficientResources => ErrorType::InsufficientResources,
            Self::External => ErrorType::External,
        }
    }

    /// Matches failed queries whose error type equals this filter's type.
    #[must_use]
    pub fn matches(&self, query: &QueryInfo) -> bool {
        query.state == QueryState::Failed && query.error_type == Some(self.error_type())
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User Error",
            Self::Internal => "Internal Error",
            Self::InsufficientResources => "Resources Error",
            Self::External => "External Error",
        }
    }
}

/// The filter engine: one inclusion test over a query.
///
/// Pure function over its inputs; applying it twice to already-filtered
/// input changes nothing.
#[must_use]
pub fn query_matches(query: &QueryInfo, criteria: &ViewCriteria) -> bool {
    let selected = criteria.state_filters.iter().any(|f| f.matches(query))
        || criteria
            .error_type_filters
            .iter()
            .any(|f| f.matches(query));
    if !selected {
        return false;
    }

    if criteria.search.is_empty() {
        return true;
    }

    let term = criteria.search.to_lowercase();
    query.query_id.to_lowercase().contains(&term)
        || query.human_readable_state().to_lowercase().contains(&term)
        || query.query.to_lowercase().contains(&term)
        || query.session.user.to_lowercase().contains(&term)
        || query
            .session
            .source
            .as_deref()
            .is_some_and(|source| source.to_lowercase().contains(&term))
        || query
            .resource_group_path()
            .is_some_and(|path| path.to_lowercase().contains(&term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionInfo;

    fn make_query(id: &str, state: QueryState) -> QueryInfo {
        QueryInfo {
            query_id: id.to_string(),
            state,
            session: SessionInfo {
                user: "alice".to_string(),
                source: Some("presto-cli".to_string()),
                principal: None,
            },
            resource_group_id: Some(vec!["global".to_string(), "adhoc".to_string()]),
            query: "SELECT count(*) FROM lineitem".to_string(),
            ..QueryInfo::default()
        }
    }

    fn criteria(
        state_filters: Vec<StateFilter>,
        error_type_filters: Vec<ErrorTypeFilter>,
        search: &str,
    ) -> ViewCriteria {
        ViewCriteria {
            state_filters,
            error_type_filters,
            search: search.to_string(),
            ..ViewCriteria::default()
        }
    }

    #[test]
    fn test_no_filters_matches_nothing() {
        let c = criteria(vec![], vec![], "");
        for state in [
            QueryState::Queued,
            QueryState::Running,
            QueryState::Finished,
            QueryState::Failed,
        ] {
            assert!(!query_matches(&make_query("q", state), &c));
        }
    }

    #[test]
    fn test_running_filter_is_exclusion_based() {
        let c = criteria(vec![StateFilter::Running], vec![], "");
        assert!(query_matches(&make_query("q", QueryState::Running), &c));
        assert!(query_matches(&make_query("q", QueryState::Planning), &c));
        assert!(query_matches(&make_query("q", QueryState::Finishing), &c));
        assert!(query_matches(&make_query("q", QueryState::Unknown), &c));
        assert!(!query_matches(&make_query("q", QueryState::Queued), &c));
        assert!(!query_matches(&make_query("q", QueryState::Finished), &c));
        assert!(!query_matches(&make_query("q", QueryState::Failed), &c));
    }

    #[test]
    fn test_error_type_filter_requires_failed_state() {
        let c = criteria(vec![], vec![ErrorTypeFilter::Internal], "");

        let mut query = make_query("q", QueryState::Failed);
        query.error_type = Some(ErrorType::Internal);
        assert!(query_matches(&query, &c));

        query.error_type = Some(ErrorType::User);
        assert!(!query_matches(&query, &c));

        // Matching error type on a non-failed query does not count
        query.state = QueryState::Running;
        query.error_type = Some(ErrorType::Internal);
        assert!(!query_matches(&query, &c));
    }

    #[test]
    fn test_search_requires_state_match_first() {
        // Search cannot resurrect a query excluded by state filters
        let c = criteria(vec![StateFilter::Queued], vec![], "alice");
        assert!(!query_matches(&make_query("q", QueryState::Running), &c));
    }

    #[test]
    fn test_search_fields() {
        let query = make_query("20260806_00042", QueryState::Running);
        let running = vec![StateFilter::Running];

        for term in ["00042", "run", "lineitem", "alice", "presto-cli", "global.adhoc"] {
            let c = criteria(running.clone(), vec![], term);
            assert!(query_matches(&query, &c), "term {:?} should match", term);
        }

        let c = criteria(running, vec![], "no-such-thing");
        assert!(!query_matches(&query, &c));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let query = make_query("q", QueryState::Running);
        let c = criteria(vec![StateFilter::Running], vec![], "ALICE");
        assert!(query_matches(&query, &c));
    }

    #[test]
    fn test_search_matches_human_readable_error_label() {
        let mut query = make_query("q", QueryState::Failed);
        query.error_type = Some(ErrorType::InsufficientResources);
        let c = criteria(
            vec![],
            vec![ErrorTypeFilter::InsufficientResources],
            "insufficient",
        );
        assert!(query_matches(&query, &c));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let queries: Vec<QueryInfo> = [
            QueryState::Running,
            QueryState::Queued,
            QueryState::Finished,
            QueryState::Failed,
        ]
        .iter()
        .enumerate()
        .map(|(i, &state)| make_query(&format!("q{i}"), state))
        .collect();

        let c = criteria(vec![StateFilter::Running, StateFilter::Queued], vec![], "");
        let once: Vec<&QueryInfo> = queries.iter().filter(|q| query_matches(q, &c)).collect();
        let twice: Vec<&QueryInfo> = once
            .iter()
            .copied()
            .filter(|q| query_matches(q, &c))
            .collect();

        assert_eq!(once.len(), 2);
        let once_ids: Vec<&str> = once.iter().map(|q| q.query_id.as_str()).collect();
        let twice_ids: Vec<&str> = twice.iter().map(|q| q.query_id.as_str()).collect();
        assert_eq!(once_ids, twice_ids);
    }
}
