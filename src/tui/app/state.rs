//! View-model state for the query list.
//!
//! `QueryListState` is the single owner of everything the renderer reads:
//! the last snapshot, the displayed (ordered) list, the active criteria, and
//! the refresh/reorder timestamps. All mutation happens through its command
//! methods, called sequentially from the event loop, so no locking is
//! involved. Methods that depend on time take an explicit `now` so the
//! reconciliation paths stay deterministic under test.

use std::time::{Duration, Instant};

use crate::models::{Config, QueryInfo};

use super::filter::{query_matches, ErrorTypeFilter, StateFilter};
use super::reconcile::{merge_snapshot, RefreshMode};
use super::sort::{sort_and_limit, SortOrder, SortType};

/// The user-controlled view criteria: filters, search, sort, display cap.
#[derive(Debug, Clone)]
pub struct ViewCriteria {
    pub state_filters: Vec<StateFilter>,
    pub error_type_filters: Vec<ErrorTypeFilter>,
    pub search: String,
    pub sort_type: SortType,
    pub sort_order: SortOrder,
    /// 0 means unbounded.
    pub max_queries: usize,
}

impl Default for ViewCriteria {
    fn default() -> Self {
        Self {
            state_filters: vec![StateFilter::Running, StateFilter::Queued],
            error_type_filters: vec![
                ErrorTypeFilter::Internal,
                ErrorTypeFilter::InsufficientResources,
                ErrorTypeFilter::External,
            ],
            search: String::new(),
            sort_type: SortType::Created,
            sort_order: SortOrder::Descending,
            max_queries: 100,
        }
    }
}

/// Mutable state behind the live query list.
#[derive(Debug)]
pub struct QueryListState {
    /// The full last-fetched collection, unordered with respect to display.
    pub all_queries: Vec<QueryInfo>,
    /// The ordered list currently shown. Order is first-class: it only
    /// changes at reorder time or on explicit user commands.
    pub displayed: Vec<QueryInfo>,
    pub criteria: ViewCriteria,
    /// How often a full re-sort is forced. Zero disables reordering.
    pub reorder_interval: Duration,
    pub last_refresh: Instant,
    pub last_reorder: Instant,
    /// True once the first poll completed, successfully or not. Used only to
    /// distinguish "loading" from "nothing to show".
    pub initialized: bool,
}

impl QueryListState {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_start(
            Duration::from_millis(config.refresh.reorder_interval_ms),
            config.display.max_queries,
            Instant::now(),
        )
    }

    #[must_use]
    pub fn with_start(reorder_interval: Duration, max_queries: usize, start: Instant) -> Self {
        Self {
            all_queries: Vec::new(),
            displayed: Vec::new(),
            criteria: ViewCriteria {
                max_queries,
                ..ViewCriteria::default()
            },
            reorder_interval,
            last_refresh: start,
            last_reorder: start,
            initialized: false,
        }
    }

    /// Consume a successful poll: reconcile the snapshot into the displayed
    /// list, deciding once whether this cycle reorders. Returns the mode so
    /// callers can log it.
    pub fn apply_snapshot(&mut self, fresh: Vec<QueryInfo>, now: Instant) -> RefreshMode {
        let mode = RefreshMode::decide(self.reorder_interval, self.last_reorder, now);
        self.displayed = merge_snapshot(&self.displayed, &fresh, &self.criteria, mode);
        if mode == RefreshMode::Reorder {
            self.last_reorder = now;
        }
        self.all_queries = fresh;
        self.last_refresh = now;
        self.initialized = true;
        mode
    }

    /// Consume a failed poll: keep all prior data, but mark the view
    /// initialized so the renderer stops saying "loading".
    pub fn apply_fetch_error(&mut self) {
        self.initialized = true;
    }

    /// Recompute `displayed` from scratch: filter the full collection, sort,
    /// truncate. Every user-driven change runs through here, bypassing the
    /// incremental merge.
    pub fn rederive(&mut self) {
        let mut queries: Vec<QueryInfo> = self
            .all_queries
            .iter()
            .filter(|query| query_matches(query, &self.criteria))
            .cloned()
            .collect();
        sort_and_limit(
            &mut queries,
            self.criteria.sort_type,
            self.criteria.sort_order,
            self.criteria.max_queries,
        );
        self.displayed = queries;
    }

    pub fn toggle_state_filter(&mut self, filter: StateFilter) {
        toggle(&mut self.criteria.state_filters, filter);
        self.rederive();
    }

    pub fn toggle_error_type_filter(&mut self, filter: ErrorTypeFilter) {
        toggle(&mut self.criteria.error_type_filters, filter);
        self.rederive();
    }

    #[must_use]
    pub fn has_state_filter(&self, filter: StateFilter) -> bool {
        self.criteria.state_filters.contains(&filter)
    }

    #[must_use]
    pub fn has_error_type_filter(&self, filter: ErrorTypeFilter) -> bool {
        self.criteria.error_type_filters.contains(&filter)
    }

    /// Select a sort key. Selecting the already-active key flips descending
    /// to ascending; any other key starts descending.
    pub fn select_sort(&mut self, sort_type: SortType) {
        if self.criteria.sort_type == sort_type && self.criteria.sort_order == SortOrder::Descending
        {
            self.criteria.sort_order = SortOrder::Ascending;
        } else {
            self.criteria.sort_type = sort_type;
            self.criteria.sort_order = SortOrder::Descending;
        }
        self.rederive();
    }

    pub fn set_reorder_interval(&mut self, interval: Duration) {
        self.reorder_interval = interval;
        self.rederive();
    }

    pub fn set_max_queries(&mut self, max_queries: usize) {
        self.criteria.max_queries = max_queries;
        self.rederive();
    }

    /// Update the live search text without re-deriving. New queries admitted
    /// by the next poll already see the latest text; the full re-derivation
    /// waits for the debounce to settle.
    pub fn set_search_text(&mut self, search: String) {
        self.criteria.search = search;
    }

    /// The debounced search settle: one full re-derivation with the final
    /// text.
    pub fn settle_search(&mut self) {
        self.rederive();
    }
}

fn toggle<T: PartialEq>(filters: &mut Vec<T>, filter: T) {
    if let Some(pos) = filters.iter().position(|f| *f == filter) {
        filters.remove(pos);
    } else {
        filters.push(filter);
    }
}

/// Cancellable quiet-period timer with reschedule-supersedes-previous
/// semantics. The event loop sleeps until `deadline()` and calls `fire()`.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            deadline: None,
        }
    }

    /// Record activity: the deadline moves to `now + quiet_period`,
    /// superseding any pending deadline.
    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet_period);
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// If the deadline has passed, disarm and report true (at most once per
    /// poke sequence).
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Selection and scroll state for a vertical list.
#[derive(Debug, Default)]
pub struct ListState {
    pub selected: usize,
}

impl ListState {
    pub fn move_up(&mut self, _len: usize) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self, len: usize) {
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn move_to_top(&mut self) {
        self.selected = 0;
    }

    pub fn move_to_bottom(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub fn page_up(&mut self, _len: usize) {
        self.selected = self.selected.saturating_sub(10);
    }

    pub fn page_down(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 10).min(len - 1);
        }
    }

    /// Keep the selection inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// State of the sort menu overlay.
#[derive(Debug, Default)]
pub struct SortMenuState {
    pub selected: usize,
}

impl SortMenuState {
    /// Open positioned on the currently active sort key.
    #[must_use]
    pub fn open_at(active: SortType) -> Self {
        let selected = SortType::ALL
            .iter()
            .position(|t| *t == active)
            .unwrap_or(0);
        Self { selected }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < SortType::ALL.len() {
            self.selected += 1;
        }
    }

    #[must_use]
    pub fn current(&self) -> SortType {
        SortType::ALL[self.selected]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QueryState, SessionInfo};
    use chrono::DateTime;

    fn make_query(id: &str, state: QueryState, create_millis: i64) -> QueryInfo {
        let mut query = QueryInfo {
            query_id: id.to_string(),
            state,
            session: SessionInfo {
                user: "alice".to_string(),
                ..SessionInfo::default()
            },
            query: format!("SELECT * FROM {id}"),
            ..QueryInfo::default()
        };
        query.query_stats.create_time = DateTime::from_timestamp_millis(create_millis);
        query
    }

    fn state_at(start: Instant) -> QueryListState {
        QueryListState::with_start(Duration::from_millis(5_000), 100, start)
    }

    fn ids(queries: &[QueryInfo]) -> Vec<&str> {
        queries.iter().map(|q| q.query_id.as_str()).collect()
    }

    #[test]
    fn test_first_snapshot_populates_and_initializes() {
        let start = Instant::now();
        let mut state = state_at(start);
        assert!(!state.initialized);

        let fresh = vec![
            make_query("a", QueryState::Running, 1_000),
            make_query("b", QueryState::Queued, 2_000),
            make_query("c", QueryState::Finished, 3_000),
        ];
        state.apply_snapshot(fresh, start + Duration::from_millis(1_000));

        assert!(state.initialized);
        assert_eq!(state.all_queries.len(), 3);
        // Finished is not in the default filters
        assert_eq!(ids(&state.displayed), vec!["b", "a"]);
    }

    #[test]
    fn test_fetch_error_preserves_display() {
        let start = Instant::now();
        let mut state = state_at(start);

        let fresh = vec![make_query("a", QueryState::Running, 1_000)];
        state.apply_snapshot(fresh, start + Duration::from_millis(1_000));
        let before = ids(&state.displayed).join(",");

        // Poll #2 fails: nothing changes except initialized stays true
        state.apply_fetch_error();
        assert!(state.initialized);
        assert_eq!(ids(&state.displayed).join(","), before);
        assert_eq!(state.all_queries.len(), 1);
    }

    #[test]
    fn test_reorder_timestamp_advances_only_on_reorder() {
        let start = Instant::now();
        let mut state = state_at(start);
        let fresh = vec![make_query("a", QueryState::Running, 1_000)];

        let t1 = start + Duration::from_millis(1_000);
        assert_eq!(state.apply_snapshot(fresh.clone(), t1), RefreshMode::Incremental);
        assert_eq!(state.last_reorder, start);

        let t2 = start + Duration::from_millis(6_000);
        assert_eq!(state.apply_snapshot(fresh.clone(), t2), RefreshMode::Reorder);
        assert_eq!(state.last_reorder, t2);

        // The interval restarts from the reorder
        let t3 = t2 + Duration::from_millis(1_000);
        assert_eq!(state.apply_snapshot(fresh, t3), RefreshMode::Incremental);
        assert_eq!(state.last_reorder, t2);
    }

    #[test]
    fn test_zero_interval_never_reorders() {
        let start = Instant::now();
        let mut state = QueryListState::with_start(Duration::ZERO, 100, start);
        let fresh = vec![make_query("a", QueryState::Running, 1_000)];

        let late = start + Duration::from_secs(3_600);
        assert_eq!(state.apply_snapshot(fresh, late), RefreshMode::Incremental);
        assert_eq!(state.last_reorder, start);
    }

    #[test]
    fn test_filter_toggle_rederives_synchronously() {
        let start = Instant::now();
        let mut state = state_at(start);
        let fresh = vec![
            make_query("run", QueryState::Running, 1_000),
            make_query("done", QueryState::Finished, 2_000),
        ];
        state.apply_snapshot(fresh, start + Duration::from_millis(1_000));
        assert_eq!(ids(&state.displayed), vec!["run"]);

        state.toggle_state_filter(super::super::filter::StateFilter::Finished);
        assert_eq!(ids(&state.displayed), vec!["done", "run"]);

        state.toggle_state_filter(super::super::filter::StateFilter::Finished);
        assert_eq!(ids(&state.displayed), vec!["run"]);
    }

    #[test]
    fn test_sort_click_flips_direction() {
        let start = Instant::now();
        let mut state = state_at(start);
        let fresh = vec![
            make_query("a", QueryState::Running, 1_000),
            make_query("b", QueryState::Running, 2_000),
        ];
        state.apply_snapshot(fresh, start + Duration::from_millis(1_000));

        assert_eq!(state.criteria.sort_order, SortOrder::Descending);

        // Clicking the active column flips to ascending
        state.select_sort(SortType::Created);
        assert_eq!(state.criteria.sort_order, SortOrder::Ascending);
        assert_eq!(ids(&state.displayed), vec!["a", "b"]);

        // Clicking a different column selects it descending
        state.select_sort(SortType::Cpu);
        assert_eq!(state.criteria.sort_type, SortType::Cpu);
        assert_eq!(state.criteria.sort_order, SortOrder::Descending);
    }

    #[test]
    fn test_max_queries_change_rederives() {
        let start = Instant::now();
        let mut state = state_at(start);
        let fresh: Vec<QueryInfo> = (0..5)
            .map(|i| make_query(&format!("q{i}"), QueryState::Running, i * 1_000))
            .collect();
        state.apply_snapshot(fresh, start + Duration::from_millis(1_000));
        assert_eq!(state.displayed.len(), 5);

        state.set_max_queries(2);
        assert_eq!(ids(&state.displayed), vec!["q4", "q3"]);

        state.set_max_queries(0);
        assert_eq!(state.displayed.len(), 5);
    }

    #[test]
    fn test_search_settle_uses_final_text() {
        let start = Instant::now();
        let mut state = state_at(start);
        let fresh = vec![
            make_query("alpha", QueryState::Running, 1_000),
            make_query("beta", QueryState::Running, 2_000),
        ];
        state.apply_snapshot(fresh, start + Duration::from_millis(1_000));

        // Keystrokes update criteria without re-deriving
        state.set_search_text("b".to_string());
        state.set_search_text("be".to_string());
        state.set_search_text("bet".to_string());
        assert_eq!(state.displayed.len(), 2);

        state.settle_search();
        assert_eq!(ids(&state.displayed), vec!["beta"]);
    }

    #[test]
    fn test_debouncer_reschedule_supersedes() {
        let start = Instant::now();
        let quiet = Duration::from_millis(200);
        let mut debouncer = Debouncer::new(quiet);
        assert_eq!(debouncer.deadline(), None);

        // Three keystrokes within 50ms of each other
        debouncer.poke(start);
        debouncer.poke(start + Duration::from_millis(50));
        debouncer.poke(start + Duration::from_millis(100));

        let expected = start + Duration::from_millis(300);
        assert_eq!(debouncer.deadline(), Some(expected));

        // Not yet due
        assert!(!debouncer.fire(start + Duration::from_millis(250)));
        // Fires exactly once, 200ms after the last keystroke
        assert!(debouncer.fire(expected));
        assert!(!debouncer.fire(expected + Duration::from_millis(1)));
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_debouncer_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(200));
        debouncer.poke(start);
        debouncer.cancel();
        assert!(!debouncer.fire(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_list_state_clamp() {
        let mut list = ListState { selected: 5 };
        list.clamp(3);
        assert_eq!(list.selected, 2);
        list.clamp(0);
        assert_eq!(list.selected, 0);
    }
}
