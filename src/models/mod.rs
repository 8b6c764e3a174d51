//! Data models for coordinator query snapshots.
//!
//! The coordinator's query list endpoint returns the full current collection
//! on every call; [`QueryInfo`] mirrors the subset of that JSON the monitor
//! uses. Deserialization is deliberately tolerant: unknown states, unknown
//! error types, and malformed timestamps degrade to neutral values instead
//! of failing the snapshot.

pub mod config;
pub mod state;
pub mod units;

pub use config::Config;
pub use state::{ErrorType, QueryState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One query in the polled collection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryInfo {
    pub query_id: String,

    pub state: QueryState,

    /// Populated only for failed queries; unknown categories become `None`.
    #[serde(deserialize_with = "state::deserialize_error_type")]
    pub error_type: Option<ErrorType>,

    pub error_code: Option<ErrorCode>,

    pub session: SessionInfo,

    /// Resource group path segments, joined with '.' for search matching.
    pub resource_group_id: Option<Vec<String>>,

    /// Full query text.
    pub query: String,

    pub query_stats: QueryStats,
}

/// Error code detail for failed queries.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorCode {
    pub name: String,
}

/// Session information attached to a query.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionInfo {
    pub user: String,
    pub source: Option<String>,
    pub principal: Option<String>,
}

/// Statistics block of a query snapshot.
///
/// Durations and memory reservations arrive as formatted strings; the
/// numeric accessors on [`QueryInfo`] parse them on demand.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryStats {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub create_time: Option<DateTime<Utc>>,

    pub elapsed_time: String,
    pub execution_time: String,
    pub total_cpu_time: String,

    pub cumulative_user_memory: f64,
    pub user_memory_reservation: String,
    pub total_memory_reservation: String,
    pub peak_total_memory_reservation: String,

    // Classic driver counters
    pub total_drivers: u64,
    pub completed_drivers: u64,
    pub running_drivers: u64,
    pub queued_drivers: u64,

    // Split counters; their presence selects the new driver model
    pub completed_splits: Option<u64>,
    pub running_splits: Option<u64>,
    pub queued_splits: Option<u64>,

    // New driver counters
    pub completed_new_drivers: Option<u64>,
    pub running_new_drivers: Option<u64>,
    pub queued_new_drivers: Option<u64>,

    pub fully_blocked: bool,
    pub blocked_reasons: Vec<String>,

    pub progress_percentage: Option<f64>,
}

/// Progress counters under the model the snapshot actually populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryProgress {
    pub completed: u64,
    pub running: u64,
    pub queued: u64,
}

impl QueryInfo {
    /// Creation time in epoch milliseconds; 0.0 when the snapshot carried no
    /// parseable timestamp. Sort-key sentinel, never a panic.
    #[must_use]
    pub fn create_time_millis(&self) -> f64 {
        self.query_stats
            .create_time
            .map(|t| t.timestamp_millis() as f64)
            .unwrap_or(0.0)
    }

    /// Total wall time in milliseconds (0.0 if unparseable).
    #[must_use]
    pub fn elapsed_millis(&self) -> f64 {
        units::parse_duration(&self.query_stats.elapsed_time).unwrap_or(0.0)
    }

    /// Execution wall time in milliseconds (0.0 if unparseable).
    #[must_use]
    pub fn execution_millis(&self) -> f64 {
        units::parse_duration(&self.query_stats.execution_time).unwrap_or(0.0)
    }

    /// CPU time in milliseconds (0.0 if unparseable).
    #[must_use]
    pub fn cpu_millis(&self) -> f64 {
        units::parse_duration(&self.query_stats.total_cpu_time).unwrap_or(0.0)
    }

    /// Cumulative user memory, as reported (already numeric).
    #[must_use]
    pub fn cumulative_user_memory(&self) -> f64 {
        self.query_stats.cumulative_user_memory
    }

    /// Current user memory reservation in bytes (0.0 if unparseable).
    #[must_use]
    pub fn current_memory_bytes(&self) -> f64 {
        units::parse_data_size(&self.query_stats.user_memory_reservation).unwrap_or(0.0)
    }

    /// Resource group path joined with '.', if the query ran in one.
    #[must_use]
    pub fn resource_group_path(&self) -> Option<String> {
        self.resource_group_id
            .as_ref()
            .map(|segments| segments.join("."))
    }

    /// Human-readable state label.
    ///
    /// Failed queries are labelled by their error category (with user
    /// cancellation distinguished from other user errors); a fully blocked
    /// running query shows BLOCKED. Everything else shows the state name.
    #[must_use]
    pub fn human_readable_state(&self) -> String {
        match self.state {
            QueryState::Running if self.query_stats.fully_blocked => "BLOCKED".to_string(),
            QueryState::Failed => match self.error_type {
                Some(ErrorType::User) => {
                    if self
                        .error_code
                        .as_ref()
                        .is_some_and(|code| code.name == "USER_CANCELED")
                    {
                        "USER CANCELED".to_string()
                    } else {
                        "USER ERROR".to_string()
                    }
                }
                Some(error_type) => error_type.display_label().to_string(),
                None => "FAILED".to_string(),
            },
            state => state.as_str().to_string(),
        }
    }

    /// Progress counters, selecting the new driver model when the snapshot
    /// populated split counters, otherwise the classic driver counters.
    /// Terminal queries report zero running/queued units.
    #[must_use]
    pub fn progress(&self) -> QueryProgress {
        let stats = &self.query_stats;
        let (completed, running, queued) = if stats.completed_splits.is_some() {
            (
                stats.completed_new_drivers.unwrap_or(0),
                stats.running_new_drivers.unwrap_or(0),
                stats.queued_new_drivers.unwrap_or(0),
            )
        } else {
            (
                stats.completed_drivers,
                stats.running_drivers,
                stats.queued_drivers,
            )
        };

        if self.state.is_terminal() {
            QueryProgress {
                completed,
                running: 0,
                queued: 0,
            }
        } else {
            QueryProgress {
                completed,
                running,
                queued,
            }
        }
    }

    /// Completion percentage for progress gauges, clamped to 0..=100.
    #[must_use]
    pub fn progress_percent(&self) -> u16 {
        if self.state == QueryState::Finished {
            return 100;
        }
        if let Some(pct) = self.query_stats.progress_percentage {
            return pct.round().clamp(0.0, 100.0) as u16;
        }
        let total = self.query_stats.total_drivers;
        if total == 0 {
            0
        } else {
            (self.query_stats.completed_drivers * 100 / total).min(100) as u16
        }
    }
}

/// Deserialize an RFC 3339 timestamp, degrading to `None` on malformed input.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }))
}
