//! Query lifecycle state and error taxonomy.
//!
//! This module defines the authoritative QueryState enum used throughout the
//! codebase, parsed from the coordinator's state strings. Unrecognized states
//! deserialize to `Unknown` rather than failing the whole snapshot; the
//! RUNNING filter treats them as running-equivalent since its predicate is
//! exclusion-based (anything that is not queued, finished, or failed).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Query state parsed from the coordinator's state string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryState {
    #[default]
    Unknown,
    // Pre-execution states
    Queued,
    WaitingForResources,
    Dispatching,
    Planning,
    Starting,
    // Active states
    Running,
    Finishing,
    // Terminal states
    Finished,
    Failed,
}

impl QueryState {
    /// Parse a coordinator state string, tolerating unknown values.
    #[must_use]
    pub fn from_state_string(state: &str) -> Self {
        match state {
            "QUEUED" => Self::Queued,
            "WAITING_FOR_RESOURCES" => Self::WaitingForResources,
            "DISPATCHING" => Self::Dispatching,
            "PLANNING" => Self::Planning,
            "STARTING" => Self::Starting,
            "RUNNING" => Self::Running,
            "FINISHING" => Self::Finishing,
            "FINISHED" => Self::Finished,
            "FAILED" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// Return the full coordinator state name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Queued => "QUEUED",
            Self::WaitingForResources => "WAITING_FOR_RESOURCES",
            Self::Dispatching => "DISPATCHING",
            Self::Planning => "PLANNING",
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
            Self::Finishing => "FINISHING",
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
        }
    }

    /// True for states that will never change again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl<'de> Deserialize<'de> for QueryState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(QueryState::from_state_string(&raw))
    }
}

impl Serialize for QueryState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Error classification reported for failed queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    User,
    Internal,
    InsufficientResources,
    External,
}

impl ErrorType {
    /// Parse a coordinator error-type string. Unknown strings map to `None`
    /// so a new server-side category cannot fail deserialization.
    #[must_use]
    pub fn from_error_string(error: &str) -> Option<Self> {
        match error {
            "USER_ERROR" => Some(Self::User),
            "INTERNAL_ERROR" => Some(Self::Internal),
            "INSUFFICIENT_RESOURCES" => Some(Self::InsufficientResources),
            "EXTERNAL" => Some(Self::External),
            _ => None,
        }
    }

    /// Return the coordinator's wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER_ERROR",
            Self::Internal => "INTERNAL_ERROR",
            Self::InsufficientResources => "INSUFFICIENT_RESOURCES",
            Self::External => "EXTERNAL",
        }
    }

    /// Human-readable label used by the renderers and search matching.
    #[must_use]
    pub fn display_label(&self) -> &'static str {
        match self {
            Self::User => "USER ERROR",
            Self::Internal => "INTERNAL ERROR",
            Self::InsufficientResources => "INSUFFICIENT RESOURCES",
            Self::External => "EXTERNAL ERROR",
        }
    }
}

impl Serialize for ErrorType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Deserialize an optional error type, tolerating unknown strings as `None`.
pub fn deserialize_error_type<'de, D>(deserializer: D) -> Result<Option<ErrorType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ErrorType::from_error_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_state_parsing() {
        assert_eq!(QueryState::from_state_string("RUNNING"), QueryState::Running);
        assert_eq!(QueryState::from_state_string("QUEUED"), QueryState::Queued);
        assert_eq!(
            QueryState::from_state_string("WAITING_FOR_RESOURCES"),
            QueryState::WaitingForResources
        );
        assert_eq!(QueryState::from_state_string("BOGUS"), QueryState::Unknown);
    }

    #[test]
    fn test_query_state_serde() {
        let state: QueryState = serde_json::from_str("\"FINISHED\"").unwrap();
        assert_eq!(state, QueryState::Finished);
        assert_eq!(serde_json::to_string(&state).unwrap(), "\"FINISHED\"");

        // Unknown states must not fail the snapshot
        let state: QueryState = serde_json::from_str("\"SHINY_NEW_STATE\"").unwrap();
        assert_eq!(state, QueryState::Unknown);
    }

    #[test]
    fn test_terminal_states() {
        assert!(QueryState::Finished.is_terminal());
        assert!(QueryState::Failed.is_terminal());
        assert!(!QueryState::Running.is_terminal());
        assert!(!QueryState::Queued.is_terminal());
    }

    #[test]
    fn test_error_type_parsing() {
        assert_eq!(ErrorType::from_error_string("USER_ERROR"), Some(ErrorType::User));
        assert_eq!(
            ErrorType::from_error_string("INSUFFICIENT_RESOURCES"),
            Some(ErrorType::InsufficientResources)
        );
        assert_eq!(ErrorType::from_error_string("SOMETHING_ELSE"), None);
    }
}
