//! Domain Events
//!
//! Events are immutable facts that have happened in the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UNKNOWN_REGION;

/// Visit-related events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VisitEvent {
    /// A visitor hit the counter
    VisitRecorded {
        visitor_key: String,
        region: String,
        recorded_at: DateTime<Utc>,
    },
}

impl VisitEvent {
    /// Build a visit event, falling back to the unknown region label
    pub fn recorded(
        visitor_key: impl Into<String>,
        region: Option<&str>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        VisitEvent::VisitRecorded {
            visitor_key: visitor_key.into(),
            region: region.unwrap_or(UNKNOWN_REGION).to_string(),
            recorded_at,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            VisitEvent::VisitRecorded { .. } => "VisitRecorded",
        }
    }

    /// Get the visitor key this event refers to
    pub fn visitor_key(&self) -> &str {
        match self {
            VisitEvent::VisitRecorded { visitor_key, .. } => visitor_key,
        }
    }
}
