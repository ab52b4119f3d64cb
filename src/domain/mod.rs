//! Domain module
//!
//! Core domain types for visit counting.

pub mod bucket;
pub mod context;
pub mod error;
pub mod events;
pub mod period;

pub use bucket::BucketKeys;
pub use context::VisitContext;
pub use error::DomainError;
pub use events::VisitEvent;
pub use period::{Period, StatsReport, VisitStat};

/// Region label used when no region is supplied or the lookup fails
pub const UNKNOWN_REGION: &str = "Unknown";

/// Region label for visits originating from the local machine
pub const LOCALHOST_REGION: &str = "Localhost";
