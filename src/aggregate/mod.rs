//! Aggregate module
//!
//! Aggregate Root pattern: state is only changed by applying events.

pub mod visits;

pub use visits::VisitAggregate;

/// Aggregate trait that all aggregates must implement
pub trait Aggregate: Sized + Default {
    /// The type of events this aggregate handles
    type Event;

    /// Get the aggregate type name (for logging)
    fn aggregate_type() -> &'static str;

    /// Apply an event to update the aggregate state
    fn apply(&mut self, event: &Self::Event);
}
