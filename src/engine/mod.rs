//! Visit Engine
//!
//! Owns the live aggregate and serializes every mutation together with the
//! snapshot write that follows it. Queries share a read lock and always see
//! a whole aggregate, never one half-way through a record.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::aggregate::{Aggregate, VisitAggregate};
use crate::domain::{Period, StatsReport, VisitEvent};
use crate::store::{StoreError, VisitStore};

/// Visit Engine
#[derive(Debug)]
pub struct VisitEngine {
    state: RwLock<VisitAggregate>,
    store: VisitStore,
}

impl VisitEngine {
    /// Load the snapshot once and bind the store for later saves
    pub async fn open(store: VisitStore) -> Result<Self, StoreError> {
        let aggregate = store.load().await?;

        tracing::info!(
            path = %store.path().display(),
            aggregate_type = VisitAggregate::aggregate_type(),
            total = aggregate.total(),
            unique = aggregate.unique_total().len(),
            "Visit engine ready"
        );

        Ok(Self::with_state(store, aggregate))
    }

    /// Build an engine around an already loaded aggregate
    pub fn with_state(store: VisitStore, aggregate: VisitAggregate) -> Self {
        Self {
            state: RwLock::new(aggregate),
            store,
        }
    }

    /// Snapshot path backing this engine
    pub fn store(&self) -> &VisitStore {
        &self.store
    }

    // =========================================================================
    // record
    // =========================================================================

    /// Record one visit at the current time
    ///
    /// `None` for region counts the visit under "Unknown".
    pub async fn record(&self, visitor_key: &str, region: Option<&str>) -> Result<(), StoreError> {
        self.record_at(visitor_key, region, Utc::now()).await
    }

    /// Record one visit at an explicit instant
    ///
    /// The in-memory update always sticks. A failed save is logged and
    /// returned, and the next successful save carries the visit to disk.
    pub async fn record_at(
        &self,
        visitor_key: &str,
        region: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let event = VisitEvent::recorded(visitor_key, region, at);

        let mut state = self.state.write().await;
        state.apply(&event);

        let result = self.store.save(&state).await;
        let total = state.total();
        drop(state);

        match &result {
            Ok(()) => tracing::debug!(
                event_type = event.event_type(),
                visitor_key = %event.visitor_key(),
                total = total,
                "Visit recorded"
            ),
            Err(e) => tracing::error!(
                event_type = event.event_type(),
                visitor_key = %event.visitor_key(),
                total = total,
                error = %e,
                "Visit recorded in memory but snapshot save failed"
            ),
        }

        result
    }

    // =========================================================================
    // query
    // =========================================================================

    /// Statistics for one period
    pub async fn query(&self, period: Period) -> StatsReport {
        self.state.read().await.stats(period)
    }

    /// Consistent copy of the whole aggregate
    pub async fn snapshot(&self) -> VisitAggregate {
        self.state.read().await.clone()
    }

    /// Persist the current state again
    ///
    /// Every record already saves, so this only matters after a failed save.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let state = self.state.write().await;
        self.store.save(&state).await
    }
}
