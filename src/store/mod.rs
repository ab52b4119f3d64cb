//! Visit Store module
//!
//! Durable JSON mirror of the visit aggregate.
//! Every save rewrites the whole snapshot.

mod error;
mod file_store;

pub use error::StoreError;
pub use file_store::VisitStore;
