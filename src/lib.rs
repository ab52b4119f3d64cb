//! visit_counter Library
//!
//! Re-exports modules for integration testing and the binaries.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod geo;
pub mod store;

mod error;

pub use aggregate::VisitAggregate;
pub use config::Config;
pub use domain::{DomainError, Period, StatsReport, VisitStat};
pub use engine::VisitEngine;
pub use error::{AppError, AppResult, ErrorResponse};
pub use geo::RegionResolver;
pub use store::{StoreError, VisitStore};
