//! Persistence for creation records and free-tier usage.

pub mod db;

pub use db::{CreationRepository, CreationStore, Reservation, UsageLedger, UsageRepository};
#[cfg(any(test, feature = "test-helpers"))]
pub use db::{InMemoryCreationStore, InMemoryUsageLedger};
