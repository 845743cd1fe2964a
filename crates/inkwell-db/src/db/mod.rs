//! Database repositories for the data access layer
//!
//! Two stores back the gateway: the append-only creations log and the
//! per-identity usage ledger. Both are expressed as traits so the gateway can
//! run against Postgres in production and in-memory stores in tests.

use std::time::Duration;

use async_trait::async_trait;
use inkwell_core::models::{CreationRecord, NewCreation};
use inkwell_core::AppError;
use uuid::Uuid;

pub mod creation;
pub mod usage;

#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;

pub use creation::CreationRepository;
pub use usage::UsageRepository;

#[cfg(any(test, feature = "test-helpers"))]
pub use memory::{InMemoryCreationStore, InMemoryUsageLedger};

/// Durable record of completed generations.
#[async_trait]
pub trait CreationStore: Send + Sync {
    /// Append one record. Records are never updated afterwards.
    async fn insert(&self, creation: NewCreation) -> Result<CreationRecord, AppError>;

    /// All records owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<CreationRecord>, AppError>;

    /// Published records across all users, newest first.
    async fn list_published(&self, limit: i64) -> Result<Vec<CreationRecord>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// One free-tier slot held by an in-flight generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: String,
}

/// Per-identity free-tier counter.
///
/// A generation first reserves a slot, then either commits it (incrementing
/// `free_usage`) or releases it. Reservation is atomic: `free_usage` plus
/// live reservations never exceeds the limit, regardless of how many
/// requests for the same identity run concurrently.
///
/// Every reservation carries a lease. A slot that is neither committed nor
/// released before its lease ends stops counting against the limit, so a
/// crashed or abandoned request cannot shrink the quota for good.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Committed free-tier usage; zero for identities never seen before.
    async fn free_usage(&self, user_id: &str) -> Result<i32, AppError>;

    /// Take one slot if `free_usage + live reservations < limit`. Expired
    /// reservations for the identity are reclaimed first.
    async fn try_reserve(
        &self,
        user_id: &str,
        limit: i32,
        lease: Duration,
    ) -> Result<Option<Reservation>, AppError>;

    /// Count one generation and drop its reservation. Counts even when the
    /// lease already ran out: the creation exists either way.
    async fn commit(&self, reservation: &Reservation) -> Result<i32, AppError>;

    /// Give a reserved slot back without counting it.
    async fn release(&self, reservation: &Reservation) -> Result<(), AppError>;
}
