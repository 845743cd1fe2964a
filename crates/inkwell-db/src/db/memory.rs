//! In-memory stores with the same semantics as the Postgres repositories.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use inkwell_core::models::{CreationRecord, NewCreation};
use inkwell_core::AppError;
use uuid::Uuid;

use super::{CreationStore, Reservation, UsageLedger};

fn poisoned<T>(_: T) -> AppError {
    AppError::Storage("in-memory store lock poisoned".to_string())
}

#[derive(Default)]
pub struct InMemoryCreationStore {
    records: Mutex<Vec<CreationRecord>>,
    fail_inserts: AtomicBool,
}

impl InMemoryCreationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail with a storage error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<CreationRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CreationStore for InMemoryCreationStore {
    async fn insert(&self, creation: NewCreation) -> Result<CreationRecord, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Storage("creation store unavailable".to_string()));
        }
        let record = creation.into_record();
        self.records.lock().map_err(poisoned)?.push(record.clone());
        Ok(record)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<CreationRecord>, AppError> {
        let records = self.records.lock().map_err(poisoned)?;
        // Insertion order breaks ties between equal timestamps.
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_published(&self, limit: i64) -> Result<Vec<CreationRecord>, AppError> {
        let records = self.records.lock().map_err(poisoned)?;
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.publish)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

struct Held {
    user_id: String,
    expires_at: Instant,
}

#[derive(Default)]
struct LedgerState {
    free_usage: HashMap<String, i32>,
    reservations: HashMap<Uuid, Held>,
}

impl LedgerState {
    fn reclaim_expired(&mut self, user_id: &str, now: Instant) {
        self.reservations
            .retain(|_, held| held.user_id != user_id || held.expires_at > now);
    }

    fn live(&self, user_id: &str, now: Instant) -> i32 {
        let count = self
            .reservations
            .values()
            .filter(|held| held.user_id == user_id && held.expires_at > now)
            .count();
        i32::try_from(count).unwrap_or(i32::MAX)
    }
}

#[derive(Default)]
pub struct InMemoryUsageLedger {
    state: Mutex<LedgerState>,
    fail_commits: AtomicBool,
}

impl InMemoryUsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an identity's committed usage.
    pub fn set_free_usage(&self, user_id: &str, free_usage: i32) {
        if let Ok(mut state) = self.state.lock() {
            state.free_usage.insert(user_id.to_string(), free_usage);
        }
    }

    /// Make every subsequent commit fail with a storage error.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn free_usage_of(&self, user_id: &str) -> i32 {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.free_usage.get(user_id).copied())
            .unwrap_or(0)
    }

    /// Reservations for `user_id` whose lease has not run out.
    pub fn reserved_of(&self, user_id: &str) -> i32 {
        self.state
            .lock()
            .map(|state| state.live(user_id, Instant::now()))
            .unwrap_or(0)
    }
}

#[async_trait]
impl UsageLedger for InMemoryUsageLedger {
    async fn free_usage(&self, user_id: &str) -> Result<i32, AppError> {
        let state = self.state.lock().map_err(poisoned)?;
        Ok(state.free_usage.get(user_id).copied().unwrap_or(0))
    }

    async fn try_reserve(
        &self,
        user_id: &str,
        limit: i32,
        lease: Duration,
    ) -> Result<Option<Reservation>, AppError> {
        let mut state = self.state.lock().map_err(poisoned)?;
        let now = Instant::now();
        state.reclaim_expired(user_id, now);

        let used = state.free_usage.get(user_id).copied().unwrap_or(0);
        if used + state.live(user_id, now) >= limit {
            return Ok(None);
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
        };
        state.reservations.insert(
            reservation.id,
            Held {
                user_id: user_id.to_string(),
                expires_at: now + lease,
            },
        );
        Ok(Some(reservation))
    }

    async fn commit(&self, reservation: &Reservation) -> Result<i32, AppError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(AppError::Storage("usage ledger unavailable".to_string()));
        }
        let mut state = self.state.lock().map_err(poisoned)?;
        state.reservations.remove(&reservation.id);
        let usage = state
            .free_usage
            .entry(reservation.user_id.clone())
            .or_insert(0);
        *usage += 1;
        Ok(*usage)
    }

    async fn release(&self, reservation: &Reservation) -> Result<(), AppError> {
        let mut state = self.state.lock().map_err(poisoned)?;
        state.reservations.remove(&reservation.id);
        Ok(())
    }
}
