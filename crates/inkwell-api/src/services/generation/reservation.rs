//! Free-tier slot held for the duration of one generation

use std::sync::Arc;

use inkwell_core::AppError;
use inkwell_db::{Reservation, UsageLedger};

/// Owns a reserved slot until it is committed or released.
///
/// Dropping the guard while it still holds the slot (task panic, runtime
/// shutdown) releases it in the background. Anything that slips past that is
/// reclaimed by the ledger once the lease ends.
pub(super) struct ReservationGuard {
    ledger: Arc<dyn UsageLedger>,
    reservation: Option<Reservation>,
}

impl ReservationGuard {
    pub(super) fn new(ledger: Arc<dyn UsageLedger>, reservation: Reservation) -> Self {
        Self {
            ledger,
            reservation: Some(reservation),
        }
    }

    /// Turn the slot into counted usage. On failure the reservation stays in
    /// the ledger until its lease expires.
    pub(super) async fn commit(mut self) -> Result<i32, AppError> {
        let reservation = self
            .reservation
            .take()
            .ok_or_else(|| AppError::Internal("reservation already settled".to_string()))?;
        self.ledger.commit(&reservation).await
    }

    pub(super) async fn release(mut self) {
        if let Some(reservation) = self.reservation.take() {
            if let Err(e) = self.ledger.release(&reservation).await {
                tracing::error!(
                    error = %e,
                    reservation_id = %reservation.id,
                    "Failed to release free-tier reservation; it will expire with its lease"
                );
            }
        }
    }
}

impl Drop for ReservationGuard {
    fn drop(&mut self) {
        let Some(reservation) = self.reservation.take() else {
            return;
        };
        let ledger = self.ledger.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = ledger.release(&reservation).await {
                        tracing::error!(
                            error = %e,
                            reservation_id = %reservation.id,
                            "Failed to release abandoned reservation"
                        );
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    reservation_id = %reservation.id,
                    "Reservation dropped outside a runtime; it will expire with its lease"
                );
            }
        }
    }
}
