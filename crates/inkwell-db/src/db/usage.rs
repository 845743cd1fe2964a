use std::time::Duration;

use async_trait::async_trait;
use inkwell_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::{Reservation, UsageLedger};

/// Repository for the usage ledger and its reservations
#[derive(Clone)]
pub struct UsageRepository {
    pool: PgPool,
}

impl UsageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageLedger for UsageRepository {
    #[tracing::instrument(skip(self), fields(db.table = "usage_ledger", db.operation = "select"))]
    async fn free_usage(&self, user_id: &str) -> Result<i32, AppError> {
        let usage = sqlx::query_scalar::<Postgres, i32>(
            "SELECT free_usage FROM usage_ledger WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usage.unwrap_or(0))
    }

    /// The ledger row is locked for the whole transaction, so concurrent
    /// reservations for one identity are serialized and the threshold check
    /// sees every live reservation.
    #[tracing::instrument(skip(self), fields(db.table = "usage_reservations", db.operation = "insert"))]
    async fn try_reserve(
        &self,
        user_id: &str,
        limit: i32,
        lease: Duration,
    ) -> Result<Option<Reservation>, AppError> {
        if limit <= 0 {
            return Ok(None);
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO usage_ledger (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let free_usage = sqlx::query_scalar::<Postgres, i32>(
            "SELECT free_usage FROM usage_ledger WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let reclaimed = sqlx::query(
            "DELETE FROM usage_reservations WHERE user_id = $1 AND expires_at <= NOW()",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if reclaimed > 0 {
            tracing::warn!(reclaimed = reclaimed, "Reclaimed expired usage reservations");
        }

        let live = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM usage_reservations WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if i64::from(free_usage) + live >= i64::from(limit) {
            tx.commit().await?;
            return Ok(None);
        }

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO usage_reservations (id, user_id, expires_at)
            VALUES ($1, $2, NOW() + make_interval(secs => $3))
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(lease.as_secs_f64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(Reservation {
            id,
            user_id: user_id.to_string(),
        }))
    }

    #[tracing::instrument(skip(self), fields(db.table = "usage_ledger", db.operation = "update", reservation_id = %reservation.id))]
    async fn commit(&self, reservation: &Reservation) -> Result<i32, AppError> {
        let usage = sqlx::query_scalar::<Postgres, i32>(
            r#"
            WITH released AS (
                DELETE FROM usage_reservations WHERE id = $1
            )
            INSERT INTO usage_ledger (user_id, free_usage)
            VALUES ($2, 1)
            ON CONFLICT (user_id) DO UPDATE
                SET free_usage = usage_ledger.free_usage + 1, updated_at = NOW()
            RETURNING free_usage
            "#,
        )
        .bind(reservation.id)
        .bind(&reservation.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(usage)
    }

    #[tracing::instrument(skip(self), fields(db.table = "usage_reservations", db.operation = "delete", reservation_id = %reservation.id))]
    async fn release(&self, reservation: &Reservation) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM usage_reservations WHERE id = $1")
            .bind(reservation.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::warn!("Released usage reservation that was no longer held");
        }

        Ok(())
    }
}
