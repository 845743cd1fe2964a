use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inkwell_core::models::{CreationKind, CreationRecord, NewCreation};
use inkwell_core::AppError;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use super::CreationStore;

const CREATION_COLUMNS: &str = "id, user_id, prompt, content, type, publish, created_at";

#[derive(Debug, FromRow)]
struct CreationRow {
    id: Uuid,
    user_id: String,
    prompt: String,
    content: String,
    #[sqlx(rename = "type")]
    kind: String,
    publish: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<CreationRow> for CreationRecord {
    type Error = AppError;

    fn try_from(row: CreationRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse::<CreationKind>()
            .map_err(|e| AppError::Storage(format!("creation {}: {}", row.id, e)))?;
        Ok(CreationRecord {
            id: row.id,
            user_id: row.user_id,
            prompt: row.prompt,
            content: row.content,
            kind,
            publish: row.publish,
            created_at: row.created_at,
        })
    }
}

fn into_records(rows: Vec<CreationRow>) -> Result<Vec<CreationRecord>, AppError> {
    rows.into_iter().map(CreationRecord::try_from).collect()
}

/// Repository for the creations log
#[derive(Clone)]
pub struct CreationRepository {
    pool: PgPool,
}

impl CreationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CreationStore for CreationRepository {
    #[tracing::instrument(
        skip(self, creation),
        fields(db.table = "creations", db.operation = "insert", creation.kind = %creation.kind)
    )]
    async fn insert(&self, creation: NewCreation) -> Result<CreationRecord, AppError> {
        let row = sqlx::query_as::<Postgres, CreationRow>(&format!(
            r#"
            INSERT INTO creations (id, user_id, prompt, content, type, publish)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CREATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&creation.user_id)
        .bind(&creation.prompt)
        .bind(&creation.content)
        .bind(creation.kind.as_str())
        .bind(creation.publish)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip(self), fields(db.table = "creations", db.operation = "select"))]
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<CreationRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, CreationRow>(&format!(
            "SELECT {} FROM creations WHERE user_id = $1 ORDER BY created_at DESC",
            CREATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "creations", db.operation = "select"))]
    async fn list_published(&self, limit: i64) -> Result<Vec<CreationRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, CreationRow>(&format!(
            "SELECT {} FROM creations WHERE publish = TRUE ORDER BY created_at DESC LIMIT $1",
            CREATION_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
