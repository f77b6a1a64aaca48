use async_trait::async_trait;
use common::RecordId;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    Document, Filter, Result, SortOrder, StoreError, UniqueKey, store::DocumentStore,
};

/// PostgreSQL-backed document store implementation.
///
/// Bodies live in a JSONB column; unique keys are rows in
/// `document_unique_keys` written in the same transaction as the document,
/// so the table's primary key serialises competing writers.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` with a bounded pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("document store migrations applied");
        Ok(())
    }

    async fn claim_keys(
        tx: &mut Transaction<'_, Postgres>,
        collection: &'static str,
        owner: &RecordId,
        keys: &[UniqueKey],
    ) -> Result<()> {
        for key in keys {
            sqlx::query(
                r#"
                INSERT INTO document_unique_keys (collection, constraint_name, key, document_id)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(collection)
            .bind(key.constraint)
            .bind(&key.value)
            .bind(owner.as_str())
            .execute(&mut **tx)
            .await
            .map_err(|e| unique_violation_or(e, collection, key.constraint))?;
        }
        Ok(())
    }
}

fn unique_violation_or(e: sqlx::Error, collection: &'static str, constraint: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        metrics::counter!("document_store_unique_violations_total").increment(1);
        return StoreError::UniqueViolation {
            collection,
            constraint: constraint.to_string(),
        };
    }
    StoreError::Database(e)
}

fn decode_all<D: Document>(bodies: Vec<serde_json::Value>) -> Result<Vec<D>> {
    bodies
        .into_iter()
        .map(|body| serde_json::from_value(body).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn find<D: Document>(&self, filter: Filter) -> Result<Vec<D>> {
        let direction = match filter.order {
            SortOrder::OldestFirst => "ASC",
            SortOrder::NewestFirst => "DESC",
        };
        let sql = format!(
            "SELECT body FROM documents WHERE collection = $1 AND body @> $2 ORDER BY seq {direction} LIMIT $3"
        );

        let bodies: Vec<serde_json::Value> = sqlx::query_scalar(&sql)
            .bind(D::COLLECTION)
            .bind(filter.pattern_value())
            .bind(filter.limit.map(|l| l as i64))
            .fetch_all(&self.pool)
            .await?;

        decode_all(bodies)
    }

    async fn find_by_id<D: Document>(&self, id: &RecordId) -> Result<Option<D>> {
        let body: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = $1 AND id = $2")
                .bind(D::COLLECTION)
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(body.map(serde_json::from_value).transpose()?)
    }

    async fn find_by_ids<D: Document>(&self, ids: &[RecordId]) -> Result<Vec<D>> {
        let ids: Vec<&str> = ids.iter().map(RecordId::as_str).collect();

        let bodies: Vec<serde_json::Value> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 AND id = ANY($2) ORDER BY seq ASC",
        )
        .bind(D::COLLECTION)
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    async fn insert<D: Document>(&self, document: &D) -> Result<()> {
        let body = serde_json::to_value(document)?;
        let id = document.id();

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(D::COLLECTION)
            .bind(id.as_str())
            .bind(&body)
            .execute(&mut *tx)
            .await
            .map_err(|e| unique_violation_or(e, D::COLLECTION, "documents_pkey"))?;

        Self::claim_keys(&mut tx, D::COLLECTION, id, &document.unique_keys()).await?;

        tx.commit().await?;
        tracing::debug!(collection = D::COLLECTION, %id, "document inserted");
        Ok(())
    }

    async fn replace<D: Document>(&self, document: &D) -> Result<bool> {
        let body = serde_json::to_value(document)?;
        let id = document.id();

        let mut tx = self.pool.begin().await?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE documents SET body = $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(D::COLLECTION)
        .bind(id.as_str())
        .bind(&body)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM document_unique_keys WHERE collection = $1 AND document_id = $2")
            .bind(D::COLLECTION)
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

        Self::claim_keys(&mut tx, D::COLLECTION, id, &document.unique_keys()).await?;

        tx.commit().await?;
        tracing::debug!(collection = D::COLLECTION, %id, "document replaced");
        Ok(true)
    }

    async fn delete<D: Document>(&self, id: &RecordId) -> Result<Option<D>> {
        let body: Option<serde_json::Value> = sqlx::query_scalar(
            "DELETE FROM documents WHERE collection = $1 AND id = $2 RETURNING body",
        )
        .bind(D::COLLECTION)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(body.map(serde_json::from_value).transpose()?)
    }
}
