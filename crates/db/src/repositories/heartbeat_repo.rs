//! Repository for the `heartbeat` table.

use chrono::Utc;
use sqlx::PgPool;
use vigil_core::error::CoreError;
use vigil_core::heartbeat::Heartbeat;
use vigil_core::labels;
use vigil_core::types::DbId;

use crate::error::{classify, expect_rows, DbResult};
use crate::lock::{advisory_xact_lock, lock_key, name_owner};
use crate::models::heartbeat::HeartbeatRow;
use crate::repositories::common::{count_rows, delete_existing};

const TABLE: &str = "heartbeat";

const ENTITY: &str = "heartbeat";

const COLUMNS: &str = "\
    id, name, description, labels::text AS labels, ttl, created_at, refreshed_at";

pub struct HeartbeatRepo;

impl HeartbeatRepo {
    /// Insert a new heartbeat. A taken name fails with `Conflict`.
    pub async fn create(pool: &PgPool, heartbeat: &Heartbeat) -> DbResult<()> {
        let labels = labels::encode(heartbeat.labels.as_ref())?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| classify("fail to create heartbeat", e))?;
        advisory_xact_lock(&mut tx, &lock_key(TABLE, &heartbeat.name)).await?;

        if name_owner(&mut tx, TABLE, &heartbeat.name).await?.is_some() {
            return Err(name_taken(&heartbeat.name));
        }

        let result = sqlx::query(
            "INSERT INTO heartbeat \
                 (id, name, description, labels, ttl, created_at, refreshed_at) \
             VALUES ($1, $2, $3, $4::jsonb, $5, $6, $7)",
        )
        .bind(heartbeat.id)
        .bind(&heartbeat.name)
        .bind(heartbeat.description.as_deref())
        .bind(labels)
        .bind(heartbeat.ttl.as_deref())
        .bind(heartbeat.created_at)
        .bind(heartbeat.refreshed_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify("fail to create heartbeat", e))?;
        expect_rows(result.rows_affected(), 1, ENTITY, heartbeat.id)?;

        tx.commit()
            .await
            .map_err(|e| classify("fail to create heartbeat", e))?;
        tracing::debug!(id = %heartbeat.id, name = %heartbeat.name, "Heartbeat created");
        Ok(())
    }

    /// Replace name, description, labels and TTL. `refreshed_at` is left
    /// untouched; see [`HeartbeatRepo::refresh`].
    pub async fn update(pool: &PgPool, heartbeat: &Heartbeat) -> DbResult<()> {
        let labels = labels::encode(heartbeat.labels.as_ref())?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| classify("fail to update heartbeat", e))?;
        advisory_xact_lock(&mut tx, &lock_key(TABLE, &heartbeat.name)).await?;

        if let Some(owner) = name_owner(&mut tx, TABLE, &heartbeat.name).await? {
            if owner != heartbeat.id {
                return Err(name_taken(&heartbeat.name));
            }
        }

        let result = sqlx::query(
            "UPDATE heartbeat SET \
                 name = $2, description = $3, labels = $4::jsonb, ttl = $5 \
             WHERE id = $1",
        )
        .bind(heartbeat.id)
        .bind(&heartbeat.name)
        .bind(heartbeat.description.as_deref())
        .bind(labels)
        .bind(heartbeat.ttl.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(|e| classify("fail to update heartbeat", e))?;
        expect_rows(result.rows_affected(), 1, ENTITY, heartbeat.id)?;

        tx.commit()
            .await
            .map_err(|e| classify("fail to update heartbeat", e))?;
        tracing::debug!(id = %heartbeat.id, name = %heartbeat.name, "Heartbeat updated");
        Ok(())
    }

    /// Mark a heartbeat as seen now.
    pub async fn refresh(pool: &PgPool, id: DbId) -> DbResult<()> {
        let result = sqlx::query("UPDATE heartbeat SET refreshed_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(pool)
            .await
            .map_err(|e| classify("fail to refresh heartbeat", e))?;
        expect_rows(result.rows_affected(), 1, ENTITY, id)
    }

    pub async fn get(pool: &PgPool, id: DbId) -> DbResult<Heartbeat> {
        let query = format!("SELECT {COLUMNS} FROM heartbeat WHERE id = $1");
        sqlx::query_as::<_, HeartbeatRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| classify("fail to get heartbeat", e))?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?
            .try_into()
    }

    pub async fn get_by_name(pool: &PgPool, name: &str) -> DbResult<Heartbeat> {
        let query = format!("SELECT {COLUMNS} FROM heartbeat WHERE name = $1");
        sqlx::query_as::<_, HeartbeatRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(|e| classify("fail to get heartbeat", e))?
            .ok_or_else(|| CoreError::not_found(ENTITY, name))?
            .try_into()
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<()> {
        delete_existing(pool, TABLE, ENTITY, id).await
    }

    pub async fn list(pool: &PgPool) -> DbResult<Vec<Heartbeat>> {
        let query = format!("SELECT {COLUMNS} FROM heartbeat ORDER BY name");
        let rows = sqlx::query_as::<_, HeartbeatRow>(&query)
            .fetch_all(pool)
            .await
            .map_err(|e| classify("fail to list heartbeats", e))?;
        rows.into_iter().map(Heartbeat::try_from).collect()
    }

    pub async fn count(pool: &PgPool) -> DbResult<i64> {
        count_rows(pool, TABLE).await
    }
}

fn name_taken(name: &str) -> CoreError {
    CoreError::Conflict(format!("a heartbeat named {name} already exists"))
}
