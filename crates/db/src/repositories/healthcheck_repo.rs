//! Repository for the `healthcheck` table.

use sqlx::PgPool;
use vigil_core::error::CoreError;
use vigil_core::healthcheck::Healthcheck;
use vigil_core::labels;
use vigil_core::sharding;
use vigil_core::types::DbId;

use crate::error::{classify, expect_rows, DbResult};
use crate::lock::{advisory_xact_lock, lock_key, name_owner};
use crate::models::healthcheck::HealthcheckRow;
use crate::repositories::common::{count_rows, delete_existing};

const TABLE: &str = "healthcheck";

const ENTITY: &str = "healthcheck";

/// Column list for `healthcheck` queries.
const COLUMNS: &str = "\
    id, name, description, labels::text AS labels, random_id, created_at, \
    type AS kind, \"interval\", timeout, enabled, definition";

/// Provides CRUD and prober-shard queries for health checks.
pub struct HealthcheckRepo;

impl HealthcheckRepo {
    /// Insert a new health check.
    ///
    /// Fails with `Conflict` when another health check already holds the
    /// name. Concurrent creates of the same name are serialized by the
    /// advisory lock, so exactly one of them succeeds.
    pub async fn create(pool: &PgPool, check: &Healthcheck) -> DbResult<()> {
        let (kind, definition) = check.definition.encode()?;
        let labels = labels::encode(check.labels.as_ref())?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| classify("fail to create healthcheck", e))?;
        advisory_xact_lock(&mut tx, &lock_key(TABLE, &check.name)).await?;

        if name_owner(&mut tx, TABLE, &check.name).await?.is_some() {
            return Err(name_taken(&check.name));
        }

        let result = sqlx::query(
            "INSERT INTO healthcheck \
                 (id, name, description, labels, random_id, created_at, \
                  type, \"interval\", timeout, enabled, definition) \
             VALUES ($1, $2, $3, $4::jsonb, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(check.id)
        .bind(&check.name)
        .bind(check.description.as_deref())
        .bind(labels)
        .bind(check.random_id)
        .bind(check.created_at)
        .bind(kind.as_str())
        .bind(&check.interval)
        .bind(&check.timeout)
        .bind(check.enabled)
        .bind(definition)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify("fail to create healthcheck", e))?;
        expect_rows(result.rows_affected(), 1, ENTITY, check.id)?;

        tx.commit()
            .await
            .map_err(|e| classify("fail to create healthcheck", e))?;
        tracing::debug!(id = %check.id, name = %check.name, kind = %kind, "Healthcheck created");
        Ok(())
    }

    /// Replace every mutable field of an existing health check.
    ///
    /// The health check type is fixed at creation: changing it is rejected
    /// with `BadRequest`. Renaming onto a name held by another health check
    /// fails with `Conflict`; keeping one's own name is always allowed.
    pub async fn update(pool: &PgPool, check: &Healthcheck) -> DbResult<()> {
        let (kind, definition) = check.definition.encode()?;
        let labels = labels::encode(check.labels.as_ref())?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| classify("fail to update healthcheck", e))?;
        advisory_xact_lock(&mut tx, &lock_key(TABLE, &check.name)).await?;

        let current_kind: Option<String> =
            sqlx::query_scalar("SELECT type FROM healthcheck WHERE id = $1 FOR UPDATE")
                .bind(check.id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| classify("fail to update healthcheck", e))?;
        let current_kind = current_kind.ok_or_else(|| CoreError::not_found(ENTITY, check.id))?;
        if current_kind != kind.as_str() {
            return Err(CoreError::BadRequest(format!(
                "the type of healthcheck {} cannot be changed from {current_kind} to {kind}",
                check.name
            )));
        }

        if let Some(owner) = name_owner(&mut tx, TABLE, &check.name).await? {
            if owner != check.id {
                return Err(name_taken(&check.name));
            }
        }

        let result = sqlx::query(
            "UPDATE healthcheck SET \
                 name = $2, description = $3, labels = $4::jsonb, \
                 \"interval\" = $5, timeout = $6, enabled = $7, definition = $8 \
             WHERE id = $1",
        )
        .bind(check.id)
        .bind(&check.name)
        .bind(check.description.as_deref())
        .bind(labels)
        .bind(&check.interval)
        .bind(&check.timeout)
        .bind(check.enabled)
        .bind(definition)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify("fail to update healthcheck", e))?;
        expect_rows(result.rows_affected(), 1, ENTITY, check.id)?;

        tx.commit()
            .await
            .map_err(|e| classify("fail to update healthcheck", e))?;
        tracing::debug!(id = %check.id, name = %check.name, "Healthcheck updated");
        Ok(())
    }

    pub async fn get(pool: &PgPool, id: DbId) -> DbResult<Healthcheck> {
        let query = format!("SELECT {COLUMNS} FROM healthcheck WHERE id = $1");
        sqlx::query_as::<_, HealthcheckRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| classify("fail to get healthcheck", e))?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?
            .try_into()
    }

    pub async fn get_by_name(pool: &PgPool, name: &str) -> DbResult<Healthcheck> {
        let query = format!("SELECT {COLUMNS} FROM healthcheck WHERE name = $1");
        sqlx::query_as::<_, HealthcheckRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(|e| classify("fail to get healthcheck", e))?
            .ok_or_else(|| CoreError::not_found(ENTITY, name))?
            .try_into()
    }

    /// Delete a health check. A missing id yields `NotFound`.
    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<()> {
        delete_existing(pool, TABLE, ENTITY, id).await
    }

    /// List health checks ordered by name, optionally only enabled or
    /// disabled ones.
    pub async fn list(pool: &PgPool, enabled: Option<bool>) -> DbResult<Vec<Healthcheck>> {
        let query = format!(
            "SELECT {COLUMNS} FROM healthcheck \
             WHERE ($1::boolean IS NULL OR enabled = $1) \
             ORDER BY name"
        );
        let rows = sqlx::query_as::<_, HealthcheckRow>(&query)
            .bind(enabled)
            .fetch_all(pool)
            .await
            .map_err(|e| classify("fail to list healthchecks", e))?;
        rows.into_iter().map(Healthcheck::try_from).collect()
    }

    /// Enabled health checks owned by `prober` out of `total_probers`.
    ///
    /// Ownership is `random_id % total_probers == prober`, so the slices of
    /// all probers partition the enabled checks.
    pub async fn list_for_prober(
        pool: &PgPool,
        prober: u32,
        total_probers: u32,
    ) -> DbResult<Vec<Healthcheck>> {
        sharding::validate_prober(prober, total_probers)?;
        let query = format!(
            "SELECT {COLUMNS} FROM healthcheck \
             WHERE enabled AND random_id % $1 = $2 \
             ORDER BY name"
        );
        let rows = sqlx::query_as::<_, HealthcheckRow>(&query)
            .bind(i64::from(total_probers))
            .bind(i64::from(prober))
            .fetch_all(pool)
            .await
            .map_err(|e| classify("fail to list healthchecks for prober", e))?;
        rows.into_iter().map(Healthcheck::try_from).collect()
    }

    pub async fn count(pool: &PgPool) -> DbResult<i64> {
        count_rows(pool, TABLE).await
    }
}

fn name_taken(name: &str) -> CoreError {
    CoreError::Conflict(format!("a healthcheck named {name} already exists"))
}
