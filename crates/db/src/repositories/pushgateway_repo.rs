//! Repository for the `pushgateway_metric` table.
//!
//! A metric is identified by `(name, labels)`. Labels are stored in their
//! canonical JSON form (`{}` when unset) and compared with JSONB equality,
//! so `{"a":"1"}` and `{"a":"1","b":"2"}` are distinct metrics.

use chrono::Utc;
use sqlx::PgPool;
use vigil_core::labels;
use vigil_core::pushgateway::{PushedMetric, PushgatewayMetric};
use vigil_core::types::DbId;

use crate::error::{classify, expect_rows, DbResult};
use crate::lock::{advisory_xact_lock, lock_key};
use crate::models::pushgateway::PushgatewayMetricRow;

const ENTITY: &str = "pushgateway metric";

const COLUMNS: &str = "\
    id, name, description, labels::text AS labels, ttl, type AS metric_type, \
    value, created_at, expires_at";

pub struct PushgatewayRepo;

impl PushgatewayRepo {
    /// Insert a sample or merge it into the stored metric with the same
    /// name and labels, returning the stored metric's id.
    ///
    /// On merge the value is replaced, or added to when `cumulative` is set;
    /// description, type, TTL, `created_at` and `expires_at` are always
    /// refreshed from the incoming sample. All pushes of one name serialize
    /// on the same advisory lock, so concurrent cumulative pushes never lose
    /// an increment.
    pub async fn create_or_update(
        pool: &PgPool,
        metric: &PushedMetric,
        cumulative: bool,
    ) -> DbResult<DbId> {
        let labels = labels::canonical(metric.labels.as_ref());

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| classify("fail to push metric", e))?;
        advisory_xact_lock(&mut tx, &lock_key("pushgateway", &metric.name)).await?;

        let existing: Option<(DbId, f64)> = sqlx::query_as(
            "SELECT id, value FROM pushgateway_metric \
             WHERE name = $1 AND labels = $2::jsonb",
        )
        .bind(&metric.name)
        .bind(&labels)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| classify("fail to push metric", e))?;

        let id = match existing {
            None => {
                let id = uuid::Uuid::new_v4();
                let result = sqlx::query(
                    "INSERT INTO pushgateway_metric \
                         (id, name, description, ttl, labels, value, type, created_at, expires_at) \
                     VALUES ($1, $2, $3, $4, $5::jsonb, $6, $7, $8, $9)",
                )
                .bind(id)
                .bind(&metric.name)
                .bind(metric.description.as_deref())
                .bind(metric.ttl.as_deref())
                .bind(&labels)
                .bind(metric.value)
                .bind(metric.metric_type.as_deref())
                .bind(metric.created_at)
                .bind(metric.expires_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| classify("fail to push metric", e))?;
                expect_rows(result.rows_affected(), 1, ENTITY, id)?;
                tracing::debug!(%id, name = %metric.name, "Pushgateway metric created");
                id
            }
            Some((id, current)) => {
                let value = if cumulative {
                    current + metric.value
                } else {
                    metric.value
                };
                let result = sqlx::query(
                    "UPDATE pushgateway_metric SET \
                         description = $2, ttl = $3, value = $4, type = $5, \
                         created_at = $6, expires_at = $7 \
                     WHERE id = $1",
                )
                .bind(id)
                .bind(metric.description.as_deref())
                .bind(metric.ttl.as_deref())
                .bind(value)
                .bind(metric.metric_type.as_deref())
                .bind(metric.created_at)
                .bind(metric.expires_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| classify("fail to push metric", e))?;
                expect_rows(result.rows_affected(), 1, ENTITY, id)?;
                tracing::debug!(%id, name = %metric.name, cumulative, "Pushgateway metric updated");
                id
            }
        };

        tx.commit()
            .await
            .map_err(|e| classify("fail to push metric", e))?;
        Ok(id)
    }

    pub async fn list(pool: &PgPool) -> DbResult<Vec<PushgatewayMetric>> {
        let query = format!(
            "SELECT {COLUMNS} FROM pushgateway_metric ORDER BY name, labels::text"
        );
        let rows = sqlx::query_as::<_, PushgatewayMetricRow>(&query)
            .fetch_all(pool)
            .await
            .map_err(|e| classify("fail to list pushgateway metrics", e))?;
        rows.into_iter().map(PushgatewayMetric::try_from).collect()
    }

    /// Delete every label variant of `name`, returning how many were
    /// removed. Deleting a name with no stored metric is `NotFound`.
    pub async fn delete_by_name(pool: &PgPool, name: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM pushgateway_metric WHERE name = $1")
            .bind(name)
            .execute(pool)
            .await
            .map_err(|e| classify("fail to delete pushgateway metrics", e))?;
        let deleted = result.rows_affected();
        if deleted == 0 {
            return Err(vigil_core::error::CoreError::not_found(ENTITY, name));
        }
        tracing::debug!(name, deleted, "Pushgateway metrics deleted");
        Ok(deleted)
    }

    pub async fn delete_by_id(pool: &PgPool, id: DbId) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM pushgateway_metric WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| classify("fail to delete pushgateway metric", e))?;
        expect_rows(result.rows_affected(), 1, ENTITY, id)
    }

    pub async fn delete_all(pool: &PgPool) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM pushgateway_metric")
            .execute(pool)
            .await
            .map_err(|e| classify("fail to delete pushgateway metrics", e))?;
        Ok(result.rows_affected())
    }

    /// Remove every metric whose `expires_at` lies in the past.
    ///
    /// A plain conditional delete: safe to run while pushes are in flight.
    pub async fn clean_expired(pool: &PgPool) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM pushgateway_metric WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(pool)
            .await
            .map_err(|e| classify("fail to clean expired pushgateway metrics", e))?;
        Ok(result.rows_affected())
    }
}
