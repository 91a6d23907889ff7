//! Repository for the `slo` and `slo_records_aggregated` tables.

use chrono::Utc;
use sqlx::PgPool;
use vigil_core::error::CoreError;
use vigil_core::labels;
use vigil_core::slo::{self, Slo, SloBucket, SloRecord, SloSum};
use vigil_core::types::{DbId, Timestamp};

use crate::error::{classify, expect_rows, DbResult};
use crate::lock::{advisory_xact_lock, lock_key, name_owner};
use crate::models::slo::{SloBucketRow, SloRow, SloTotalRow};
use crate::repositories::common::{count_rows, delete_existing};

const TABLE: &str = "slo";

const ENTITY: &str = "slo";

const COLUMNS: &str = "id, name, description, labels::text AS labels, objective, created_at";

pub struct SloRepo;

impl SloRepo {
    // -----------------------------------------------------------------------
    // Definitions
    // -----------------------------------------------------------------------

    pub async fn create(pool: &PgPool, slo: &Slo) -> DbResult<()> {
        let labels = labels::encode(slo.labels.as_ref())?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| classify("fail to create slo", e))?;
        advisory_xact_lock(&mut tx, &lock_key(TABLE, &slo.name)).await?;

        if name_owner(&mut tx, TABLE, &slo.name).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "an slo named {} already exists",
                slo.name
            )));
        }

        let result = sqlx::query(
            "INSERT INTO slo (id, name, description, labels, objective, created_at) \
             VALUES ($1, $2, $3, $4::jsonb, $5, $6)",
        )
        .bind(slo.id)
        .bind(&slo.name)
        .bind(slo.description.as_deref())
        .bind(labels)
        .bind(slo.objective)
        .bind(slo.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify("fail to create slo", e))?;
        expect_rows(result.rows_affected(), 1, ENTITY, slo.id)?;

        tx.commit()
            .await
            .map_err(|e| classify("fail to create slo", e))?;
        tracing::debug!(id = %slo.id, name = %slo.name, "SLO created");
        Ok(())
    }

    pub async fn get(pool: &PgPool, id: DbId) -> DbResult<Slo> {
        let query = format!("SELECT {COLUMNS} FROM slo WHERE id = $1");
        sqlx::query_as::<_, SloRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| classify("fail to get slo", e))?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?
            .try_into()
    }

    pub async fn get_by_name(pool: &PgPool, name: &str) -> DbResult<Slo> {
        let query = format!("SELECT {COLUMNS} FROM slo WHERE name = $1");
        sqlx::query_as::<_, SloRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(|e| classify("fail to get slo", e))?
            .ok_or_else(|| CoreError::not_found(ENTITY, name))?
            .try_into()
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<()> {
        delete_existing(pool, TABLE, ENTITY, id).await
    }

    pub async fn list(pool: &PgPool) -> DbResult<Vec<Slo>> {
        let query = format!("SELECT {COLUMNS} FROM slo ORDER BY name");
        let rows = sqlx::query_as::<_, SloRow>(&query)
            .fetch_all(pool)
            .await
            .map_err(|e| classify("fail to list slos", e))?;
        rows.into_iter().map(Slo::try_from).collect()
    }

    pub async fn count(pool: &PgPool) -> DbResult<i64> {
        count_rows(pool, TABLE).await
    }

    // -----------------------------------------------------------------------
    // Record buckets
    // -----------------------------------------------------------------------

    /// Fold a record into the current bucket of its `(name, success)` pair.
    pub async fn add_record(pool: &PgPool, record: &SloRecord) -> DbResult<()> {
        Self::add_record_at(pool, record, Utc::now()).await
    }

    /// Fold a record as if it arrived at `now`.
    ///
    /// The latest bucket is incremented when it started at most one hour
    /// before `now`; otherwise a new bucket starting at `now` is opened.
    pub async fn add_record_at(pool: &PgPool, record: &SloRecord, now: Timestamp) -> DbResult<()> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| classify("fail to add slo record", e))?;
        let key = lock_key("slo-record", &format!("{}:{}", record.name, record.success));
        advisory_xact_lock(&mut tx, &key).await?;

        let latest: Option<Timestamp> = sqlx::query_scalar(
            "SELECT started_at FROM slo_records_aggregated \
             WHERE name = $1 AND success = $2 \
             ORDER BY started_at DESC LIMIT 1",
        )
        .bind(&record.name)
        .bind(record.success)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| classify("fail to add slo record", e))?;

        let result = match latest {
            Some(started_at) if !slo::needs_new_bucket(Some(started_at), now) => {
                tracing::debug!(name = %record.name, success = record.success, %started_at, "Incrementing SLO bucket");
                sqlx::query(
                    "UPDATE slo_records_aggregated SET value = value + $4 \
                     WHERE name = $1 AND success = $2 AND started_at = $3",
                )
                .bind(&record.name)
                .bind(record.success)
                .bind(started_at)
                .bind(record.value)
                .execute(&mut *tx)
                .await
            }
            _ => {
                tracing::debug!(name = %record.name, success = record.success, "Opening SLO bucket");
                sqlx::query(
                    "INSERT INTO slo_records_aggregated (name, started_at, success, value) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(&record.name)
                .bind(now)
                .bind(record.success)
                .bind(record.value)
                .execute(&mut *tx)
                .await
            }
        }
        .map_err(|e| classify("fail to add slo record", e))?;
        expect_rows(result.rows_affected(), 1, "slo bucket", &record.name)?;

        tx.commit()
            .await
            .map_err(|e| classify("fail to add slo record", e))?;
        Ok(())
    }

    /// Per-SLO success and failure totals over buckets started after
    /// `threshold`, sorted by name.
    pub async fn list_aggregated_records(
        pool: &PgPool,
        threshold: Timestamp,
    ) -> DbResult<Vec<SloSum>> {
        let rows = sqlx::query_as::<_, SloTotalRow>(
            "SELECT name, success, SUM(value)::BIGINT AS value \
             FROM slo_records_aggregated \
             WHERE started_at > $1 \
             GROUP BY name, success",
        )
        .bind(threshold)
        .fetch_all(pool)
        .await
        .map_err(|e| classify("fail to list slo records", e))?;
        Ok(slo::fold_sums(
            rows.into_iter().map(|r| (r.name, r.success, r.value)),
            threshold,
        ))
    }

    /// Raw buckets of one SLO, oldest first.
    pub async fn list_buckets(pool: &PgPool, name: &str) -> DbResult<Vec<SloBucket>> {
        let rows = sqlx::query_as::<_, SloBucketRow>(
            "SELECT name, started_at, success, value FROM slo_records_aggregated \
             WHERE name = $1 ORDER BY started_at, success",
        )
        .bind(name)
        .fetch_all(pool)
        .await
        .map_err(|e| classify("fail to list slo buckets", e))?;
        Ok(rows.into_iter().map(SloBucket::from).collect())
    }
}
