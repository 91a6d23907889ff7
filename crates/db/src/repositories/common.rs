//! Helpers shared by the named-resource repositories.

use sqlx::PgPool;
use vigil_core::error::CoreError;
use vigil_core::types::DbId;

use crate::error::{classify, expect_rows, DbResult};

/// Delete one row of `table` by id.
///
/// Existence is checked first under a row lock, so a missing id surfaces as
/// `NotFound` rather than a silent zero-row delete.
pub(crate) async fn delete_existing(
    pool: &PgPool,
    table: &'static str,
    entity: &'static str,
    id: DbId,
) -> DbResult<()> {
    let context = format!("fail to delete {entity}");
    let mut tx = pool.begin().await.map_err(|e| classify(&context, e))?;

    let select = format!("SELECT id FROM {table} WHERE id = $1 FOR UPDATE");
    sqlx::query_scalar::<_, DbId>(&select)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| classify(&context, e))?
        .ok_or_else(|| CoreError::not_found(entity, id))?;

    let delete = format!("DELETE FROM {table} WHERE id = $1");
    let result = sqlx::query(&delete)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify(&context, e))?;
    expect_rows(result.rows_affected(), 1, entity, id)?;

    tx.commit().await.map_err(|e| classify(&context, e))?;
    tracing::debug!(%id, entity, "Deleted");
    Ok(())
}

/// `SELECT COUNT(*)` over a whole table.
pub(crate) async fn count_rows(pool: &PgPool, table: &'static str) -> DbResult<i64> {
    let query = format!("SELECT COUNT(*) FROM {table}");
    sqlx::query_scalar(&query)
        .fetch_one(pool)
        .await
        .map_err(|e| classify(&format!("fail to count {table} rows"), e))
}
