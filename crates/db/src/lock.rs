//! Transaction-scoped advisory locks.
//!
//! A name claim (create or rename) takes `pg_advisory_xact_lock` on a hash of
//! the name before checking for an existing owner. Any other transaction
//! claiming the same name blocks until the first one commits or rolls back,
//! which closes the gap between the check and the insert. The lock is
//! released automatically at transaction end.

use sqlx::PgConnection;

use crate::error::{classify, DbResult};

/// Namespaced lock key, so that families never contend with each other.
pub fn lock_key(family: &str, name: &str) -> String {
    format!("{family}:{name}")
}

/// Block until the advisory lock for `key` is held by this transaction.
pub async fn advisory_xact_lock(conn: &mut PgConnection, key: &str) -> DbResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(key)
        .execute(conn)
        .await
        .map_err(|e| classify("fail to acquire advisory lock", e))?;
    Ok(())
}

/// Id of the row of `table` currently holding `name`, if any.
///
/// `table` is always one of the repositories' table constants.
pub async fn name_owner(
    conn: &mut PgConnection,
    table: &'static str,
    name: &str,
) -> DbResult<Option<uuid::Uuid>> {
    let query = format!("SELECT id FROM {table} WHERE name = $1");
    sqlx::query_scalar::<_, uuid::Uuid>(&query)
        .bind(name)
        .fetch_optional(conn)
        .await
        .map_err(|e| classify("fail to check name ownership", e))
}
