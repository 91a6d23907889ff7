//! Classification of driver errors into the domain taxonomy.

use vigil_core::error::CoreError;

/// Result type returned by every repository method.
pub type DbResult<T> = Result<T, CoreError>;

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Classify a sqlx error, prefixing the message with `context`.
///
/// - `RowNotFound` maps to `NotFound`.
/// - Unique constraint violations map to `Conflict`.
/// - Everything else maps to `Internal`.
pub fn classify(context: &str, err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::RowNotFound => CoreError::NotFound {
            entity: "resource",
            key: context.to_string(),
        },
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            CoreError::Conflict(format!(
                "{context}: resource already exists (constraint {constraint})"
            ))
        }
        _ => CoreError::Internal(format!("{context}: {err}")),
    }
}

/// Check the number of rows touched by a write.
///
/// Zero rows means the target vanished (`NotFound`); any other mismatch is
/// unexpected and reported as `Internal`.
pub fn expect_rows(
    affected: u64,
    expected: u64,
    entity: &'static str,
    key: impl std::fmt::Display,
) -> DbResult<()> {
    if affected == expected {
        return Ok(());
    }
    if affected == 0 {
        return Err(CoreError::not_found(entity, key));
    }
    Err(CoreError::Internal(format!(
        "expected {expected} rows changed, got {affected}"
    )))
}
