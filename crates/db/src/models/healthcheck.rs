use sqlx::FromRow;
use vigil_core::error::CoreError;
use vigil_core::healthcheck::{Healthcheck, HealthcheckDefinition};
use vigil_core::labels;
use vigil_core::types::{DbId, Timestamp};

/// A row from the `healthcheck` table.
#[derive(Debug, Clone, FromRow)]
pub struct HealthcheckRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<String>,
    pub random_id: i32,
    pub created_at: Timestamp,
    /// The `type` column.
    pub kind: String,
    pub interval: String,
    pub timeout: String,
    pub enabled: bool,
    pub definition: String,
}

impl TryFrom<HealthcheckRow> for Healthcheck {
    type Error = CoreError;

    fn try_from(row: HealthcheckRow) -> Result<Self, Self::Error> {
        Ok(Healthcheck {
            id: row.id,
            random_id: row.random_id,
            labels: labels::decode(row.labels.as_deref())?,
            definition: HealthcheckDefinition::decode(&row.kind, &row.definition)?,
            name: row.name,
            description: row.description,
            interval: row.interval,
            timeout: row.timeout,
            enabled: row.enabled,
            created_at: row.created_at,
        })
    }
}
