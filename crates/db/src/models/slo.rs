use sqlx::FromRow;
use vigil_core::error::CoreError;
use vigil_core::labels;
use vigil_core::slo::{Slo, SloBucket};
use vigil_core::types::{DbId, Timestamp};

/// A row from the `slo` table.
#[derive(Debug, Clone, FromRow)]
pub struct SloRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<String>,
    pub objective: f64,
    pub created_at: Timestamp,
}

impl TryFrom<SloRow> for Slo {
    type Error = CoreError;

    fn try_from(row: SloRow) -> Result<Self, Self::Error> {
        Ok(Slo {
            id: row.id,
            labels: labels::decode(row.labels.as_deref())?,
            name: row.name,
            description: row.description,
            objective: row.objective,
            created_at: row.created_at,
        })
    }
}

/// A row from the `slo_records_aggregated` table: one hourly bucket.
#[derive(Debug, Clone, FromRow)]
pub struct SloBucketRow {
    pub name: String,
    pub started_at: Timestamp,
    pub success: bool,
    pub value: i64,
}

impl From<SloBucketRow> for SloBucket {
    fn from(row: SloBucketRow) -> Self {
        SloBucket {
            name: row.name,
            started_at: row.started_at,
            success: row.success,
            value: row.value,
        }
    }
}

/// Per-`(name, success)` total returned by the aggregation query.
#[derive(Debug, Clone, FromRow)]
pub struct SloTotalRow {
    pub name: String,
    pub success: bool,
    pub value: i64,
}
