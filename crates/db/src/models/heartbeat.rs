use sqlx::FromRow;
use vigil_core::error::CoreError;
use vigil_core::heartbeat::Heartbeat;
use vigil_core::labels;
use vigil_core::types::{DbId, Timestamp};

/// A row from the `heartbeat` table.
#[derive(Debug, Clone, FromRow)]
pub struct HeartbeatRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<String>,
    pub ttl: Option<String>,
    pub created_at: Timestamp,
    pub refreshed_at: Option<Timestamp>,
}

impl TryFrom<HeartbeatRow> for Heartbeat {
    type Error = CoreError;

    fn try_from(row: HeartbeatRow) -> Result<Self, Self::Error> {
        Ok(Heartbeat {
            id: row.id,
            labels: labels::decode(row.labels.as_deref())?,
            name: row.name,
            description: row.description,
            ttl: row.ttl,
            created_at: row.created_at,
            refreshed_at: row.refreshed_at,
        })
    }
}
