use sqlx::FromRow;
use vigil_core::error::CoreError;
use vigil_core::labels;
use vigil_core::pushgateway::PushgatewayMetric;
use vigil_core::types::{DbId, Timestamp};

/// A row from the `pushgateway_metric` table.
#[derive(Debug, Clone, FromRow)]
pub struct PushgatewayMetricRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Never NULL: an unlabeled metric is stored as `{}`.
    pub labels: String,
    pub ttl: Option<String>,
    /// The `type` column.
    pub metric_type: Option<String>,
    pub value: f64,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

impl TryFrom<PushgatewayMetricRow> for PushgatewayMetric {
    type Error = CoreError;

    fn try_from(row: PushgatewayMetricRow) -> Result<Self, Self::Error> {
        // `{}` is the storage form of "no labels".
        let labels = labels::decode(Some(&row.labels))?.filter(|l| !l.is_empty());
        Ok(PushgatewayMetric {
            id: row.id,
            labels,
            name: row.name,
            description: row.description,
            ttl: row.ttl,
            metric_type: row.metric_type,
            value: row.value,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}
