//! Store contracts consumed by the API layer, one trait per entity family.
//!
//! Implementations must resolve name claims atomically (two concurrent
//! creates with the same name yield one success and one `Conflict`) and
//! report failures through [`CoreError`].

use async_trait::async_trait;

use crate::error::CoreError;
use crate::healthcheck::Healthcheck;
use crate::heartbeat::Heartbeat;
use crate::pushgateway::{PushedMetric, PushgatewayMetric};
use crate::slo::{Slo, SloBucket, SloRecord, SloSum};
use crate::types::{DbId, Timestamp};

#[async_trait]
pub trait HealthcheckStore: Send + Sync {
    async fn create_healthcheck(&self, check: &Healthcheck) -> Result<(), CoreError>;
    async fn get_healthcheck(&self, id: DbId) -> Result<Healthcheck, CoreError>;
    async fn get_healthcheck_by_name(&self, name: &str) -> Result<Healthcheck, CoreError>;
    async fn update_healthcheck(&self, check: &Healthcheck) -> Result<(), CoreError>;
    async fn delete_healthcheck(&self, id: DbId) -> Result<(), CoreError>;
    /// `enabled = Some(b)` restricts the listing to checks with that flag.
    async fn list_healthchecks(&self, enabled: Option<bool>) -> Result<Vec<Healthcheck>, CoreError>;
    /// Enabled checks owned by prober `prober` out of `total_probers`.
    async fn list_healthchecks_for_prober(
        &self,
        prober: u32,
        total_probers: u32,
    ) -> Result<Vec<Healthcheck>, CoreError>;
    async fn count_healthchecks(&self) -> Result<i64, CoreError>;
}

#[async_trait]
pub trait HeartbeatStore: Send + Sync {
    async fn create_heartbeat(&self, heartbeat: &Heartbeat) -> Result<(), CoreError>;
    async fn get_heartbeat(&self, id: DbId) -> Result<Heartbeat, CoreError>;
    async fn get_heartbeat_by_name(&self, name: &str) -> Result<Heartbeat, CoreError>;
    async fn update_heartbeat(&self, heartbeat: &Heartbeat) -> Result<(), CoreError>;
    async fn refresh_heartbeat(&self, id: DbId) -> Result<(), CoreError>;
    async fn delete_heartbeat(&self, id: DbId) -> Result<(), CoreError>;
    async fn list_heartbeats(&self) -> Result<Vec<Heartbeat>, CoreError>;
    async fn count_heartbeats(&self) -> Result<i64, CoreError>;
}

#[async_trait]
pub trait PushgatewayStore: Send + Sync {
    /// Insert or merge a sample, returning the id of the stored metric.
    async fn create_or_update_metric(
        &self,
        metric: &PushedMetric,
        cumulative: bool,
    ) -> Result<DbId, CoreError>;
    async fn list_metrics(&self) -> Result<Vec<PushgatewayMetric>, CoreError>;
    async fn delete_metrics_by_name(&self, name: &str) -> Result<u64, CoreError>;
    async fn delete_metric_by_id(&self, id: DbId) -> Result<(), CoreError>;
    async fn delete_all_metrics(&self) -> Result<u64, CoreError>;
    /// Remove every metric whose expiry lies in the past.
    async fn clean_expired_metrics(&self) -> Result<u64, CoreError>;
}

#[async_trait]
pub trait SloStore: Send + Sync {
    async fn create_slo(&self, slo: &Slo) -> Result<(), CoreError>;
    async fn get_slo(&self, id: DbId) -> Result<Slo, CoreError>;
    async fn get_slo_by_name(&self, name: &str) -> Result<Slo, CoreError>;
    async fn delete_slo(&self, id: DbId) -> Result<(), CoreError>;
    async fn list_slos(&self) -> Result<Vec<Slo>, CoreError>;
    async fn count_slos(&self) -> Result<i64, CoreError>;
    async fn add_record(&self, record: &SloRecord) -> Result<(), CoreError>;
    async fn list_aggregated_records(&self, threshold: Timestamp)
        -> Result<Vec<SloSum>, CoreError>;
    /// Raw buckets of one SLO, oldest first.
    async fn list_slo_buckets(&self, name: &str) -> Result<Vec<SloBucket>, CoreError>;
}
