//! PostgreSQL implementation of the `vigil_core::store` traits.

use async_trait::async_trait;
use vigil_core::error::CoreError;
use vigil_core::healthcheck::Healthcheck;
use vigil_core::heartbeat::Heartbeat;
use vigil_core::pushgateway::{PushedMetric, PushgatewayMetric};
use vigil_core::slo::{Slo, SloBucket, SloRecord, SloSum};
use vigil_core::store::{HealthcheckStore, HeartbeatStore, PushgatewayStore, SloStore};
use vigil_core::types::{DbId, Timestamp};

use crate::repositories::{HealthcheckRepo, HeartbeatRepo, PushgatewayRepo, SloRepo};
use crate::DbPool;

/// Store backed by a shared connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthcheckStore for PgStore {
    async fn create_healthcheck(&self, check: &Healthcheck) -> Result<(), CoreError> {
        HealthcheckRepo::create(&self.pool, check).await
    }

    async fn get_healthcheck(&self, id: DbId) -> Result<Healthcheck, CoreError> {
        HealthcheckRepo::get(&self.pool, id).await
    }

    async fn get_healthcheck_by_name(&self, name: &str) -> Result<Healthcheck, CoreError> {
        HealthcheckRepo::get_by_name(&self.pool, name).await
    }

    async fn update_healthcheck(&self, check: &Healthcheck) -> Result<(), CoreError> {
        HealthcheckRepo::update(&self.pool, check).await
    }

    async fn delete_healthcheck(&self, id: DbId) -> Result<(), CoreError> {
        HealthcheckRepo::delete(&self.pool, id).await
    }

    async fn list_healthchecks(&self, enabled: Option<bool>) -> Result<Vec<Healthcheck>, CoreError> {
        HealthcheckRepo::list(&self.pool, enabled).await
    }

    async fn list_healthchecks_for_prober(
        &self,
        prober: u32,
        total_probers: u32,
    ) -> Result<Vec<Healthcheck>, CoreError> {
        HealthcheckRepo::list_for_prober(&self.pool, prober, total_probers).await
    }

    async fn count_healthchecks(&self) -> Result<i64, CoreError> {
        HealthcheckRepo::count(&self.pool).await
    }
}

#[async_trait]
impl HeartbeatStore for PgStore {
    async fn create_heartbeat(&self, heartbeat: &Heartbeat) -> Result<(), CoreError> {
        HeartbeatRepo::create(&self.pool, heartbeat).await
    }

    async fn get_heartbeat(&self, id: DbId) -> Result<Heartbeat, CoreError> {
        HeartbeatRepo::get(&self.pool, id).await
    }

    async fn get_heartbeat_by_name(&self, name: &str) -> Result<Heartbeat, CoreError> {
        HeartbeatRepo::get_by_name(&self.pool, name).await
    }

    async fn update_heartbeat(&self, heartbeat: &Heartbeat) -> Result<(), CoreError> {
        HeartbeatRepo::update(&self.pool, heartbeat).await
    }

    async fn refresh_heartbeat(&self, id: DbId) -> Result<(), CoreError> {
        HeartbeatRepo::refresh(&self.pool, id).await
    }

    async fn delete_heartbeat(&self, id: DbId) -> Result<(), CoreError> {
        HeartbeatRepo::delete(&self.pool, id).await
    }

    async fn list_heartbeats(&self) -> Result<Vec<Heartbeat>, CoreError> {
        HeartbeatRepo::list(&self.pool).await
    }

    async fn count_heartbeats(&self) -> Result<i64, CoreError> {
        HeartbeatRepo::count(&self.pool).await
    }
}

#[async_trait]
impl PushgatewayStore for PgStore {
    async fn create_or_update_metric(
        &self,
        metric: &PushedMetric,
        cumulative: bool,
    ) -> Result<DbId, CoreError> {
        PushgatewayRepo::create_or_update(&self.pool, metric, cumulative).await
    }

    async fn list_metrics(&self) -> Result<Vec<PushgatewayMetric>, CoreError> {
        PushgatewayRepo::list(&self.pool).await
    }

    async fn delete_metrics_by_name(&self, name: &str) -> Result<u64, CoreError> {
        PushgatewayRepo::delete_by_name(&self.pool, name).await
    }

    async fn delete_metric_by_id(&self, id: DbId) -> Result<(), CoreError> {
        PushgatewayRepo::delete_by_id(&self.pool, id).await
    }

    async fn delete_all_metrics(&self) -> Result<u64, CoreError> {
        PushgatewayRepo::delete_all(&self.pool).await
    }

    async fn clean_expired_metrics(&self) -> Result<u64, CoreError> {
        PushgatewayRepo::clean_expired(&self.pool).await
    }
}

#[async_trait]
impl SloStore for PgStore {
    async fn create_slo(&self, slo: &Slo) -> Result<(), CoreError> {
        SloRepo::create(&self.pool, slo).await
    }

    async fn get_slo(&self, id: DbId) -> Result<Slo, CoreError> {
        SloRepo::get(&self.pool, id).await
    }

    async fn get_slo_by_name(&self, name: &str) -> Result<Slo, CoreError> {
        SloRepo::get_by_name(&self.pool, name).await
    }

    async fn delete_slo(&self, id: DbId) -> Result<(), CoreError> {
        SloRepo::delete(&self.pool, id).await
    }

    async fn list_slos(&self) -> Result<Vec<Slo>, CoreError> {
        SloRepo::list(&self.pool).await
    }

    async fn count_slos(&self) -> Result<i64, CoreError> {
        SloRepo::count(&self.pool).await
    }

    async fn add_record(&self, record: &SloRecord) -> Result<(), CoreError> {
        SloRepo::add_record(&self.pool, record).await
    }

    async fn list_aggregated_records(
        &self,
        threshold: Timestamp,
    ) -> Result<Vec<SloSum>, CoreError> {
        SloRepo::list_aggregated_records(&self.pool, threshold).await
    }

    async fn list_slo_buckets(&self, name: &str) -> Result<Vec<SloBucket>, CoreError> {
        SloRepo::list_buckets(&self.pool, name).await
    }
}
