//! Query parameter types shared by handler modules.

use serde::Deserialize;
use vigil_core::types::Timestamp;

/// `GET /healthchecks?name-pattern=&enabled=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HealthcheckListParams {
    /// Regular expression matched against health check names.
    pub name_pattern: Option<String>,
    pub enabled: Option<bool>,
}

/// `GET /discovery/{prober}?labels=a=b,c=d`
#[derive(Debug, Default, Deserialize)]
pub struct DiscoveryParams {
    pub labels: Option<String>,
}

/// `POST /pushgateway?cumulative=true`
#[derive(Debug, Default, Deserialize)]
pub struct PushParams {
    #[serde(default)]
    pub cumulative: bool,
}

/// `GET /slos/sums?since=2025-01-01T00:00:00Z`
#[derive(Debug, Default, Deserialize)]
pub struct SumsParams {
    pub since: Option<Timestamp>,
}
