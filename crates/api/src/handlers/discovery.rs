//! Prober discovery: the slice of enabled health checks a prober runs.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use vigil_core::healthcheck::Healthcheck;
use vigil_core::labels;
use vigil_core::store::HealthcheckStore;

use crate::error::AppResult;
use crate::query::DiscoveryParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/discovery/{prober}
///
/// Enabled checks whose shard belongs to `prober` out of the configured
/// prober count, optionally filtered by a `labels=a=b,c=d` selector and
/// grouped by kind.
pub async fn discover(
    State(state): State<AppState>,
    Path(prober): Path<u32>,
    Query(params): Query<DiscoveryParams>,
) -> AppResult<impl IntoResponse> {
    let selector = labels::parse_selector(params.labels.as_deref().unwrap_or_default())?;

    let checks = state
        .store
        .list_healthchecks_for_prober(prober, state.config.probers)
        .await?;

    let mut by_kind: BTreeMap<&'static str, Vec<Healthcheck>> = BTreeMap::new();
    for check in checks {
        if labels::matches(check.labels.as_ref(), &selector) {
            by_kind.entry(check.kind().as_str()).or_default().push(check);
        }
    }

    tracing::debug!(prober, total = state.config.probers, "Discovery served");

    Ok(Json(DataResponse { data: by_kind }))
}
