//! Handlers for pushed metrics and their Prometheus exposition.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;
use vigil_core::pushgateway::{self, PushedMetric};
use vigil_core::store::PushgatewayStore;
use vigil_core::types::{DbId, Labels};

use crate::error::AppResult;
use crate::handlers::Identifier;
use crate::query::PushParams;
use crate::response::{DataResponse, DeletedResponse};
use crate::state::AppState;

/// Content type of the Prometheus text exposition format.
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Deserialize, Validate)]
pub struct PushRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1 to 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    pub ttl: Option<String>,
    /// Prometheus metric type (`counter`, `gauge`, ...).
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub id: DbId,
}

/// POST /api/v1/pushgateway
///
/// Creates the metric, or merges into the stored one with the same name and
/// labels: the value is replaced, or added to with `?cumulative=true`.
pub async fn push_metric(
    State(state): State<AppState>,
    Query(params): Query<PushParams>,
    Json(input): Json<PushRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let metric = PushedMetric::new(
        input.name,
        input.description,
        input.labels,
        input.ttl,
        input.metric_type,
        input.value,
        Utc::now(),
    )?;
    let id = state
        .store
        .create_or_update_metric(&metric, params.cumulative)
        .await?;

    tracing::debug!(%id, name = %metric.name, cumulative = params.cumulative, "Metric pushed");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PushResponse { id },
        }),
    ))
}

/// GET /api/v1/pushgateway
pub async fn list_metrics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let metrics = state.store.list_metrics().await?;
    Ok(Json(DataResponse { data: metrics }))
}

/// DELETE /api/v1/pushgateway
pub async fn delete_all_metrics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let deleted = state.store.delete_all_metrics().await?;
    tracing::info!(deleted, "All pushgateway metrics deleted");
    Ok(Json(DataResponse {
        data: DeletedResponse { deleted },
    }))
}

/// DELETE /api/v1/pushgateway/{id}
///
/// An id removes that one metric; a name removes every label variant of it.
pub async fn delete_metrics(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> AppResult<impl IntoResponse> {
    let deleted = match Identifier::parse(&identifier) {
        Identifier::Id(id) => {
            state.store.delete_metric_by_id(id).await?;
            1
        }
        Identifier::Name(name) => state.store.delete_metrics_by_name(&name).await?,
    };
    tracing::info!(identifier = %identifier, deleted, "Pushgateway metrics deleted");
    Ok(Json(DataResponse {
        data: DeletedResponse { deleted },
    }))
}

/// GET /pushgateway/metrics
pub async fn render_metrics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let metrics = state.store.list_metrics().await?;
    Ok((
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        pushgateway::render(&metrics),
    ))
}
