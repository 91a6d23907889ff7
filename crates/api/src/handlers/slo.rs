use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;
use vigil_core::slo::{Slo, SloRecord, SloSpec, DEFAULT_SUM_WINDOW};
use vigil_core::store::SloStore;
use vigil_core::types::{DbId, Labels};

use crate::error::AppResult;
use crate::handlers::Identifier;
use crate::query::SumsParams;
use crate::response::{CountResponse, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SloRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1 to 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    #[validate(range(min = 0.0, max = 1.0, message = "objective must be between 0 and 1"))]
    pub objective: f64,
}

/// GET /api/v1/slos
pub async fn list_slos(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let slos = state.store.list_slos().await?;
    Ok(Json(DataResponse { data: slos }))
}

/// POST /api/v1/slos
pub async fn create_slo(
    State(state): State<AppState>,
    Json(input): Json<SloRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let spec = SloSpec {
        name: input.name,
        description: input.description,
        labels: input.labels,
        objective: input.objective,
    };
    spec.validate()?;

    let slo = Slo::new(spec);
    state.store.create_slo(&slo).await?;

    tracing::info!(id = %slo.id, name = %slo.name, "SLO created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: slo })))
}

/// GET /api/v1/slos/count
pub async fn count_slos(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let count = state.store.count_slos().await?;
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// GET /api/v1/slos/{id}
pub async fn get_slo(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> AppResult<impl IntoResponse> {
    let slo = match Identifier::parse(&identifier) {
        Identifier::Id(id) => state.store.get_slo(id).await?,
        Identifier::Name(name) => state.store.get_slo_by_name(&name).await?,
    };
    Ok(Json(DataResponse { data: slo }))
}

/// GET /api/v1/slos/{id}/buckets
///
/// Hourly record buckets of one SLO, oldest first.
pub async fn list_buckets(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> AppResult<impl IntoResponse> {
    let slo = match Identifier::parse(&identifier) {
        Identifier::Id(id) => state.store.get_slo(id).await?,
        Identifier::Name(name) => state.store.get_slo_by_name(&name).await?,
    };
    let buckets = state.store.list_slo_buckets(&slo.name).await?;
    Ok(Json(DataResponse { data: buckets }))
}

/// DELETE /api/v1/slos/{id}
pub async fn delete_slo(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.store.delete_slo(id).await?;
    tracing::info!(%id, "SLO deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/slos/records
///
/// Folds a batch of successful or failed events into the current hourly
/// bucket of the SLO.
pub async fn add_record(
    State(state): State<AppState>,
    Json(record): Json<SloRecord>,
) -> AppResult<impl IntoResponse> {
    record.validate()?;
    state.store.add_record(&record).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/slos/sums
///
/// Totals per SLO over buckets started after `since` (default: 30 days ago).
pub async fn list_sums(
    State(state): State<AppState>,
    Query(params): Query<SumsParams>,
) -> AppResult<impl IntoResponse> {
    let threshold = params
        .since
        .unwrap_or_else(|| Utc::now() - DEFAULT_SUM_WINDOW);
    let sums = state.store.list_aggregated_records(threshold).await?;
    Ok(Json(DataResponse { data: sums }))
}
