//! Handlers for health check definitions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;
use vigil_core::healthcheck::{
    Healthcheck, HealthcheckDefinition, HealthcheckKind, HealthcheckSpec,
};
use vigil_core::store::HealthcheckStore;
use vigil_core::types::{DbId, Labels};

use crate::error::{AppError, AppResult};
use crate::handlers::Identifier;
use crate::query::HealthcheckListParams;
use crate::response::{CountResponse, DataResponse};
use crate::state::AppState;

/// Body of create and update requests.
///
/// The definition is kept as raw JSON until `type` is known, then decoded
/// into the matching [`HealthcheckDefinition`] case.
#[derive(Debug, Deserialize, Validate)]
pub struct HealthcheckRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1 to 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    pub interval: String,
    pub timeout: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: HealthcheckKind,
    pub definition: serde_json::Value,
}

fn enabled_by_default() -> bool {
    true
}

impl HealthcheckRequest {
    fn into_spec(self) -> AppResult<HealthcheckSpec> {
        self.validate()?;
        let spec = HealthcheckSpec {
            definition: HealthcheckDefinition::from_value(self.kind, self.definition)?,
            name: self.name,
            description: self.description,
            labels: self.labels,
            interval: self.interval,
            timeout: self.timeout,
            enabled: self.enabled,
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// GET /api/v1/healthchecks
///
/// Optional `enabled` filter, then an optional `name-pattern` regex applied
/// to the fetched names.
pub async fn list_healthchecks(
    State(state): State<AppState>,
    Query(params): Query<HealthcheckListParams>,
) -> AppResult<impl IntoResponse> {
    let pattern = params
        .name_pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("invalid name pattern: {e}")))?;

    let mut checks = state.store.list_healthchecks(params.enabled).await?;
    if let Some(pattern) = pattern {
        checks.retain(|c| pattern.is_match(&c.name));
    }

    Ok(Json(DataResponse { data: checks }))
}

/// POST /api/v1/healthchecks
pub async fn create_healthcheck(
    State(state): State<AppState>,
    Json(input): Json<HealthcheckRequest>,
) -> AppResult<impl IntoResponse> {
    let check = Healthcheck::new(input.into_spec()?);
    state.store.create_healthcheck(&check).await?;

    tracing::info!(
        id = %check.id,
        name = %check.name,
        kind = %check.kind(),
        target = %check.definition.summary(),
        "Healthcheck created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: check })))
}

/// GET /api/v1/healthchecks/count
pub async fn count_healthchecks(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let count = state.store.count_healthchecks().await?;
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// GET /api/v1/healthchecks/{id}
///
/// Accepts either the id or the name of the health check.
pub async fn get_healthcheck(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> AppResult<impl IntoResponse> {
    let check = match Identifier::parse(&identifier) {
        Identifier::Id(id) => state.store.get_healthcheck(id).await?,
        Identifier::Name(name) => state.store.get_healthcheck_by_name(&name).await?,
    };
    Ok(Json(DataResponse { data: check }))
}

/// PUT /api/v1/healthchecks/{id}
///
/// Replaces every mutable field. Id, shard id and creation time are kept.
pub async fn update_healthcheck(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<HealthcheckRequest>,
) -> AppResult<impl IntoResponse> {
    let spec = input.into_spec()?;
    let check = state.store.get_healthcheck(id).await?.with_spec(spec);
    state.store.update_healthcheck(&check).await?;

    tracing::info!(%id, name = %check.name, "Healthcheck updated");

    Ok(Json(DataResponse { data: check }))
}

/// DELETE /api/v1/healthchecks/{id}
pub async fn delete_healthcheck(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.store.delete_healthcheck(id).await?;
    tracing::info!(%id, "Healthcheck deleted");
    Ok(StatusCode::NO_CONTENT)
}
