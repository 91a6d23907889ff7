use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use vigil_core::heartbeat::{Heartbeat, HeartbeatSpec};
use vigil_core::store::HeartbeatStore;
use vigil_core::types::{DbId, Labels};

use crate::error::AppResult;
use crate::handlers::Identifier;
use crate::response::{CountResponse, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct HeartbeatRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1 to 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    /// Duration string such as `"10m"`.
    pub ttl: Option<String>,
}

impl HeartbeatRequest {
    fn into_spec(self) -> AppResult<HeartbeatSpec> {
        self.validate()?;
        let spec = HeartbeatSpec {
            name: self.name,
            description: self.description,
            labels: self.labels,
            ttl: self.ttl,
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// GET /api/v1/heartbeats
pub async fn list_heartbeats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let heartbeats = state.store.list_heartbeats().await?;
    Ok(Json(DataResponse { data: heartbeats }))
}

/// POST /api/v1/heartbeats
pub async fn create_heartbeat(
    State(state): State<AppState>,
    Json(input): Json<HeartbeatRequest>,
) -> AppResult<impl IntoResponse> {
    let heartbeat = Heartbeat::new(input.into_spec()?);
    state.store.create_heartbeat(&heartbeat).await?;

    tracing::info!(id = %heartbeat.id, name = %heartbeat.name, "Heartbeat created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: heartbeat })))
}

/// GET /api/v1/heartbeats/count
pub async fn count_heartbeats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let count = state.store.count_heartbeats().await?;
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// GET /api/v1/heartbeats/{id}
pub async fn get_heartbeat(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> AppResult<impl IntoResponse> {
    let heartbeat = match Identifier::parse(&identifier) {
        Identifier::Id(id) => state.store.get_heartbeat(id).await?,
        Identifier::Name(name) => state.store.get_heartbeat_by_name(&name).await?,
    };
    Ok(Json(DataResponse { data: heartbeat }))
}

/// PUT /api/v1/heartbeats/{id}
pub async fn update_heartbeat(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<HeartbeatRequest>,
) -> AppResult<impl IntoResponse> {
    let spec = input.into_spec()?;
    let heartbeat = state.store.get_heartbeat(id).await?.with_spec(spec);
    state.store.update_heartbeat(&heartbeat).await?;

    tracing::info!(%id, name = %heartbeat.name, "Heartbeat updated");

    Ok(Json(DataResponse { data: heartbeat }))
}

/// PUT /api/v1/heartbeats/{id}/refresh
pub async fn refresh_heartbeat(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.store.refresh_heartbeat(id).await?;
    let heartbeat = state.store.get_heartbeat(id).await?;
    Ok(Json(DataResponse { data: heartbeat }))
}

/// DELETE /api/v1/heartbeats/{id}
pub async fn delete_heartbeat(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.store.delete_heartbeat(id).await?;
    tracing::info!(%id, "Heartbeat deleted");
    Ok(StatusCode::NO_CONTENT)
}
