use axum::routing::{get, put};
use axum::Router;

use crate::handlers::heartbeat;
use crate::state::AppState;

/// Routes mounted at `/heartbeats`.
///
/// ```text
/// GET    /              -> list_heartbeats
/// POST   /              -> create_heartbeat
/// GET    /count         -> count_heartbeats
/// GET    /{id}          -> get_heartbeat (id or name)
/// PUT    /{id}          -> update_heartbeat
/// DELETE /{id}          -> delete_heartbeat
/// PUT    /{id}/refresh  -> refresh_heartbeat
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(heartbeat::list_heartbeats).post(heartbeat::create_heartbeat),
        )
        .route("/count", get(heartbeat::count_heartbeats))
        .route(
            "/{id}",
            get(heartbeat::get_heartbeat)
                .put(heartbeat::update_heartbeat)
                .delete(heartbeat::delete_heartbeat),
        )
        .route("/{id}/refresh", put(heartbeat::refresh_heartbeat))
}
