use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::pushgateway;
use crate::state::AppState;

/// Routes mounted at `/pushgateway` under `/api/v1`.
///
/// ```text
/// POST   /        -> push_metric (?cumulative=true adds to the stored value)
/// GET    /        -> list_metrics
/// DELETE /        -> delete_all_metrics
/// DELETE /{id}    -> delete_metrics (id, or every label variant of a name)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(pushgateway::list_metrics)
                .post(pushgateway::push_metric)
                .delete(pushgateway::delete_all_metrics),
        )
        .route("/{id}", delete(pushgateway::delete_metrics))
}

/// Prometheus scrape endpoint, mounted at the root.
///
/// ```text
/// GET /pushgateway/metrics -> render_metrics
/// ```
pub fn scrape_router() -> Router<AppState> {
    Router::new().route("/pushgateway/metrics", get(pushgateway::render_metrics))
}
