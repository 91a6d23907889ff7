use axum::routing::get;
use axum::Router;

use crate::handlers::healthcheck;
use crate::state::AppState;

/// Routes mounted at `/healthchecks`.
///
/// ```text
/// GET    /          -> list_healthchecks
/// POST   /          -> create_healthcheck
/// GET    /count     -> count_healthchecks
/// GET    /{id}      -> get_healthcheck (id or name)
/// PUT    /{id}      -> update_healthcheck
/// DELETE /{id}      -> delete_healthcheck
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(healthcheck::list_healthchecks).post(healthcheck::create_healthcheck),
        )
        .route("/count", get(healthcheck::count_healthchecks))
        .route(
            "/{id}",
            get(healthcheck::get_healthcheck)
                .put(healthcheck::update_healthcheck)
                .delete(healthcheck::delete_healthcheck),
        )
}
