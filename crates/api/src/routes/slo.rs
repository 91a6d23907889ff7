use axum::routing::{get, post};
use axum::Router;

use crate::handlers::slo;
use crate::state::AppState;

/// Routes mounted at `/slos`.
///
/// ```text
/// GET    /          -> list_slos
/// POST   /          -> create_slo
/// GET    /count     -> count_slos
/// POST   /records   -> add_record
/// GET    /sums      -> list_sums (?since=RFC3339, default 30 days ago)
/// GET    /{id}      -> get_slo (id or name)
/// DELETE /{id}      -> delete_slo
/// GET    /{id}/buckets -> list_buckets (id or name)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(slo::list_slos).post(slo::create_slo))
        .route("/count", get(slo::count_slos))
        .route("/records", post(slo::add_record))
        .route("/sums", get(slo::list_sums))
        .route("/{id}", get(slo::get_slo).delete(slo::delete_slo))
        .route("/{id}/buckets", get(slo::list_buckets))
}
