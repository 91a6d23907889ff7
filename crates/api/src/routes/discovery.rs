use axum::routing::get;
use axum::Router;

use crate::handlers::discovery;
use crate::state::AppState;

/// Routes mounted at `/discovery`.
///
/// ```text
/// GET /{prober}   -> discover (optional ?labels=a=b,c=d)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{prober}", get(discovery::discover))
}
