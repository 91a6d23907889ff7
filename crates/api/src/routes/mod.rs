pub mod discovery;
pub mod health;
pub mod healthcheck;
pub mod heartbeat;
pub mod pushgateway;
pub mod slo;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /healthchecks                    list, create
/// /healthchecks/count              count
/// /healthchecks/{id}               get (id or name), update, delete
///
/// /discovery/{prober}              enabled checks owned by a prober
///
/// /heartbeats                      list, create
/// /heartbeats/count                count
/// /heartbeats/{id}                 get (id or name), update, delete
/// /heartbeats/{id}/refresh         refresh (PUT)
///
/// /pushgateway                     push (POST), list, delete all
/// /pushgateway/{id}                delete by id or by name
///
/// /slos                            list, create
/// /slos/count                      count
/// /slos/records                    add record (POST)
/// /slos/sums                       aggregated sums
/// /slos/{id}                       get (id or name), delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/healthchecks", healthcheck::router())
        .nest("/discovery", discovery::router())
        .nest("/heartbeats", heartbeat::router())
        .nest("/pushgateway", pushgateway::router())
        .nest("/slos", slo::router())
}
