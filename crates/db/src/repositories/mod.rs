//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Writes that claim a name run in a
//! transaction guarded by an advisory lock on that name (see [`crate::lock`]).

mod common;
pub mod healthcheck_repo;
pub mod heartbeat_repo;
pub mod pushgateway_repo;
pub mod slo_repo;

pub use healthcheck_repo::HealthcheckRepo;
pub use heartbeat_repo::HeartbeatRepo;
pub use pushgateway_repo::PushgatewayRepo;
pub use slo_repo::SloRepo;
