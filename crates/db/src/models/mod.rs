//! Database row structs.
//!
//! Each submodule holds the `FromRow` struct matching one table and its
//! conversion into the domain type from `vigil_core`. Labels and healthcheck
//! definitions are selected as text and decoded here.

pub mod healthcheck;
pub mod heartbeat;
pub mod pushgateway;
pub mod slo;
