//! Domain logic shared by the persistence layer and the HTTP layer.
//!
//! Nothing in this crate talks to the database: it holds the entity types,
//! the error taxonomy, the text codecs used for storage, validation rules,
//! and the store contracts implemented by `vigil-db`.

pub mod error;
pub mod healthcheck;
pub mod heartbeat;
pub mod labels;
pub mod pushgateway;
pub mod sharding;
pub mod slo;
pub mod store;
pub mod types;
pub mod validation;
