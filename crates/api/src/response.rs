//! Shared response envelope types for API handlers.
//!
//! JSON responses use a `{ "data": ... }` envelope.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Payload of the `/count` endpoints.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

/// Payload of bulk delete endpoints.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
