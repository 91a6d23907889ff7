//! Heartbeats: dead-man's-switch liveness signals.
//!
//! A client refreshes its heartbeat periodically; whoever watches the
//! heartbeat treats it as dead once `ttl` has elapsed since the last refresh.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Labels, Timestamp};
use crate::validation::{parse_duration, validate_name};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heartbeat {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    pub ttl: Option<String>,
    pub created_at: Timestamp,
    pub refreshed_at: Option<Timestamp>,
}

/// Mutable fields of a heartbeat, as supplied on create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatSpec {
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    pub ttl: Option<String>,
}

impl HeartbeatSpec {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        if let Some(ttl) = &self.ttl {
            parse_duration(ttl)
                .ok_or_else(|| CoreError::BadRequest("invalid heartbeat TTL".to_string()))?;
        }
        Ok(())
    }
}

impl Heartbeat {
    pub fn new(spec: HeartbeatSpec) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: spec.name,
            description: spec.description,
            labels: spec.labels,
            ttl: spec.ttl,
            created_at: chrono::Utc::now(),
            refreshed_at: None,
        }
    }

    /// Apply an update. Refresh state is not part of an update.
    pub fn with_spec(self, spec: HeartbeatSpec) -> Self {
        Self {
            name: spec.name,
            description: spec.description,
            labels: spec.labels,
            ttl: spec.ttl,
            ..self
        }
    }
}
