//! Push-gateway metrics and their Prometheus text exposition.
//!
//! A pushed metric is identified by its name together with its exact label
//! set; pushing the same pair again either overwrites the value or adds to
//! it (cumulative push).

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Labels, Timestamp};
use crate::validation::{parse_duration, validate_name};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushgatewayMetric {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    pub ttl: Option<String>,
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
    pub value: f64,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

/// An incoming sample, before it is matched against stored metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct PushedMetric {
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    pub ttl: Option<String>,
    pub metric_type: Option<String>,
    pub value: f64,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

impl PushedMetric {
    /// Build a sample pushed at `now`, deriving `expires_at` from the TTL.
    pub fn new(
        name: String,
        description: Option<String>,
        labels: Option<Labels>,
        ttl: Option<String>,
        metric_type: Option<String>,
        value: f64,
        now: Timestamp,
    ) -> Result<Self, CoreError> {
        validate_name(&name)?;
        if !value.is_finite() {
            return Err(CoreError::BadRequest(format!("Invalid value: {value}")));
        }
        let expires_at = match &ttl {
            Some(raw) => {
                let ttl = parse_duration(raw)
                    .and_then(|d| chrono::Duration::from_std(d).ok())
                    .ok_or_else(|| CoreError::BadRequest(format!("Invalid TTL: {raw}")))?;
                Some(now + ttl)
            }
            None => None,
        };
        Ok(Self {
            name,
            description,
            labels,
            ttl,
            metric_type,
            value,
            created_at: now,
            expires_at,
        })
    }
}

/// Render metrics in the Prometheus text exposition format.
///
/// Metrics are sorted by name. `# HELP` / `# TYPE` lines are written once per
/// name, before its first sample, using the metadata of the last metric of
/// that name which carries any.
pub fn render(metrics: &[PushgatewayMetric]) -> String {
    let mut sorted: Vec<&PushgatewayMetric> = metrics.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut headers: HashMap<&str, String> = HashMap::new();
    for metric in &sorted {
        let mut header = String::new();
        if let Some(description) = &metric.description {
            let _ = writeln!(header, "# HELP {} {}", metric.name, description);
        }
        if let Some(metric_type) = &metric.metric_type {
            let _ = writeln!(header, "# TYPE {} {}", metric.name, metric_type);
        }
        if !header.is_empty() {
            headers.insert(metric.name.as_str(), header);
        }
    }

    let mut out = String::new();
    for metric in sorted {
        if let Some(header) = headers.remove(metric.name.as_str()) {
            out.push_str(&header);
        }
        let _ = writeln!(
            out,
            "{}{} {}",
            metric.name,
            render_labels(metric.labels.as_ref()),
            render_value(metric.value)
        );
    }
    out
}

fn render_labels(labels: Option<&Labels>) -> String {
    let pairs: Vec<String> = labels
        .into_iter()
        .flatten()
        .map(|(k, v)| format!("{k}=\"{}\"", escape_label_value(v)))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn render_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}
