//! Service level objectives and their rolling record buckets.
//!
//! Records are folded into one bucket per `(name, success)` pair per hour:
//! a record either increments the latest bucket or, when that bucket is
//! older than [`BUCKET_WINDOW`], opens a new one.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Labels, Timestamp};
use crate::validation::{validate_name, validate_unit_range};

/// Validity window of a single aggregation bucket.
pub const BUCKET_WINDOW: Duration = Duration::hours(1);

/// Look-back window used when no explicit threshold is given.
pub const DEFAULT_SUM_WINDOW: Duration = Duration::days(30);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slo {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    /// Target success fraction, e.g. `0.999`.
    pub objective: f64,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SloSpec {
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    pub objective: f64,
}

impl SloSpec {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        validate_unit_range(self.objective, "objective")
    }
}

impl Slo {
    pub fn new(spec: SloSpec) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: spec.name,
            description: spec.description,
            labels: spec.labels,
            objective: spec.objective,
            created_at: chrono::Utc::now(),
        }
    }
}

/// A batch of pass or fail events for one SLO.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SloRecord {
    pub name: String,
    pub success: bool,
    pub value: i64,
}

impl SloRecord {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        if self.value < 0 {
            return Err(CoreError::BadRequest(
                "record value must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// One hourly bucket of records for an SLO and outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SloBucket {
    pub name: String,
    pub started_at: Timestamp,
    pub success: bool,
    pub value: i64,
}

/// Success and failure totals of one SLO since `start_date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SloSum {
    pub name: String,
    pub start_date: Timestamp,
    pub success: i64,
    pub failure: i64,
}

/// Whether a record arriving at `now` must open a new bucket.
pub fn needs_new_bucket(latest_started_at: Option<Timestamp>, now: Timestamp) -> bool {
    match latest_started_at {
        None => true,
        Some(started_at) => started_at < now - BUCKET_WINDOW,
    }
}

/// Fold per-`(name, success)` sums into one [`SloSum`] per name, sorted by name.
pub fn fold_sums(
    rows: impl IntoIterator<Item = (String, bool, i64)>,
    threshold: Timestamp,
) -> Vec<SloSum> {
    let mut by_name: BTreeMap<String, SloSum> = BTreeMap::new();
    for (name, success, value) in rows {
        let sum = by_name.entry(name.clone()).or_insert_with(|| SloSum {
            name,
            start_date: threshold,
            success: 0,
            failure: 0,
        });
        if success {
            sum.success += value;
        } else {
            sum.failure += value;
        }
    }
    by_name.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn first_record_opens_a_bucket() {
        assert!(needs_new_bucket(None, Utc::now()));
    }

    #[test]
    fn bucket_within_the_hour_is_reused() {
        let now = Utc::now();
        assert!(!needs_new_bucket(Some(now - Duration::minutes(59)), now));
        assert!(!needs_new_bucket(Some(now - BUCKET_WINDOW), now));
    }

    #[test]
    fn stale_bucket_is_replaced() {
        let now = Utc::now();
        assert!(needs_new_bucket(
            Some(now - BUCKET_WINDOW - Duration::seconds(1)),
            now
        ));
    }

    #[test]
    fn sums_fold_per_name() {
        let threshold = Utc::now() - DEFAULT_SUM_WINDOW;
        let sums = fold_sums(
            vec![
                ("svc".to_string(), true, 90),
                ("api".to_string(), false, 3),
                ("svc".to_string(), false, 10),
            ],
            threshold,
        );
        assert_eq!(sums.len(), 2);
        assert_eq!(sums[0].name, "api");
        assert_eq!((sums[0].success, sums[0].failure), (0, 3));
        assert_eq!(sums[1].name, "svc");
        assert_eq!((sums[1].success, sums[1].failure), (90, 10));
        assert_eq!(sums[1].start_date, threshold);
    }

    #[test]
    fn spec_validation() {
        let mut spec = SloSpec {
            name: "checkout".to_string(),
            description: None,
            labels: None,
            objective: 0.999,
        };
        assert!(spec.validate().is_ok());
        spec.objective = 99.9;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn negative_records_rejected() {
        let record = SloRecord {
            name: "svc".to_string(),
            success: true,
            value: -1,
        };
        assert!(record.validate().is_err());
    }
}
