use std::collections::BTreeMap;

/// All primary keys are UUIDv4 values generated by the application.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// An unordered string-to-string label set, kept sorted for canonical encoding.
pub type Labels = BTreeMap<String, String>;
