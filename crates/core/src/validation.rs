//! Shared validation helpers.
//!
//! Semantic checks on caller-supplied values that more than one entity
//! family needs: names, duration strings and fractions.

use std::time::Duration;

use crate::error::CoreError;

/// Maximum length of an entity name, matching the `VARCHAR(255)` columns.
pub const MAX_NAME_LEN: usize = 255;

/// Validate that a name is non-empty and fits the column.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::BadRequest("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::BadRequest(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Parse a duration string such as `"100s"`, `"3s"` or `"1m30s"`.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    humantime::parse_duration(raw.trim()).ok()
}

/// Validate that a value falls within `[0.0, 1.0]`.
///
/// Returns a `CoreError::BadRequest` naming the field if out of range.
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::BadRequest(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert!(validate_name("dns1").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("100s"), Some(Duration::from_secs(100)));
        assert_eq!(parse_duration("3s"), Some(Duration::from_secs(3)));
        assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("120ss"), None);
        assert_eq!(parse_duration("soon"), None);
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(validate_unit_range(0.0, "objective").is_ok());
        assert!(validate_unit_range(0.999, "objective").is_ok());
        assert!(validate_unit_range(1.0, "objective").is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(validate_unit_range(-0.01, "objective").is_err());
        assert!(validate_unit_range(99.9, "objective").is_err());
    }
}
