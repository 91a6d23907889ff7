//! Labeled-map codec.
//!
//! Labels are persisted as a JSON object of string values. An absent label
//! set is stored as NULL (not `{}`) and decodes back to `None`.

use crate::error::CoreError;
use crate::types::Labels;

/// Serialize a label set for storage. `None` stays `None`.
///
/// Keys are emitted in sorted order, so equal label sets always produce the
/// same text.
pub fn encode(labels: Option<&Labels>) -> Result<Option<String>, CoreError> {
    labels
        .map(|l| {
            serde_json::to_string(l).map_err(|e| {
                CoreError::Internal(format!("fail to encode labels {l:?}: {e}"))
            })
        })
        .transpose()
}

/// Deserialize a stored label set. NULL decodes to `None`.
pub fn decode(raw: Option<&str>) -> Result<Option<Labels>, CoreError> {
    raw.map(|s| {
        serde_json::from_str::<Labels>(s)
            .map_err(|e| CoreError::Internal(format!("fail to deserialize labels {s}: {e}")))
    })
    .transpose()
}

/// Canonical identity form of a label set: `"{}"` when absent or empty.
pub fn canonical(labels: Option<&Labels>) -> String {
    match labels {
        Some(l) if !l.is_empty() => {
            // BTreeMap<String, String> serialization cannot fail.
            serde_json::to_string(l).unwrap_or_else(|_| "{}".to_string())
        }
        _ => "{}".to_string(),
    }
}

/// True when every `selector` pair is present in `candidate` with the same value.
///
/// An empty selector matches everything, including an entity without labels.
pub fn matches(candidate: Option<&Labels>, selector: &Labels) -> bool {
    selector.iter().all(|(key, value)| {
        candidate
            .and_then(|labels| labels.get(key))
            .is_some_and(|v| v == value)
    })
}

/// Parse a `key=value,key2=value2` selector as used by discovery queries.
pub fn parse_selector(raw: &str) -> Result<Labels, CoreError> {
    let mut labels = Labels::new();
    if raw.trim().is_empty() {
        return Ok(labels);
    }
    for pair in raw.split(',') {
        let mut parts = pair.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) if !key.is_empty() => {
                labels.insert(key.to_string(), value.to_string());
            }
            _ => return Err(CoreError::BadRequest("Invalid labels parameter".to_string())),
        }
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn absent_labels_stay_absent() {
        assert_eq!(encode(None).unwrap(), None);
        assert_eq!(decode(None).unwrap(), None);
    }

    #[test]
    fn empty_map_is_not_confused_with_absence() {
        let empty = Labels::new();
        assert_eq!(encode(Some(&empty)).unwrap().as_deref(), Some("{}"));
        assert_eq!(decode(Some("{}")).unwrap(), Some(Labels::new()));
    }

    #[test]
    fn encoding_is_sorted() {
        let l = labels(&[("team", "sre"), ("env", "prod")]);
        assert_eq!(
            encode(Some(&l)).unwrap().as_deref(),
            Some(r#"{"env":"prod","team":"sre"}"#)
        );
    }

    #[test]
    fn decode_reads_stored_text() {
        let decoded = decode(Some(r#"{"a":"b","foo":"bar"}"#)).unwrap().unwrap();
        assert_eq!(decoded, labels(&[("a", "b"), ("foo", "bar")]));
    }

    #[test]
    fn decode_rejects_corrupted_text() {
        assert_matches!(decode(Some("not json")), Err(CoreError::Internal(_)));
        assert_matches!(decode(Some(r#"{"a": 1}"#)), Err(CoreError::Internal(_)));
    }

    #[test]
    fn canonical_form_collapses_empty_and_absent() {
        assert_eq!(canonical(None), "{}");
        assert_eq!(canonical(Some(&Labels::new())), "{}");
        assert_eq!(canonical(Some(&labels(&[("a", "b")]))), r#"{"a":"b"}"#);
    }

    #[test]
    fn selector_matching() {
        let l = labels(&[("env", "prod"), ("team", "sre")]);
        assert!(matches(Some(&l), &Labels::new()));
        assert!(matches(None, &Labels::new()));
        assert!(matches(Some(&l), &labels(&[("env", "prod")])));
        assert!(!matches(Some(&l), &labels(&[("env", "dev")])));
        assert!(!matches(Some(&l), &labels(&[("zone", "a")])));
        assert!(!matches(None, &labels(&[("env", "prod")])));
    }

    #[test]
    fn parse_selector_pairs() {
        assert_eq!(parse_selector("").unwrap(), Labels::new());
        assert_eq!(
            parse_selector("foo=bar,a=b").unwrap(),
            labels(&[("foo", "bar"), ("a", "b")])
        );
        assert_matches!(parse_selector("foo"), Err(CoreError::BadRequest(_)));
        assert_matches!(parse_selector("a=b=c"), Err(CoreError::BadRequest(_)));
        assert_matches!(parse_selector("=b"), Err(CoreError::BadRequest(_)));
    }
}
