//! Health-check entity and its polymorphic definition.
//!
//! A health check is stored as common columns plus a `(type, definition)`
//! pair: the discriminator string and the JSON payload of the kind-specific
//! definition. [`HealthcheckDefinition`] is the closed set of kinds.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::sharding;
use crate::types::{DbId, Labels, Timestamp};
use crate::validation::{parse_duration, validate_name};

/// Smallest accepted probe interval.
pub const MIN_INTERVAL: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Kind discriminator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthcheckKind {
    Dns,
    Tcp,
    Tls,
    Http,
    Command,
}

impl HealthcheckKind {
    pub const ALL: [HealthcheckKind; 5] = [
        HealthcheckKind::Dns,
        HealthcheckKind::Tcp,
        HealthcheckKind::Tls,
        HealthcheckKind::Http,
        HealthcheckKind::Command,
    ];

    /// The discriminator string stored in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthcheckKind::Dns => "dns",
            HealthcheckKind::Tcp => "tcp",
            HealthcheckKind::Tls => "tls",
            HealthcheckKind::Http => "http",
            HealthcheckKind::Command => "command",
        }
    }
}

impl fmt::Display for HealthcheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthcheckKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HealthcheckKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::BadRequest(format!("invalid healthcheck type {s}")))
    }
}

// ---------------------------------------------------------------------------
// Kind-specific definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DnsDefinition {
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_ips: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TcpDefinition {
    /// An IP address or a domain.
    pub target: String,
    pub port: u16,
    #[serde(default)]
    pub should_fail: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TlsDefinition {
    pub target: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    /// Fail when the certificate expires within this duration (e.g. `"168h"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_delay: Option<String>,
    #[serde(default)]
    pub insecure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cacert: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpDefinition {
    pub valid_status: Vec<u16>,
    /// An IP address or a domain.
    pub target: String,
    pub method: String,
    pub port: u16,
    #[serde(default)]
    pub redirect: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_regexp: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cacert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default)]
    pub insecure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandDefinition {
    pub command: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// The kind-specific payload of a health check.
///
/// Serializes adjacently tagged: `{"type": "dns", "definition": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "definition", rename_all = "lowercase")]
pub enum HealthcheckDefinition {
    Dns(DnsDefinition),
    Tcp(TcpDefinition),
    Tls(TlsDefinition),
    Http(HttpDefinition),
    Command(CommandDefinition),
}

impl HealthcheckDefinition {
    pub fn kind(&self) -> HealthcheckKind {
        match self {
            HealthcheckDefinition::Dns(_) => HealthcheckKind::Dns,
            HealthcheckDefinition::Tcp(_) => HealthcheckKind::Tcp,
            HealthcheckDefinition::Tls(_) => HealthcheckKind::Tls,
            HealthcheckDefinition::Http(_) => HealthcheckKind::Http,
            HealthcheckDefinition::Command(_) => HealthcheckKind::Command,
        }
    }

    /// Short human-readable description of the probe target.
    pub fn summary(&self) -> String {
        match self {
            HealthcheckDefinition::Dns(d) => d.domain.clone(),
            HealthcheckDefinition::Tcp(d) => format!("{}:{}", d.target, d.port),
            HealthcheckDefinition::Tls(d) => format!("{}:{}", d.target, d.port),
            HealthcheckDefinition::Http(d) => format!("{} {}:{}", d.method, d.target, d.port),
            HealthcheckDefinition::Command(d) => d.command.clone(),
        }
    }

    /// Check the kind-specific fields serde cannot: body regexps must compile
    /// and a TLS expiration delay must be a valid duration.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            HealthcheckDefinition::Http(d) => {
                for pattern in d.body_regexp.iter().flatten() {
                    Regex::new(pattern).map_err(|_| {
                        CoreError::BadRequest(format!("Invalid Regex {pattern} in body-regexp"))
                    })?;
                }
            }
            HealthcheckDefinition::Tls(d) => {
                if let Some(delay) = &d.expiration_delay {
                    parse_duration(delay).ok_or_else(|| {
                        CoreError::BadRequest(
                            "Invalid healthcheck expiration delay".to_string(),
                        )
                    })?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Encode into the stored `(type, definition)` pair.
    pub fn encode(&self) -> Result<(HealthcheckKind, String), CoreError> {
        let payload = match self {
            HealthcheckDefinition::Dns(d) => serde_json::to_string(d),
            HealthcheckDefinition::Tcp(d) => serde_json::to_string(d),
            HealthcheckDefinition::Tls(d) => serde_json::to_string(d),
            HealthcheckDefinition::Http(d) => serde_json::to_string(d),
            HealthcheckDefinition::Command(d) => serde_json::to_string(d),
        }
        .map_err(|e| {
            CoreError::Internal(format!("fail to serialize {} definition: {e}", self.kind()))
        })?;
        Ok((self.kind(), payload))
    }

    /// Decode a stored `(type, definition)` pair.
    ///
    /// Stored rows are trusted data: an unknown discriminator or a payload
    /// that does not match it is corruption, reported as `Internal`.
    pub fn decode(kind: &str, payload: &str) -> Result<Self, CoreError> {
        let kind = HealthcheckKind::from_str(kind)
            .map_err(|_| CoreError::Internal(format!("invalid healthcheck type {kind}")))?;
        Self::parse(kind, payload)
            .map_err(|e| CoreError::Internal(format!("fail to deserialize {kind} definition: {e}")))
    }

    /// Build a definition from caller-supplied JSON for the given kind.
    pub fn from_value(kind: HealthcheckKind, value: serde_json::Value) -> Result<Self, CoreError> {
        let result = match kind {
            HealthcheckKind::Dns => serde_json::from_value(value).map(HealthcheckDefinition::Dns),
            HealthcheckKind::Tcp => serde_json::from_value(value).map(HealthcheckDefinition::Tcp),
            HealthcheckKind::Tls => serde_json::from_value(value).map(HealthcheckDefinition::Tls),
            HealthcheckKind::Http => serde_json::from_value(value).map(HealthcheckDefinition::Http),
            HealthcheckKind::Command => {
                serde_json::from_value(value).map(HealthcheckDefinition::Command)
            }
        };
        result.map_err(|e| CoreError::BadRequest(format!("invalid {kind} definition: {e}")))
    }

    fn parse(kind: HealthcheckKind, payload: &str) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            HealthcheckKind::Dns => HealthcheckDefinition::Dns(serde_json::from_str(payload)?),
            HealthcheckKind::Tcp => HealthcheckDefinition::Tcp(serde_json::from_str(payload)?),
            HealthcheckKind::Tls => HealthcheckDefinition::Tls(serde_json::from_str(payload)?),
            HealthcheckKind::Http => HealthcheckDefinition::Http(serde_json::from_str(payload)?),
            HealthcheckKind::Command => {
                HealthcheckDefinition::Command(serde_json::from_str(payload)?)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A health check as seen by the API layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Healthcheck {
    pub id: DbId,
    /// Shard id, fixed at creation.
    pub random_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    pub interval: String,
    pub timeout: String,
    pub enabled: bool,
    pub created_at: Timestamp,
    #[serde(flatten)]
    pub definition: HealthcheckDefinition,
}

/// Mutable fields of a health check, as supplied on create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthcheckSpec {
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    pub interval: String,
    pub timeout: String,
    pub enabled: bool,
    pub definition: HealthcheckDefinition,
}

impl HealthcheckSpec {
    /// Validate the name, the interval/timeout pair and the definition.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        validate_timing(&self.interval, &self.timeout)?;
        self.definition.validate()
    }
}

impl Healthcheck {
    /// Materialize a new health check: fresh id, creation time and shard id.
    pub fn new(spec: HealthcheckSpec) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            random_id: sharding::new_random_id(),
            name: spec.name,
            description: spec.description,
            labels: spec.labels,
            interval: spec.interval,
            timeout: spec.timeout,
            enabled: spec.enabled,
            created_at: chrono::Utc::now(),
            definition: spec.definition,
        }
    }

    /// Apply an update, keeping the immutable id, shard id and creation time.
    pub fn with_spec(self, spec: HealthcheckSpec) -> Self {
        Self {
            name: spec.name,
            description: spec.description,
            labels: spec.labels,
            interval: spec.interval,
            timeout: spec.timeout,
            enabled: spec.enabled,
            definition: spec.definition,
            ..self
        }
    }

    pub fn kind(&self) -> HealthcheckKind {
        self.definition.kind()
    }
}

/// Validate a probe interval and timeout pair.
pub fn validate_timing(interval: &str, timeout: &str) -> Result<(), CoreError> {
    let interval = parse_duration(interval)
        .ok_or_else(|| CoreError::BadRequest("Invalid healthcheck interval".to_string()))?;
    if interval < MIN_INTERVAL {
        return Err(CoreError::BadRequest(
            "The minimum healthcheck interval is 30 seconds".to_string(),
        ));
    }
    let timeout = parse_duration(timeout)
        .ok_or_else(|| CoreError::BadRequest("Invalid healthcheck timeout".to_string()))?;
    if interval < timeout {
        return Err(CoreError::BadRequest(
            "The healthcheck interval should be greater than its timeout".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn dns() -> HealthcheckDefinition {
        HealthcheckDefinition::Dns(DnsDefinition {
            domain: "example.com".to_string(),
            expected_ips: Some(vec!["10.0.0.1".to_string()]),
        })
    }

    fn http() -> HealthcheckDefinition {
        HealthcheckDefinition::Http(HttpDefinition {
            valid_status: vec![200, 204],
            target: "example.com".to_string(),
            method: "GET".to_string(),
            port: 443,
            redirect: false,
            body: None,
            query: None,
            headers: Some(BTreeMap::from([("x-env".to_string(), "prod".to_string())])),
            protocol: "https".to_string(),
            path: Some("/healthz".to_string()),
            body_regexp: None,
            key: None,
            cert: None,
            cacert: None,
            host: None,
            insecure: false,
            server_name: None,
        })
    }

    fn spec(interval: &str, timeout: &str) -> HealthcheckSpec {
        HealthcheckSpec {
            name: "dns1".to_string(),
            description: None,
            labels: None,
            interval: interval.to_string(),
            timeout: timeout.to_string(),
            enabled: true,
            definition: dns(),
        }
    }

    #[test]
    fn kind_strings() {
        for kind in HealthcheckKind::ALL {
            assert_eq!(kind.as_str().parse::<HealthcheckKind>().unwrap(), kind);
        }
        assert!("icmp".parse::<HealthcheckKind>().is_err());
    }

    #[test]
    fn encode_uses_kebab_case_payload() {
        let (kind, payload) = dns().encode().unwrap();
        assert_eq!(kind, HealthcheckKind::Dns);
        assert_eq!(
            payload,
            r#"{"domain":"example.com","expected-ips":["10.0.0.1"]}"#
        );
    }

    #[test]
    fn stored_pair_decodes_back() {
        for def in [dns(), http()] {
            let (kind, payload) = def.encode().unwrap();
            let decoded = HealthcheckDefinition::decode(kind.as_str(), &payload).unwrap();
            assert_eq!(decoded, def);
        }
    }

    #[test]
    fn decode_unknown_type_is_internal() {
        assert_matches!(
            HealthcheckDefinition::decode("icmp", "{}"),
            Err(CoreError::Internal(_))
        );
    }

    #[test]
    fn decode_mismatched_payload_is_internal() {
        assert_matches!(
            HealthcheckDefinition::decode("tcp", r#"{"domain":"example.com"}"#),
            Err(CoreError::Internal(_))
        );
    }

    #[test]
    fn body_regexps_must_compile() {
        let HealthcheckDefinition::Http(mut def) = http() else {
            unreachable!()
        };
        def.body_regexp = Some(vec!["ok.*".to_string()]);
        assert!(HealthcheckDefinition::Http(def.clone()).validate().is_ok());

        def.body_regexp = Some(vec!["ok".to_string(), "(unclosed".to_string()]);
        assert_matches!(
            HealthcheckDefinition::Http(def).validate(),
            Err(CoreError::BadRequest(msg)) if msg.contains("(unclosed")
        );
    }

    #[test]
    fn tls_expiration_delay_must_parse() {
        let tls = |delay: Option<&str>| {
            HealthcheckDefinition::Tls(TlsDefinition {
                target: "example.com".to_string(),
                port: 443,
                server_name: None,
                expiration_delay: delay.map(str::to_string),
                insecure: false,
                key: None,
                cert: None,
                cacert: None,
            })
        };
        assert!(tls(None).validate().is_ok());
        assert!(tls(Some("168h")).validate().is_ok());
        assert_matches!(tls(Some("bogus")).validate(), Err(CoreError::BadRequest(_)));

        let mut spec = spec("100s", "3s");
        spec.definition = tls(Some("bogus"));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn caller_payload_errors_are_bad_requests() {
        assert_matches!(
            HealthcheckDefinition::from_value(HealthcheckKind::Tcp, json!({"target": "a"})),
            Err(CoreError::BadRequest(_))
        );
        let def = HealthcheckDefinition::from_value(
            HealthcheckKind::Command,
            json!({"command": "ls", "arguments": ["-l"]}),
        )
        .unwrap();
        assert_eq!(def.summary(), "ls");
    }

    #[test]
    fn summaries() {
        assert_eq!(dns().summary(), "example.com");
        assert_eq!(http().summary(), "GET example.com:443");
        let tcp = HealthcheckDefinition::Tcp(TcpDefinition {
            target: "10.0.0.1".to_string(),
            port: 22,
            should_fail: false,
        });
        assert_eq!(tcp.summary(), "10.0.0.1:22");
    }

    #[test]
    fn api_representation_is_adjacently_tagged() {
        let check = Healthcheck::new(spec("100s", "3s"));
        let value = serde_json::to_value(&check).unwrap();
        assert_eq!(value["type"], "dns");
        assert_eq!(value["definition"]["domain"], "example.com");
        assert_eq!(value["name"], "dns1");
    }

    #[test]
    fn new_assigns_generated_fields() {
        let a = Healthcheck::new(spec("100s", "3s"));
        let b = Healthcheck::new(spec("100s", "3s"));
        assert_ne!(a.id, b.id);
        assert!((0..sharding::RANDOM_ID_RANGE).contains(&a.random_id));
        assert_eq!(a.kind(), HealthcheckKind::Dns);
    }

    #[test]
    fn update_keeps_immutable_fields() {
        let original = Healthcheck::new(spec("100s", "3s"));
        let mut changed = spec("60s", "5s");
        changed.name = "dns2".to_string();
        changed.enabled = false;
        let updated = original.clone().with_spec(changed);
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.random_id, original.random_id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.name, "dns2");
        assert!(!updated.enabled);
    }

    #[test]
    fn timing_rules() {
        assert!(spec("100s", "3s").validate().is_ok());
        assert_matches!(spec("abc", "3s").validate(), Err(CoreError::BadRequest(m)) if m.contains("interval"));
        assert_matches!(spec("10s", "3s").validate(), Err(CoreError::BadRequest(m)) if m.contains("30 seconds"));
        assert_matches!(spec("100s", "x").validate(), Err(CoreError::BadRequest(m)) if m.contains("timeout"));
        assert_matches!(spec("30s", "60s").validate(), Err(CoreError::BadRequest(m)) if m.contains("greater"));
    }
}
