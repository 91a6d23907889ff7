//! HTTP handlers, one module per entity family.

pub mod discovery;
pub mod healthcheck;
pub mod heartbeat;
pub mod pushgateway;
pub mod slo;

use vigil_core::types::DbId;

/// A path segment naming an entity either by id or by name.
///
/// A segment that parses as a UUID is an id; anything else is a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Id(DbId),
    Name(String),
}

impl Identifier {
    pub fn parse(raw: &str) -> Self {
        match uuid::Uuid::parse_str(raw) {
            Ok(id) => Identifier::Id(id),
            Err(_) => Identifier::Name(raw.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_segments_are_ids() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(Identifier::parse(&id.to_string()), Identifier::Id(id));
    }

    #[test]
    fn other_segments_are_names() {
        assert_eq!(
            Identifier::parse("dns1"),
            Identifier::Name("dns1".to_string())
        );
    }
}
