//! Canonical entity kinds handled by the reconciliation engine.

use serde::{Deserialize, Serialize};

/// The kind of canonical record a row reconciles against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Member,
    Advisor,
    Lead,
}

impl EntityType {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Advisor => "advisor",
            Self::Lead => "lead",
        }
    }

    /// Parse a database string back into an entity type.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "member" => Some(Self::Member),
            "advisor" => Some(Self::Advisor),
            "lead" => Some(Self::Lead),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_round_trip() {
        for entity in [EntityType::Member, EntityType::Advisor, EntityType::Lead] {
            assert_eq!(EntityType::parse(entity.as_str()), Some(entity));
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(EntityType::parse("device"), None);
        assert_eq!(EntityType::parse(""), None);
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&EntityType::Member).unwrap(),
            "\"member\""
        );
        let parsed: EntityType = serde_json::from_str("\"advisor\"").unwrap();
        assert_eq!(parsed, EntityType::Advisor);
    }
}
