//! # Mapping Errors
//!
//! Failures resolving logical field names against entity mappings, and
//! failures building those mappings.

use thiserror::Error;

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A path segment names no property of the entity it was looked up on
    #[error("Field undefined: '{segment}' (in '{path}') is not a property of '{entity}'")]
    UndefinedField {
        entity: String,
        path: String,
        segment: String,
    },

    /// No mapper registered under this entity name
    #[error("Entity undefined: '{0}'")]
    UndefinedEntity(String),

    /// Relation target has no identity column to stand in for it
    #[error("Entity '{0}' has no identity column")]
    MissingIdentity(String),

    #[error("Entity '{0}' is registered twice")]
    DuplicateEntity(String),

    #[error("Property '{property}' is declared twice on '{entity}'")]
    DuplicateProperty { entity: String, property: String },

    #[error("Relations form a cycle through '{0}'")]
    CyclicRelation(String),

    /// Mapping document could not be read or is inconsistent
    #[error("Invalid mapping config: {0}")]
    Config(String),
}

impl MappingError {
    pub fn code(&self) -> &'static str {
        match self {
            MappingError::UndefinedField { .. } => "DYNQ_FIELD_UNDEFINED",
            MappingError::UndefinedEntity(_) => "DYNQ_ENTITY_UNDEFINED",
            MappingError::MissingIdentity(_) => "DYNQ_ENTITY_NO_IDENTITY",
            MappingError::DuplicateEntity(_)
            | MappingError::DuplicateProperty { .. }
            | MappingError::CyclicRelation(_)
            | MappingError::Config(_) => "DYNQ_MAPPING_INVALID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_field_display() {
        let err = MappingError::UndefinedField {
            entity: "customer".into(),
            path: "customer.adress".into(),
            segment: "adress".into(),
        };
        assert_eq!(err.code(), "DYNQ_FIELD_UNDEFINED");
        let display = err.to_string();
        assert!(display.contains("'adress'"));
        assert!(display.contains("customer.adress"));
    }
}
