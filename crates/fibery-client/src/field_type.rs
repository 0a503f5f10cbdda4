//! Logical field types and their Fibery type identifiers

use crate::error::{FiberyError, FiberyResult};
use std::fmt;
use std::str::FromStr;

/// Logical field type accepted in a field declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Free text
    Text,
    /// Integer
    Int,
    /// UUID
    Uuid,
    /// Timestamp
    DateTime,
    /// Decimal number
    Float,
    /// Boolean flag
    Boolean,
}

impl FieldType {
    /// Every supported type, in table order
    pub const ALL: [FieldType; 6] = [
        Self::Text,
        Self::Int,
        Self::Uuid,
        Self::DateTime,
        Self::Float,
        Self::Boolean,
    ];

    /// Logical name used in field declarations
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Int => "int",
            Self::Uuid => "uuid",
            Self::DateTime => "date-time",
            Self::Float => "float",
            Self::Boolean => "boolean",
        }
    }

    /// Fibery type identifier
    #[inline]
    #[must_use]
    pub const fn external_id(self) -> &'static str {
        match self {
            Self::Text => "fibery/text",
            Self::Int => "fibery/int",
            Self::Uuid => "fibery/uuid",
            Self::DateTime => "fibery/date-time",
            Self::Float => "fibery/decimal",
            Self::Boolean => "fibery/bool",
        }
    }

    /// Comma separated list of supported logical names
    #[must_use]
    pub fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolve a declared type for a named field
    pub fn for_field(field: &str, declared: &str) -> FiberyResult<Self> {
        declared
            .parse()
            .map_err(|()| FiberyError::UnsupportedFieldType {
                field: field.to_string(),
                field_type: declared.to_string(),
                supported: Self::supported_names(),
            })
    }
}

impl FromStr for FieldType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.name() == s).ok_or(())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_fibery_identifiers() {
        assert_eq!(FieldType::Text.external_id(), "fibery/text");
        assert_eq!(FieldType::Float.external_id(), "fibery/decimal");
        assert_eq!(FieldType::Boolean.external_id(), "fibery/bool");
        assert_eq!(FieldType::DateTime.external_id(), "fibery/date-time");
    }

    #[test]
    fn parses_every_logical_name() {
        for t in FieldType::ALL {
            assert_eq!(t.name().parse::<FieldType>(), Ok(t));
        }
    }

    #[test]
    fn rejects_unknown_type_with_field_context() {
        let err = FieldType::for_field("Salary", "money").unwrap_err();
        match err {
            FiberyError::UnsupportedFieldType {
                field,
                field_type,
                supported,
            } => {
                assert_eq!(field, "Salary");
                assert_eq!(field_type, "money");
                assert_eq!(supported, "text, int, uuid, date-time, float, boolean");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
