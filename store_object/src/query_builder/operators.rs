//! Operator lookup tables
//!
//! Comparison symbols and join keywords are dialect-neutral. An unmapped kind
//! is a configuration error.

use crate::errors::StoreError;
use serde::{Deserialize, Serialize};

/// Comparison applied by a single filter item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonKind {
    /// Unset; never mapped to an operator
    #[default]
    None,
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

/// SQL JOIN flavour of a join descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinKind {
    /// Unset; rendering a join with this kind is a configuration error
    #[default]
    None,
    LeftOuter,
    Left,
    Inner,
    Right,
    RightOuter,
    FullOuter,
}

/// Logical operator combining the members of a filter group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalJoin {
    #[default]
    And,
    Or,
}

static COMPARISON_OPERATORS: &[(ComparisonKind, &str)] = &[
    (ComparisonKind::Equal, "="),
    (ComparisonKind::NotEqual, "<>"),
    (ComparisonKind::Greater, ">"),
    (ComparisonKind::GreaterOrEqual, ">="),
    (ComparisonKind::Less, "<"),
    (ComparisonKind::LessOrEqual, "<="),
];

static JOIN_KEYWORDS: &[(JoinKind, &str)] = &[
    (JoinKind::LeftOuter, "LEFT OUTER JOIN"),
    (JoinKind::Left, "LEFT JOIN"),
    (JoinKind::Inner, "INNER JOIN"),
    (JoinKind::Right, "RIGHT JOIN"),
    (JoinKind::RightOuter, "RIGHT OUTER JOIN"),
    (JoinKind::FullOuter, "FULL OUTER JOIN"),
];

impl ComparisonKind {
    pub fn to_sql(&self) -> Result<&'static str, StoreError> {
        COMPARISON_OPERATORS
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, symbol)| *symbol)
            .ok_or_else(|| {
                StoreError::invalid_configuration(format!(
                    "comparison kind {:?} has no SQL operator",
                    self
                ))
            })
    }
}

impl JoinKind {
    pub fn to_sql(&self) -> Result<&'static str, StoreError> {
        JOIN_KEYWORDS
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, keyword)| *keyword)
            .ok_or_else(|| {
                StoreError::invalid_configuration(format!(
                    "join kind {:?} has no SQL keyword",
                    self
                ))
            })
    }
}

impl LogicalJoin {
    pub fn to_sql(&self) -> &'static str {
        match self {
            LogicalJoin::And => "AND",
            LogicalJoin::Or => "OR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_symbols() {
        assert_eq!(ComparisonKind::Equal.to_sql().unwrap(), "=");
        assert_eq!(ComparisonKind::NotEqual.to_sql().unwrap(), "<>");
        assert_eq!(ComparisonKind::Greater.to_sql().unwrap(), ">");
        assert_eq!(ComparisonKind::GreaterOrEqual.to_sql().unwrap(), ">=");
        assert_eq!(ComparisonKind::Less.to_sql().unwrap(), "<");
        assert_eq!(ComparisonKind::LessOrEqual.to_sql().unwrap(), "<=");
    }

    #[test]
    fn test_join_keywords() {
        assert_eq!(JoinKind::LeftOuter.to_sql().unwrap(), "LEFT OUTER JOIN");
        assert_eq!(JoinKind::Left.to_sql().unwrap(), "LEFT JOIN");
        assert_eq!(JoinKind::Inner.to_sql().unwrap(), "INNER JOIN");
        assert_eq!(JoinKind::Right.to_sql().unwrap(), "RIGHT JOIN");
        assert_eq!(JoinKind::RightOuter.to_sql().unwrap(), "RIGHT OUTER JOIN");
        assert_eq!(JoinKind::FullOuter.to_sql().unwrap(), "FULL OUTER JOIN");
    }

    #[test]
    fn test_unset_kinds_are_configuration_errors() {
        let err = ComparisonKind::None.to_sql().unwrap_err();
        assert!(err.is_configuration_error());

        let err = JoinKind::None.to_sql().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("None"));
    }

    #[test]
    fn test_logical_join() {
        assert_eq!(LogicalJoin::default(), LogicalJoin::And);
        assert_eq!(LogicalJoin::And.to_sql(), "AND");
        assert_eq!(LogicalJoin::Or.to_sql(), "OR");
    }
}
