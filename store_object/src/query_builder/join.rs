//! Join-path parsing
//!
//! A join path walks from a source table to a column on a related table:
//!
//! ```text
//! [Comments:Id:CommentId].[Users:Id:AuthorId].DisplayName
//!  ^right   ^right ^left   next hop starts     ^final column
//!   table    column column  from Comments
//! ```
//!
//! Every segment but the last is a bracketed `[RightTable:RightColumn:LeftColumn]`
//! hop; the last segment is a bare column name.

use crate::errors::StoreError;
use crate::query_builder::operators::JoinKind;
use std::hash::{Hash, Hasher};

/// Join kind used for every parsed hop
pub const DEFAULT_JOIN_KIND: JoinKind = JoinKind::LeftOuter;

/// One hop of a parsed join path
#[derive(Debug, Clone, Default)]
pub struct JoinDescriptor {
    /// Raw path text up to and including this hop; the descriptor's identity
    pub path: String,
    pub left_table: String,
    /// Qualifier for the left side of the ON clause: the source table for the
    /// first hop, the previous hop's alias afterwards
    pub left_alias: String,
    pub left_relation_column: String,
    pub right_table: String,
    pub right_relation_column: String,
    pub join_kind: JoinKind,
    /// Alias given to `right_table`
    pub alias: String,
}

impl PartialEq for JoinDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for JoinDescriptor {}

impl Hash for JoinDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl JoinDescriptor {
    /// Qualifier used on the left side of the ON clause
    pub fn left_reference(&self) -> &str {
        if self.left_alias.is_empty() {
            &self.left_table
        } else {
            &self.left_alias
        }
    }
}

/// Result of parsing a join path against a source table
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPath {
    pub joins: Vec<JoinDescriptor>,
    pub column: String,
}

/// Parse `path` into its join chain and final column.
pub fn parse_join_path(path: &str, source_table: &str) -> Result<JoinPath, StoreError> {
    if source_table.trim().is_empty() {
        return Err(StoreError::invalid_join_path(
            path,
            "source table cannot be empty",
        ));
    }

    let segments = split_segments(path)?;
    let (last, hops) = match segments.split_last() {
        Some(split) => split,
        None => return Err(StoreError::invalid_join_path(path, "path is empty")),
    };

    if last.starts_with('[') {
        return Err(StoreError::invalid_join_path(
            path,
            "path must end with a column name, not a join segment",
        ));
    }
    if !is_bare_name(last) {
        return Err(StoreError::invalid_join_path(
            path,
            format!("'{}' is not a valid column name", last),
        ));
    }

    let mut joins: Vec<JoinDescriptor> = Vec::with_capacity(hops.len());
    let mut raw_prefix = String::new();

    for segment in hops {
        let (right_table, right_relation_column, left_relation_column) =
            parse_hop(path, segment)?;

        if !raw_prefix.is_empty() {
            raw_prefix.push('.');
        }
        raw_prefix.push_str(segment);

        let (left_table, left_alias) = match joins.last() {
            Some(previous) => (previous.right_table.clone(), previous.alias.clone()),
            None => (source_table.to_string(), source_table.to_string()),
        };
        let alias = hop_alias(
            joins.last().map(|previous| previous.alias.as_str()),
            right_table,
            left_relation_column,
        );

        joins.push(JoinDescriptor {
            path: raw_prefix.clone(),
            left_table,
            left_alias,
            left_relation_column: left_relation_column.to_string(),
            right_table: right_table.to_string(),
            right_relation_column: right_relation_column.to_string(),
            join_kind: DEFAULT_JOIN_KIND,
            alias,
        });
    }

    Ok(JoinPath {
        joins,
        column: last.to_string(),
    })
}

/// `<RightTable>_<LeftRelationColumn>` for a first hop, prefixed with the
/// previous hop's alias afterwards
pub fn hop_alias(previous: Option<&str>, right_table: &str, left_relation_column: &str) -> String {
    match previous {
        Some(previous) => format!("{}_{}_{}", previous, right_table, left_relation_column),
        None => format!("{}_{}", right_table, left_relation_column),
    }
}

/// Split on dots that are outside brackets
fn split_segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (position, c) in path.char_indices() {
        match c {
            '[' => {
                if depth > 0 {
                    return Err(StoreError::invalid_join_path(path, "nested '[' in join segment"));
                }
                depth += 1;
            }
            ']' => {
                if depth == 0 {
                    return Err(StoreError::invalid_join_path(path, "unmatched ']'"));
                }
                depth -= 1;
            }
            '.' if depth == 0 => {
                segments.push(path[start..position].trim());
                start = position + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(StoreError::invalid_join_path(path, "unclosed '['"));
    }
    segments.push(path[start..].trim());

    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(StoreError::invalid_join_path(path, "empty path segment"));
    }

    Ok(segments)
}

/// `[RightTable:RightRelationColumn:LeftRelationColumn]`
fn parse_hop<'a>(path: &str, segment: &'a str) -> Result<(&'a str, &'a str, &'a str), StoreError> {
    let inner = segment
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            StoreError::invalid_join_path(
                path,
                format!("'{}' must be a bracketed join segment", segment),
            )
        })?;

    let parts: Vec<&str> = inner.split(':').map(str::trim).collect();
    match parts.as_slice() {
        [right_table, right_column, left_column]
            if [right_table, right_column, left_column]
                .iter()
                .all(|part| is_bare_name(part)) =>
        {
            Ok((*right_table, *right_column, *left_column))
        }
        _ => Err(StoreError::invalid_join_path(
            path,
            format!(
                "'{}' must have the form [RightTable:RightRelationColumn:LeftRelationColumn]",
                segment
            ),
        )),
    }
}

fn is_bare_name(segment: &str) -> bool {
    !segment.is_empty()
        && !segment
            .chars()
            .any(|c| matches!(c, '[' | ']' | ':' | '.') || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_hop() {
        let parsed = parse_join_path("[Comments:Id:CommentId].Message", "Usages").unwrap();

        assert_eq!(parsed.column, "Message");
        assert_eq!(parsed.joins.len(), 1);

        let join = &parsed.joins[0];
        assert_eq!(join.path, "[Comments:Id:CommentId]");
        assert_eq!(join.left_table, "Usages");
        assert_eq!(join.left_alias, "Usages");
        assert_eq!(join.left_relation_column, "CommentId");
        assert_eq!(join.right_table, "Comments");
        assert_eq!(join.right_relation_column, "Id");
        assert_eq!(join.join_kind, JoinKind::LeftOuter);
        assert_eq!(join.alias, "Comments_CommentId");
    }

    #[test]
    fn test_multi_hop_chains_left_tables() {
        let parsed = parse_join_path(
            "[Comments:Id:CommentId].[Users:Id:AuthorId].DisplayName",
            "Usages",
        )
        .unwrap();

        assert_eq!(parsed.joins.len(), 2);
        let (first, second) = (&parsed.joins[0], &parsed.joins[1]);

        assert_eq!(second.left_table, first.right_table);
        assert_eq!(second.left_alias, first.alias);
        assert_eq!(second.left_relation_column, "AuthorId");
        assert_eq!(second.right_table, "Users");
        assert_eq!(second.path, "[Comments:Id:CommentId].[Users:Id:AuthorId]");
        assert_eq!(second.alias, "Comments_CommentId_Users_AuthorId");
        assert_eq!(parsed.column, "DisplayName");
    }

    #[test]
    fn test_shared_prefix_yields_equal_descriptors() {
        let a = parse_join_path("[Comments:Id:CommentId].Id", "Usages").unwrap();
        let b = parse_join_path("[Comments:Id:CommentId].Message", "Usages").unwrap();

        assert_eq!(a.joins[0], b.joins[0]);
        assert_eq!(a.joins[0].alias, b.joins[0].alias);
    }

    #[test]
    fn test_bare_column_has_no_joins() {
        let parsed = parse_join_path("Count", "Usages").unwrap();
        assert!(parsed.joins.is_empty());
        assert_eq!(parsed.column, "Count");
    }

    #[test]
    fn test_dangling_join_segment_fails() {
        let err = parse_join_path("[Comments:Id:CommentId]", "Usages").unwrap_err();
        assert!(matches!(err, StoreError::InvalidJoinPath { .. }));
        assert!(err.is_configuration_error());

        assert!(parse_join_path("[Comments:Id:CommentId].[Users:Id:AuthorId]", "Usages").is_err());
    }

    #[test]
    fn test_malformed_paths() {
        let cases = [
            "",
            "[Comments:Id].Message",
            "[Comments:Id:CommentId:Inner].Message",
            "[Comments::CommentId].Message",
            "Comments.Message",
            "[Comments:Id:CommentId]..Message",
            "[Comments:Id:CommentId.Message",
            "Comments:Id:CommentId].Message",
            "[[Comments:Id:CommentId]].Message",
        ];

        for path in cases {
            assert!(
                parse_join_path(path, "Usages").is_err(),
                "Should reject path: {:?}",
                path
            );
        }
    }

    #[test]
    fn test_blank_source_table_fails() {
        assert!(parse_join_path("[Comments:Id:CommentId].Message", " ").is_err());
    }
}
