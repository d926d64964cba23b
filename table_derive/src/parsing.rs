//! Parsing utilities for table, field and join-path attributes
//!
//! Names are validated here with the same rules the runtime applies, so a bad
//! table name or join path fails the build instead of the first query.

use syn::{Attribute, Data, Error, Fields, GenericArgument, Ident, LitStr, Meta, PathArguments, Result, Type};

const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate table name and return syn::Error for better proc macro error handling
pub fn validate_table_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid table name '{}': {}", name, e)))
}

/// Validate column name and return syn::Error for better proc macro error handling
pub fn validate_column_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid column name '{}': {}", name, e)))
}

/// Mirrors `store_object::validation::ValidatedIdentifier`
fn validate_identifier(name: &str) -> std::result::Result<(), String> {
    if name.trim().is_empty() {
        return Err("name cannot be empty".to_string());
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(format!(
            "too long: {} characters (max {})",
            name.len(),
            MAX_IDENTIFIER_LENGTH
        ));
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err("must start with a letter or underscore".to_string());
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(
            "only alphanumeric characters and underscores are allowed".to_string(),
        );
    }

    Ok(())
}

/// Syntax check for `[RightTable:RightColumn:LeftColumn].…Column`
pub fn validate_join_path(path: &str) -> std::result::Result<(), String> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (position, c) in path.char_indices() {
        match c {
            '[' if depth > 0 => return Err("nested '[' in join segment".to_string()),
            '[' => depth += 1,
            ']' if depth == 0 => return Err("unmatched ']'".to_string()),
            ']' => depth -= 1,
            '.' if depth == 0 => {
                segments.push(path[start..position].trim());
                start = position + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unclosed '['".to_string());
    }
    segments.push(path[start..].trim());

    let (last, hops) = segments
        .split_last()
        .ok_or_else(|| "path is empty".to_string())?;

    if last.starts_with('[') {
        return Err("path must end with a column name, not a join segment".to_string());
    }
    validate_identifier(last).map_err(|e| format!("column '{}': {}", last, e))?;

    for segment in hops {
        let inner = segment
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| format!("'{}' must be a bracketed join segment", segment))?;
        let parts: Vec<&str> = inner.split(':').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!(
                "'{}' must have the form [RightTable:RightRelationColumn:LeftRelationColumn]",
                segment
            ));
        }
        for part in parts {
            validate_identifier(part)
                .map_err(|e| format!("'{}' in '{}': {}", part, segment, e))?;
        }
    }

    Ok(())
}

#[derive(Debug)]
pub struct TableInfo {
    pub name: String,
    /// Logical entity name; defaults to the struct name
    pub entity: Option<String>,
    pub has_auto_increment: bool,
}

#[derive(Debug)]
pub struct FieldInfo {
    pub primary_key_field: Ident,
    pub primary_key_column: String,
    pub primary_key_type: Type,
    /// Column names in declaration order
    pub columns: Vec<String>,
    /// `(column, ColumnType variant)` for fields whose type maps to one
    pub column_types: Vec<(String, &'static str)>,
}

#[derive(Debug)]
pub struct JoinPathInfo {
    /// Serialized field name, used as the column alias
    pub field: String,
    pub path: String,
}

/// Parse `#[table(name = "...", entity = "...", auto_increment)]`
pub fn parse_table_attributes(attrs: &[Attribute]) -> Result<TableInfo> {
    let mut table_name = None;
    let mut entity = None;
    let mut has_auto_increment = false;

    for attr in attrs {
        if !attr.path().is_ident("table") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                validate_table_name_syn(&value.value(), value.span())?;
                table_name = Some(value.value());
            } else if meta.path.is_ident("entity") {
                let value: LitStr = meta.value()?.parse()?;
                entity = Some(value.value());
            } else if meta.path.is_ident("auto_increment") {
                has_auto_increment = true;
            } else {
                return Err(meta.error("unknown table attribute; expected name, entity or auto_increment"));
            }
            Ok(())
        })?;
    }

    let name = table_name.ok_or_else(|| {
        Error::new(
            proc_macro2::Span::call_site(),
            "table attribute is required: add #[table(name = \"table_name\")] to your struct",
        )
    })?;

    Ok(TableInfo {
        name,
        entity,
        has_auto_increment,
    })
}

/// Collect columns and the `#[primary_key]` field of a named-field struct
pub fn parse_field_attributes(data: &Data, span: proc_macro2::Span) -> Result<FieldInfo> {
    let fields = named_fields(data, span, "TableMetadata")?;

    let mut primary_key = None;
    let mut columns = Vec::new();
    let mut column_types = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let column = serialized_name(&field.attrs)?.unwrap_or_else(|| ident.to_string());
        validate_column_name_syn(&column, ident.span())?;

        if has_attribute(&field.attrs, "primary_key") {
            if primary_key.is_some() {
                return Err(Error::new(
                    ident.span(),
                    "only one field can be marked #[primary_key]",
                ));
            }
            primary_key = Some((ident.clone(), column.clone(), field.ty.clone()));
        }

        if let Some(variant) = column_type_variant(&field.ty) {
            column_types.push((column.clone(), variant));
        }
        columns.push(column);
    }

    let (primary_key_field, primary_key_column, primary_key_type) =
        primary_key.ok_or_else(|| {
            Error::new(span, "a field must be marked #[primary_key]")
        })?;

    Ok(FieldInfo {
        primary_key_field,
        primary_key_column,
        primary_key_type,
        columns,
        column_types,
    })
}

/// `ColumnType` variant for a field type; `Option<T>` maps like `T` and
/// unmapped types bind by JSON shape at runtime
pub fn column_type_variant(ty: &Type) -> Option<&'static str> {
    match ty {
        Type::Reference(reference) => column_type_variant(&reference.elem),
        Type::Path(path) => {
            let segment = path.path.segments.last()?;
            let name = segment.ident.to_string();

            if name == "Option" {
                return match &segment.arguments {
                    PathArguments::AngleBracketed(args) => match args.args.first() {
                        Some(GenericArgument::Type(inner)) => column_type_variant(inner),
                        _ => None,
                    },
                    _ => None,
                };
            }

            match name.as_str() {
                "String" | "str" | "char" => Some("Text"),
                "i8" | "i16" | "u8" => Some("SmallInt"),
                "i32" | "u16" => Some("Integer"),
                "i64" | "u32" => Some("BigInt"),
                "f32" | "f64" => Some("Float"),
                "bool" => Some("Boolean"),
                "Uuid" => Some("Uuid"),
                "DateTime" | "NaiveDateTime" => Some("Timestamp"),
                "NaiveDate" => Some("Date"),
                "Value" => Some("Json"),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Collect `#[join_path("...")]` registrations in declaration order
pub fn parse_join_paths(data: &Data, span: proc_macro2::Span) -> Result<Vec<JoinPathInfo>> {
    let fields = named_fields(data, span, "Projection")?;
    let mut join_paths = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        for attr in &field.attrs {
            if !attr.path().is_ident("join_path") {
                continue;
            }

            let path: LitStr = attr.parse_args()?;
            validate_join_path(&path.value()).map_err(|reason| {
                Error::new(
                    path.span(),
                    format!("Invalid join path '{}': {}", path.value(), reason),
                )
            })?;

            join_paths.push(JoinPathInfo {
                field: serialized_name(&field.attrs)?.unwrap_or_else(|| ident.to_string()),
                path: path.value(),
            });
        }
    }

    Ok(join_paths)
}

fn named_fields<'a>(
    data: &'a Data,
    span: proc_macro2::Span,
    derive: &str,
) -> Result<&'a syn::punctuated::Punctuated<syn::Field, syn::token::Comma>> {
    match data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(Error::new(
                span,
                format!("{} can only be derived for structs with named fields", derive),
            )),
        },
        _ => Err(Error::new(
            span,
            format!("{} can only be derived for structs", derive),
        )),
    }
}

/// `#[serde(rename = "...")]` on a field, if any
fn serialized_name(attrs: &[Attribute]) -> Result<Option<String>> {
    let mut rename = None;

    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        if let Meta::List(_) = &attr.meta {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    rename = Some(value.value());
                } else if meta.input.peek(syn::Token![=]) {
                    let _: syn::Expr = meta.value()?.parse()?;
                } else if meta.input.peek(syn::token::Paren) {
                    let _content;
                    syn::parenthesized!(_content in meta.input);
                }
                Ok(())
            })?;
        }
    }

    Ok(rename)
}

pub fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        for name in ["comments", "comment_usages", "_private", "Table123"] {
            assert!(validate_identifier(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_invalid_identifiers() {
        for name in ["", " ", "1st", "user-table", "a b", "users;drop", "x\"y"] {
            assert!(validate_identifier(name).is_err(), "{:?}", name);
        }
        assert!(validate_identifier(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_join_path_syntax() {
        assert!(validate_join_path("[comments:id:comment_id].message").is_ok());
        assert!(validate_join_path("[comments:id:comment_id].[users:id:author_id].name").is_ok());
        assert!(validate_join_path("count").is_ok());

        for path in [
            "",
            "[comments:id:comment_id]",
            "[comments:id].message",
            "[comments:id:comment_id:x].message",
            "comments.message",
            "[comments:id:comment_id.message",
            "[comments:id:comment-id].message",
            "[comments:id:comment_id].1st",
            "[comments:id:comment_id].x y",
        ] {
            assert!(validate_join_path(path).is_err(), "{:?}", path);
        }
    }

    #[test]
    fn test_parse_table_attributes() {
        let input: syn::DeriveInput = syn::parse_quote! {
            #[table(name = "comments", entity = "Comment", auto_increment)]
            struct CommentRow { #[primary_key] id: i64 }
        };

        let info = parse_table_attributes(&input.attrs).unwrap();
        assert_eq!(info.name, "comments");
        assert_eq!(info.entity.as_deref(), Some("Comment"));
        assert!(info.has_auto_increment);
    }

    #[test]
    fn test_parse_fields_with_rename() {
        let input: syn::DeriveInput = syn::parse_quote! {
            #[table(name = "system_variables")]
            struct SystemVariable {
                #[primary_key]
                #[serde(rename = "name")]
                key: String,
                #[serde(default)]
                value: String,
            }
        };

        let info = parse_field_attributes(&input.data, proc_macro2::Span::call_site()).unwrap();
        assert_eq!(info.primary_key_field.to_string(), "key");
        assert_eq!(info.primary_key_column, "name");
        assert_eq!(info.columns, vec!["name", "value"]);
        assert_eq!(
            info.column_types,
            vec![("name".to_string(), "Text"), ("value".to_string(), "Text")]
        );
    }

    #[test]
    fn test_column_type_variants() {
        let cases: [(Type, Option<&str>); 9] = [
            (syn::parse_quote!(i64), Some("BigInt")),
            (syn::parse_quote!(Option<i32>), Some("Integer")),
            (syn::parse_quote!(chrono::DateTime<chrono::Utc>), Some("Timestamp")),
            (syn::parse_quote!(Option<DateTime<Utc>>), Some("Timestamp")),
            (syn::parse_quote!(uuid::Uuid), Some("Uuid")),
            (syn::parse_quote!(String), Some("Text")),
            (syn::parse_quote!(serde_json::Value), Some("Json")),
            (syn::parse_quote!(Vec<String>), None),
            (syn::parse_quote!(CommentState), None),
        ];

        for (ty, expected) in cases {
            assert_eq!(column_type_variant(&ty), expected, "{}", quote::quote!(#ty));
        }
    }

    #[test]
    fn test_missing_primary_key_fails() {
        let input: syn::DeriveInput = syn::parse_quote! {
            struct NoKey { value: String }
        };
        assert!(parse_field_attributes(&input.data, proc_macro2::Span::call_site()).is_err());
    }

    #[test]
    fn test_parse_join_paths() {
        let input: syn::DeriveInput = syn::parse_quote! {
            struct View {
                id: i64,
                #[join_path("[comments:id:comment_id].message")]
                comment_message: String,
            }
        };

        let paths = parse_join_paths(&input.data, proc_macro2::Span::call_site()).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].field, "comment_message");
        assert_eq!(paths[0].path, "[comments:id:comment_id].message");
    }

    #[test]
    fn test_bad_join_path_is_compile_error() {
        let input: syn::DeriveInput = syn::parse_quote! {
            struct View {
                #[join_path("[comments:id:comment_id]")]
                comment: String,
            }
        };
        assert!(parse_join_paths(&input.data, proc_macro2::Span::call_site()).is_err());
    }
}
