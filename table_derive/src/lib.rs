//! Procedural macros for table metadata and projection registration
//!
//! `#[derive(TableMetadata)]` describes the table behind an entity,
//! `#[derive(Projection)]` registers join-path fields of a read model and
//! `#[model]` bundles the derives a table-backed struct needs.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod generation;
mod model_macro;
mod parsing;

use generation::{generate_projection_impl, generate_table_metadata_impl};
use model_macro::model_attribute;
use parsing::{parse_field_attributes, parse_join_paths, parse_table_attributes};

/// Derive macro for the `TableMetadata` trait
///
/// ```ignore
/// #[derive(Debug, Clone, serde::Serialize, serde::Deserialize, TableMetadata)]
/// #[table(name = "comments", entity = "Comment", auto_increment)]
/// pub struct Comment {
///     #[primary_key]
///     pub id: i64,
///     pub message: String,
/// }
/// ```
///
/// Columns are the serialized field names; `#[serde(rename = "...")]` on a
/// field is honoured.
#[proc_macro_derive(TableMetadata, attributes(table, primary_key))]
pub fn derive_table_metadata(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let table_info = match parse_table_attributes(&input.attrs) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    let field_info = match parse_field_attributes(&input.data, input.ident.span()) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    generate_table_metadata_impl(&input.ident, &table_info, &field_info).into()
}

/// Derive macro for the `Projection` trait
///
/// ```ignore
/// #[derive(Debug, serde::Deserialize, Projection)]
/// pub struct CommentUsageView {
///     pub id: i64,
///     #[join_path("[comments:id:comment_id].message")]
///     pub comment_message: String,
/// }
/// ```
///
/// Paths are checked at compile time.
#[proc_macro_derive(Projection, attributes(join_path))]
pub fn derive_projection(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let join_paths = match parse_join_paths(&input.data, input.ident.span()) {
        Ok(paths) => paths,
        Err(e) => return e.to_compile_error().into(),
    };

    generate_projection_impl(&input.ident, &join_paths).into()
}

/// Adds `Debug`, `Clone`, `Serialize`, `Deserialize` and `TableMetadata`
/// derives to a struct
///
/// ```ignore
/// #[model]
/// #[table(name = "retraction_tokens")]
/// pub struct RetractionToken {
///     #[primary_key]
///     pub token: Uuid,
///     pub comment_id: i64,
/// }
/// ```
#[proc_macro_attribute]
pub fn model(attr: TokenStream, item: TokenStream) -> TokenStream {
    model_attribute(attr, item)
}
