//! Trait implementation generation
//!
//! Generated code refers to `store_object::...`, which the root crate
//! re-exports through its prelude.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

use crate::parsing::{FieldInfo, JoinPathInfo, TableInfo};

pub fn generate_table_metadata_impl(
    name: &Ident,
    table_info: &TableInfo,
    field_info: &FieldInfo,
) -> TokenStream {
    let table_name = &table_info.name;
    let entity_name = table_info
        .entity
        .clone()
        .unwrap_or_else(|| name.to_string());
    let identity_generated = table_info.has_auto_increment;

    let primary_key_field = &field_info.primary_key_field;
    let primary_key_column = &field_info.primary_key_column;
    let primary_key_type = &field_info.primary_key_type;
    let columns = &field_info.columns;
    let column_types = field_info.column_types.iter().map(|(column, variant)| {
        let variant = format_ident!("{}", variant);
        quote! { (#column, store_object::query_builder::ColumnType::#variant) }
    });

    quote! {
        impl store_object::traits::TableMetadata for #name {
            type Id = #primary_key_type;

            fn table_name() -> &'static str {
                #table_name
            }

            fn entity_name() -> &'static str {
                #entity_name
            }

            fn primary_key_field() -> &'static str {
                #primary_key_column
            }

            fn fields() -> &'static [&'static str] {
                &[#(#columns),*]
            }

            fn column_types() -> &'static [(&'static str, store_object::query_builder::ColumnType)] {
                const COLUMN_TYPES: &[(&str, store_object::query_builder::ColumnType)] =
                    &[#(#column_types),*];
                COLUMN_TYPES
            }

            fn identity_generated() -> bool {
                #identity_generated
            }

            fn extract_id(&self) -> Self::Id {
                ::std::clone::Clone::clone(&self.#primary_key_field)
            }
        }
    }
}

pub fn generate_projection_impl(name: &Ident, join_paths: &[JoinPathInfo]) -> TokenStream {
    let registrations = join_paths.iter().map(|info| {
        let field = &info.field;
        let path = &info.path;
        quote! {
            store_object::query_builder::JoinPathField::new(#field, #path)
        }
    });

    quote! {
        impl store_object::traits::Projection for #name {
            fn join_path_fields() -> &'static [store_object::query_builder::JoinPathField] {
                const FIELDS: &[store_object::query_builder::JoinPathField] = &[#(#registrations),*];
                FIELDS
            }
        }
    }
}
