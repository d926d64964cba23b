//! Traits for entity metadata, execution and data access

pub mod adapter;
pub mod core;
pub mod table_metadata;

pub use adapter::{ConnectionFactory, QueryAdapter};
pub use core::DataProvider;
pub use table_metadata::{Projection, TableMetadata};
