//! Convenience re-exports for common Remark Store usage
//!
//! ```rust,ignore
//! use remark_store::prelude::*;
//! ```

pub use crate::core::RemarkStore;
pub use crate::errors::RemarkStoreError;
pub use crate::models::{Comment, CommentUsage, CommentUsageView, RetractionToken, SystemVariable};

pub use config::{AppConfig, DatabaseConfig};

pub use store_object::prelude::*;

// Generated derive code refers to `store_object::...`
pub use store_object;

pub use table_derive::{model, Projection, TableMetadata};

pub use async_trait;
pub use sqlx;
pub use tokio;
