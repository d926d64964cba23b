//! # Remark Store
//!
//! Relational storage for a comment-tracking application: reusable review
//! comments, usage counters, retraction tokens and system variables.
//!
//! Queries are compiled, not hand-written. Filter trees, join paths declared
//! on projection models and CRUD intents become parameterized SQL for
//! SQL Server or PostgreSQL.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use remark_store::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let store = RemarkStore::new(config.database).await?;
//!
//!     let usages = store.store::<CommentUsage>();
//!     let recent = FilterGroup::and()
//!         .item(FilterItem::greater_or_equal("Since", "last_used_on", "2024-01-01T00:00:00Z"));
//!
//!     let views: Vec<CommentUsageView> = usages.select(&recent).await?;
//!     println!("{} usages, capped at {}", views.len(), usages.max_row_count());
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod models;
pub mod prelude;

pub use core::RemarkStore;
pub use errors::RemarkStoreError;

pub use config::{AppConfig, DatabaseConfig};

// Generated derive code refers to these crates by name
pub use store_object;
pub use table_derive;

pub use async_trait;
pub use sqlx;
