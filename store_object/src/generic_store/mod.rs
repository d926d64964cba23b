pub mod core;
pub mod data_provider;
pub mod postgres;

pub use core::GenericStore;
pub use postgres::{PgAdapter, PgConnection, PgConnectionFactory};

/// Store wired to the bundled PostgreSQL adapter
pub type PgStore<T> = GenericStore<T, PgConnectionFactory, PgAdapter>;
