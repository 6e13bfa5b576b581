//! Storage adapters implementing the `domains` repository ports.

pub mod in_memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use in_memory::InMemoryCatalog;

#[cfg(feature = "db-postgres")]
pub use postgres::PgCatalog;
