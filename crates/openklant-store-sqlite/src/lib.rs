//! SQLite backend for the OpenKlant Partij store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every write runs inside one `rusqlite`
//! transaction; the identifier reconciler works against that transaction and
//! a failure anywhere rolls the whole write back.

mod encode;
mod repo;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
