//! Core types and the identifier reconciliation engine for OpenKlant.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`repository::IdentificatorRepository`] for the
//! synchronous in-transaction work and [`store::PartijStore`] for the async
//! service boundary; the API crate depends only on the latter.

pub mod diff;
pub mod error;
pub mod identificator;
pub mod partij;
pub mod reconciler;
pub mod repository;
pub mod rules;
pub mod store;
pub mod validation;
pub mod validators;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
