//! JSON REST API for OpenKlant.
//!
//! Exposes an axum [`Router`] for `/partijen` and `/partij-identificatoren`
//! backed by any [`PartijStore`]. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/klantinteracties/api/v1", openklant_api::api_router(state))
//! ```

pub mod dto;
pub mod error;
pub mod identificatoren;
pub mod partijen;

use std::sync::Arc;

use axum::{Router, routing::get};
use openklant_core::store::PartijStore;

pub use error::ApiError;

/// Settings the handlers need at request time.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Prefix for every `url` field in responses, without a trailing slash.
  pub base_url: String,
}

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ApiConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: S, config: ApiConfig) -> Self {
    Self { store: Arc::new(store), config: Arc::new(config) }
  }
}

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: PartijStore + Clone + 'static,
{
  Router::new()
    // Partijen
    .route(
      "/partijen",
      get(partijen::list::<S>).post(partijen::create::<S>),
    )
    .route(
      "/partijen/{uuid}",
      get(partijen::get_one::<S>)
        .put(partijen::replace::<S>)
        .patch(partijen::patch::<S>)
        .delete(partijen::delete_one::<S>),
    )
    // PartijIdentificatoren
    .route(
      "/partij-identificatoren",
      get(identificatoren::list::<S>).post(identificatoren::create::<S>),
    )
    .route(
      "/partij-identificatoren/{uuid}",
      get(identificatoren::get_one::<S>)
        .put(identificatoren::replace::<S>)
        .patch(identificatoren::patch::<S>)
        .delete(identificatoren::delete_one::<S>),
    )
    .with_state(state)
}
