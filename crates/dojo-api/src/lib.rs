//! JSON REST API for Dojo.
//!
//! Exposes an axum [`Router`] backed by any
//! [`dojo_core::store::TournamentStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", dojo_api::api_router(store.clone(), PairingOptions::default()))
//! ```

pub mod competitors;
pub mod error;
pub mod matches;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use dojo_core::{pairing::PairingOptions, store::TournamentStore};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub pairing: PairingOptions,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), pairing: self.pairing }
  }
}

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, pairing: PairingOptions) -> Router<()>
where
  S: TournamentStore + 'static,
{
  Router::new()
    // Roster
    .route(
      "/competitors",
      get(competitors::list::<S>)
        .post(competitors::create::<S>)
        .delete(competitors::clear::<S>),
    )
    .route("/competitors/bulk", post(competitors::create_many::<S>))
    .route("/competitors/{id}", delete(competitors::delete_one::<S>))
    // Matches
    .route("/matches", get(matches::list::<S>).delete(matches::clear::<S>))
    .route("/matches/generate", post(matches::generate::<S>))
    .route("/matches/manual", post(matches::create_manual::<S>))
    .route("/matches/{id}", get(matches::get_one::<S>).delete(matches::delete_one::<S>))
    .route("/matches/{id}/result", put(matches::declare::<S>))
    .with_state(ApiState { store, pairing })
}
