//! HTTP layer for Elinara profile sync.
//!
//! Exposes an axum [`Router`] backed by any
//! [`elinara_core::store::ProfileStore`]. Token signature verification and
//! TLS are the job of whatever sits in front of the service.
//!
//! | Method | Path          | Handler                   |
//! |--------|---------------|---------------------------|
//! | `GET`  | `/`           | [`access::welcome`]       |
//! | `GET`  | `/protected`  | [`access::protected`]     |
//! | `GET`  | `/admin`      | [`access::admin`]         |
//! | `GET`  | `/users`      | [`users::list`]           |
//! | `POST` | `/users/sync` | [`users::sync_current`]   |

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod mapper;
pub mod users;

pub use config::ServerConfig;
pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Router,
  http::HeaderValue,
  routing::{get, post},
};
use elinara_core::store::ProfileStore;
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ProfileStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the service [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ProfileStore + Clone + 'static,
{
  let cors = cors_layer(&state.config.cors_origins);

  Router::new()
    .route("/",           get(access::welcome::<S>))
    .route("/protected",  get(access::protected))
    .route("/admin",      get(access::admin))
    .route("/users",      get(users::list::<S>))
    .route("/users/",     get(users::list::<S>))
    .route("/users/sync", post(users::sync_current::<S>))
    .with_state(state)
    .layer(TraceLayer::new_for_http())
    .layer(cors)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
  if origins.is_empty() {
    return CorsLayer::permissive();
  }

  let allowed: Vec<HeaderValue> = origins
    .iter()
    .filter_map(|o| match HeaderValue::from_str(o) {
      Ok(v) => Some(v),
      Err(_) => {
        tracing::warn!(origin = %o, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(allowed))
    .allow_methods(Any)
    .allow_headers(Any)
}

// ─── Integration tests ────────────────────────────────────────────────────────
