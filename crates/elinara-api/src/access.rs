//! Connectivity and role-gated endpoints.

use axum::{Json, extract::State};
use elinara_core::{Role, store::ProfileStore};
use serde_json::{Value, json};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `GET /`
pub async fn welcome<S>(State(state): State<AppState<S>>) -> Json<Value>
where
  S: ProfileStore + Clone + 'static,
{
  Json(json!({ "message": format!("Welcome to {}", state.config.project_name) }))
}

/// `GET /protected` — succeeds for any authenticated caller.
pub async fn protected(_auth: Authenticated) -> Json<Value> {
  Json(json!({
    "message": "Authenticated successfully! Gateway connection active.",
    "status": "online",
  }))
}

/// `GET /admin` — requires the `admin` realm role.
pub async fn admin(Authenticated(identity): Authenticated) -> Result<Json<Value>, ApiError> {
  if !identity.has_role(Role::Admin) {
    return Err(ApiError::Forbidden("You do not have the admin role.".to_owned()));
  }
  let profile = identity.resolve()?;
  Ok(Json(json!({ "message": "Welcome Admin!", "user": profile })))
}
