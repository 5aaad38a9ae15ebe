//! Handlers for `/users` endpoints.
//!
//! | Method | Path          | Notes                                           |
//! |--------|---------------|-------------------------------------------------|
//! | `GET`  | `/users`      | Purges placeholder-email rows, then lists all   |
//! | `POST` | `/users/sync` | Upserts the caller's profile; 401 without `sub` |

use axum::{Json, extract::State};
use elinara_core::{StoredUser, store::ProfileStore, sync};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `GET /users`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
) -> Result<Json<Vec<StoredUser>>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  let users = sync::list_all(state.store.as_ref()).await?;
  Ok(Json(users))
}

/// `POST /users/sync` — no body; the profile comes from the bearer token.
pub async fn sync_current<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
) -> Result<Json<StoredUser>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  let profile = identity.resolve()?;
  let user = sync::synchronize(state.store.as_ref(), &profile).await?;
  Ok(Json(user))
}
