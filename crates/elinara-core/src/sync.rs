//! Profile synchronization: reconciling a resolved [`IdentityProfile`] with a
//! [`ProfileStore`].
//!
//! Per subject the stored row moves `ABSENT → PRESENT` on the first
//! [`synchronize`], stays `PRESENT` (fields refreshed) on every later one, and
//! only goes back to `ABSENT` through the placeholder-email cleanup performed
//! by [`list_all`].

use tracing::{debug, info};

use crate::{
  Error, Result,
  profile::{CORRUPTED_EMAIL_SENTINEL, IdentityProfile, StoredUser},
  store::{InsertOutcome, ProfileStore},
};

/// How many lookup/write rounds [`synchronize`] attempts before giving up on
/// a subject that concurrent writers keep racing for.
pub const MAX_SYNC_ATTEMPTS: usize = 3;

/// Purge corrupted rows, then return every remaining profile.
pub async fn list_all<S: ProfileStore>(store: &S) -> Result<Vec<StoredUser>> {
  purge_corrupted(store).await?;
  store.list_users().await.map_err(Error::store)
}

/// Delete every row carrying [`CORRUPTED_EMAIL_SENTINEL`] as its email.
/// Matching is exact; `"n/a"` is a legitimate (if odd) value and is kept.
pub async fn purge_corrupted<S: ProfileStore>(store: &S) -> Result<usize> {
  let purged = store
    .delete_by_email(CORRUPTED_EMAIL_SENTINEL)
    .await
    .map_err(Error::store)?;
  if purged > 0 {
    info!(purged, "removed profiles carrying the placeholder email");
  }
  Ok(purged)
}

/// Upsert `profile`, keyed by its subject identifier, and return the stored
/// row.
///
/// An existing row has all mutable fields overwritten (absent values clear
/// the column). A missing row is inserted. When a concurrent writer inserts
/// the same subject between our lookup and our insert, the store reports a
/// conflict and the attempt is retried as an update.
pub async fn synchronize<S: ProfileStore>(
  store: &S,
  profile: &IdentityProfile,
) -> Result<StoredUser> {
  if profile.subject_id.is_empty() {
    return Err(Error::IdentityMissing);
  }
  let subject_id = profile.subject_id.as_str();

  for attempt in 1..=MAX_SYNC_ATTEMPTS {
    let existing = store
      .find_by_subject(subject_id)
      .await
      .map_err(Error::store)?;

    if existing.is_some() {
      match store.update_user(profile).await.map_err(Error::store)? {
        Some(user) => {
          debug!(id = user.id, subject_id, "refreshed profile");
          return Ok(user);
        }
        // Deleted between lookup and update.
        None => {
          debug!(attempt, subject_id, "profile vanished before update, retrying");
          continue;
        }
      }
    }

    match store.insert_user(profile).await.map_err(Error::store)? {
      InsertOutcome::Inserted(user) => {
        info!(id = user.id, subject_id, "created profile");
        return Ok(user);
      }
      InsertOutcome::Conflict => {
        debug!(attempt, subject_id, "lost insert race, retrying as update");
      }
    }
  }

  Err(Error::StoreConstraintViolation(profile.subject_id.clone()))
}
