//! The `ProfileStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `elinara-store-sqlite`).
//! The synchronizer in [`crate::sync`] and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::profile::{IdentityProfile, StoredUser};

/// Result of an insert attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
  Inserted(StoredUser),
  /// A row with the same `subject_id` already exists. Usually another writer
  /// got there first.
  Conflict,
}

/// Abstraction over the table of synchronized profiles.
///
/// Every method must be atomic on its own; no cross-call transactions are
/// required. All methods return `Send` futures so the trait can be used from
/// axum handlers on a multi-threaded runtime.
pub trait ProfileStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every stored profile, ordered by surrogate `id`.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<StoredUser>, Self::Error>> + Send + '_;

  fn find_by_subject<'a>(
    &'a self,
    subject_id: &'a str,
  ) -> impl Future<Output = Result<Option<StoredUser>, Self::Error>> + Send + 'a;

  /// Insert a new row for `profile` with a freshly assigned `id`.
  ///
  /// A uniqueness violation on `subject_id` must be reported as
  /// [`InsertOutcome::Conflict`], not as an error.
  fn insert_user<'a>(
    &'a self,
    profile: &'a IdentityProfile,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + 'a;

  /// Overwrite every mutable column of the row keyed by
  /// `profile.subject_id`. Returns `None` if no such row exists.
  fn update_user<'a>(
    &'a self,
    profile: &'a IdentityProfile,
  ) -> impl Future<Output = Result<Option<StoredUser>, Self::Error>> + Send + 'a;

  /// Delete every row whose email equals `email` exactly (case-sensitive).
  /// Returns the number of rows removed.
  fn delete_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}
