//! Canonical profile types.
//!
//! [`IdentityProfile`] is the ephemeral result of resolving an authenticated
//! identity; [`StoredUser`] is its durable projection, one row per subject.

use serde::{Deserialize, Serialize};

/// Placeholder email left behind by an old resolution bug that defaulted
/// missing emails to a literal string. Rows carrying it are purged on read.
pub const CORRUPTED_EMAIL_SENTINEL: &str = "N/A";

/// A canonical identity, reconciled from every available claim source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
  /// Stable provider-issued identifier (the token `sub`). Never empty once
  /// produced by [`crate::resolve`].
  pub subject_id:   String,
  pub email:        Option<String>,
  pub full_name:    Option<String>,
  pub username:     Option<String>,
  pub phone_number: Option<String>,
  /// Single display string, even when the source was a structured address.
  pub address:      Option<String>,
}

impl IdentityProfile {
  pub fn new(subject_id: impl Into<String>) -> Self {
    Self { subject_id: subject_id.into(), ..Self::default() }
  }
}

/// A persisted profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
  /// Surrogate key assigned by the store.
  pub id:           i64,
  pub subject_id:   String,
  pub email:        Option<String>,
  pub full_name:    Option<String>,
  pub username:     Option<String>,
  pub phone_number: Option<String>,
  pub address:      Option<String>,
}

impl StoredUser {
  /// Build the row a store would hold for `profile` under surrogate `id`.
  pub fn from_profile(id: i64, profile: &IdentityProfile) -> Self {
    Self {
      id,
      subject_id:   profile.subject_id.clone(),
      email:        profile.email.clone(),
      full_name:    profile.full_name.clone(),
      username:     profile.username.clone(),
      phone_number: profile.phone_number.clone(),
      address:      profile.address.clone(),
    }
  }

  /// Overwrite every mutable field from `profile`. Absent fields clear the
  /// stored value; `id` and `subject_id` are left alone.
  pub fn overwrite_from(&mut self, profile: &IdentityProfile) {
    self.email = profile.email.clone();
    self.full_name = profile.full_name.clone();
    self.username = profile.username.clone();
    self.phone_number = profile.phone_number.clone();
    self.address = profile.address.clone();
  }

  pub fn is_corrupted(&self) -> bool {
    self.email.as_deref() == Some(CORRUPTED_EMAIL_SENTINEL)
  }
}
