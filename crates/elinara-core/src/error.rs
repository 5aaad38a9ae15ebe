//! Error types for `elinara-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No source yielded a non-empty subject identifier.
  #[error("no subject identifier could be resolved for the authenticated identity")]
  IdentityMissing,

  /// Concurrent writers kept winning the insert for this subject.
  #[error("subject {0:?} kept colliding with concurrent inserts")]
  StoreConstraintViolation(String),

  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StoreUnavailable(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
