//! Core types and reconciliation logic for Elinara profile sync.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! It turns an already-authenticated identity into a canonical profile
//! ([`resolve`]) and reconciles that profile against any [`ProfileStore`]
//! ([`sync`]).

pub mod claims;
pub mod error;
pub mod profile;
pub mod resolve;
pub mod role;
pub mod store;
pub mod sync;

pub use claims::{AuthenticatedIdentity, MiddlewareUser, TokenClaims};
pub use error::{Error, Result};
pub use profile::{CORRUPTED_EMAIL_SENTINEL, IdentityProfile, StoredUser};
pub use resolve::resolve;
pub use role::Role;
pub use store::{InsertOutcome, ProfileStore};
