//! Raw identity material handed over by the authentication layer.
//!
//! Two shapes exist: a [`MiddlewareUser`] synthesised by the authentication
//! layer from the verified token, and [`TokenClaims`] decoded directly from
//! the bearer token. Both travel together in an [`AuthenticatedIdentity`],
//! which is passed explicitly to whoever needs it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::role::Role;

/// Claim names this crate knows how to read.
pub mod keys {
  pub const SUB:                &str = "sub";
  pub const EMAIL:              &str = "email";
  pub const NAME:               &str = "name";
  pub const PREFERRED_USERNAME: &str = "preferred_username";
  pub const PHONE_NUMBER:       &str = "phone_number";
  pub const ADDRESS:            &str = "address";
  pub const REALM_ACCESS:       &str = "realm_access";
}

// ─── Token claims ────────────────────────────────────────────────────────────

/// Claims decoded from a bearer token without signature verification.
///
/// Verification is the job of whatever sits in front of this service; these
/// claims are only read, never trusted for authentication decisions on their
/// own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenClaims(Map<String, Value>);

impl TokenClaims {
  pub fn new() -> Self { Self::default() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Raw claim value. JSON `null` is reported as absent.
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key).filter(|v| !v.is_null())
  }

  /// Claim value as a non-empty string.
  pub fn get_str(&self, key: &str) -> Option<&str> {
    self.0.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
  }

  /// Role names listed under `realm_access.roles`, in token order.
  pub fn realm_roles(&self) -> Vec<String> {
    self
      .get(keys::REALM_ACCESS)
      .and_then(|access| access.get("roles"))
      .and_then(Value::as_array)
      .map(|roles| {
        roles
          .iter()
          .filter_map(Value::as_str)
          .map(str::to_owned)
          .collect()
      })
      .unwrap_or_default()
  }
}

impl From<Map<String, Value>> for TokenClaims {
  fn from(map: Map<String, Value>) -> Self { Self(map) }
}

// ─── Middleware user ─────────────────────────────────────────────────────────

/// The user object produced by the authentication layer.
///
/// Every attribute is optional: depending on the provider's mapper the object
/// may lack the subject entirely, or carry values the token does not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareUser {
  pub user_id:       Option<String>,
  pub identity:      Option<String>,
  pub email:         Option<String>,
  pub full_name:     Option<String>,
  pub display_name:  Option<String>,
  pub username:      Option<String>,
  pub phone_number:  Option<String>,
  /// Either a plain string or a structured address object.
  pub address:       Option<Value>,
  pub roles:         Vec<String>,
  /// Claims the authentication layer decoded alongside the user object.
  pub manual_claims: Option<TokenClaims>,
}

// ─── Authenticated identity ──────────────────────────────────────────────────

/// Everything the authentication layer knows about the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthenticatedIdentity {
  pub user:   Option<MiddlewareUser>,
  pub claims: TokenClaims,
}

impl AuthenticatedIdentity {
  pub fn new(user: Option<MiddlewareUser>, claims: TokenClaims) -> Self {
    Self { user, claims }
  }

  /// Known roles granted to the caller, from the user object and every claim
  /// source. Unknown role names are ignored and duplicates collapsed.
  pub fn roles(&self) -> Vec<Role> {
    let from_user = self.user.iter().flat_map(|u| u.roles.iter().cloned());
    let from_manual = self
      .user
      .iter()
      .filter_map(|u| u.manual_claims.as_ref())
      .flat_map(TokenClaims::realm_roles);

    let mut roles = Vec::new();
    for name in from_user.chain(self.claims.realm_roles()).chain(from_manual) {
      if let Ok(role) = name.parse::<Role>()
        && !roles.contains(&role)
      {
        roles.push(role);
      }
    }
    roles
  }

  pub fn has_role(&self, role: Role) -> bool { self.roles().contains(&role) }
}
