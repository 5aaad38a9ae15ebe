//! Claims mapper: builds the [`MiddlewareUser`] the authentication layer
//! hands to the resolver.
//!
//! Configured as a table from claim name to user attribute, e.g.
//!
//! ```toml
//! [claims_mapper]
//! sub                = "user_id"
//! name               = "full_name"
//! preferred_username = "username"
//! realm_access       = "roles"
//! ```

use std::collections::BTreeMap;

use elinara_core::{MiddlewareUser, TokenClaims, claims::keys};
use serde::Deserialize;
use serde_json::Value;

/// A [`MiddlewareUser`] attribute a claim can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAttribute {
  UserId,
  Identity,
  Email,
  FullName,
  DisplayName,
  Username,
  PhoneNumber,
  Address,
  Roles,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ClaimsMapper(BTreeMap<String, UserAttribute>);

impl Default for ClaimsMapper {
  fn default() -> Self {
    Self(BTreeMap::from([
      (keys::SUB.to_owned(), UserAttribute::UserId),
      (keys::NAME.to_owned(), UserAttribute::FullName),
      (keys::EMAIL.to_owned(), UserAttribute::Email),
      (keys::PREFERRED_USERNAME.to_owned(), UserAttribute::Username),
      (keys::REALM_ACCESS.to_owned(), UserAttribute::Roles),
      (keys::PHONE_NUMBER.to_owned(), UserAttribute::PhoneNumber),
      (keys::ADDRESS.to_owned(), UserAttribute::Address),
    ]))
  }
}

impl ClaimsMapper {
  /// Project `claims` onto a user object and attach the claims themselves as
  /// `manual_claims`. Claims of the wrong JSON type are skipped.
  pub fn map(&self, claims: &TokenClaims) -> MiddlewareUser {
    let mut user = MiddlewareUser::default();

    for (claim, attribute) in &self.0 {
      let Some(value) = claims.get(claim) else { continue };
      let text = || value.as_str().map(str::to_owned);
      match attribute {
        UserAttribute::UserId => user.user_id = text(),
        UserAttribute::Identity => user.identity = text(),
        UserAttribute::Email => user.email = text(),
        UserAttribute::FullName => user.full_name = text(),
        UserAttribute::DisplayName => user.display_name = text(),
        UserAttribute::Username => user.username = text(),
        UserAttribute::PhoneNumber => user.phone_number = text(),
        UserAttribute::Address => user.address = Some(value.clone()),
        UserAttribute::Roles => user.roles = role_names(value),
      }
    }

    user.manual_claims = Some(claims.clone());
    user
  }
}

/// Accept both `{"roles": [...]}` (Keycloak `realm_access`) and a bare array.
fn role_names(value: &Value) -> Vec<String> {
  value
    .get("roles")
    .unwrap_or(value)
    .as_array()
    .map(|roles| {
      roles
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn claims(value: Value) -> TokenClaims {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn default_mapping_projects_standard_claims() {
    let c = claims(json!({
      "sub": "u1",
      "name": "Ada",
      "email": "a@x.com",
      "preferred_username": "ada",
      "phone_number": "555",
      "address": { "formatted": "1 Main St" },
      "realm_access": { "roles": ["admin", "user"] },
    }));

    let user = ClaimsMapper::default().map(&c);
    assert_eq!(user.user_id.as_deref(), Some("u1"));
    assert_eq!(user.full_name.as_deref(), Some("Ada"));
    assert_eq!(user.email.as_deref(), Some("a@x.com"));
    assert_eq!(user.username.as_deref(), Some("ada"));
    assert_eq!(user.phone_number.as_deref(), Some("555"));
    assert_eq!(user.address, Some(json!({ "formatted": "1 Main St" })));
    assert_eq!(user.roles, ["admin", "user"]);
    assert_eq!(user.manual_claims, Some(c));
  }

  #[test]
  fn custom_mapping_is_deserialised_from_config() {
    let mapper: ClaimsMapper =
      serde_json::from_value(json!({ "oid": "identity", "nickname": "display_name" }))
        .unwrap();
    let user = mapper.map(&claims(json!({ "oid": "o-1", "nickname": "Nick", "sub": "s" })));

    assert_eq!(user.identity.as_deref(), Some("o-1"));
    assert_eq!(user.display_name.as_deref(), Some("Nick"));
    assert_eq!(user.user_id, None);
  }

  #[test]
  fn unknown_attribute_names_are_rejected() {
    let parsed = serde_json::from_value::<ClaimsMapper>(json!({ "sub": "nope" }));
    assert!(parsed.is_err());
  }

  #[test]
  fn non_string_values_are_skipped() {
    let user = ClaimsMapper::default().map(&claims(json!({ "sub": 42, "email": null })));
    assert_eq!(user.user_id, None);
    assert_eq!(user.email, None);
  }

  #[test]
  fn bare_role_arrays_are_accepted() {
    assert_eq!(role_names(&json!(["admin"])), ["admin"]);
    assert!(role_names(&json!("admin")).is_empty());
  }
}
