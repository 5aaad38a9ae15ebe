//! Claims resolution: turning an authenticated identity into exactly one
//! [`IdentityProfile`].
//!
//! Each profile field is resolved independently from the first source that
//! has a non-empty value for it. Sources are consulted in this order:
//!
//! 1. the manually decoded token claims passed in alongside the user object,
//! 2. the `manual_claims` attached to the user object,
//! 3. the user object's own attributes.
//!
//! The token is preferred for identity fields because some authentication
//! layers drop the subject from the object they inject, while the object may
//! still carry attributes the token lacks (a provider-synthesised display
//! name, for instance).

use serde_json::Value;

use crate::{
  Error, Result,
  claims::{AuthenticatedIdentity, MiddlewareUser, TokenClaims, keys},
  profile::IdentityProfile,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  SubjectId,
  Email,
  FullName,
  Username,
  PhoneNumber,
}

impl Field {
  fn claim_key(self) -> &'static str {
    match self {
      Field::SubjectId => keys::SUB,
      Field::Email => keys::EMAIL,
      Field::FullName => keys::NAME,
      Field::Username => keys::PREFERRED_USERNAME,
      Field::PhoneNumber => keys::PHONE_NUMBER,
    }
  }
}

/// One place a profile field can come from.
#[derive(Clone, Copy)]
enum Source<'a> {
  Claims(&'a TokenClaims),
  User(&'a MiddlewareUser),
}

impl<'a> Source<'a> {
  fn text(self, field: Field) -> Option<&'a str> {
    match self {
      Source::Claims(claims) => claims.get_str(field.claim_key()),
      Source::User(user) => match field {
        Field::SubjectId => non_empty(&user.user_id).or_else(|| non_empty(&user.identity)),
        Field::Email => non_empty(&user.email),
        Field::FullName => {
          non_empty(&user.full_name).or_else(|| non_empty(&user.display_name))
        }
        Field::Username => non_empty(&user.username),
        Field::PhoneNumber => non_empty(&user.phone_number),
      },
    }
  }

  fn address(self) -> Option<&'a Value> {
    let raw = match self {
      Source::Claims(claims) => claims.get(keys::ADDRESS),
      Source::User(user) => user.address.as_ref(),
    };
    raw.filter(|v| !v.is_null() && v.as_str() != Some(""))
  }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|s| !s.is_empty())
}

fn sources<'a>(
  user: Option<&'a MiddlewareUser>,
  claims: &'a TokenClaims,
) -> Vec<Source<'a>> {
  let mut sources = vec![Source::Claims(claims)];
  if let Some(user) = user {
    if let Some(manual) = &user.manual_claims {
      sources.push(Source::Claims(manual));
    }
    sources.push(Source::User(user));
  }
  sources
}

/// Resolve a canonical profile from the authentication layer's output.
///
/// Fails with [`Error::IdentityMissing`] when no source yields a subject
/// identifier. Missing non-identity fields never fail; they resolve to
/// `None`.
pub fn resolve(
  user: Option<&MiddlewareUser>,
  claims: &TokenClaims,
) -> Result<IdentityProfile> {
  let sources = sources(user, claims);
  let pick = |field: Field| {
    sources
      .iter()
      .find_map(|s| s.text(field))
      .map(str::to_owned)
  };

  let subject_id = pick(Field::SubjectId).ok_or(Error::IdentityMissing)?;
  let address = sources
    .iter()
    .find_map(|s| s.address())
    .and_then(normalize_address);

  Ok(IdentityProfile {
    subject_id,
    email: pick(Field::Email),
    full_name: pick(Field::FullName),
    username: pick(Field::Username),
    phone_number: pick(Field::PhoneNumber),
    address,
  })
}

impl AuthenticatedIdentity {
  pub fn resolve(&self) -> Result<IdentityProfile> {
    resolve(self.user.as_ref(), &self.claims)
  }
}

/// Collapse an address claim into one display string.
///
/// Structured addresses (OIDC `address` claims) use their `formatted` member
/// when present, and fall back to the compact JSON rendering of the whole
/// object otherwise.
pub fn normalize_address(value: &Value) -> Option<String> {
  match value {
    Value::Null => None,
    Value::String(s) if s.is_empty() => None,
    Value::String(s) => Some(s.clone()),
    Value::Object(map) => match map.get("formatted").and_then(Value::as_str) {
      Some(formatted) if !formatted.is_empty() => Some(formatted.to_owned()),
      _ => Some(value.to_string()),
    },
    other => Some(other.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn claims(value: Value) -> TokenClaims {
    serde_json::from_value(value).expect("claims object")
  }

  fn full_user() -> MiddlewareUser {
    MiddlewareUser {
      user_id:      Some("user-id".into()),
      identity:     Some("identity".into()),
      email:        Some("b@x.com".into()),
      full_name:    Some("User Name".into()),
      display_name: Some("Display".into()),
      username:     Some("uname".into()),
      phone_number: Some("555-0100".into()),
      address:      Some(json!("1 User Rd")),
      ..Default::default()
    }
  }

  // ── Precedence ──────────────────────────────────────────────────────────

  #[test]
  fn claims_win_over_user_per_field() {
    let user = full_user();
    let c = claims(json!({ "sub": "u1", "email": "a@x.com" }));

    let p = resolve(Some(&user), &c).unwrap();
    assert_eq!(p.subject_id, "u1");
    assert_eq!(p.email.as_deref(), Some("a@x.com"));
    // Fields the token lacks still come from the user object.
    assert_eq!(p.full_name.as_deref(), Some("User Name"));
    assert_eq!(p.username.as_deref(), Some("uname"));
    assert_eq!(p.phone_number.as_deref(), Some("555-0100"));
    assert_eq!(p.address.as_deref(), Some("1 User Rd"));
  }

  #[test]
  fn every_claim_overrides_its_user_attribute() {
    let user = full_user();
    let c = claims(json!({
      "sub": "s",
      "email": "e@x.com",
      "name": "N",
      "preferred_username": "p",
      "phone_number": "1",
      "address": "A",
    }));

    let p = resolve(Some(&user), &c).unwrap();
    assert_eq!(
      p,
      IdentityProfile {
        subject_id:   "s".into(),
        email:        Some("e@x.com".into()),
        full_name:    Some("N".into()),
        username:     Some("p".into()),
        phone_number: Some("1".into()),
        address:      Some("A".into()),
      }
    );
  }

  #[test]
  fn subject_falls_back_to_user_id_then_identity() {
    let mut user = full_user();
    let p = resolve(Some(&user), &TokenClaims::new()).unwrap();
    assert_eq!(p.subject_id, "user-id");

    user.user_id = Some(String::new());
    let p = resolve(Some(&user), &TokenClaims::new()).unwrap();
    assert_eq!(p.subject_id, "identity");
  }

  #[test]
  fn full_name_falls_back_to_display_name() {
    let user = MiddlewareUser {
      user_id: Some("u1".into()),
      display_name: Some("Display".into()),
      ..Default::default()
    };
    let p = resolve(Some(&user), &TokenClaims::new()).unwrap();
    assert_eq!(p.full_name.as_deref(), Some("Display"));
  }

  #[test]
  fn empty_claim_values_do_not_shadow_user_values() {
    let user = full_user();
    let c = claims(json!({ "sub": "", "email": "", "address": "" }));

    let p = resolve(Some(&user), &c).unwrap();
    assert_eq!(p.subject_id, "user-id");
    assert_eq!(p.email.as_deref(), Some("b@x.com"));
    assert_eq!(p.address.as_deref(), Some("1 User Rd"));
  }

  #[test]
  fn attached_manual_claims_rank_between_token_and_user() {
    let user = MiddlewareUser {
      manual_claims: Some(claims(json!({ "sub": "manual", "email": "m@x.com" }))),
      ..full_user()
    };

    let p = resolve(Some(&user), &TokenClaims::new()).unwrap();
    assert_eq!(p.subject_id, "manual");
    assert_eq!(p.email.as_deref(), Some("m@x.com"));

    let p = resolve(Some(&user), &claims(json!({ "email": "t@x.com" }))).unwrap();
    assert_eq!(p.subject_id, "manual");
    assert_eq!(p.email.as_deref(), Some("t@x.com"));
  }

  #[test]
  fn claims_alone_are_enough() {
    let c = claims(json!({ "sub": "u1", "name": "Ada" }));
    let p = resolve(None, &c).unwrap();
    assert_eq!(p.subject_id, "u1");
    assert_eq!(p.full_name.as_deref(), Some("Ada"));
    assert_eq!(p.email, None);
    assert_eq!(p.address, None);
  }

  // ── Identity missing ────────────────────────────────────────────────────

  #[test]
  fn nothing_at_all_is_identity_missing() {
    let err = resolve(None, &TokenClaims::new()).unwrap_err();
    assert!(matches!(err, Error::IdentityMissing));
  }

  #[test]
  fn user_without_any_subject_is_identity_missing() {
    let user = MiddlewareUser {
      email: Some("a@x.com".into()),
      identity: Some(String::new()),
      ..Default::default()
    };
    let c = claims(json!({ "sub": null, "name": "Ada" }));
    assert!(matches!(resolve(Some(&user), &c), Err(Error::IdentityMissing)));
  }

  #[test]
  fn non_string_sub_is_ignored() {
    let c = claims(json!({ "sub": 12345 }));
    assert!(matches!(resolve(None, &c), Err(Error::IdentityMissing)));
  }

  #[test]
  fn authenticated_identity_resolves_through_both_sources() {
    let identity = AuthenticatedIdentity::new(
      Some(full_user()),
      claims(json!({ "sub": "u1" })),
    );
    let p = identity.resolve().unwrap();
    assert_eq!(p.subject_id, "u1");
    assert_eq!(p.email.as_deref(), Some("b@x.com"));
  }

  // ── Address normalisation ───────────────────────────────────────────────

  #[test]
  fn formatted_address_is_extracted() {
    let v = json!({ "formatted": "123 Main St", "locality": "Springfield" });
    assert_eq!(normalize_address(&v).as_deref(), Some("123 Main St"));
  }

  #[test]
  fn address_without_formatted_renders_whole_object() {
    let v = json!({ "city": "X" });
    assert_eq!(normalize_address(&v).as_deref(), Some(r#"{"city":"X"}"#));
  }

  #[test]
  fn plain_string_address_is_unchanged() {
    assert_eq!(
      normalize_address(&json!("456 Oak Ave")).as_deref(),
      Some("456 Oak Ave")
    );
  }

  #[test]
  fn null_or_empty_address_is_absent() {
    assert_eq!(normalize_address(&Value::Null), None);
    assert_eq!(normalize_address(&json!("")), None);
  }

  #[test]
  fn structured_address_claim_flows_into_profile() {
    let c = claims(json!({
      "sub": "u1",
      "address": { "formatted": "123 Main St" },
    }));
    let p = resolve(None, &c).unwrap();
    assert_eq!(p.address.as_deref(), Some("123 Main St"));
  }

  #[test]
  fn null_address_claim_falls_through_to_user() {
    let c = claims(json!({ "sub": "u1", "address": null }));
    let p = resolve(Some(&full_user()), &c).unwrap();
    assert_eq!(p.address.as_deref(), Some("1 User Rd"));
  }
}
