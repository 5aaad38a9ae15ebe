//! The closed set of realm roles the service understands.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
  Admin,
  User,
}

/// Returned for role names outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl FromStr for Role {
  type Err = UnknownRole;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "admin" => Ok(Role::Admin),
      "user" => Ok(Role::User),
      other => Err(UnknownRole(other.to_owned())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_known_roles_exactly() {
    assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
    assert_eq!("user".parse::<Role>(), Ok(Role::User));
    assert_eq!("Admin".parse::<Role>(), Err(UnknownRole("Admin".into())));
  }
}
