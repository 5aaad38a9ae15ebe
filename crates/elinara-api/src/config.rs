//! Runtime server configuration.
//!
//! Layered as: built-in defaults, then an optional TOML file, then
//! `ELINARA_*` environment variables (e.g. `ELINARA_PORT=9000`,
//! `ELINARA_CORS_ORIGINS=https://a.example,https://b.example`).

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::mapper::ClaimsMapper;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  /// Shown by the welcome endpoint.
  pub project_name:  String,
  pub host:          String,
  pub port:          u16,
  pub database_path: PathBuf,
  /// Allowed CORS origins. Empty allows any origin.
  #[serde(default)]
  pub cors_origins:  Vec<String>,
  /// Which token claim feeds which attribute of the middleware user.
  #[serde(default)]
  pub claims_mapper: ClaimsMapper,
}

impl ServerConfig {
  /// Load configuration, treating a missing file at `path` as empty.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Config::builder()
      .set_default("project_name", "Elinara Auth Backend")?
      .set_default("host", "0.0.0.0")?
      .set_default("port", 8000_i64)?
      .set_default("database_path", "./data/users.db")?
      .add_source(File::from(path).required(false))
      .add_source(
        Environment::with_prefix("ELINARA")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins"),
      )
      .build()?
      .try_deserialize()
  }

  /// `database_path` with a leading `~` expanded to the user's home
  /// directory.
  pub fn resolved_database_path(&self) -> PathBuf {
    expand_tilde(&self.database_path)
  }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
