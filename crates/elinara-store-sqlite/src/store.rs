//! [`SqliteStore`] — the SQLite implementation of [`ProfileStore`].

use std::path::Path;

use elinara_core::{
  profile::{IdentityProfile, StoredUser},
  store::{InsertOutcome, ProfileStore},
};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
  Result,
  schema::{SCHEMA, USER_COLUMNS},
};

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredUser> {
  Ok(StoredUser {
    id:           row.get(0)?,
    subject_id:   row.get(1)?,
    email:        row.get(2)?,
    full_name:    row.get(3)?,
    username:     row.get(4)?,
    phone_number: row.get(5)?,
    address:      row.get(6)?,
  })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.code == rusqlite::ErrorCode::ConstraintViolation
        && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

/// Owned copy of the mutable columns, movable into a connection closure.
struct Columns {
  subject_id:   String,
  email:        Option<String>,
  full_name:    Option<String>,
  username:     Option<String>,
  phone_number: Option<String>,
  address:      Option<String>,
}

impl From<&IdentityProfile> for Columns {
  fn from(p: &IdentityProfile) -> Self {
    Self {
      subject_id:   p.subject_id.clone(),
      email:        p.email.clone(),
      full_name:    p.full_name.clone(),
      username:     p.username.clone(),
      phone_number: p.phone_number.clone(),
      address:      p.address.clone(),
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A profile store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every call
/// runs on the connection's own thread, one at a time, and each write is a
/// single autocommitted statement or an explicit transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, creating missing parent
  /// directories, and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(dir).await?;
    }
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ProfileStore impl ───────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  type Error = crate::Error;

  async fn list_users(&self) -> Result<Vec<StoredUser>> {
    let users = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
        let rows = stmt
          .query_map([], user_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(users)
  }

  async fn find_by_subject(&self, subject_id: &str) -> Result<Option<StoredUser>> {
    let subject_id = subject_id.to_owned();

    let user = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE subject_id = ?1"),
            rusqlite::params![subject_id],
            user_from_row,
          )
          .optional()?)
      })
      .await?;
    Ok(user)
  }

  async fn insert_user(&self, profile: &IdentityProfile) -> Result<InsertOutcome> {
    let c = Columns::from(profile);

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO users (subject_id, email, full_name, username, phone_number, address)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            c.subject_id,
            c.email,
            c.full_name,
            c.username,
            c.phone_number,
            c.address,
          ],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(match id {
      Some(id) => InsertOutcome::Inserted(StoredUser::from_profile(id, profile)),
      None => {
        debug!(subject_id = %profile.subject_id, "insert hit unique constraint");
        InsertOutcome::Conflict
      }
    })
  }

  async fn update_user(&self, profile: &IdentityProfile) -> Result<Option<StoredUser>> {
    let c = Columns::from(profile);

    let user = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE users
           SET email = ?2, full_name = ?3, username = ?4, phone_number = ?5, address = ?6
           WHERE subject_id = ?1",
          rusqlite::params![
            c.subject_id,
            c.email,
            c.full_name,
            c.username,
            c.phone_number,
            c.address,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let user = tx.query_row(
          &format!("SELECT {USER_COLUMNS} FROM users WHERE subject_id = ?1"),
          rusqlite::params![c.subject_id],
          user_from_row,
        )?;
        tx.commit()?;
        Ok(Some(user))
      })
      .await?;
    Ok(user)
  }

  async fn delete_by_email(&self, email: &str) -> Result<usize> {
    let email = email.to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE email = ?1",
          rusqlite::params![email],
        )?)
      })
      .await?;
    Ok(deleted)
  }
}
