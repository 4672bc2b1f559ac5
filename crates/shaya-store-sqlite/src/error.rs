//! Error type for `shaya-store-sqlite`.

use rusqlite::ErrorCode;
use shaya_core::entity::UniqueField;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column holds a value the domain model does not accept.
  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Constraint violations become domain errors; `UNIQUE` failures on a known
/// column map back to the field's conflict.
impl From<Error> for shaya_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(failure, Some(message)),
      )) if failure.code == ErrorCode::ConstraintViolation => {
        constraint_error(message)
      }
      other => shaya_core::Error::Store(Box::new(other)),
    }
  }
}

fn constraint_error(message: String) -> shaya_core::Error {
  let field = message
    .strip_prefix("UNIQUE constraint failed: ")
    .and_then(unique_field);
  match field {
    Some(field) => shaya_core::Error::Conflict(field),
    None => shaya_core::Error::Integrity(message),
  }
}

fn unique_field(column: &str) -> Option<UniqueField> {
  match column {
    "users.username" => Some(UniqueField::Username),
    "persons.document" => Some(UniqueField::Document),
    "persons.email" => Some(UniqueField::Email),
    "farmers.farm_name" => Some(UniqueField::FarmName),
    "farmers.farm_location" => Some(UniqueField::FarmLocation),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn constraint(message: &str) -> Error {
    Error::Database(tokio_rusqlite::Error::Rusqlite(
      rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE),
        Some(message.to_owned()),
      ),
    ))
  }

  #[test]
  fn unique_violation_maps_to_conflict() {
    let err: shaya_core::Error =
      constraint("UNIQUE constraint failed: persons.email").into();
    assert!(matches!(err, shaya_core::Error::Conflict(UniqueField::Email)));
  }

  #[test]
  fn unknown_constraint_is_integrity() {
    let err: shaya_core::Error =
      constraint("UNIQUE constraint failed: users.person_id").into();
    assert!(matches!(err, shaya_core::Error::Integrity(_)));
  }

  #[test]
  fn other_errors_are_store_errors() {
    let err: shaya_core::Error = Error::Decode("bad role".into()).into();
    assert!(matches!(err, shaya_core::Error::Store(_)));
  }
}
