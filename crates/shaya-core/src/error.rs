//! Error types for `shaya-core`.

use thiserror::Error;

use crate::{entity::UniqueField, validate::ValidationError};

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("{0} already exists")]
  Conflict(UniqueField),

  /// A storage-level constraint violation that maps to no known field.
  #[error("database integrity error: {0}")]
  Integrity(String),

  /// Carries the entity's display name, e.g. `"Customer"`.
  #[error("{0} not found")]
  NotFound(&'static str),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
