//! Store traits and supporting query types.
//!
//! Implemented by storage backends (e.g. `shaya-store-sqlite`). The services
//! in this crate and the HTTP layer depend on these abstractions, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  customer::Customer,
  entity::{RoleEntity, UniqueField},
  farmer::Farmer,
  user::{Role, User},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`EntityStore::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
  /// Case-insensitive substring matched against the entity's search columns.
  pub text: Option<String>,
  /// Exact role filter. Only meaningful for users; other entities ignore it.
  pub role: Option<Role>,
}

impl SearchQuery {
  pub fn text(text: impl Into<String>) -> Self {
    Self { text: Some(text.into()), role: None }
  }

  /// `true` when neither filter is set, so the search is a plain listing.
  pub fn is_empty(&self) -> bool {
    self.text.as_deref().is_none_or(str::is_empty) && self.role.is_none()
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Shared error type of a storage backend.
///
/// All store methods return `Send` futures so the traits can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Store: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;
}

/// Lookup of unique values, backing the uniqueness guard.
pub trait UniqueIndex: Store {
  /// `true` when some record other than `exclude` already holds `value` in
  /// `field`. `exclude` is a person id for person fields and an entity id for
  /// entity fields.
  fn is_taken<'a>(
    &'a self,
    field: UniqueField,
    value: &'a str,
    exclude: Option<i64>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

/// Persistence of one role entity together with the person it owns. Every
/// method is a single transaction.
pub trait EntityStore<E: RoleEntity>: Store {
  /// Insert the person and the entity, returning the stored aggregate.
  fn insert(
    &self,
    draft: E::Draft,
  ) -> impl Future<Output = Result<E, Self::Error>> + Send + '_;

  /// Retrieve an aggregate by entity id. Returns `None` if not found.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<E>, Self::Error>> + Send + '_;

  /// All aggregates, newest first.
  fn list(&self) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + '_;

  /// Aggregates matching `query`, ordered by the person's full name.
  fn search<'a>(
    &'a self,
    query: &'a SearchQuery,
  ) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + 'a;

  /// Apply `changes` and return the updated aggregate, or `None` if `id` does
  /// not exist.
  fn update(
    &self,
    id: i64,
    changes: E::Changes,
  ) -> impl Future<Output = Result<Option<E>, Self::Error>> + Send + '_;

  /// Remove the aggregate (person first, then entity). Returns `false` when
  /// `id` does not exist.
  fn delete(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

/// Credential lookup for authentication.
pub trait CredentialStore: Store {
  fn find_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;
}

/// Everything the HTTP layer needs from a backend.
pub trait AdminStore:
  EntityStore<User>
  + EntityStore<Customer>
  + EntityStore<Farmer>
  + UniqueIndex
  + CredentialStore
{
}

impl<T> AdminStore for T where
  T: EntityStore<User>
    + EntityStore<Customer>
    + EntityStore<Farmer>
    + UniqueIndex
    + CredentialStore
{
}
