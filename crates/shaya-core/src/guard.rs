//! Uniqueness guard: rejects a write whose unique values are already held by
//! another record.
//!
//! The store's own `UNIQUE` constraints still back every field; the guard
//! exists so the client sees the first conflicting field in a stable order.

use crate::{
  Error, Result,
  entity::{Owner, UniqueField},
  store::UniqueIndex,
};

/// Fail with [`Error::Conflict`] if `value` is already held in `field` by a
/// record other than `exclude`.
pub async fn check_unique<S: UniqueIndex>(
  store: &S,
  field: UniqueField,
  value: &str,
  exclude: Option<i64>,
) -> Result<()> {
  let taken = store
    .is_taken(field, value, exclude)
    .await
    .map_err(Into::<Error>::into)?;
  if taken {
    tracing::debug!(%field, "unique value already taken");
    return Err(Error::Conflict(field));
  }
  Ok(())
}

/// Run [`check_unique`] over `values` in order, stopping at the first
/// conflict.
///
/// `owner_ids` gives the record to exclude for each kind of field: the
/// aggregate's person id for person fields, its entity id for entity fields.
/// Pass `None` when creating.
pub async fn check_all<S: UniqueIndex>(
  store: &S,
  values: &[(UniqueField, &str)],
  owner_ids: Option<OwnerIds>,
) -> Result<()> {
  for &(field, value) in values {
    let exclude = owner_ids.map(|ids| ids.for_field(field));
    check_unique(store, field, value, exclude).await?;
  }
  Ok(())
}

/// The ids of an existing aggregate.
#[derive(Debug, Clone, Copy)]
pub struct OwnerIds {
  pub entity: i64,
  pub person: i64,
}

impl OwnerIds {
  fn for_field(self, field: UniqueField) -> i64 {
    match field.owner() {
      Owner::Person => self.person,
      Owner::Entity => self.entity,
    }
  }
}
