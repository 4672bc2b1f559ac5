//! The entity service: create, read, search, update and delete one kind of
//! role entity through any backend that implements [`EntityStore`].

use std::marker::PhantomData;

use crate::{
  Error, Result,
  entity::RoleEntity,
  guard::{self, OwnerIds},
  store::{EntityStore, SearchQuery, UniqueIndex},
};

/// Operations on role entity `E`, borrowed over a store for the duration of a
/// request.
pub struct EntityService<'a, S, E> {
  store:   &'a S,
  _entity: PhantomData<fn() -> E>,
}

impl<'a, S, E> EntityService<'a, S, E>
where
  S: EntityStore<E> + UniqueIndex,
  E: RoleEntity,
{
  pub fn new(store: &'a S) -> Self {
    Self { store, _entity: PhantomData }
  }

  /// Validate, normalise and guard `input`, then seal it and persist the
  /// person and the entity together. The first conflicting unique field is
  /// reported.
  pub async fn create(&self, input: E::New) -> Result<E> {
    let input = E::prepare(input)?;
    guard::check_all(self.store, &E::unique_values(&input), None).await?;
    let draft = E::seal(input)?;

    let entity = self.store.insert(draft).await.map_err(Into::<Error>::into)?;
    tracing::info!(entity = E::NAME, id = entity.id(), "created");
    Ok(entity)
  }

  pub async fn get(&self, id: i64) -> Result<E> {
    self
      .store
      .get(id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or(Error::NotFound(E::NAME))
  }

  pub async fn list(&self) -> Result<Vec<E>> {
    self.store.list().await.map_err(Into::into)
  }

  /// Filtered search; an empty query lists everything.
  pub async fn search(&self, query: &SearchQuery) -> Result<Vec<E>> {
    if query.is_empty() {
      return self.list().await;
    }
    self.store.search(query).await.map_err(Into::into)
  }

  /// Apply a partial update. Unique fields in the patch are checked against
  /// every record except this aggregate's own.
  pub async fn update(&self, id: i64, patch: E::Patch) -> Result<E> {
    let current = self.get(id).await?;
    let patch = E::prepare_patch(patch)?;

    let ids = OwnerIds { entity: current.id(), person: current.person().id };
    guard::check_all(self.store, &E::changed_unique_values(&patch), Some(ids))
      .await?;
    let changes = E::seal_patch(patch)?;

    let updated = self
      .store
      .update(id, changes)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or(Error::NotFound(E::NAME))?;
    tracing::info!(entity = E::NAME, id, "updated");
    Ok(updated)
  }

  /// Remove the aggregate. Returns `false` when `id` does not exist.
  pub async fn delete(&self, id: i64) -> Result<bool> {
    let deleted = self.store.delete(id).await.map_err(Into::<Error>::into)?;
    if deleted {
      tracing::info!(entity = E::NAME, id, "deleted");
    }
    Ok(deleted)
  }

  /// Best-effort bulk create. Items that fail are logged and skipped; only
  /// the created aggregates are returned, in input order.
  pub async fn create_bulk(&self, items: Vec<E::New>) -> Vec<E> {
    let total = items.len();
    let mut created = Vec::with_capacity(total);

    for item in items {
      let label = E::label(&item).to_owned();
      match self.create(item).await {
        Ok(entity) => created.push(entity),
        Err(error) => {
          tracing::warn!(entity = E::NAME, item = %label, %error, "skipped bulk item");
        }
      }
    }

    tracing::info!(
      entity = E::NAME,
      total,
      created = created.len(),
      "bulk create finished"
    );
    created
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use serde::Serialize;

  use super::*;
  use crate::{
    entity::UniqueField,
    person::Person,
    store::Store,
  };

  static SEALED: AtomicUsize = AtomicUsize::new(0);

  /// An entity whose sealing step is counted.
  #[derive(Debug, Serialize)]
  struct Badge {
    id:     i64,
    person: Person,
  }

  impl RoleEntity for Badge {
    const NAME: &'static str = "Badge";

    type New = String;
    type Patch = String;
    type Draft = String;
    type Changes = String;

    fn id(&self) -> i64 { self.id }

    fn person(&self) -> &Person { &self.person }

    fn prepare(input: String) -> Result<String> { Ok(input) }

    fn prepare_patch(patch: String) -> Result<String> { Ok(patch) }

    fn unique_values(input: &String) -> Vec<(UniqueField, &str)> {
      vec![(UniqueField::Document, input.as_str())]
    }

    fn changed_unique_values(patch: &String) -> Vec<(UniqueField, &str)> {
      vec![(UniqueField::Document, patch.as_str())]
    }

    fn seal(input: String) -> Result<String> {
      SEALED.fetch_add(1, Ordering::SeqCst);
      Ok(input)
    }

    fn seal_patch(patch: String) -> Result<String> {
      SEALED.fetch_add(1, Ordering::SeqCst);
      Ok(patch)
    }

    fn label(input: &String) -> &str { input }
  }

  /// Every unique value is already taken.
  struct FullStore;

  impl Store for FullStore {
    type Error = Error;
  }

  impl UniqueIndex for FullStore {
    async fn is_taken(&self, _: UniqueField, _: &str, _: Option<i64>) -> Result<bool> { Ok(true) }
  }

  impl EntityStore<Badge> for FullStore {
    async fn insert(&self, _: String) -> Result<Badge> { unimplemented!() }
    async fn get(&self, _: i64) -> Result<Option<Badge>> { unimplemented!() }
    async fn list(&self) -> Result<Vec<Badge>> { unimplemented!() }
    async fn search(&self, _: &SearchQuery) -> Result<Vec<Badge>> { unimplemented!() }
    async fn update(&self, _: i64, _: String) -> Result<Option<Badge>> { unimplemented!() }
    async fn delete(&self, _: i64) -> Result<bool> { unimplemented!() }
  }

  #[tokio::test]
  async fn conflicting_items_are_never_sealed() {
    let service = EntityService::<_, Badge>::new(&FullStore);

    let err = service.create("1234567".into()).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(UniqueField::Document)));

    let created = service.create_bulk(vec!["7654321".into(), "1111111".into()]).await;
    assert!(created.is_empty());
    assert_eq!(SEALED.load(Ordering::SeqCst), 0);
  }
}
