//! [`SqliteStore`]: the SQLite implementation of the `shaya-core` store
//! traits.

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params, params_from_iter};

use shaya_core::{
  customer::Customer,
  entity::{RoleEntity, UniqueField},
  farmer::Farmer,
  store::{CredentialStore, EntityStore, SearchQuery, Store, UniqueIndex},
  user::User,
};

use crate::{
  Error, Result,
  encode::{encode_dt, like_pattern},
  entity::{SqlEntity, read_row, select_sql},
  schema::{FOLD_FN, SCHEMA, register_functions},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Shaya store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
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
        register_functions(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Generic aggregate operations ──────────────────────────────────────

  async fn insert_entity<E: SqlEntity>(&self, draft: E::Draft) -> Result<E> {
    let created_at = encode_dt(Utc::now());
    let select = select_sql::<E>("WHERE e.id = ?1");

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let person = E::person_input(&draft);
        tx.execute(
          "INSERT INTO persons (
             full_name, document, phone, email, observation, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![
            person.full_name,
            person.document,
            person.phone,
            person.email,
            person.observation,
            created_at,
          ],
        )?;
        let person_id = tx.last_insert_rowid();
        let id = E::insert_row(&tx, person_id, &draft)?;

        let raw = tx.query_row(&select, [id], read_row::<E>)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_entity::<E>()
  }

  async fn get_entity<E: SqlEntity>(&self, id: i64) -> Result<Option<E>> {
    let select = select_sql::<E>("WHERE e.id = ?1");

    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&select, [id], read_row::<E>).optional()?)
      })
      .await?;

    raw.map(|raw| raw.into_entity::<E>()).transpose()
  }

  async fn list_entities<E: SqlEntity>(&self) -> Result<Vec<E>> {
    let select = select_sql::<E>("ORDER BY e.id DESC");

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&select)?;
        let rows = stmt
          .query_map([], read_row::<E>)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|raw| raw.into_entity::<E>()).collect()
  }

  async fn search_entities<E: SqlEntity>(
    &self,
    query: &SearchQuery,
  ) -> Result<Vec<E>> {
    // Build WHERE clause dynamically; placeholders are numbered as pushed.
    let mut conds: Vec<String> = vec![];
    let mut args: Vec<String> = vec![];

    if let Some(text) = query.text.as_deref().filter(|t| !t.is_empty()) {
      args.push(like_pattern(&text.to_lowercase()));
      let n = args.len();
      let any = E::SEARCH_COLUMNS
        .iter()
        .map(|column| format!("{FOLD_FN}({column}) LIKE ?{n} ESCAPE '\\'"))
        .collect::<Vec<_>>()
        .join(" OR ");
      conds.push(format!("({any})"));
    }
    if let (Some(role), Some(column)) = (query.role, E::ROLE_COLUMN) {
      args.push(role.as_str().to_owned());
      conds.push(format!("{column} = ?{}", args.len()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    let select = select_sql::<E>(&format!(
      "{where_clause} ORDER BY {FOLD_FN}(p.full_name) ASC, e.id ASC"
    ));

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&select)?;
        let rows = stmt
          .query_map(params_from_iter(args), read_row::<E>)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|raw| raw.into_entity::<E>()).collect()
  }

  async fn update_entity<E: SqlEntity>(
    &self,
    id: i64,
    changes: E::Changes,
  ) -> Result<Option<E>> {
    let owner = format!("SELECT person_id FROM {} WHERE id = ?1", E::TABLE);
    let select = select_sql::<E>("WHERE e.id = ?1");

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let person_id: Option<i64> =
          tx.query_row(&owner, [id], |r| r.get(0)).optional()?;
        let Some(person_id) = person_id else {
          return Ok(None);
        };

        E::apply_changes(&tx, id, &changes)?;

        // A supplied person replaces every person field.
        if let Some(person) = E::changed_person(&changes) {
          tx.execute(
            "UPDATE persons SET
               full_name   = ?1,
               document    = ?2,
               phone       = ?3,
               email       = ?4,
               observation = ?5
             WHERE id = ?6",
            params![
              person.full_name,
              person.document,
              person.phone,
              person.email,
              person.observation,
              person_id,
            ],
          )?;
        }

        let raw = tx.query_row(&select, [id], read_row::<E>)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(|raw| raw.into_entity::<E>()).transpose()
  }

  async fn delete_entity<E: SqlEntity>(&self, id: i64) -> Result<bool> {
    let owner = format!("SELECT person_id FROM {} WHERE id = ?1", E::TABLE);
    let delete = format!("DELETE FROM {} WHERE id = ?1", E::TABLE);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let person_id: Option<i64> =
          tx.query_row(&owner, [id], |r| r.get(0)).optional()?;
        let Some(person_id) = person_id else {
          return Ok(false);
        };

        // Person first, then the owning row; the foreign key is checked at
        // commit.
        tx.execute("DELETE FROM persons WHERE id = ?1", [person_id])?;
        tx.execute(&delete, [id])?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(deleted)
  }
}

// ─── Store trait impls ───────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;
}

macro_rules! entity_store {
  ($($entity:ty),+ $(,)?) => {$(
    impl EntityStore<$entity> for SqliteStore {
      async fn insert(
        &self,
        draft: <$entity as RoleEntity>::Draft,
      ) -> Result<$entity> {
        self.insert_entity(draft).await
      }

      async fn get(&self, id: i64) -> Result<Option<$entity>> {
        self.get_entity(id).await
      }

      async fn list(&self) -> Result<Vec<$entity>> {
        self.list_entities().await
      }

      async fn search(&self, query: &SearchQuery) -> Result<Vec<$entity>> {
        self.search_entities(query).await
      }

      async fn update(
        &self,
        id: i64,
        changes: <$entity as RoleEntity>::Changes,
      ) -> Result<Option<$entity>> {
        self.update_entity(id, changes).await
      }

      async fn delete(&self, id: i64) -> Result<bool> {
        self.delete_entity::<$entity>(id).await
      }
    }
  )+};
}

entity_store!(User, Customer, Farmer);

/// Table and column holding each unique field.
fn unique_column(field: UniqueField) -> (&'static str, &'static str) {
  match field {
    UniqueField::Username => ("users", "username"),
    UniqueField::Document => ("persons", "document"),
    UniqueField::Email => ("persons", "email"),
    UniqueField::FarmName => ("farmers", "farm_name"),
    UniqueField::FarmLocation => ("farmers", "farm_location"),
  }
}

impl UniqueIndex for SqliteStore {
  async fn is_taken(
    &self,
    field: UniqueField,
    value: &str,
    exclude: Option<i64>,
  ) -> Result<bool> {
    let (table, column) = unique_column(field);
    let sql = format!(
      "SELECT EXISTS (
         SELECT 1 FROM {table}
         WHERE {column} = ?1 AND (?2 IS NULL OR id != ?2)
       )"
    );
    let value = value.to_owned();

    let taken: bool = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, params![value, exclude], |r| r.get(0))?)
      })
      .await?;
    Ok(taken)
  }
}

impl CredentialStore for SqliteStore {
  async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
    let select = select_sql::<User>("WHERE e.username = ?1");
    let username = username.to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&select, [username], read_row::<User>).optional()?)
      })
      .await?;

    raw.map(|raw| raw.into_entity::<User>()).transpose()
  }
}
