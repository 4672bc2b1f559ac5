//! Per-entity SQL: table names, column lists and the row reads and writes that
//! differ between users, customers and farmers.
//!
//! Every role table is read joined with `persons`:
//! `e.id`, then [`PERSON_COLUMNS`], then the entity's own [`SqlEntity::COLUMNS`].

use rusqlite::{Connection, Row, params};
use shaya_core::{
  customer::{Customer, CustomerPatch, NewCustomer},
  entity::RoleEntity,
  farmer::{Farmer, FarmerPatch, NewFarmer},
  person::{Person, PersonInput},
  user::{User, UserChanges, UserDraft},
};

use crate::{
  Result,
  encode::{PERSON_COLUMN_COUNT, PERSON_COLUMNS, RawPerson, decode_role},
};

/// Offset of the first entity column in a joined row.
const ENTITY_OFFSET: usize = 1 + PERSON_COLUMN_COUNT;

pub trait SqlEntity: RoleEntity {
  const TABLE: &'static str;
  /// Entity columns after the person columns; never `id` or `person_id`.
  const COLUMNS: &'static str;
  /// Columns matched by free-text search.
  const SEARCH_COLUMNS: &'static [&'static str];
  /// Column matched by the search role filter, if the entity has one.
  const ROLE_COLUMN: Option<&'static str> = None;

  /// Entity columns as read, before decoding.
  type Raw: Send + 'static;

  fn read_raw(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self::Raw>;
  fn decode(id: i64, raw: Self::Raw, person: Person) -> Result<Self>;

  fn person_input(draft: &Self::Draft) -> &PersonInput;
  fn changed_person(changes: &Self::Changes) -> Option<&PersonInput>;

  /// Insert the entity row for an already inserted person; returns its id.
  fn insert_row(
    conn: &Connection,
    person_id: i64,
    draft: &Self::Draft,
  ) -> rusqlite::Result<i64>;

  /// Overwrite the entity columns present in `changes`.
  fn apply_changes(
    conn: &Connection,
    id: i64,
    changes: &Self::Changes,
  ) -> rusqlite::Result<()>;
}

// ─── Joined rows ─────────────────────────────────────────────────────────────

/// `SELECT` over the entity joined with its person, followed by `tail`.
pub fn select_sql<E: SqlEntity>(tail: &str) -> String {
  format!(
    "SELECT e.id, {PERSON_COLUMNS}, {columns}
     FROM {table} e
     JOIN persons p ON p.id = e.person_id
     {tail}",
    columns = E::COLUMNS,
    table = E::TABLE,
  )
}

pub struct RawRow<R> {
  id:     i64,
  person: RawPerson,
  entity: R,
}

pub fn read_row<E: SqlEntity>(row: &Row<'_>) -> rusqlite::Result<RawRow<E::Raw>> {
  Ok(RawRow {
    id:     row.get(0)?,
    person: RawPerson::read(row, 1)?,
    entity: E::read_raw(row, ENTITY_OFFSET)?,
  })
}

impl<R> RawRow<R> {
  pub fn into_entity<E: SqlEntity<Raw = R>>(self) -> Result<E> {
    E::decode(self.id, self.entity, self.person.into_person()?)
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

impl SqlEntity for User {
  const TABLE: &'static str = "users";
  const COLUMNS: &'static str = "e.username, e.hashed_password, e.role";
  const SEARCH_COLUMNS: &'static [&'static str] =
    &["e.username", "p.full_name", "p.email"];
  const ROLE_COLUMN: Option<&'static str> = Some("e.role");

  type Raw = (String, String, String);

  fn read_raw(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self::Raw> {
    Ok((row.get(offset)?, row.get(offset + 1)?, row.get(offset + 2)?))
  }

  fn decode(
    id: i64,
    (username, hashed_password, role): Self::Raw,
    person: Person,
  ) -> Result<Self> {
    Ok(User {
      id,
      username,
      hashed_password,
      role: decode_role(&role)?,
      person,
    })
  }

  fn person_input(draft: &UserDraft) -> &PersonInput { &draft.person }

  fn changed_person(changes: &UserChanges) -> Option<&PersonInput> {
    changes.person.as_ref()
  }

  fn insert_row(
    conn: &Connection,
    person_id: i64,
    draft: &UserDraft,
  ) -> rusqlite::Result<i64> {
    conn.execute(
      "INSERT INTO users (username, hashed_password, role, person_id)
       VALUES (?1, ?2, ?3, ?4)",
      params![
        draft.username,
        draft.hashed_password,
        draft.role.as_str(),
        person_id
      ],
    )?;
    Ok(conn.last_insert_rowid())
  }

  fn apply_changes(
    conn: &Connection,
    id: i64,
    changes: &UserChanges,
  ) -> rusqlite::Result<()> {
    conn.execute(
      "UPDATE users SET
         username        = COALESCE(?1, username),
         hashed_password = COALESCE(?2, hashed_password),
         role            = COALESCE(?3, role)
       WHERE id = ?4",
      params![
        changes.username,
        changes.hashed_password,
        changes.role.map(|r| r.as_str()),
        id
      ],
    )?;
    Ok(())
  }
}

// ─── Customers ───────────────────────────────────────────────────────────────

impl SqlEntity for Customer {
  const TABLE: &'static str = "customers";
  const COLUMNS: &'static str = "e.customer_type, e.address, e.city";
  const SEARCH_COLUMNS: &'static [&'static str] =
    &["p.full_name", "p.email", "e.address", "e.city"];

  type Raw = (String, String, String);

  fn read_raw(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self::Raw> {
    Ok((row.get(offset)?, row.get(offset + 1)?, row.get(offset + 2)?))
  }

  fn decode(
    id: i64,
    (customer_type, address, city): Self::Raw,
    person: Person,
  ) -> Result<Self> {
    Ok(Customer { id, customer_type, address, city, person })
  }

  fn person_input(draft: &NewCustomer) -> &PersonInput { &draft.person }

  fn changed_person(changes: &CustomerPatch) -> Option<&PersonInput> {
    changes.person.as_ref()
  }

  fn insert_row(
    conn: &Connection,
    person_id: i64,
    draft: &NewCustomer,
  ) -> rusqlite::Result<i64> {
    conn.execute(
      "INSERT INTO customers (customer_type, address, city, person_id)
       VALUES (?1, ?2, ?3, ?4)",
      params![draft.customer_type, draft.address, draft.city, person_id],
    )?;
    Ok(conn.last_insert_rowid())
  }

  fn apply_changes(
    conn: &Connection,
    id: i64,
    changes: &CustomerPatch,
  ) -> rusqlite::Result<()> {
    conn.execute(
      "UPDATE customers SET
         customer_type = COALESCE(?1, customer_type),
         address       = COALESCE(?2, address),
         city          = COALESCE(?3, city)
       WHERE id = ?4",
      params![changes.customer_type, changes.address, changes.city, id],
    )?;
    Ok(())
  }
}

// ─── Farmers ─────────────────────────────────────────────────────────────────

impl SqlEntity for Farmer {
  const TABLE: &'static str = "farmers";
  const COLUMNS: &'static str = "e.farm_name, e.farm_location";
  const SEARCH_COLUMNS: &'static [&'static str] = &["p.full_name", "p.email"];

  type Raw = (String, String);

  fn read_raw(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self::Raw> {
    Ok((row.get(offset)?, row.get(offset + 1)?))
  }

  fn decode(
    id: i64,
    (farm_name, farm_location): Self::Raw,
    person: Person,
  ) -> Result<Self> {
    Ok(Farmer { id, farm_name, farm_location, person })
  }

  fn person_input(draft: &NewFarmer) -> &PersonInput { &draft.person }

  fn changed_person(changes: &FarmerPatch) -> Option<&PersonInput> {
    changes.person.as_ref()
  }

  fn insert_row(
    conn: &Connection,
    person_id: i64,
    draft: &NewFarmer,
  ) -> rusqlite::Result<i64> {
    conn.execute(
      "INSERT INTO farmers (farm_name, farm_location, person_id)
       VALUES (?1, ?2, ?3)",
      params![draft.farm_name, draft.farm_location, person_id],
    )?;
    Ok(conn.last_insert_rowid())
  }

  fn apply_changes(
    conn: &Connection,
    id: i64,
    changes: &FarmerPatch,
  ) -> rusqlite::Result<()> {
    conn.execute(
      "UPDATE farmers SET
         farm_name     = COALESCE(?1, farm_name),
         farm_location = COALESCE(?2, farm_location)
       WHERE id = ?3",
      params![changes.farm_name, changes.farm_location, id],
    )?;
    Ok(())
  }
}
