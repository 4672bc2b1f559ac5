//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and roles as their lowercase
//! names.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use shaya_core::{person::Person, user::Role};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown role: {s:?}")))
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Substring pattern for `LIKE ... ESCAPE '\'`, with the wildcards in `text`
/// matched literally.
pub fn like_pattern(text: &str) -> String {
  let mut pattern = String::with_capacity(text.len() + 2);
  pattern.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Person columns, in the order [`RawPerson::read`] expects them.
pub const PERSON_COLUMNS: &str = "p.id, p.full_name, p.document, p.phone, \
                                  p.email, p.observation, p.created_at";

/// Number of columns in [`PERSON_COLUMNS`].
pub const PERSON_COLUMN_COUNT: usize = 7;

/// A `persons` row with text columns not yet decoded.
pub struct RawPerson {
  pub id:          i64,
  pub full_name:   String,
  pub document:    String,
  pub phone:       Option<String>,
  pub email:       String,
  pub observation: Option<String>,
  pub created_at:  String,
}

impl RawPerson {
  /// Read [`PERSON_COLUMNS`] starting at column `offset`.
  pub fn read(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(offset)?,
      full_name:   row.get(offset + 1)?,
      document:    row.get(offset + 2)?,
      phone:       row.get(offset + 3)?,
      email:       row.get(offset + 4)?,
      observation: row.get(offset + 5)?,
      created_at:  row.get(offset + 6)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:          self.id,
      full_name:   self.full_name,
      document:    self.document,
      phone:       self.phone,
      email:       self.email,
      observation: self.observation,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
