//! The `RoleEntity` trait shared by users, customers and farmers, and the set
//! of fields that must stay unique.

use std::fmt;

use serde::Serialize;

use crate::{Result, person::Person};

// ─── Unique fields ───────────────────────────────────────────────────────────

/// A field whose value may appear at most once in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
  Username,
  Document,
  Email,
  FarmName,
  FarmLocation,
}

/// Which record a unique field lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
  /// The shared `persons` table; unique across every role entity.
  Person,
  /// The role entity's own table.
  Entity,
}

impl UniqueField {
  pub fn name(self) -> &'static str {
    match self {
      Self::Username => "username",
      Self::Document => "document",
      Self::Email => "email",
      Self::FarmName => "farm_name",
      Self::FarmLocation => "farm_location",
    }
  }

  pub fn owner(self) -> Owner {
    match self {
      Self::Document | Self::Email => Owner::Person,
      Self::Username | Self::FarmName | Self::FarmLocation => Owner::Entity,
    }
  }
}

impl fmt::Display for UniqueField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── RoleEntity ──────────────────────────────────────────────────────────────

/// A business record that exclusively owns one [`Person`]. The entity plus
/// its person form the aggregate that services create, update and delete as
/// a unit.
///
/// Input flows through two stages. [`prepare`](Self::prepare) /
/// [`prepare_patch`](Self::prepare_patch) validate and normalise the wire-level
/// `New` / `Patch` values in place; once the uniqueness guard has passed,
/// [`seal`](Self::seal) / [`seal_patch`](Self::seal_patch) turn them into the
/// `Draft` / `Changes` types that storage backends persist verbatim. Costly
/// work such as password hashing belongs in the sealing step.
pub trait RoleEntity: Serialize + Send + Sync + Sized + 'static {
  /// Display name, used in "not found" messages and logs.
  const NAME: &'static str;

  type New: Send + 'static;
  type Patch: Send + 'static;
  type Draft: Send + 'static;
  type Changes: Send + 'static;

  fn id(&self) -> i64;
  fn person(&self) -> &Person;

  fn prepare(input: Self::New) -> Result<Self::New>;
  fn prepare_patch(patch: Self::Patch) -> Result<Self::Patch>;

  /// Unique values carried by a prepared input, entity fields first, then
  /// person fields. Conflicts are reported in this order.
  fn unique_values(input: &Self::New) -> Vec<(UniqueField, &str)>;

  /// Unique values a prepared patch would write, in the same order.
  fn changed_unique_values(patch: &Self::Patch) -> Vec<(UniqueField, &str)>;

  fn seal(input: Self::New) -> Result<Self::Draft>;
  fn seal_patch(patch: Self::Patch) -> Result<Self::Changes>;

  /// Short human label for an input, used when logging skipped bulk items.
  fn label(input: &Self::New) -> &str;
}

/// Document then email: the person half of `unique_values`.
pub(crate) fn person_unique_values(
  person: &crate::person::PersonInput,
) -> [(UniqueField, &str); 2] {
  [
    (UniqueField::Document, person.document.as_str()),
    (UniqueField::Email, person.email.as_str()),
  ]
}
