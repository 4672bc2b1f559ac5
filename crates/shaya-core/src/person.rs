//! Person: the demographic record owned by exactly one role entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{normalize::format_name, validate, validate::ValidationError};

/// A persisted person. Never exists on its own: it is created, updated and
/// deleted together with the user, customer or farmer that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:          i64,
  pub full_name:   String,
  /// Unique across every person, whichever entity owns it.
  pub document:    String,
  pub phone:       Option<String>,
  /// Unique across every person, whichever entity owns it.
  pub email:       String,
  pub observation: Option<String>,
  pub created_at:  DateTime<Utc>,
}

/// Person fields supplied on create, and on update as an all-or-nothing
/// replacement of the existing person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonInput {
  pub full_name:   String,
  pub document:    String,
  #[serde(default)]
  pub phone:       Option<String>,
  pub email:       String,
  #[serde(default)]
  pub observation: Option<String>,
}

impl PersonInput {
  /// Check every field; an empty phone counts as absent.
  pub fn validate(&self) -> Result<(), ValidationError> {
    validate::full_name(&self.full_name)?;
    validate::document(&self.document)?;
    if let Some(phone) = self.phone.as_deref().filter(|p| !p.is_empty()) {
      validate::phone(phone)?;
    }
    validate::email(&self.email)?;
    Ok(())
  }

  /// Apply the name normaliser and drop empty optional fields.
  pub fn normalized(self) -> Self {
    Self {
      full_name:   format_name(&self.full_name),
      document:    self.document,
      phone:       self.phone.filter(|p| !p.is_empty()),
      email:       self.email,
      observation: self.observation.filter(|o| !o.trim().is_empty()),
    }
  }

  /// Validate, then normalise.
  pub fn prepare(self) -> Result<Self, ValidationError> {
    self.validate()?;
    Ok(self.normalized())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::validate::Field;

  fn input() -> PersonInput {
    PersonInput {
      full_name:   "maria de las mercedes".into(),
      document:    "1020304050".into(),
      phone:       Some("3001234567".into()),
      email:       "maria@example.com".into(),
      observation: None,
    }
  }

  #[test]
  fn prepare_normalises_name() {
    let p = input().prepare().unwrap();
    assert_eq!(p.full_name, "Maria de las Mercedes");
  }

  #[test]
  fn empty_phone_is_absent() {
    let mut raw = input();
    raw.phone = Some(String::new());
    let p = raw.prepare().unwrap();
    assert_eq!(p.phone, None);
  }

  #[test]
  fn first_invalid_field_is_reported() {
    let mut raw = input();
    raw.document = "abc".into();
    raw.email = "nope".into();
    assert_eq!(raw.validate(), Err(ValidationError(Field::Document)));
  }

  #[test]
  fn phone_is_optional_in_json() {
    let p: PersonInput = serde_json::from_str(
      r#"{"full_name":"Ana","document":"1","email":"ana@example.com"}"#,
    )
    .unwrap();
    assert_eq!(p.phone, None);
    assert_eq!(p.observation, None);
  }
}
