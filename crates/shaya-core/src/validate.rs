//! Field validation with a fixed, user-facing message per field.

use thiserror::Error;

/// An input field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Document,
  Role,
  Phone,
  Password,
  Username,
  Email,
  FullName,
  CustomerType,
  Address,
  City,
  FarmName,
  FarmLocation,
}

impl Field {
  /// The field's name as it appears in request bodies.
  pub fn name(self) -> &'static str {
    match self {
      Self::Document => "document",
      Self::Role => "role",
      Self::Phone => "phone",
      Self::Password => "password",
      Self::Username => "username",
      Self::Email => "email",
      Self::FullName => "full_name",
      Self::CustomerType => "customerType",
      Self::Address => "address",
      Self::City => "city",
      Self::FarmName => "farm_name",
      Self::FarmLocation => "farm_location",
    }
  }

  /// The message shown to the client when this field is rejected.
  pub fn message(self) -> &'static str {
    match self {
      Self::Document => "El documento debe ser un valor numérico",
      Self::Role => "Rol inválido. Debe ser 'admin' o 'user'",
      Self::Phone => "El número debe ser un valor númerico de 10 caracteres",
      Self::Password => "La contraseña debe tener al menos 6 caracteres",
      Self::Username => "El usuario debe contener al menos 4 caracteres",
      Self::Email => "El correo electrónico no es válido",
      Self::FullName => "El nombre completo es obligatorio",
      Self::CustomerType | Self::Address | Self::City => {
        "El campo debe tener al menos 2 caracteres"
      }
      Self::FarmName | Self::FarmLocation => {
        "El campo debe tener al menos 4 caracteres"
      }
    }
  }
}

/// A rejected input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", .0.message())]
pub struct ValidationError(pub Field);

impl ValidationError {
  pub fn field(&self) -> Field { self.0 }
}

pub const MIN_USERNAME_CHARS: usize = 4;
pub const MIN_PASSWORD_CHARS: usize = 6;
pub const PHONE_DIGITS: usize = 10;

/// Require at least `min` characters (not bytes) in `value`.
pub fn min_chars(
  value: &str,
  min: usize,
  field: Field,
) -> Result<(), ValidationError> {
  if value.chars().count() < min {
    return Err(ValidationError(field));
  }
  Ok(())
}

pub fn username(value: &str) -> Result<(), ValidationError> {
  min_chars(value, MIN_USERNAME_CHARS, Field::Username)
}

pub fn password(value: &str) -> Result<(), ValidationError> {
  min_chars(value, MIN_PASSWORD_CHARS, Field::Password)
}

/// Documents are non-empty strings of ASCII digits.
pub fn document(value: &str) -> Result<(), ValidationError> {
  if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
    return Err(ValidationError(Field::Document));
  }
  Ok(())
}

pub fn phone(value: &str) -> Result<(), ValidationError> {
  if value.len() != PHONE_DIGITS || !value.bytes().all(|b| b.is_ascii_digit())
  {
    return Err(ValidationError(Field::Phone));
  }
  Ok(())
}

/// Syntactic check only: `local@domain.tld`, no whitespace, one `@`.
pub fn email(value: &str) -> Result<(), ValidationError> {
  let invalid = ValidationError(Field::Email);

  if value.chars().any(char::is_whitespace) {
    return Err(invalid);
  }
  let (local, domain) = value.split_once('@').ok_or(invalid)?;
  if local.is_empty() || domain.contains('@') {
    return Err(invalid);
  }

  let labels: Vec<&str> = domain.split('.').collect();
  if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
    return Err(invalid);
  }
  Ok(())
}

pub fn full_name(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError(Field::FullName));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn document_must_be_digits() {
    assert!(document("12345678").is_ok());
    assert_eq!(document("12a45"), Err(ValidationError(Field::Document)));
    assert_eq!(document(""), Err(ValidationError(Field::Document)));
  }

  #[test]
  fn phone_must_be_ten_digits() {
    assert!(phone("3001234567").is_ok());
    assert!(phone("555-1234").is_err());
    assert!(phone("30012345678").is_err());
  }

  #[test]
  fn email_syntax() {
    assert!(email("ana@example.com").is_ok());
    assert!(email("a.b+c@mail.example.co").is_ok());
    assert!(email("ana@example").is_err());
    assert!(email("@example.com").is_err());
    assert!(email("ana@@example.com").is_err());
    assert!(email("ana @example.com").is_err());
    assert!(email("ana@example..com").is_err());
  }

  #[test]
  fn length_rules_count_characters() {
    assert!(username("abcd").is_ok());
    assert!(username("abc").is_err());
    assert!(password("ñññññ").is_err());
    assert!(password("ññññññ").is_ok());
  }

  #[test]
  fn messages_come_from_the_table() {
    let err = ValidationError(Field::Username);
    assert_eq!(
      err.to_string(),
      "El usuario debe contener al menos 4 caracteres"
    );
    assert_eq!(err.field().name(), "username");
  }
}
