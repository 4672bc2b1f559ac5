//! User: the authentication principal.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  entity::{RoleEntity, UniqueField, person_unique_values},
  password::hash_password,
  person::{Person, PersonInput},
  validate::{self, Field, ValidationError},
};

/// Authorisation level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  User,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::User => "user",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "admin" => Ok(Self::Admin),
      "user" => Ok(Self::User),
      _ => Err(ValidationError(Field::Role)),
    }
  }
}

/// A persisted user together with its person.
#[derive(Debug, Clone, Serialize)]
pub struct User {
  pub id:              i64,
  pub username:        String,
  /// Argon2 PHC string. Never leaves the server.
  #[serde(skip_serializing)]
  pub hashed_password: String,
  pub role:            Role,
  pub person:          Person,
}

/// Body of a user create request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub username: String,
  pub password: String,
  pub role:     Role,
  pub person:   PersonInput,
}

/// Body of a user update request; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
  pub username: Option<String>,
  pub password: Option<String>,
  pub role:     Option<Role>,
  pub person:   Option<PersonInput>,
}

/// A sealed user ready to insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct UserDraft {
  pub username:        String,
  pub hashed_password: String,
  pub role:            Role,
  pub person:          PersonInput,
}

/// A sealed user change set.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
  pub username:        Option<String>,
  pub hashed_password: Option<String>,
  pub role:            Option<Role>,
  pub person:          Option<PersonInput>,
}

impl RoleEntity for User {
  const NAME: &'static str = "User";

  type New = NewUser;
  type Patch = UserPatch;
  type Draft = UserDraft;
  type Changes = UserChanges;

  fn id(&self) -> i64 { self.id }

  fn person(&self) -> &Person { &self.person }

  fn prepare(input: NewUser) -> Result<NewUser> {
    validate::username(&input.username)?;
    validate::password(&input.password)?;
    Ok(NewUser { person: input.person.prepare()?, ..input })
  }

  fn prepare_patch(patch: UserPatch) -> Result<UserPatch> {
    if let Some(username) = &patch.username {
      validate::username(username)?;
    }
    // An empty password means "keep the current one".
    let password = patch.password.filter(|p| !p.is_empty());
    if let Some(password) = &password {
      validate::password(password)?;
    }
    let person = patch.person.map(PersonInput::prepare).transpose()?;

    Ok(UserPatch { password, person, ..patch })
  }

  fn unique_values(input: &NewUser) -> Vec<(UniqueField, &str)> {
    let mut values = vec![(UniqueField::Username, input.username.as_str())];
    values.extend(person_unique_values(&input.person));
    values
  }

  fn changed_unique_values(patch: &UserPatch) -> Vec<(UniqueField, &str)> {
    let mut values = Vec::new();
    if let Some(username) = &patch.username {
      values.push((UniqueField::Username, username.as_str()));
    }
    if let Some(person) = &patch.person {
      values.extend(person_unique_values(person));
    }
    values
  }

  fn seal(input: NewUser) -> Result<UserDraft> {
    Ok(UserDraft {
      hashed_password: hash_password(&input.password)?,
      username:        input.username,
      role:            input.role,
      person:          input.person,
    })
  }

  fn seal_patch(patch: UserPatch) -> Result<UserChanges> {
    Ok(UserChanges {
      hashed_password: patch.password.as_deref().map(hash_password).transpose()?,
      username:        patch.username,
      role:            patch.role,
      person:          patch.person,
    })
  }

  fn label(input: &NewUser) -> &str { &input.person.full_name }
}
