//! Farmer: a coffee grower and the farm they run.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  entity::{RoleEntity, UniqueField, person_unique_values},
  person::{Person, PersonInput},
  validate::{Field, min_chars},
};

const MIN_FIELD_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Farmer {
  pub id:            i64,
  /// Unique across farmers.
  pub farm_name:     String,
  /// Unique across farmers.
  pub farm_location: String,
  pub person:        Person,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFarmer {
  pub farm_name:     String,
  pub farm_location: String,
  pub person:        PersonInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FarmerPatch {
  pub farm_name:     Option<String>,
  pub farm_location: Option<String>,
  pub person:        Option<PersonInput>,
}

impl RoleEntity for Farmer {
  const NAME: &'static str = "Farmer";

  type New = NewFarmer;
  type Patch = FarmerPatch;
  type Draft = NewFarmer;
  type Changes = FarmerPatch;

  fn id(&self) -> i64 { self.id }

  fn person(&self) -> &Person { &self.person }

  fn prepare(input: NewFarmer) -> Result<NewFarmer> {
    min_chars(&input.farm_name, MIN_FIELD_CHARS, Field::FarmName)?;
    min_chars(&input.farm_location, MIN_FIELD_CHARS, Field::FarmLocation)?;
    Ok(NewFarmer { person: input.person.prepare()?, ..input })
  }

  fn prepare_patch(patch: FarmerPatch) -> Result<FarmerPatch> {
    if let Some(name) = &patch.farm_name {
      min_chars(name, MIN_FIELD_CHARS, Field::FarmName)?;
    }
    if let Some(location) = &patch.farm_location {
      min_chars(location, MIN_FIELD_CHARS, Field::FarmLocation)?;
    }
    let person = patch.person.map(PersonInput::prepare).transpose()?;
    Ok(FarmerPatch { person, ..patch })
  }

  fn unique_values(draft: &NewFarmer) -> Vec<(UniqueField, &str)> {
    let mut values = vec![
      (UniqueField::FarmName, draft.farm_name.as_str()),
      (UniqueField::FarmLocation, draft.farm_location.as_str()),
    ];
    values.extend(person_unique_values(&draft.person));
    values
  }

  fn changed_unique_values(changes: &FarmerPatch) -> Vec<(UniqueField, &str)> {
    let mut values = Vec::new();
    if let Some(name) = &changes.farm_name {
      values.push((UniqueField::FarmName, name.as_str()));
    }
    if let Some(location) = &changes.farm_location {
      values.push((UniqueField::FarmLocation, location.as_str()));
    }
    if let Some(person) = &changes.person {
      values.extend(person_unique_values(person));
    }
    values
  }

  fn seal(input: NewFarmer) -> Result<NewFarmer> { Ok(input) }

  fn seal_patch(patch: FarmerPatch) -> Result<FarmerPatch> { Ok(patch) }

  fn label(input: &NewFarmer) -> &str { &input.person.full_name }
}
