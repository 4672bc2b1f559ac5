//! Customer: a business-role entity with a postal address.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  entity::{RoleEntity, UniqueField, person_unique_values},
  person::{Person, PersonInput},
  validate::{Field, min_chars},
};

const MIN_FIELD_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
  pub id:            i64,
  #[serde(rename = "customerType")]
  pub customer_type: String,
  pub address:       String,
  pub city:          String,
  pub person:        Person,
}

/// Body of a customer create request. Also the insert draft: customers carry
/// nothing that needs deriving beyond the normalised person.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
  #[serde(rename = "customerType")]
  pub customer_type: String,
  pub address:       String,
  pub city:          String,
  pub person:        PersonInput,
}

/// Body of a customer update request; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPatch {
  #[serde(rename = "customerType")]
  pub customer_type: Option<String>,
  pub address:       Option<String>,
  pub city:          Option<String>,
  pub person:        Option<PersonInput>,
}

impl RoleEntity for Customer {
  const NAME: &'static str = "Customer";

  type New = NewCustomer;
  type Patch = CustomerPatch;
  type Draft = NewCustomer;
  type Changes = CustomerPatch;

  fn id(&self) -> i64 { self.id }

  fn person(&self) -> &Person { &self.person }

  fn prepare(input: NewCustomer) -> Result<NewCustomer> {
    min_chars(&input.customer_type, MIN_FIELD_CHARS, Field::CustomerType)?;
    min_chars(&input.address, MIN_FIELD_CHARS, Field::Address)?;
    min_chars(&input.city, MIN_FIELD_CHARS, Field::City)?;
    Ok(NewCustomer { person: input.person.prepare()?, ..input })
  }

  fn prepare_patch(patch: CustomerPatch) -> Result<CustomerPatch> {
    for (value, field) in [
      (&patch.customer_type, Field::CustomerType),
      (&patch.address, Field::Address),
      (&patch.city, Field::City),
    ] {
      if let Some(value) = value {
        min_chars(value, MIN_FIELD_CHARS, field)?;
      }
    }
    let person = patch.person.map(PersonInput::prepare).transpose()?;
    Ok(CustomerPatch { person, ..patch })
  }

  fn unique_values(draft: &NewCustomer) -> Vec<(UniqueField, &str)> {
    person_unique_values(&draft.person).to_vec()
  }

  fn changed_unique_values(changes: &CustomerPatch) -> Vec<(UniqueField, &str)> {
    changes
      .person
      .as_ref()
      .map(|p| person_unique_values(p).to_vec())
      .unwrap_or_default()
  }

  fn seal(input: NewCustomer) -> Result<NewCustomer> { Ok(input) }

  fn seal_patch(patch: CustomerPatch) -> Result<CustomerPatch> { Ok(patch) }

  fn label(input: &NewCustomer) -> &str { &input.person.full_name }
}
