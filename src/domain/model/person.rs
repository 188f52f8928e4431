use crate::domain::model::Car;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A stored person. `cpf` is unique across all people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewPerson {
    pub name: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
}

/// Partial update: only the fields present in the payload are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PersonPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
}

/// Outcome of a person update.
#[derive(Debug, Clone, PartialEq)]
pub enum PersonUpdate {
    Updated(Person),
    NotFound,
    /// The requested `cpf` already belongs to another person.
    CpfTaken,
}

/// A person together with every car whose `owner_id` points at them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PersonWithCars {
    #[serde(flatten)]
    pub person: Person,
    pub cars: Vec<Car>,
}

impl Person {
    pub fn from_new(id: i32, new: NewPerson) -> Self {
        Self {
            id,
            name: new.name,
            cpf: new.cpf,
            birth_date: new.birth_date,
        }
    }

    /// Merges `patch` into this record, field by field.
    pub fn apply(&mut self, patch: PersonPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(cpf) = patch.cpf {
            self.cpf = cpf;
        }
        if let Some(birth_date) = patch.birth_date {
            self.birth_date = birth_date;
        }
    }
}
