use crate::domain::model::{deserialize_present, Person};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A stored car. `owner_id` is `None` when the car is unowned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Car {
    pub id: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub price: f64,
    pub owner_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub price: f64,
    #[serde(default)]
    pub owner_id: Option<i32>,
}

/// Partial update for a car.
///
/// `owner_id` is tri-state: absent leaves the owner alone, `null` clears it and
/// a value reassigns it (the referenced person must exist).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(default)]
pub struct CarPatch {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub price: Option<f64>,
    #[serde(deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<i32>, nullable)]
    pub owner_id: Option<Option<i32>>,
}

/// A car together with its owner, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CarWithOwner {
    #[serde(flatten)]
    pub car: Car,
    pub owner: Option<Person>,
}

impl CarPatch {
    /// A patch that only changes ownership.
    pub fn owner(owner_id: Option<i32>) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Default::default()
        }
    }

    /// The person this patch assigns the car to, if it assigns one.
    pub fn assigned_owner(&self) -> Option<i32> {
        self.owner_id.flatten()
    }
}

impl Car {
    pub fn from_new(id: i32, new: NewCar) -> Self {
        Self {
            id,
            make: new.make,
            model: new.model,
            year: new.year,
            color: new.color,
            price: new.price,
            owner_id: new.owner_id,
        }
    }

    /// Merges `patch` into this record, field by field.
    pub fn apply(&mut self, patch: CarPatch) {
        if let Some(make) = patch.make {
            self.make = make;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(owner_id) = patch.owner_id {
            self.owner_id = owner_id;
        }
    }
}
