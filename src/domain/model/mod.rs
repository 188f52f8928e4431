//! Record types for the two managed entities and their create/patch payloads.

pub mod car;
pub mod person;

pub use car::{Car, CarPatch, CarWithOwner, NewCar};
pub use person::{NewPerson, Person, PersonPatch, PersonUpdate, PersonWithCars};

use serde::{Deserialize, Deserializer};

/// Deserializes a field that was present in the payload, even when its value is `null`.
///
/// Paired with `#[serde(default)]` this yields `None` for an absent field and
/// `Some(None)` for an explicit `null`.
pub(crate) fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
