//! Ownership rules shared by every path that sets or clears `Car::owner_id`.
//!
//! A car is either `Unowned` or `Owned(person_id)`. No write may move a car into
//! `Owned(p)` unless person `p` exists at the moment of the write; the storage
//! gateways check that inside the same transaction as the write.

use crate::domain::model::Car;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Unowned,
    Owned(i32),
}

impl Ownership {
    pub fn of(car: &Car) -> Self {
        match car.owner_id {
            Some(person_id) => Ownership::Owned(person_id),
            None => Ownership::Unowned,
        }
    }

    pub fn is_owned_by(&self, person_id: i32) -> bool {
        matches!(self, Ownership::Owned(owner) if *owner == person_id)
    }
}

/// Result of any write that may set a car's owner.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnerAssignment {
    Assigned(Car),
    CarNotFound,
    /// The requested owner does not exist; nothing was written.
    OwnerNotFound,
}

impl OwnerAssignment {
    pub fn into_car(self) -> Option<Car> {
        match self {
            OwnerAssignment::Assigned(car) => Some(car),
            OwnerAssignment::CarNotFound | OwnerAssignment::OwnerNotFound => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, OwnerAssignment::Assigned(_))
    }
}

/// Action tag accepted by the person-centric association endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown ownership action '{}'", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for OwnershipAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(OwnershipAction::Add),
            "remove" => Ok(OwnershipAction::Remove),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}
