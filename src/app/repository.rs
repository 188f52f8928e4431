//! The entity repository.
//!
//! This is the single entry point handlers use to read and write people and cars.
//! It owns the ownership rules: every path that sets `Car::owner_id`
//! (create, update, `set_owner`, `associate`) goes through a gateway write that
//! verifies the owner exists, so a committed `owner_id` always names a person that
//! existed at the time of the write.
//!
//! Domain absence is reported through `Option`, `bool` or a tagged outcome; only
//! infrastructure failures surface as errors.

use crate::domain::model::{
    Car, CarPatch, CarWithOwner, NewCar, NewPerson, Person, PersonPatch, PersonUpdate,
    PersonWithCars,
};
use crate::domain::ownership::OwnerAssignment;
use crate::storage::{Page, RecordGateway};
use anyhow::Result;
use std::sync::Arc;

pub struct EntityRepository {
    gateway: Arc<dyn RecordGateway>,
}

impl EntityRepository {
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        Self { gateway }
    }

    pub async fn ping(&self) -> Result<()> {
        self.gateway.ping().await
    }

    // --- People ---

    pub async fn get_person(&self, id: i32) -> Result<Option<Person>> {
        self.gateway.find_person(id).await
    }

    pub async fn list_people(&self, page: Page) -> Result<Vec<Person>> {
        self.gateway.list_people(page).await
    }

    /// Creates a person, or returns `None` if the cpf is already registered.
    /// The existing record is left untouched in that case; the gateway insert
    /// is the uniqueness check.
    pub async fn create_person(&self, new: NewPerson) -> Result<Option<Person>> {
        let created = self.gateway.insert_person(new).await?;
        if let Some(person) = &created {
            tracing::info!(person_id = person.id, "person created");
        }
        Ok(created)
    }

    pub async fn update_person(&self, id: i32, patch: PersonPatch) -> Result<PersonUpdate> {
        self.gateway.update_person(id, patch).await
    }

    /// Deletes a person. Cars they owned become unowned.
    pub async fn delete_person(&self, id: i32) -> Result<bool> {
        let deleted = self.gateway.delete_person(id).await?;
        if deleted {
            tracing::info!(person_id = id, "person deleted");
        }
        Ok(deleted)
    }

    pub async fn person_with_cars(&self, id: i32) -> Result<Option<PersonWithCars>> {
        let Some(person) = self.gateway.find_person(id).await? else {
            return Ok(None);
        };
        let cars = self.gateway.list_cars_by_owner(person.id).await?;
        Ok(Some(PersonWithCars { person, cars }))
    }

    // --- Cars ---

    pub async fn get_car(&self, id: i32) -> Result<Option<Car>> {
        self.gateway.find_car(id).await
    }

    pub async fn list_cars(&self, page: Page) -> Result<Vec<Car>> {
        self.gateway.list_cars(page).await
    }

    /// Creates a car. Yields `OwnerNotFound` (and persists nothing) when
    /// `owner_id` names a person that does not exist.
    pub async fn create_car(&self, new: NewCar) -> Result<OwnerAssignment> {
        let outcome = self.gateway.insert_car(new).await?;
        if let OwnerAssignment::Assigned(car) = &outcome {
            tracing::info!(car_id = car.id, owner_id = ?car.owner_id, "car created");
        }
        Ok(outcome)
    }

    pub async fn update_car(&self, id: i32, patch: CarPatch) -> Result<OwnerAssignment> {
        self.gateway.update_car(id, patch).await
    }

    pub async fn delete_car(&self, id: i32) -> Result<bool> {
        self.gateway.delete_car(id).await
    }

    pub async fn car_with_owner(&self, id: i32) -> Result<Option<CarWithOwner>> {
        let Some(car) = self.gateway.find_car(id).await? else {
            return Ok(None);
        };
        let owner = match car.owner_id {
            Some(owner_id) => self.gateway.find_person(owner_id).await?,
            None => None,
        };
        Ok(Some(CarWithOwner { car, owner }))
    }

    // --- Ownership ---

    /// Makes `person_id` the owner of `car_id`.
    ///
    /// Returns `false`, without changing anything, if either record is absent.
    pub async fn associate(&self, person_id: i32, car_id: i32) -> Result<bool> {
        let outcome = self.set_owner(car_id, Some(person_id)).await?;
        Ok(outcome.is_assigned())
    }

    /// Clears the owner of `car_id`. Returns `false` if the car does not exist.
    pub async fn disassociate(&self, car_id: i32) -> Result<bool> {
        let outcome = self.set_owner(car_id, None).await?;
        Ok(outcome.is_assigned())
    }

    /// Sets (`Some`) or clears (`None`) the owner of a car.
    ///
    /// Clearing is unconditional; assigning requires the person to exist.
    pub async fn set_owner(&self, car_id: i32, owner_id: Option<i32>) -> Result<OwnerAssignment> {
        let outcome = self.gateway.update_car(car_id, CarPatch::owner(owner_id)).await?;
        match &outcome {
            OwnerAssignment::Assigned(_) => {
                tracing::info!(car_id, owner_id = ?owner_id, "car owner updated");
            }
            OwnerAssignment::CarNotFound => {
                tracing::debug!(car_id, "owner update skipped: car not found");
            }
            OwnerAssignment::OwnerNotFound => {
                tracing::debug!(car_id, owner_id = ?owner_id, "owner update skipped: owner not found");
            }
        }
        Ok(outcome)
    }

    /// Cars currently owned by `person_id`. Empty when the person owns nothing
    /// or does not exist; callers check person existence themselves.
    pub async fn list_by_owner(&self, person_id: i32) -> Result<Vec<Car>> {
        self.gateway.list_cars_by_owner(person_id).await
    }
}
