//! In-process gateway used by tests and by `STORAGE_BACKEND=memory`.
//!
//! Each operation holds the table lock for its whole duration, so an owner check
//! and the write it guards observe the same state.

use crate::domain::model::{Car, CarPatch, NewCar, NewPerson, Person, PersonPatch, PersonUpdate};
use crate::domain::ownership::OwnerAssignment;
use crate::storage::{Page, RecordGateway};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    people: BTreeMap<i32, Person>,
    cars: BTreeMap<i32, Car>,
    last_person_id: i32,
    last_car_id: i32,
}

#[derive(Default)]
pub struct MemoryGateway {
    tables: RwLock<Tables>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_of<T: Clone>(rows: &BTreeMap<i32, T>, page: Page) -> Vec<T> {
    rows.values()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl RecordGateway for MemoryGateway {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_person(&self, id: i32) -> Result<Option<Person>> {
        Ok(self.tables.read().await.people.get(&id).cloned())
    }

    async fn find_person_by_cpf(&self, cpf: &str) -> Result<Option<Person>> {
        let tables = self.tables.read().await;
        Ok(tables.people.values().find(|p| p.cpf == cpf).cloned())
    }

    async fn list_people(&self, page: Page) -> Result<Vec<Person>> {
        Ok(page_of(&self.tables.read().await.people, page))
    }

    async fn insert_person(&self, new: NewPerson) -> Result<Option<Person>> {
        let mut tables = self.tables.write().await;
        if tables.people.values().any(|p| p.cpf == new.cpf) {
            return Ok(None);
        }
        tables.last_person_id += 1;
        let person = Person::from_new(tables.last_person_id, new);
        tables.people.insert(person.id, person.clone());
        Ok(Some(person))
    }

    async fn update_person(&self, id: i32, patch: PersonPatch) -> Result<PersonUpdate> {
        let mut tables = self.tables.write().await;
        if let Some(cpf) = patch.cpf.as_deref() {
            if tables.people.values().any(|p| p.cpf == cpf && p.id != id) {
                return Ok(if tables.people.contains_key(&id) {
                    PersonUpdate::CpfTaken
                } else {
                    PersonUpdate::NotFound
                });
            }
        }
        match tables.people.get_mut(&id) {
            Some(person) => {
                person.apply(patch);
                Ok(PersonUpdate::Updated(person.clone()))
            }
            None => Ok(PersonUpdate::NotFound),
        }
    }

    async fn delete_person(&self, id: i32) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.people.remove(&id).is_none() {
            return Ok(false);
        }
        for car in tables.cars.values_mut() {
            if car.owner_id == Some(id) {
                car.owner_id = None;
            }
        }
        Ok(true)
    }

    async fn find_car(&self, id: i32) -> Result<Option<Car>> {
        Ok(self.tables.read().await.cars.get(&id).cloned())
    }

    async fn list_cars(&self, page: Page) -> Result<Vec<Car>> {
        Ok(page_of(&self.tables.read().await.cars, page))
    }

    async fn list_cars_by_owner(&self, owner_id: i32) -> Result<Vec<Car>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cars
            .values()
            .filter(|c| c.owner_id == Some(owner_id))
            .cloned()
            .collect())
    }

    async fn insert_car(&self, new: NewCar) -> Result<OwnerAssignment> {
        let mut tables = self.tables.write().await;
        if let Some(owner_id) = new.owner_id {
            if !tables.people.contains_key(&owner_id) {
                return Ok(OwnerAssignment::OwnerNotFound);
            }
        }
        tables.last_car_id += 1;
        let car = Car::from_new(tables.last_car_id, new);
        tables.cars.insert(car.id, car.clone());
        Ok(OwnerAssignment::Assigned(car))
    }

    async fn update_car(&self, id: i32, patch: CarPatch) -> Result<OwnerAssignment> {
        let mut tables = self.tables.write().await;
        if !tables.cars.contains_key(&id) {
            return Ok(OwnerAssignment::CarNotFound);
        }
        if let Some(owner_id) = patch.assigned_owner() {
            if !tables.people.contains_key(&owner_id) {
                return Ok(OwnerAssignment::OwnerNotFound);
            }
        }
        match tables.cars.get_mut(&id) {
            Some(car) => {
                car.apply(patch);
                Ok(OwnerAssignment::Assigned(car.clone()))
            }
            None => Ok(OwnerAssignment::CarNotFound),
        }
    }

    async fn delete_car(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.cars.remove(&id).is_some())
    }
}
