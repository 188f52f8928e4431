//! Persistence gateway over the `people` and `cars` tables.

pub mod memory;
pub mod postgres;

pub use memory::MemoryGateway;
pub use postgres::PgGateway;

use crate::domain::model::{Car, CarPatch, NewCar, NewPerson, Person, PersonPatch, PersonUpdate};
use crate::domain::ownership::OwnerAssignment;
use crate::infra::config::{Config, StorageBackend};
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Offset/limit window for list queries. Rows are always ordered by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(offset: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            offset: offset.unwrap_or(0).max(0),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Storage contract consumed by the repository.
///
/// Every write commits before returning. Writes that set a car's owner check that
/// the owner exists within the same transaction as the write itself.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Cheap round-trip used by health checks.
    async fn ping(&self) -> anyhow::Result<()>;

    async fn find_person(&self, id: i32) -> anyhow::Result<Option<Person>>;

    async fn find_person_by_cpf(&self, cpf: &str) -> anyhow::Result<Option<Person>>;

    async fn list_people(&self, page: Page) -> anyhow::Result<Vec<Person>>;

    /// Inserts a person, or returns `None` without writing if the cpf is taken.
    async fn insert_person(&self, new: NewPerson) -> anyhow::Result<Option<Person>>;

    async fn update_person(&self, id: i32, patch: PersonPatch) -> anyhow::Result<PersonUpdate>;

    /// Deletes a person and clears `owner_id` on every car they owned.
    async fn delete_person(&self, id: i32) -> anyhow::Result<bool>;

    async fn find_car(&self, id: i32) -> anyhow::Result<Option<Car>>;

    async fn list_cars(&self, page: Page) -> anyhow::Result<Vec<Car>>;

    async fn list_cars_by_owner(&self, owner_id: i32) -> anyhow::Result<Vec<Car>>;

    /// Never returns `CarNotFound`.
    async fn insert_car(&self, new: NewCar) -> anyhow::Result<OwnerAssignment>;

    async fn update_car(&self, id: i32, patch: CarPatch) -> anyhow::Result<OwnerAssignment>;

    async fn delete_car(&self, id: i32) -> anyhow::Result<bool>;
}

/// Opens the gateway selected by `config`.
pub async fn connect(config: &Config) -> anyhow::Result<Arc<dyn RecordGateway>> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; records are lost on shutdown");
            Ok(Arc::new(MemoryGateway::new()))
        }
        StorageBackend::Postgres => {
            let gateway = PgGateway::connect(config.database_url()?, config.db_max_connections).await?;
            Ok(Arc::new(gateway))
        }
    }
}
