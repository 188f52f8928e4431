pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::EntityRepository;
pub use domain::model::{Car, CarPatch, CarWithOwner, NewCar, NewPerson, Person, PersonPatch, PersonWithCars};
pub use domain::ownership::{OwnerAssignment, Ownership, OwnershipAction};
pub use infra::config::Config;
pub use storage::{MemoryGateway, PgGateway, RecordGateway};
