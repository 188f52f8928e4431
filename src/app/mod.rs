pub mod repository;

pub use repository::EntityRepository;
