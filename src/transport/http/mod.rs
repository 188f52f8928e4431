pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod cars;
    pub mod common;
    pub mod health;
    pub mod people;
}

pub use error::ApiError;
pub use router::{create_app, create_router, ApiDoc};
pub use types::AppState;
