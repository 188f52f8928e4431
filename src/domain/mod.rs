pub mod model;
pub mod ownership;
