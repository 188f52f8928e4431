use crate::app::EntityRepository;
use crate::storage::Page;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<EntityRepository>,
}

impl AppState {
    pub fn new(repository: EntityRepository) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }
}

/// Error body returned by every failing endpoint.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Offset/limit query parameters for list endpoints.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Paging {
    /// Number of rows to skip (default 0).
    pub skip: Option<i64>,
    /// Maximum number of rows to return (default 100).
    pub limit: Option<i64>,
}

impl From<Paging> for Page {
    fn from(p: Paging) -> Self {
        Page::new(p.skip, p.limit)
    }
}

/// Body of `PATCH /cars/{car_id}/owner`. A missing or `null` owner clears ownership.
#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct OwnerUpdate {
    #[serde(default)]
    pub owner_id: Option<i32>,
}

/// Body of `POST /people/{person_id}/cars`.
#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct CarAssociation {
    pub car_id: i32,
    /// `add` or `remove`.
    pub action: String,
}
