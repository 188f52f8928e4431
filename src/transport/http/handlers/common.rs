use crate::domain::model::{Car, Person};
use crate::transport::http::error::ApiError;
use crate::transport::http::types::AppState;

pub const PERSON_NOT_FOUND: &str = "Person not found";
pub const CAR_NOT_FOUND: &str = "Car not found";
pub const OWNER_NOT_FOUND: &str = "Owner not found";

pub async fn ensure_person_exists(state: &AppState, person_id: i32) -> Result<Person, ApiError> {
    state
        .repository
        .get_person(person_id)
        .await?
        .ok_or_else(|| ApiError::not_found(PERSON_NOT_FOUND))
}

pub async fn ensure_car_exists(state: &AppState, car_id: i32) -> Result<Car, ApiError> {
    state
        .repository
        .get_car(car_id)
        .await?
        .ok_or_else(|| ApiError::not_found(CAR_NOT_FOUND))
}

/// Pre-check for create/update payloads that carry an owner.
///
/// The gateway re-checks inside the write transaction; this gives the client a
/// validation error before any write is attempted.
pub async fn ensure_owner_reference(state: &AppState, owner_id: Option<i32>) -> Result<(), ApiError> {
    if let Some(owner_id) = owner_id {
        if state.repository.get_person(owner_id).await?.is_none() {
            return Err(ApiError::InvalidReference(OWNER_NOT_FOUND.to_string()));
        }
    }
    Ok(())
}
