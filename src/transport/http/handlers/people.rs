use crate::domain::model::{NewPerson, Person, PersonPatch, PersonUpdate, PersonWithCars};
use crate::domain::ownership::{Ownership, OwnershipAction};
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::{
    ensure_car_exists, ensure_person_exists, PERSON_NOT_FOUND,
};
use crate::transport::http::types::{
    AppState, CarAssociation, MessageResponse, Paging,
};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

#[utoipa::path(
    post,
    path = "/people/",
    tag = "people",
    request_body = NewPerson,
    responses(
        (status = 200, description = "Person created", body = Person),
        (status = 400, description = "CPF already registered", body = ErrorResponse),
        (status = 422, description = "Invalid JSON body", body = ErrorResponse)
    )
)]
pub async fn create_person_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewPerson>, JsonRejection>,
) -> Result<Json<Person>, ApiError> {
    let Json(new) = payload?;
    match state.repository.create_person(new).await? {
        Some(person) => Ok(Json(person)),
        None => Err(ApiError::Conflict("CPF already registered".to_string())),
    }
}

#[utoipa::path(
    get,
    path = "/people/",
    tag = "people",
    params(Paging),
    responses(
        (status = 200, description = "People ordered by id", body = [Person]),
        (status = 422, description = "Invalid paging parameter", body = ErrorResponse)
    )
)]
pub async fn list_people_handler(
    State(state): State<AppState>,
    paging: Result<Query<Paging>, QueryRejection>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let Query(paging) = paging?;
    let people = state.repository.list_people(paging.into()).await?;
    Ok(Json(people))
}

#[utoipa::path(
    get,
    path = "/people/{person_id}",
    tag = "people",
    params(("person_id" = i32, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person with their cars", body = PersonWithCars),
        (status = 404, description = "Person not found", body = ErrorResponse)
    )
)]
pub async fn read_person_handler(
    State(state): State<AppState>,
    person_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<PersonWithCars>, ApiError> {
    let Path(person_id) = person_id?;
    state
        .repository
        .person_with_cars(person_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(PERSON_NOT_FOUND))
}

#[utoipa::path(
    put,
    path = "/people/{person_id}",
    tag = "people",
    params(("person_id" = i32, Path, description = "Person id")),
    request_body = PersonPatch,
    responses(
        (status = 200, description = "Person updated", body = Person),
        (status = 400, description = "CPF already registered", body = ErrorResponse),
        (status = 404, description = "Person not found", body = ErrorResponse)
    )
)]
pub async fn update_person_handler(
    State(state): State<AppState>,
    person_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<PersonPatch>, JsonRejection>,
) -> Result<Json<Person>, ApiError> {
    let Path(person_id) = person_id?;
    let Json(patch) = payload?;
    match state.repository.update_person(person_id, patch).await? {
        PersonUpdate::Updated(person) => Ok(Json(person)),
        PersonUpdate::NotFound => Err(ApiError::not_found(PERSON_NOT_FOUND)),
        PersonUpdate::CpfTaken => Err(ApiError::Conflict("CPF already registered".to_string())),
    }
}

#[utoipa::path(
    delete,
    path = "/people/{person_id}",
    tag = "people",
    params(("person_id" = i32, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person deleted; their cars become unowned", body = MessageResponse),
        (status = 404, description = "Person not found", body = ErrorResponse)
    )
)]
pub async fn delete_person_handler(
    State(state): State<AppState>,
    person_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(person_id) = person_id?;
    if !state.repository.delete_person(person_id).await? {
        return Err(ApiError::not_found(PERSON_NOT_FOUND));
    }
    Ok(Json(MessageResponse {
        message: "Person deleted successfully".to_string(),
    }))
}

/// Adds a car to, or removes it from, a person.
///
/// Checks run in a fixed order: person, car, action tag, then (for `remove`)
/// that the car actually belongs to the person.
#[utoipa::path(
    post,
    path = "/people/{person_id}/cars",
    tag = "people",
    params(("person_id" = i32, Path, description = "Person id")),
    request_body = CarAssociation,
    responses(
        (status = 200, description = "Person with their updated cars", body = PersonWithCars),
        (status = 400, description = "Invalid action, ownership mismatch or failed write", body = ErrorResponse),
        (status = 404, description = "Person or car not found", body = ErrorResponse)
    )
)]
pub async fn manage_person_car_handler(
    State(state): State<AppState>,
    person_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<CarAssociation>, JsonRejection>,
) -> Result<Json<PersonWithCars>, ApiError> {
    let Path(person_id) = person_id?;
    let Json(request) = payload?;

    let person = ensure_person_exists(&state, person_id).await?;
    let car = ensure_car_exists(&state, request.car_id).await?;
    let action: OwnershipAction = request
        .action
        .parse()
        .map_err(|_| ApiError::InvalidInput("Invalid action".to_string()))?;

    match action {
        OwnershipAction::Add => {
            if !state.repository.associate(person.id, car.id).await? {
                return Err(ApiError::OperationFailed("Association failed".to_string()));
            }
        }
        OwnershipAction::Remove => {
            if !Ownership::of(&car).is_owned_by(person.id) {
                return Err(ApiError::OwnershipMismatch(
                    "Car not owned by this person".to_string(),
                ));
            }
            if !state.repository.disassociate(car.id).await? {
                return Err(ApiError::OperationFailed("Disassociation failed".to_string()));
            }
        }
    }

    state
        .repository
        .person_with_cars(person.id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(PERSON_NOT_FOUND))
}
