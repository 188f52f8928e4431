use crate::domain::model::{Car, CarPatch, CarWithOwner, NewCar};
use crate::domain::ownership::OwnerAssignment;
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::{
    ensure_owner_reference, ensure_person_exists, CAR_NOT_FOUND, OWNER_NOT_FOUND,
};
use crate::transport::http::types::{AppState, MessageResponse, OwnerUpdate, Paging};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

#[utoipa::path(
    post,
    path = "/cars/",
    tag = "cars",
    request_body = NewCar,
    responses(
        (status = 200, description = "Car created", body = Car),
        (status = 400, description = "Owner not found", body = ErrorResponse),
        (status = 422, description = "Invalid JSON body", body = ErrorResponse)
    )
)]
pub async fn create_car_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewCar>, JsonRejection>,
) -> Result<Json<Car>, ApiError> {
    let Json(new) = payload?;
    ensure_owner_reference(&state, new.owner_id).await?;

    match state.repository.create_car(new).await? {
        OwnerAssignment::Assigned(car) => Ok(Json(car)),
        // The owner vanished between the pre-check and the write.
        OwnerAssignment::OwnerNotFound | OwnerAssignment::CarNotFound => {
            Err(ApiError::InvalidReference(OWNER_NOT_FOUND.to_string()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/cars/",
    tag = "cars",
    params(Paging),
    responses(
        (status = 200, description = "Cars ordered by id", body = [Car]),
        (status = 422, description = "Invalid paging parameter", body = ErrorResponse)
    )
)]
pub async fn list_cars_handler(
    State(state): State<AppState>,
    paging: Result<Query<Paging>, QueryRejection>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let Query(paging) = paging?;
    let cars = state.repository.list_cars(paging.into()).await?;
    Ok(Json(cars))
}

#[utoipa::path(
    get,
    path = "/cars/{car_id}",
    tag = "cars",
    params(("car_id" = i32, Path, description = "Car id")),
    responses(
        (status = 200, description = "Car with its owner", body = CarWithOwner),
        (status = 404, description = "Car not found", body = ErrorResponse)
    )
)]
pub async fn read_car_handler(
    State(state): State<AppState>,
    car_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<CarWithOwner>, ApiError> {
    let Path(car_id) = car_id?;
    state
        .repository
        .car_with_owner(car_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(CAR_NOT_FOUND))
}

#[utoipa::path(
    put,
    path = "/cars/{car_id}",
    tag = "cars",
    params(("car_id" = i32, Path, description = "Car id")),
    request_body = CarPatch,
    responses(
        (status = 200, description = "Car updated", body = Car),
        (status = 400, description = "Owner not found", body = ErrorResponse),
        (status = 404, description = "Car not found", body = ErrorResponse)
    )
)]
pub async fn update_car_handler(
    State(state): State<AppState>,
    car_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<CarPatch>, JsonRejection>,
) -> Result<Json<Car>, ApiError> {
    let Path(car_id) = car_id?;
    let Json(patch) = payload?;
    ensure_owner_reference(&state, patch.assigned_owner()).await?;

    match state.repository.update_car(car_id, patch).await? {
        OwnerAssignment::Assigned(car) => Ok(Json(car)),
        OwnerAssignment::CarNotFound => Err(ApiError::not_found(CAR_NOT_FOUND)),
        OwnerAssignment::OwnerNotFound => {
            Err(ApiError::InvalidReference(OWNER_NOT_FOUND.to_string()))
        }
    }
}

#[utoipa::path(
    patch,
    path = "/cars/{car_id}/owner",
    tag = "cars",
    params(("car_id" = i32, Path, description = "Car id")),
    request_body = OwnerUpdate,
    responses(
        (status = 200, description = "Owner set or cleared", body = CarWithOwner),
        (status = 404, description = "Car not found, or owner not found", body = ErrorResponse)
    )
)]
pub async fn update_car_owner_handler(
    State(state): State<AppState>,
    car_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<OwnerUpdate>, JsonRejection>,
) -> Result<Json<CarWithOwner>, ApiError> {
    let Path(car_id) = car_id?;
    let Json(request) = payload?;

    let car = match state.repository.set_owner(car_id, request.owner_id).await? {
        OwnerAssignment::Assigned(car) => car,
        OwnerAssignment::CarNotFound => return Err(ApiError::not_found(CAR_NOT_FOUND)),
        OwnerAssignment::OwnerNotFound => return Err(ApiError::not_found(OWNER_NOT_FOUND)),
    };
    let owner = match car.owner_id {
        Some(owner_id) => state.repository.get_person(owner_id).await?,
        None => None,
    };
    Ok(Json(CarWithOwner { car, owner }))
}

#[utoipa::path(
    delete,
    path = "/cars/{car_id}",
    tag = "cars",
    params(("car_id" = i32, Path, description = "Car id")),
    responses(
        (status = 200, description = "Car deleted", body = MessageResponse),
        (status = 404, description = "Car not found", body = ErrorResponse)
    )
)]
pub async fn delete_car_handler(
    State(state): State<AppState>,
    car_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(car_id) = car_id?;
    if !state.repository.delete_car(car_id).await? {
        return Err(ApiError::not_found(CAR_NOT_FOUND));
    }
    Ok(Json(MessageResponse {
        message: "Car deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/cars/owner/{owner_id}",
    tag = "cars",
    params(("owner_id" = i32, Path, description = "Person id")),
    responses(
        (status = 200, description = "Cars owned by the person", body = [Car]),
        (status = 404, description = "Owner not found", body = ErrorResponse)
    )
)]
pub async fn list_cars_by_owner_handler(
    State(state): State<AppState>,
    owner_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let Path(owner_id) = owner_id?;
    let owner = ensure_person_exists(&state, owner_id)
        .await
        .map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::not_found(OWNER_NOT_FOUND),
            other => other,
        })?;
    let cars = state.repository.list_by_owner(owner.id).await?;
    Ok(Json(cars))
}
