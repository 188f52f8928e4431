use crate::domain::model::{
    Car, CarPatch, CarWithOwner, NewCar, NewPerson, Person, PersonPatch, PersonWithCars,
};
use crate::transport::http::handlers::{cars, health, people};
use crate::transport::http::types::{
    AppState, CarAssociation, ErrorResponse, HealthResponse, MessageResponse, OwnerUpdate,
};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Car API",
        description = "A simple Car API to exercise UnitTests",
        version = "0.1.0"
    ),
    paths(
        health::healthcheck_handler,
        people::create_person_handler,
        people::list_people_handler,
        people::read_person_handler,
        people::update_person_handler,
        people::delete_person_handler,
        people::manage_person_car_handler,
        cars::create_car_handler,
        cars::list_cars_handler,
        cars::read_car_handler,
        cars::update_car_handler,
        cars::update_car_owner_handler,
        cars::delete_car_handler,
        cars::list_cars_by_owner_handler
    ),
    components(schemas(
        Person,
        NewPerson,
        PersonPatch,
        PersonWithCars,
        Car,
        NewCar,
        CarPatch,
        CarWithOwner,
        OwnerUpdate,
        CarAssociation,
        ErrorResponse,
        MessageResponse,
        HealthResponse
    )),
    tags(
        (name = "people", description = "People and the cars they own"),
        (name = "cars", description = "Cars and their ownership"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/people/",
            post(people::create_person_handler).get(people::list_people_handler),
        )
        .route(
            "/people",
            post(people::create_person_handler).get(people::list_people_handler),
        )
        .route(
            "/people/:person_id",
            get(people::read_person_handler)
                .put(people::update_person_handler)
                .delete(people::delete_person_handler),
        )
        .route("/people/:person_id/cars", post(people::manage_person_car_handler))
        .route(
            "/cars/",
            post(cars::create_car_handler).get(cars::list_cars_handler),
        )
        .route(
            "/cars",
            post(cars::create_car_handler).get(cars::list_cars_handler),
        )
        .route("/cars/owner/:owner_id", get(cars::list_cars_by_owner_handler))
        .route(
            "/cars/:car_id",
            get(cars::read_car_handler)
                .put(cars::update_car_handler)
                .delete(cars::delete_car_handler),
        )
        .route("/cars/:car_id/owner", patch(cars::update_car_owner_handler))
        .with_state(app_state)
}

/// The full application: API routes, docs at `/docs`, the OpenAPI document at
/// `/openapi.json`, plus CORS and request tracing.
pub fn create_app(app_state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    create_router(app_state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
