//! Fleet catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        car::{Car, CarQuery, CreateCar, Quote, UpdateCar},
        dates::{deserialize_date, DateRange},
    },
    AppState,
};

use super::AdminSession;

/// Response carrying a single car after an admin write
#[derive(Serialize, ToSchema)]
pub struct CarResponse {
    pub success: bool,
    pub message: String,
    pub car: Car,
}

/// Rental dates for a quote
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuoteQuery {
    #[serde(deserialize_with = "deserialize_date")]
    #[param(value_type = String, format = Date)]
    pub pickup: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    #[param(value_type = String, format = Date)]
    pub dropoff: NaiveDate,
}

/// List cars, optionally only those still available for a date range
#[utoipa::path(
    get,
    path = "/cars",
    tag = "cars",
    params(CarQuery),
    responses(
        (status = 200, description = "Cars ordered by id", body = Vec<Car>),
        (status = 400, description = "Drop-off before pick-up")
    )
)]
pub async fn list_cars(
    State(state): State<AppState>,
    Query(query): Query<CarQuery>,
) -> AppResult<Json<Vec<Car>>> {
    let cars = state.services.catalog.list(&query).await?;
    Ok(Json(cars))
}

/// Distinct car types
#[utoipa::path(
    get,
    path = "/cars/types",
    tag = "cars",
    responses(
        (status = 200, description = "Each type once, sorted", body = Vec<String>)
    )
)]
pub async fn list_types(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let types = state.services.catalog.types().await?;
    Ok(Json(types))
}

/// Get a car by id
#[utoipa::path(
    get,
    path = "/cars/{id}",
    tag = "cars",
    params(
        ("id" = i32, Path, description = "Car ID")
    ),
    responses(
        (status = 200, description = "Car details", body = Car),
        (status = 404, description = "Car not found")
    )
)]
pub async fn get_car(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Car>> {
    let car = state.services.catalog.get(id).await?;
    Ok(Json(car))
}

/// Price and availability of a car for a date range
#[utoipa::path(
    get,
    path = "/cars/{id}/quote",
    tag = "cars",
    params(
        ("id" = i32, Path, description = "Car ID"),
        QuoteQuery
    ),
    responses(
        (status = 200, description = "Rental quote", body = Quote),
        (status = 400, description = "Drop-off before pick-up"),
        (status = 404, description = "Car not found")
    )
)]
pub async fn quote(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<QuoteQuery>,
) -> AppResult<Json<Quote>> {
    let range = DateRange::new(query.pickup, query.dropoff)?;
    let quote = state.services.catalog.quote(id, range).await?;
    Ok(Json(quote))
}

/// Add a car to the fleet
#[utoipa::path(
    post,
    path = "/cars",
    tag = "cars",
    security(("bearer_auth" = [])),
    request_body = CreateCar,
    responses(
        (status = 201, description = "Car created", body = CarResponse),
        (status = 400, description = "Invalid car"),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Car id already used")
    )
)]
pub async fn create_car(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
    Json(data): Json<CreateCar>,
) -> AppResult<(StatusCode, Json<CarResponse>)> {
    let car = state.services.catalog.create(&data).await?;
    Ok((
        StatusCode::CREATED,
        Json(CarResponse {
            success: true,
            message: "Car added successfully".to_string(),
            car,
        }),
    ))
}

/// Update a car
#[utoipa::path(
    patch,
    path = "/cars/{id}",
    tag = "cars",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Car ID")
    ),
    request_body = UpdateCar,
    responses(
        (status = 200, description = "Car updated", body = CarResponse),
        (status = 400, description = "Invalid values"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Car not found")
    )
)]
pub async fn update_car(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
    Path(id): Path<i32>,
    Json(data): Json<UpdateCar>,
) -> AppResult<Json<CarResponse>> {
    let car = state.services.catalog.update(id, &data).await?;
    Ok(Json(CarResponse {
        success: true,
        message: "Car updated successfully".to_string(),
        car,
    }))
}

/// Remove a car from the fleet
#[utoipa::path(
    delete,
    path = "/cars/{id}",
    tag = "cars",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Car ID")
    ),
    responses(
        (status = 204, description = "Car deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Car not found")
    )
)]
pub async fn delete_car(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
