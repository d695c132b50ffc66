//! Booking endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::booking::{Booking, CreateBooking, UpdateBooking},
    AppState,
};

use super::AdminSession;

/// Response returned when a booking request is accepted
#[derive(Serialize, ToSchema)]
pub struct BookingConfirmation {
    pub success: bool,
    pub message: String,
    pub booking: Booking,
}

/// Response returned after an admin edit
#[derive(Serialize, ToSchema)]
pub struct BookingResponse {
    pub success: bool,
    pub booking: Booking,
}

/// Request a booking
///
/// The booking starts as Pending. It is refused with 409 when the car's
/// Approved bookings already use all of its stock for an overlapping range.
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking recorded", body = BookingConfirmation),
        (status = 400, description = "Invalid booking"),
        (status = 404, description = "Car not found"),
        (status = 409, description = "Car fully booked for the dates", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(data): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingConfirmation>)> {
    let booking = state.services.bookings.create(data).await?;
    Ok((
        StatusCode::CREATED,
        Json(BookingConfirmation {
            success: true,
            message: "Booking confirmed successfully!".to_string(),
            booking,
        }),
    ))
}

/// List all bookings, newest first
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All bookings", body = Vec<Booking>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state.services.bookings.list().await?;
    Ok(Json(bookings))
}

/// Get a booking by id
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking details", body = Booking),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = state.services.bookings.get(id).await?;
    Ok(Json(booking))
}

/// Edit a booking or move it through its lifecycle
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    request_body = UpdateBooking,
    responses(
        (status = 200, description = "Booking updated", body = BookingResponse),
        (status = 400, description = "Invalid values or status transition"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Approval would exceed stock")
    )
)]
pub async fn update_booking(
    State(state): State<AppState>,
    AdminSession(claims): AdminSession,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateBooking>,
) -> AppResult<Json<BookingResponse>> {
    tracing::debug!(admin = %claims.sub, booking_id = %id, "Updating booking");
    let booking = state.services.bookings.update(id, data).await?;
    Ok(Json(BookingResponse {
        success: true,
        booking,
    }))
}

/// Delete a booking
#[utoipa::path(
    delete,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.bookings.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
