//! API handlers for the Momentum Rides REST endpoints

pub mod auth;
pub mod bookings;
pub mod cars;
pub mod health;
pub mod locations;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::session::AdminClaims, AppState};

/// Extractor for an authenticated admin session from the JWT bearer token
pub struct AdminSession(pub AdminClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = state.services.auth.verify(token)?;
        Ok(AdminSession(claims))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Admin session
        .route("/login", post(auth::login))
        // Fleet
        .route("/cars", get(cars::list_cars).post(cars::create_car))
        .route("/cars/types", get(cars::list_types))
        .route(
            "/cars/:id",
            get(cars::get_car)
                .patch(cars::update_car)
                .delete(cars::delete_car),
        )
        .route("/cars/:id/quote", get(cars::quote))
        // Storefront
        .route("/locations", get(locations::list_locations))
        // Bookings
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/bookings/:id",
            get(bookings::get_booking)
                .patch(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
