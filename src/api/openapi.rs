//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, bookings, cars, health, locations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Momentum Rides API",
        version = "1.0.0",
        description = "Car rental marketplace REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        // Cars
        cars::list_cars,
        cars::list_types,
        cars::get_car,
        cars::quote,
        cars::create_car,
        cars::update_car,
        cars::delete_car,
        // Locations
        locations::list_locations,
        // Bookings
        bookings::create_booking,
        bookings::list_bookings,
        bookings::get_booking,
        bookings::update_booking,
        bookings::delete_booking,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Cars
            crate::models::car::Car,
            crate::models::car::CreateCar,
            crate::models::car::UpdateCar,
            crate::models::car::Quote,
            cars::CarResponse,
            // Bookings
            crate::models::booking::Booking,
            crate::models::booking::BookingStatus,
            crate::models::booking::CreateBooking,
            crate::models::booking::UpdateBooking,
            bookings::BookingConfirmation,
            bookings::BookingResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Admin session"),
        (name = "cars", description = "Fleet catalog"),
        (name = "locations", description = "Pick-up locations"),
        (name = "bookings", description = "Booking requests and their lifecycle")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by admin endpoints
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
