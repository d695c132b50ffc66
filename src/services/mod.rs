//! Business logic services

pub mod auth;
pub mod bookings;
pub mod catalog;

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    repository::{BookingStore, CarStore},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub bookings: bookings::BookingsService,
}

impl Services {
    /// Create all services over the given stores
    pub fn new(
        cars: Arc<dyn CarStore>,
        bookings: Arc<dyn BookingStore>,
        auth_config: AuthConfig,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(auth_config),
            catalog: catalog::CatalogService::new(cars.clone(), bookings.clone()),
            bookings: bookings::BookingsService::new(cars, bookings),
        }
    }
}
