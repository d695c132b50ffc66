//! Momentum Rides car rental marketplace
//!
//! REST JSON API for browsing a rental fleet, requesting bookings and
//! managing them from the admin console. The core rule is that a car is
//! never approved for more overlapping rentals than it has units in stock.

use std::sync::Arc;

pub mod api;
pub mod availability;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
