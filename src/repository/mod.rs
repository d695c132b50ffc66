//! Repository layer: storage traits and their backends

pub mod bookings;
pub mod cars;
pub mod memory;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        booking::{Booking, UpdateBooking},
        car::{Car, CreateCar, UpdateCar},
        dates::DateRange,
    },
};

pub use memory::MemoryStore;

/// Fleet catalog storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarStore: Send + Sync {
    /// All cars ordered by id
    async fn list(&self) -> AppResult<Vec<Car>>;

    async fn get(&self, id: i32) -> AppResult<Option<Car>>;

    /// Distinct non-empty car types, sorted
    async fn types(&self) -> AppResult<Vec<String>>;

    async fn count(&self) -> AppResult<i64>;

    /// Insert a car; fails with Conflict when the id is taken
    async fn create(&self, data: &CreateCar) -> AppResult<Car>;

    async fn update(&self, id: i32, data: &UpdateCar) -> AppResult<Option<Car>>;

    /// Returns false when no car had this id
    async fn delete(&self, id: i32) -> AppResult<bool>;

    /// Connectivity check for readiness probes
    async fn ping(&self) -> AppResult<()>;
}

/// Booking storage
///
/// `insert_within_capacity` and `apply_update` run the capacity check and the
/// write as one atomic unit per car, so concurrent requests for the last unit
/// cannot both succeed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// All bookings, newest booking date first
    async fn list(&self) -> AppResult<Vec<Booking>>;

    async fn get(&self, id: Uuid) -> AppResult<Option<Booking>>;

    /// Approved bookings (any car) overlapping `range`
    async fn approved_overlapping(&self, range: DateRange) -> AppResult<Vec<Booking>>;

    /// Insert `booking` unless `stock` Approved bookings on its car already
    /// overlap its range (Conflict)
    async fn insert_within_capacity(&self, booking: &Booking, stock: i32) -> AppResult<Booking>;

    /// Apply an admin edit to the stored booking.
    ///
    /// The current row is read, merged with `patch` (status state machine
    /// included) and written back under the same lock, so concurrent edits
    /// always see each other's result. When the edit takes a unit of stock
    /// the capacity check runs in that unit too; `stock` is the car's stock,
    /// or `None` when the car no longer exists. Returns the booking before
    /// and after the edit, or `None` when no booking has this id.
    async fn apply_update(
        &self,
        id: Uuid,
        patch: &UpdateBooking,
        stock: Option<i32>,
    ) -> AppResult<Option<(Booking, Booking)>>;

    /// Returns false when no booking had this id
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}
