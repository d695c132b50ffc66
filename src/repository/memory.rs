//! In-memory storage backend
//!
//! Used for local development (`storage.backend = "memory"`) and tests.
//! Capacity checks and writes happen under the bookings write lock, which
//! gives the same per-car atomicity as the advisory lock in PostgreSQL.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BookingStore, CarStore};
use crate::{
    availability::{self, FULLY_BOOKED},
    error::{AppError, AppResult},
    models::{
        booking::{Booking, UpdateBooking},
        car::{Car, CreateCar, UpdateCar},
        dates::DateRange,
    },
};

#[derive(Default)]
pub struct MemoryStore {
    cars: RwLock<BTreeMap<i32, Car>>,
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_capacity(bookings: &[Booking], candidate: &Booking, stock: i32) -> AppResult<()> {
    let range = candidate.range();
    let others: Vec<Booking> = bookings
        .iter()
        .filter(|b| b.id != candidate.id)
        .cloned()
        .collect();
    let occupied = availability::occupancy(candidate.car_id, &range, &others);
    if availability::has_capacity(occupied, stock) {
        Ok(())
    } else {
        Err(AppError::Conflict(FULLY_BOOKED.to_string()))
    }
}

#[async_trait]
impl CarStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Car>> {
        Ok(self.cars.read().await.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> AppResult<Option<Car>> {
        Ok(self.cars.read().await.get(&id).cloned())
    }

    async fn types(&self) -> AppResult<Vec<String>> {
        let cars = self.cars.read().await;
        let types: BTreeSet<String> = cars
            .values()
            .filter_map(|c| c.car_type.clone())
            .filter(|t| !t.is_empty())
            .collect();
        Ok(types.into_iter().collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(i64::try_from(self.cars.read().await.len()).unwrap_or(i64::MAX))
    }

    async fn create(&self, data: &CreateCar) -> AppResult<Car> {
        let mut cars = self.cars.write().await;
        if cars.contains_key(&data.id) {
            return Err(AppError::Conflict(format!(
                "A car with id {} already exists",
                data.id
            )));
        }
        let car = Car::from(data.clone());
        cars.insert(car.id, car.clone());
        Ok(car)
    }

    async fn update(&self, id: i32, data: &UpdateCar) -> AppResult<Option<Car>> {
        let mut cars = self.cars.write().await;
        Ok(cars.get_mut(&id).map(|car| {
            data.apply_to(car);
            car.clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        Ok(self.cars.write().await.remove(&id).is_some())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Booking>> {
        let mut rows = self.bookings.read().await.clone();
        rows.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self
            .bookings
            .read()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn approved_overlapping(&self, range: DateRange) -> AppResult<Vec<Booking>> {
        Ok(self
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| b.status.consumes_stock() && availability::overlaps(&b.range(), &range))
            .cloned()
            .collect())
    }

    async fn insert_within_capacity(&self, booking: &Booking, stock: i32) -> AppResult<Booking> {
        let mut bookings = self.bookings.write().await;
        check_capacity(&bookings, booking, stock)?;
        bookings.push(booking.clone());
        Ok(booking.clone())
    }

    async fn apply_update(
        &self,
        id: Uuid,
        patch: &UpdateBooking,
        stock: Option<i32>,
    ) -> AppResult<Option<(Booking, Booking)>> {
        let mut bookings = self.bookings.write().await;
        let Some(index) = bookings.iter().position(|b| b.id == id) else {
            return Ok(None);
        };

        let current = bookings[index].clone();
        let next = patch.merge_into(&current)?;
        if availability::needs_capacity_check(&current, &next) {
            let stock = stock.ok_or_else(|| AppError::NotFound("Car not found.".to_string()))?;
            check_capacity(&bookings, &next, stock)?;
        }

        bookings[index] = next.clone();
        Ok(Some((current, next)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut bookings = self.bookings.write().await;
        let before = bookings.len();
        bookings.retain(|b| b.id != id);
        Ok(bookings.len() < before)
    }
}
