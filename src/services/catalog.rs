//! Fleet catalog service

use std::sync::Arc;

use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    availability,
    error::{AppError, AppResult},
    models::{
        car::{Car, CarQuery, CreateCar, Quote, UpdateCar},
        dates::DateRange,
    },
    repository::{BookingStore, CarStore},
};

#[derive(Clone)]
pub struct CatalogService {
    cars: Arc<dyn CarStore>,
    bookings: Arc<dyn BookingStore>,
}

impl CatalogService {
    pub fn new(cars: Arc<dyn CarStore>, bookings: Arc<dyn BookingStore>) -> Self {
        Self { cars, bookings }
    }

    /// List cars matching the query; with both dates set, only cars that
    /// still have a free unit for that range are returned
    pub async fn list(&self, query: &CarQuery) -> AppResult<Vec<Car>> {
        let cars: Vec<Car> = self
            .cars
            .list()
            .await?
            .into_iter()
            .filter(|car| query.matches(car))
            .collect();

        match query.date_range()? {
            Some(range) => {
                let held = self.bookings.approved_overlapping(range).await?;
                Ok(availability::filter_available(cars, &range, &held))
            }
            None => Ok(cars),
        }
    }

    pub async fn types(&self) -> AppResult<Vec<String>> {
        self.cars.types().await
    }

    pub async fn get(&self, id: i32) -> AppResult<Car> {
        self.cars
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))
    }

    pub async fn create(&self, data: &CreateCar) -> AppResult<Car> {
        data.validate()?;
        let car = self.cars.create(data).await?;
        tracing::info!(car_id = car.id, "Car {} added to the fleet", car.name);
        Ok(car)
    }

    pub async fn update(&self, id: i32, data: &UpdateCar) -> AppResult<Car> {
        data.validate()?;
        self.cars
            .update(id, data)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.cars.delete(id).await? {
            return Err(AppError::NotFound("Car not found".to_string()));
        }
        tracing::info!(car_id = id, "Car removed from the fleet");
        Ok(())
    }

    /// Price and availability for renting a car over `range`
    pub async fn quote(&self, id: i32, range: DateRange) -> AppResult<Quote> {
        let car = self.get(id).await?;
        let held = self.bookings.approved_overlapping(range).await?;
        let days = availability::rental_days(&range);
        Ok(Quote {
            car_id: car.id,
            start_date: range.start,
            end_date: range.end,
            rental_days: days,
            price_per_day: car.price_per_day,
            total_cost: car.price_per_day * Decimal::from(days),
            available: availability::is_available(&car, &range, &held),
        })
    }

    /// Insert the seed fleet when the catalog is empty; returns cars inserted
    pub async fn seed_if_empty(&self, fleet: &[CreateCar]) -> AppResult<usize> {
        if self.cars.count().await? > 0 {
            return Ok(0);
        }
        tracing::info!("No cars found. Seeding {} initial cars", fleet.len());
        for car in fleet {
            self.create(car).await?;
        }
        Ok(fleet.len())
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.cars.ping().await
    }
}
