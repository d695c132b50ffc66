//! Car (fleet catalog) model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::dates::{deserialize_optional_date, DateRange};
use crate::error::AppResult;

/// Car record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Car {
    /// Human-assigned identifier
    pub id: i32,
    pub name: String,
    /// Free-text category (Luxury, SUV, ...)
    #[serde(rename = "type")]
    pub car_type: Option<String>,
    pub passengers: Option<i32>,
    pub luggage: Option<i32>,
    pub transmission: Option<String>,
    #[schema(value_type = f64)]
    pub price_per_day: Decimal,
    pub image_url: Option<String>,
    /// Number of physical units that can be rented at the same time
    pub stock: i32,
}

fn default_stock() -> i32 {
    1
}

pub(crate) fn positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_positive() && !price.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("positive_price")
            .with_message("Price per day must be positive".into()))
    }
}

/// Create car request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCar {
    #[validate(range(min = 1, message = "Car id must be a positive integer"))]
    pub id: i32,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(rename = "type")]
    pub car_type: Option<String>,
    #[validate(range(min = 0))]
    pub passengers: Option<i32>,
    #[validate(range(min = 0))]
    pub luggage: Option<i32>,
    pub transmission: Option<String>,
    #[validate(custom(function = "positive_price"))]
    #[schema(value_type = f64)]
    pub price_per_day: Decimal,
    pub image_url: Option<String>,
    #[serde(default = "default_stock")]
    #[validate(range(min = 1, message = "Stock must be at least 1"))]
    pub stock: i32,
}

impl From<CreateCar> for Car {
    fn from(data: CreateCar) -> Self {
        Self {
            id: data.id,
            name: data.name,
            car_type: data.car_type,
            passengers: data.passengers,
            luggage: data.luggage,
            transmission: data.transmission,
            price_per_day: data.price_per_day,
            image_url: data.image_url,
            stock: data.stock,
        }
    }
}

/// Update car request (the id itself is immutable)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCar {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub car_type: Option<String>,
    #[validate(range(min = 0))]
    pub passengers: Option<i32>,
    #[validate(range(min = 0))]
    pub luggage: Option<i32>,
    pub transmission: Option<String>,
    #[validate(custom(function = "positive_price"))]
    #[schema(value_type = Option<f64>)]
    pub price_per_day: Option<Decimal>,
    pub image_url: Option<String>,
    #[validate(range(min = 1, message = "Stock must be at least 1"))]
    pub stock: Option<i32>,
}

impl UpdateCar {
    /// Apply the provided fields onto an existing car
    pub fn apply_to(&self, car: &mut Car) {
        if let Some(ref name) = self.name {
            car.name = name.clone();
        }
        if self.car_type.is_some() {
            car.car_type = self.car_type.clone();
        }
        if self.passengers.is_some() {
            car.passengers = self.passengers;
        }
        if self.luggage.is_some() {
            car.luggage = self.luggage;
        }
        if self.transmission.is_some() {
            car.transmission = self.transmission.clone();
        }
        if let Some(price) = self.price_per_day {
            car.price_per_day = price;
        }
        if self.image_url.is_some() {
            car.image_url = self.image_url.clone();
        }
        if let Some(stock) = self.stock {
            car.stock = stock;
        }
    }
}

/// Fleet listing filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CarQuery {
    /// Requested pick-up date
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[param(value_type = Option<String>, format = Date)]
    pub pickup: Option<NaiveDate>,
    /// Requested drop-off date
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[param(value_type = Option<String>, format = Date)]
    pub dropoff: Option<NaiveDate>,
    /// Car types, comma separated (`SUV,Luxury`); any one may match
    #[serde(rename = "type")]
    pub car_type: Option<String>,
    /// Transmissions, comma separated; any one may match
    pub transmission: Option<String>,
    /// Maximum price per day (inclusive)
    #[param(value_type = Option<f64>)]
    pub max_price: Option<Decimal>,
}

impl CarQuery {
    /// Date range to filter on, present only when both dates were given
    pub fn date_range(&self) -> AppResult<Option<DateRange>> {
        DateRange::from_optional(self.pickup, self.dropoff)
    }

    /// Attribute filters (type, transmission, price)
    pub fn matches(&self, car: &Car) -> bool {
        let type_ok = any_of(self.car_type.as_deref(), car.car_type.as_deref());
        let transmission_ok = any_of(self.transmission.as_deref(), car.transmission.as_deref());
        let price_ok = self.max_price.map_or(true, |max| car.price_per_day <= max);
        type_ok && transmission_ok && price_ok
    }
}

/// `true` when no filter is given, or the value equals one of its
/// comma-separated entries. Blank entries are ignored.
fn any_of(filter: Option<&str>, value: Option<&str>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    let mut wanted = filter.split(',').map(str::trim).filter(|t| !t.is_empty()).peekable();
    if wanted.peek().is_none() {
        return true;
    }
    value.is_some_and(|value| wanted.any(|t| t == value))
}

/// Price quote for a rental
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub car_id: i32,
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    pub rental_days: i64,
    #[schema(value_type = f64)]
    pub price_per_day: Decimal,
    #[schema(value_type = f64)]
    pub total_cost: Decimal,
    pub available: bool,
}
