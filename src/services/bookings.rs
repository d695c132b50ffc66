//! Booking management service

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    availability,
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingStatus, CreateBooking, UpdateBooking},
        car::Car,
        dates::DateRange,
    },
    repository::{BookingStore, CarStore},
};

#[derive(Clone)]
pub struct BookingsService {
    cars: Arc<dyn CarStore>,
    bookings: Arc<dyn BookingStore>,
}

impl BookingsService {
    pub fn new(cars: Arc<dyn CarStore>, bookings: Arc<dyn BookingStore>) -> Self {
        Self { cars, bookings }
    }

    async fn car(&self, id: i32) -> AppResult<Car> {
        self.cars
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found.".to_string()))
    }

    /// Whether `car_id` still has a free unit for `range`
    pub async fn is_available(&self, car_id: i32, range: DateRange) -> AppResult<bool> {
        let car = self.car(car_id).await?;
        let held = self.bookings.approved_overlapping(range).await?;
        Ok(availability::is_available(&car, &range, &held))
    }

    /// Record a new Pending booking if the car is not fully booked
    pub async fn create(&self, data: CreateBooking) -> AppResult<Booking> {
        data.validate()?;
        let range = data.range()?;
        let car = self.car(data.car_id).await?;

        let total_cost = data.total_cost.unwrap_or_else(|| {
            car.price_per_day * Decimal::from(availability::rental_days(&range))
        });

        let booking = Booking {
            id: Uuid::new_v4(),
            car_id: car.id,
            car_name: data.car_name.unwrap_or_else(|| car.name.clone()),
            user_name: data.user_name,
            user_email: data.user_email,
            start_date: range.start,
            end_date: range.end,
            total_cost,
            location: data.location,
            booking_date: Utc::now(),
            status: BookingStatus::Pending,
        };

        let created = self
            .bookings
            .insert_within_capacity(&booking, car.stock)
            .await?;
        tracing::info!(
            booking_id = %created.id,
            car_id = created.car_id,
            "Booking received for {} to {}",
            created.start_date,
            created.end_date
        );
        Ok(created)
    }

    /// All bookings, newest first
    pub async fn list(&self) -> AppResult<Vec<Booking>> {
        self.bookings.list().await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Booking> {
        self.bookings
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }

    /// Apply an admin edit. Status changes follow the booking state machine
    /// and are checked against the stored status at write time; a booking
    /// that is (or becomes) Approved must fit within the car's stock for its
    /// dates.
    pub async fn update(&self, id: Uuid, data: UpdateBooking) -> AppResult<Booking> {
        data.validate()?;
        // car_id never changes, so the car can be looked up before the write
        let car_id = self.get(id).await?.car_id;
        let stock = self.cars.get(car_id).await?.map(|car| car.stock);

        let (before, updated) = self
            .bookings
            .apply_update(id, &data, stock)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if updated.status != before.status {
            tracing::info!(
                booking_id = %updated.id,
                "Booking moved from {} to {}",
                before.status,
                updated.status
            );
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.bookings.delete(id).await? {
            return Err(AppError::NotFound("Booking not found".to_string()));
        }
        tracing::info!(booking_id = %id, "Booking deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockBookingStore, MockCarStore};
    use chrono::NaiveDate;
    use mockall::predicate::{always, eq};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn mustang(stock: i32) -> Car {
        Car {
            id: 3,
            name: "Ford Mustang".into(),
            car_type: Some("Luxury".into()),
            passengers: Some(2),
            luggage: Some(1),
            transmission: Some("Automatic".into()),
            price_per_day: Decimal::new(4500, 0),
            image_url: None,
            stock,
        }
    }

    fn request(start: &str, end: &str) -> CreateBooking {
        CreateBooking {
            car_id: 3,
            car_name: None,
            user_name: "Asha".into(),
            user_email: "asha@example.com".into(),
            start_date: day(start),
            end_date: day(end),
            total_cost: None,
            location: Some("Mall of Jaipur".into()),
        }
    }

    fn stored(status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            car_id: 3,
            car_name: "Ford Mustang".into(),
            user_name: "Asha".into(),
            user_email: "asha@example.com".into(),
            start_date: day("2025-06-01"),
            end_date: day("2025-06-03"),
            total_cost: Decimal::new(9000, 0),
            location: None,
            booking_date: Utc::now(),
            status,
        }
    }

    fn service(cars: MockCarStore, bookings: MockBookingStore) -> BookingsService {
        BookingsService::new(Arc::new(cars), Arc::new(bookings))
    }

    #[tokio::test]
    async fn test_create_stores_pending_booking_with_car_stock() {
        let mut cars = MockCarStore::new();
        cars.expect_get().with(eq(3)).returning(|_| Ok(Some(mustang(2))));
        let mut bookings = MockBookingStore::new();
        bookings
            .expect_insert_within_capacity()
            .withf(|b, stock| *stock == 2 && b.status == BookingStatus::Pending)
            .times(1)
            .returning(|b, _| Ok(b.clone()));

        let created = service(cars, bookings)
            .create(request("2025-06-01", "2025-06-01"))
            .await
            .unwrap();
        assert_eq!(created.car_name, "Ford Mustang");
        // same-day rental bills one day
        assert_eq!(created.total_cost, Decimal::new(4500, 0));
        assert_eq!(created.location.as_deref(), Some("Mall of Jaipur"));
    }

    #[tokio::test]
    async fn test_create_keeps_client_total() {
        let mut cars = MockCarStore::new();
        cars.expect_get().returning(|_| Ok(Some(mustang(1))));
        let mut bookings = MockBookingStore::new();
        bookings
            .expect_insert_within_capacity()
            .returning(|b, _| Ok(b.clone()));

        let mut data = request("2025-06-01", "2025-06-04");
        data.total_cost = Some(Decimal::new(14000, 0));
        let created = service(cars, bookings).create(data).await.unwrap();
        assert_eq!(created.total_cost, Decimal::new(14000, 0));
    }

    #[tokio::test]
    async fn test_create_unknown_car_is_not_found() {
        let mut cars = MockCarStore::new();
        cars.expect_get().returning(|_| Ok(None));
        let mut bookings = MockBookingStore::new();
        bookings.expect_insert_within_capacity().never();

        let err = service(cars, bookings)
            .create(request("2025-06-01", "2025-06-03"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_reversed_dates_is_validation_error() {
        let mut cars = MockCarStore::new();
        cars.expect_get().never();
        let err = service(cars, MockBookingStore::new())
            .create(request("2025-06-05", "2025-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_propagates_conflict() {
        let mut cars = MockCarStore::new();
        cars.expect_get().returning(|_| Ok(Some(mustang(1))));
        let mut bookings = MockBookingStore::new();
        bookings
            .expect_insert_within_capacity()
            .returning(|_, _| Err(AppError::Conflict(availability::FULLY_BOOKED.to_string())));

        let err = service(cars, bookings)
            .create(request("2025-06-01", "2025-06-03"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_passes_car_stock_to_store() {
        let current = stored(BookingStatus::Pending);
        let id = current.id;
        let mut cars = MockCarStore::new();
        cars.expect_get().with(eq(3)).returning(|_| Ok(Some(mustang(1))));
        let mut bookings = MockBookingStore::new();
        bookings
            .expect_get()
            .with(eq(id))
            .returning(move |_| Ok(Some(current.clone())));
        bookings
            .expect_apply_update()
            .withf(move |booking_id, patch, stock| {
                *booking_id == id
                    && patch.status == Some(BookingStatus::Approved)
                    && *stock == Some(1)
            })
            .times(1)
            .returning(|_, _, _| Err(AppError::Conflict(availability::FULLY_BOOKED.to_string())));

        let patch = UpdateBooking {
            status: Some(BookingStatus::Approved),
            ..Default::default()
        };
        let err = service(cars, bookings).update(id, patch).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_of_booking_for_removed_car() {
        let current = stored(BookingStatus::Approved);
        let id = current.id;
        let mut cars = MockCarStore::new();
        cars.expect_get().returning(|_| Ok(None));
        let mut bookings = MockBookingStore::new();
        let before = current.clone();
        bookings
            .expect_get()
            .returning(move |_| Ok(Some(current.clone())));
        bookings
            .expect_apply_update()
            .with(always(), always(), eq(None))
            .returning(move |_, patch, _| {
                let after = patch.merge_into(&before)?;
                Ok(Some((before.clone(), after)))
            });

        let patch = UpdateBooking {
            status: Some(BookingStatus::Completed),
            ..Default::default()
        };
        let updated = service(cars, bookings).update(id, patch).await.unwrap();
        assert_eq!(updated.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_unknown_booking_never_writes() {
        let mut bookings = MockBookingStore::new();
        bookings.expect_get().returning(|_| Ok(None));
        bookings.expect_apply_update().never();

        let err = service(MockCarStore::new(), bookings)
            .update(Uuid::new_v4(), UpdateBooking::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_patch_before_store() {
        let mut bookings = MockBookingStore::new();
        bookings.expect_get().never();

        let patch = UpdateBooking {
            user_email: Some("nope".into()),
            ..Default::default()
        };
        let err = service(MockCarStore::new(), bookings)
            .update(Uuid::new_v4(), patch)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_booking_is_not_found() {
        let mut bookings = MockBookingStore::new();
        bookings.expect_delete().returning(|_| Ok(false));
        let err = service(MockCarStore::new(), bookings)
            .delete(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_pending_bookings_do_not_block_availability() {
        let mut cars = MockCarStore::new();
        cars.expect_get().returning(|_| Ok(Some(mustang(1))));
        let mut bookings = MockBookingStore::new();
        // the store only hands back Approved rows; three Pending ones leave nothing
        bookings.expect_approved_overlapping().returning(|_| Ok(vec![]));

        let range = DateRange::new(day("2025-06-01"), day("2025-06-03")).unwrap();
        assert!(service(cars, bookings).is_available(3, range).await.unwrap());
    }
}
