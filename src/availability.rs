//! Booking availability rules
//!
//! A car has `stock` interchangeable units. A date range is bookable while
//! fewer than `stock` Approved bookings on that car overlap it. Ranges are
//! closed on both ends, so a booking that ends on the day another begins
//! still holds the unit for that day.

use crate::models::{
    booking::Booking,
    car::Car,
    dates::DateRange,
};

/// Message returned when a range is fully booked
pub const FULLY_BOOKED: &str =
    "Sorry, this car is fully booked for the selected dates. Please try another date range.";

/// Inclusive overlap: neither range starts after the other ends
pub fn overlaps(a: &DateRange, b: &DateRange) -> bool {
    a.start <= b.end && a.end >= b.start
}

/// Number of Approved bookings on `car_id` overlapping `range`
pub fn occupancy(car_id: i32, range: &DateRange, bookings: &[Booking]) -> usize {
    bookings
        .iter()
        .filter(|b| b.car_id == car_id && b.status.consumes_stock())
        .filter(|b| overlaps(&b.range(), range))
        .count()
}

/// Whether another unit can be handed out
pub fn has_capacity(occupied: usize, stock: i32) -> bool {
    i64::try_from(occupied).is_ok_and(|n| n < i64::from(stock))
}

/// Whether replacing `current` by `next` can take an extra unit: the booking
/// becomes Approved, or an Approved booking moves to other dates
pub fn needs_capacity_check(current: &Booking, next: &Booking) -> bool {
    next.status.consumes_stock()
        && (!current.status.consumes_stock() || next.range() != current.range())
}

pub fn is_available(car: &Car, range: &DateRange, bookings: &[Booking]) -> bool {
    has_capacity(occupancy(car.id, range, bookings), car.stock)
}

/// Keep the cars that still have a free unit for `range`, in input order
pub fn filter_available(cars: Vec<Car>, range: &DateRange, bookings: &[Booking]) -> Vec<Car> {
    cars.into_iter()
        .filter(|car| is_available(car, range, bookings))
        .collect()
}

/// Billed rental days; a same-day rental counts as one day
pub fn rental_days(range: &DateRange) -> i64 {
    (range.end - range.start).num_days().max(1)
}
