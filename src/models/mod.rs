//! Data models for Momentum Rides

pub mod booking;
pub mod car;
pub mod dates;
pub mod session;

// Re-export commonly used types
pub use booking::{Booking, BookingStatus, CreateBooking, UpdateBooking};
pub use car::{Car, CarQuery, CreateCar, Quote, UpdateCar};
pub use dates::DateRange;
pub use session::AdminClaims;
