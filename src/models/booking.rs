//! Booking (reservation) model, status state machine and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::dates::{deserialize_date, deserialize_optional_date, DateRange};
use crate::error::{AppError, AppResult};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Declined,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Approved => "Approved",
            BookingStatus::Declined => "Declined",
            BookingStatus::Completed => "Completed",
        }
    }

    /// Whether the status holds a unit of stock
    pub fn consumes_stock(&self) -> bool {
        matches!(self, BookingStatus::Approved)
    }

    /// Allowed moves: Pending -> Approved | Declined, Approved -> Completed.
    /// Re-asserting the current status is accepted as a no-op.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        *self == next
            || matches!(
                (self, next),
                (Pending, Approved) | (Pending, Declined) | (Approved, Completed)
            )
    }

    pub fn transition_to(self, next: BookingStatus) -> AppResult<BookingStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::InvalidTransition(format!(
                "Cannot move a booking from {} to {}",
                self, next
            )))
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "declined" => Ok(BookingStatus::Declined),
            "completed" => Ok(BookingStatus::Completed),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

// SQLx conversion for BookingStatus (stored as TEXT)
impl sqlx::Type<Postgres> for BookingStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookingStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookingStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Booking record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    /// Referenced car id (not enforced as a foreign key)
    pub car_id: i32,
    /// Car name captured when the booking was made
    pub car_name: String,
    pub user_name: String,
    pub user_email: String,
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    #[schema(value_type = f64)]
    pub total_cost: Decimal,
    pub location: Option<String>,
    /// Server-assigned creation timestamp
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
}

impl Booking {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("not_blank").with_message("Name is required".into()))
    } else {
        Ok(())
    }
}

/// Tells an explicit `null` (Some(None)) apart from an absent field (None)
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn non_negative_cost(cost: &Decimal) -> Result<(), ValidationError> {
    if cost.is_sign_negative() && !cost.is_zero() {
        Err(ValidationError::new("non_negative_cost")
            .with_message("Total cost cannot be negative".into()))
    } else {
        Ok(())
    }
}

/// Create booking request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub car_id: i32,
    /// Defaults to the car's current name
    pub car_name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub user_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub user_email: String,
    #[serde(deserialize_with = "deserialize_date")]
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    /// Computed by the client; derived from the daily price when omitted
    #[validate(custom(function = "non_negative_cost"))]
    #[schema(value_type = Option<f64>)]
    pub total_cost: Option<Decimal>,
    pub location: Option<String>,
}

impl CreateBooking {
    pub fn range(&self) -> AppResult<DateRange> {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// Partial booking update (admin)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBooking {
    #[validate(custom(function = "not_blank"))]
    pub user_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub user_email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    /// `null` clears the pick-up location
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>, nullable)]
    pub location: Option<Option<String>>,
    #[validate(custom(function = "non_negative_cost"))]
    #[schema(value_type = Option<f64>)]
    pub total_cost: Option<Decimal>,
    pub status: Option<BookingStatus>,
}

impl UpdateBooking {
    /// Produce the updated booking, enforcing the status state machine and
    /// the date ordering of the merged result.
    pub fn merge_into(&self, current: &Booking) -> AppResult<Booking> {
        let mut next = current.clone();
        if let Some(ref name) = self.user_name {
            next.user_name = name.clone();
        }
        if let Some(ref email) = self.user_email {
            next.user_email = email.clone();
        }
        if let Some(start) = self.start_date {
            next.start_date = start;
        }
        if let Some(end) = self.end_date {
            next.end_date = end;
        }
        if let Some(ref location) = self.location {
            next.location = location.clone();
        }
        if let Some(cost) = self.total_cost {
            next.total_cost = cost;
        }
        if let Some(status) = self.status {
            next.status = current.status.transition_to(status)?;
        }
        DateRange::new(next.start_date, next.end_date)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn pending() -> Booking {
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
            status: BookingStatus::Pending,
        }
    }

    #[test]
    fn test_allowed_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Declined));
        assert!(Approved.can_transition_to(Completed));
        assert!(Approved.can_transition_to(Approved));
    }

    #[test]
    fn test_rejected_transitions() {
        use BookingStatus::*;
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Declined.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Completed));
        assert!(matches!(
            Completed.transition_to(Pending),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_only_approved_consumes_stock() {
        assert!(BookingStatus::Approved.consumes_stock());
        assert!(!BookingStatus::Pending.consumes_stock());
        assert!(!BookingStatus::Declined.consumes_stock());
        assert!(!BookingStatus::Completed.consumes_stock());
    }

    #[test]
    fn test_status_parse_and_json() {
        assert_eq!(BookingStatus::from_str("approved").unwrap(), BookingStatus::Approved);
        assert!(BookingStatus::from_str("cancelled").is_err());
        assert_eq!(
            serde_json::to_value(BookingStatus::Declined).unwrap(),
            serde_json::json!("Declined")
        );
    }

    #[test]
    fn test_create_booking_from_storefront_payload() {
        let data: CreateBooking = serde_json::from_value(serde_json::json!({
            "carId": 3,
            "carName": "Ford Mustang",
            "userName": "Asha",
            "userEmail": "asha@example.com",
            "startDate": "2025-06-01",
            "endDate": "2025-06-03T10:00:00.000Z",
            "totalCost": 9000,
            "location": "Mall of Jaipur"
        }))
        .unwrap();
        assert!(data.validate().is_ok());
        assert_eq!(data.end_date, day("2025-06-03"));
        assert_eq!(data.range().unwrap().start, day("2025-06-01"));
    }

    #[test]
    fn test_create_booking_rejects_bad_email() {
        let data: CreateBooking = serde_json::from_value(serde_json::json!({
            "carId": 3,
            "userName": "Asha",
            "userEmail": "not-an-email",
            "startDate": "2025-06-01",
            "endDate": "2025-06-03"
        }))
        .unwrap();
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_merge_applies_fields_and_status() {
        let current = pending();
        let patch = UpdateBooking {
            user_name: Some("Asha R".into()),
            end_date: Some(day("2025-06-04")),
            status: Some(BookingStatus::Approved),
            ..Default::default()
        };
        let next = patch.merge_into(&current).unwrap();
        assert_eq!(next.user_name, "Asha R");
        assert_eq!(next.end_date, day("2025-06-04"));
        assert_eq!(next.status, BookingStatus::Approved);
        assert_eq!(next.id, current.id);
        assert_eq!(next.booking_date, current.booking_date);
    }

    #[test]
    fn test_merge_rejects_reversed_dates() {
        let patch = UpdateBooking {
            start_date: Some(day("2025-06-10")),
            ..Default::default()
        };
        assert!(matches!(
            patch.merge_into(&pending()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_merge_rejects_invalid_transition() {
        let mut current = pending();
        current.status = BookingStatus::Completed;
        let patch = UpdateBooking {
            status: Some(BookingStatus::Pending),
            ..Default::default()
        };
        assert!(patch.merge_into(&current).is_err());
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let data: CreateBooking = serde_json::from_value(serde_json::json!({
            "carId": 3,
            "userName": "   ",
            "userEmail": "asha@example.com",
            "startDate": "2025-06-01",
            "endDate": "2025-06-03"
        }))
        .unwrap();
        assert!(data.validate().is_err());

        let patch = UpdateBooking {
            user_name: Some("\t".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_location_can_be_cleared() {
        let mut current = pending();
        current.location = Some("Mall of Jaipur".into());

        let untouched: UpdateBooking =
            serde_json::from_value(serde_json::json!({ "userName": "Asha R" })).unwrap();
        assert_eq!(
            untouched.merge_into(&current).unwrap().location.as_deref(),
            Some("Mall of Jaipur")
        );

        let cleared: UpdateBooking =
            serde_json::from_value(serde_json::json!({ "location": null })).unwrap();
        assert_eq!(cleared.merge_into(&current).unwrap().location, None);

        let moved: UpdateBooking =
            serde_json::from_value(serde_json::json!({ "location": "Sindhi Camp Bus Station" }))
                .unwrap();
        assert_eq!(
            moved.merge_into(&current).unwrap().location.as_deref(),
            Some("Sindhi Camp Bus Station")
        );
    }
}
