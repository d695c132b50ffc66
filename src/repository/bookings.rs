//! Bookings repository for database operations

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{BookingStore, Repository};
use crate::{
    availability::{self, FULLY_BOOKED},
    error::{AppError, AppResult},
    models::{
        booking::{Booking, UpdateBooking},
        dates::DateRange,
    },
};

const BOOKING_COLUMNS: &str = "id, car_id, car_name, user_name, user_email, start_date, end_date, \
                               total_cost, location, booking_date, status";

impl Repository {
    /// Serialize capacity decisions for one car until the transaction ends
    async fn lock_car(tx: &mut Transaction<'_, Postgres>, car_id: i32) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(i64::from(car_id))
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Approved bookings on a car overlapping `range`, other than `exclude`
    async fn approved_for_car(
        tx: &mut Transaction<'_, Postgres>,
        car_id: i32,
        range: &DateRange,
        exclude: Option<Uuid>,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {} FROM bookings
            WHERE car_id = $1
              AND status = 'Approved'
              AND start_date <= $3
              AND end_date >= $2
              AND ($4::uuid IS NULL OR id <> $4)
            "#,
            BOOKING_COLUMNS
        ))
        .bind(car_id)
        .bind(range.start)
        .bind(range.end)
        .bind(exclude)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows)
    }

    async fn ensure_capacity(
        tx: &mut Transaction<'_, Postgres>,
        booking: &Booking,
        stock: i32,
    ) -> AppResult<()> {
        let range = booking.range();
        let held = Self::approved_for_car(tx, booking.car_id, &range, Some(booking.id)).await?;
        let occupied = availability::occupancy(booking.car_id, &range, &held);
        if !availability::has_capacity(occupied, stock) {
            tracing::warn!(
                car_id = booking.car_id,
                occupied,
                stock,
                "Capacity exhausted for {} to {}",
                range.start,
                range.end
            );
            return Err(AppError::Conflict(FULLY_BOOKED.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingStore for Repository {
    async fn list(&self) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings ORDER BY booking_date DESC",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn approved_overlapping(&self, range: DateRange) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {} FROM bookings
            WHERE status = 'Approved'
              AND start_date <= $2
              AND end_date >= $1
            "#,
            BOOKING_COLUMNS
        ))
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_within_capacity(&self, booking: &Booking, stock: i32) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;
        Self::lock_car(&mut tx, booking.car_id).await?;
        Self::ensure_capacity(&mut tx, booking, stock).await?;

        let row = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings (id, car_id, car_name, user_name, user_email, start_date, end_date,
                                  total_cost, location, booking_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking.id)
        .bind(booking.car_id)
        .bind(&booking.car_name)
        .bind(&booking.user_name)
        .bind(&booking.user_email)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_cost)
        .bind(&booking.location)
        .bind(booking.booking_date)
        .bind(booking.status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn apply_update(
        &self,
        id: Uuid,
        patch: &UpdateBooking,
        stock: Option<i32>,
    ) -> AppResult<Option<(Booking, Booking)>> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        let next = patch.merge_into(&current)?;
        if availability::needs_capacity_check(&current, &next) {
            let stock = stock.ok_or_else(|| AppError::NotFound("Car not found.".to_string()))?;
            Self::lock_car(&mut tx, next.car_id).await?;
            Self::ensure_capacity(&mut tx, &next, stock).await?;
        }

        let updated = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET user_name = $2, user_email = $3, start_date = $4, end_date = $5,
                total_cost = $6, location = $7, status = $8
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(next.id)
        .bind(&next.user_name)
        .bind(&next.user_email)
        .bind(next.start_date)
        .bind(next.end_date)
        .bind(next.total_cost)
        .bind(&next.location)
        .bind(next.status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some((current, updated)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
