//! Cars repository for database operations

use async_trait::async_trait;

use super::{CarStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::car::{Car, CreateCar, UpdateCar},
};

const CAR_COLUMNS: &str =
    "id, name, car_type, passengers, luggage, transmission, price_per_day, image_url, stock";

#[async_trait]
impl CarStore for Repository {
    async fn list(&self) -> AppResult<Vec<Car>> {
        let rows = sqlx::query_as::<_, Car>(&format!(
            "SELECT {} FROM cars ORDER BY id",
            CAR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Car>> {
        let row = sqlx::query_as::<_, Car>(&format!(
            "SELECT {} FROM cars WHERE id = $1",
            CAR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn types(&self) -> AppResult<Vec<String>> {
        let types: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT car_type FROM cars
            WHERE car_type IS NOT NULL AND car_type <> ''
            ORDER BY car_type
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(types)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, data: &CreateCar) -> AppResult<Car> {
        let result = sqlx::query_as::<_, Car>(&format!(
            r#"
            INSERT INTO cars (id, name, car_type, passengers, luggage, transmission, price_per_day, image_url, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            CAR_COLUMNS
        ))
        .bind(data.id)
        .bind(&data.name)
        .bind(&data.car_type)
        .bind(data.passengers)
        .bind(data.luggage)
        .bind(&data.transmission)
        .bind(data.price_per_day)
        .bind(&data.image_url)
        .bind(data.stock)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(car) => Ok(car),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                format!("A car with id {} already exists", data.id),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, id: i32, data: &UpdateCar) -> AppResult<Option<Car>> {
        let mut sets = vec!["modif_date = NOW()".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.car_type, "car_type");
        add_field!(data.passengers, "passengers");
        add_field!(data.luggage, "luggage");
        add_field!(data.transmission, "transmission");
        add_field!(data.price_per_day, "price_per_day");
        add_field!(data.image_url, "image_url");
        add_field!(data.stock, "stock");

        let query = format!(
            "UPDATE cars SET {} WHERE id = $1 RETURNING {}",
            sets.join(", "),
            CAR_COLUMNS
        );

        let mut builder = sqlx::query_as::<_, Car>(&query).bind(id);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.car_type);
        bind_field!(data.passengers);
        bind_field!(data.luggage);
        bind_field!(data.transmission);
        bind_field!(data.price_per_day);
        bind_field!(data.image_url);
        bind_field!(data.stock);

        Ok(builder.fetch_optional(&self.pool).await?)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
