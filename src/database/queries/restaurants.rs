use sqlx::FromRow;

use crate::api::pagination::Page;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewRestaurant, Restaurant};
use crate::database::repository::Repository;

#[derive(FromRow)]
struct SearchRow {
    #[sqlx(flatten)]
    restaurant: Restaurant,
    total: i64,
}

impl Repository<Restaurant> {
    /// New restaurants start inactive
    pub async fn create(&self, new: &NewRestaurant) -> Result<Restaurant, DatabaseError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            "INSERT INTO restaurants (name, address, phone, is_active)
             VALUES ($1, $2, $3, FALSE)
             RETURNING id, name, address, phone, is_active, created_at, updated_at",
        )
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.phone)
        .fetch_one(self.pool())
        .await?;
        Ok(restaurant)
    }

    /// Case-insensitive name substring match ordered by name, with the total match count.
    /// The total is read off the returned rows, so a page past the end reports 0.
    pub async fn search(&self, name: &str, page: Page) -> Result<(Vec<Restaurant>, i64), DatabaseError> {
        let rows = sqlx::query_as::<_, SearchRow>(
            "SELECT id, name, address, phone, is_active, created_at, updated_at,
                    COUNT(*) OVER() AS total
             FROM restaurants
             WHERE ($1 = '' OR name ILIKE '%' || $1 || '%')
             ORDER BY name
             LIMIT $2 OFFSET $3",
        )
        .bind(name)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool())
        .await?;

        let total = rows.first().map(|row| row.total).unwrap_or(0);
        let restaurants = rows.into_iter().map(|row| row.restaurant).collect();
        Ok((restaurants, total))
    }

    pub async fn update(&self, restaurant: &Restaurant) -> Result<Restaurant, DatabaseError> {
        sqlx::query_as::<_, Restaurant>(
            "UPDATE restaurants
             SET name = $1, address = $2, phone = $3, is_active = $4, updated_at = NOW()
             WHERE id = $5
             RETURNING id, name, address, phone, is_active, created_at, updated_at",
        )
        .bind(&restaurant.name)
        .bind(&restaurant.address)
        .bind(&restaurant.phone)
        .bind(restaurant.is_active)
        .bind(restaurant.id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("restaurant {} not found", restaurant.id)))
    }
}
