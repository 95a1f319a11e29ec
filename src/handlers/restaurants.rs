use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use sqlx::PgPool;

use crate::api::pagination::{Page, PageMetadata};
use crate::database::models::{NewRestaurant, Restaurant, RestaurantChanges, RestaurantSearch};
use crate::database::{Collection, Repository};
use crate::middleware::{ApiResponse, ApiResult};

use super::utils::{json_body, parse_id, require};

fn repository(pool: PgPool) -> Repository<Restaurant> {
    Repository::new(Collection::Restaurants, pool)
}

/// POST /restaurants - create a restaurant (inactive until updated)
pub async fn create(
    State(pool): State<PgPool>,
    payload: Result<Json<NewRestaurant>, JsonRejection>,
) -> ApiResult {
    let new = json_body(payload)?;
    require("name", &new.name)?;

    let restaurant = repository(pool).create(&new).await?;
    tracing::info!("Created restaurant {}", restaurant.id);
    Ok(ApiResponse::created().field("restaurant", restaurant))
}

/// GET /restaurants?name=&page=&page_size= - paged name search
pub async fn search(State(pool): State<PgPool>, Query(query): Query<RestaurantSearch>) -> ApiResult {
    let page = Page::from_query(query.page.as_deref(), query.page_size.as_deref());
    let (restaurants, total_records) = repository(pool).search(&query.name, page).await?;

    Ok(ApiResponse::ok()
        .field("restaurants", restaurants)
        .field("metadata", PageMetadata { page, total_records }))
}

/// GET /restaurants/:id
pub async fn get(State(pool): State<PgPool>, Path(id): Path<String>) -> ApiResult {
    let id = parse_id(&id)?;
    let restaurant = repository(pool).select_404(id).await?;
    Ok(ApiResponse::ok().field("restaurant", restaurant))
}

/// PATCH /restaurants/:id - change only the supplied fields
pub async fn update(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
    payload: Result<Json<RestaurantChanges>, JsonRejection>,
) -> ApiResult {
    let id = parse_id(&id)?;
    let changes = json_body(payload)?;
    if let Some(name) = &changes.name {
        require("name", name)?;
    }

    let repository = repository(pool);
    let mut restaurant = repository.select_404(id).await?;
    changes.apply_to(&mut restaurant);
    let restaurant = repository.update(&restaurant).await?;

    Ok(ApiResponse::ok().field("restaurant", restaurant))
}

/// DELETE /restaurants/:id
pub async fn delete(State(pool): State<PgPool>, Path(id): Path<String>) -> ApiResult {
    let id = parse_id(&id)?;
    repository(pool).delete_one(id).await?;
    tracing::info!("Deleted restaurant {}", id);
    Ok(ApiResponse::ok().field("message", "deleted"))
}
