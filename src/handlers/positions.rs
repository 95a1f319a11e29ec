use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use sqlx::PgPool;

use crate::database::models::{Position, PositionInput};
use crate::database::{Collection, Repository};
use crate::middleware::{ApiResponse, ApiResult};

use super::utils::{json_body, parse_id, require};

fn repository(pool: PgPool) -> Repository<Position> {
    Repository::new(Collection::Positions, pool)
}

/// POST /positions
pub async fn create(
    State(pool): State<PgPool>,
    payload: Result<Json<PositionInput>, JsonRejection>,
) -> ApiResult {
    let input = json_body(payload)?;
    require("title", &input.title)?;

    let position = repository(pool).create(&input).await?;
    Ok(ApiResponse::created().field("position", position))
}

/// GET /positions/:id
pub async fn get(State(pool): State<PgPool>, Path(id): Path<String>) -> ApiResult {
    let id = parse_id(&id)?;
    let position = repository(pool).select_404(id).await?;
    Ok(ApiResponse::ok().field("position", position))
}

/// PUT /positions/:id - replace the title
pub async fn update(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
    payload: Result<Json<PositionInput>, JsonRejection>,
) -> ApiResult {
    let id = parse_id(&id)?;
    let input = json_body(payload)?;
    require("title", &input.title)?;

    let position = repository(pool).update(id, &input).await?;
    Ok(ApiResponse::ok().field("position", position))
}
