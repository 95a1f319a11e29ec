use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::PgPool;

use crate::database::models::{NewUser, User};
use crate::database::{Collection, Repository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::utils::{json_body, parse_id, require};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

const MIN_PHONE_LEN: usize = 3;

fn repository(pool: PgPool) -> Repository<User> {
    Repository::new(Collection::Users, pool)
}

pub fn validate_new_user(user: &NewUser) -> Result<(), ApiError> {
    require("username", &user.username)?;
    require("email", &user.email)?;
    if !EMAIL.is_match(&user.email) {
        return Err(ApiError::field_error("email", "email is not valid"));
    }
    if user.phone.chars().count() < MIN_PHONE_LEN {
        return Err(ApiError::field_error("phone", "phone is not valid"));
    }
    Ok(())
}

/// POST /users - register a user
pub async fn create(
    State(pool): State<PgPool>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult {
    let new = json_body(payload)?;
    validate_new_user(&new)?;

    let user = repository(pool).create(&new).await?;
    tracing::info!("Registered user {}", user.id);
    Ok(ApiResponse::created().field("user", user))
}

/// GET /users/:id
pub async fn get(State(pool): State<PgPool>, Path(id): Path<String>) -> ApiResult {
    let id = parse_id(&id)?;
    let user = repository(pool).select_404(id).await?;
    Ok(ApiResponse::ok().field("user", user))
}
