use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::api::auth::CurrentUser;
use crate::db::users;
use crate::error::AppError;
use crate::models::{NewUserRequest, UpdateUserRequest, User};
use crate::state::AppState;

pub(super) async fn register(
    State(state): State<AppState>,
    Json(mut req): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    req.name = req.name.trim().to_string();
    req.email = req.email.trim().to_lowercase();
    if req.name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    if !req.email.contains('@') {
        return Err(AppError::BadRequest("email is not valid".to_string()));
    }

    let mut conn = state.db.acquire().await?;
    if users::find_user_by_email(&mut conn, &req.email).await?.is_some() {
        return Err(email_taken());
    }
    // a concurrent registration can still win between check and insert
    let user = users::insert_user(&mut conn, req)
        .await
        .map_err(registration_error)?;
    Ok((StatusCode::CREATED, Json(user)))
}

fn email_taken() -> AppError {
    AppError::Conflict("email is already registered".to_string())
}

fn registration_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => email_taken(),
        e => AppError::Database(e),
    }
}

pub(super) async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

pub(super) async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut req): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    if let Some(name) = req.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("name must not be empty".to_string()));
        }
    }

    let mut conn = state.db.acquire().await?;
    let user = users::update_user(&mut conn, &user.id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user))
}
