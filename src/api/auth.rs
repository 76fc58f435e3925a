use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::db::users;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Header carrying the authenticated user id, set by the identity layer in
/// front of this service.
pub const USER_HEADER: &str = "x-user-id";

/// The user a request acts for.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let mut conn = state.db.acquire().await?;
        users::find_user(&mut conn, user_id)
            .await?
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}
