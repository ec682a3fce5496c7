use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{error, info, instrument};

use super::dto::{AvatarRequest, PublicUser};
use crate::{app::internal, auth::AuthUser, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me))
        .route("/users/avatar", patch(update_avatar))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = state
        .users
        .get_by_id(user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            error!(user_id = %user_id, "user not found");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;

    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_avatar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AvatarRequest>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let not_found = || (StatusCode::UNAUTHORIZED, "User not found".to_string());
    let user = state
        .users
        .get_by_id(user_id)
        .await
        .map_err(internal)?
        .ok_or_else(not_found)?;

    let user = state
        .users
        .update_avatar(&user.email, payload.avatar_url.trim())
        .await
        .map_err(internal)?
        .ok_or_else(not_found)?;

    info!(user_id = %user.id, "avatar updated");
    Ok(Json(PublicUser::from(user)))
}
