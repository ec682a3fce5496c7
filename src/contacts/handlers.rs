use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{ContactResponse, Pagination},
    repo_types::{ContactFields, FavoriteFlag},
    services,
};
use crate::{app::internal, auth::AuthUser, state::AppState};

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/:id",
            get(get_contact).put(update_contact).delete(remove_contact),
        )
        .route("/contacts/:id/favorite", patch(set_favorite))
}

fn not_found(user: AuthUser, id: i64) -> (StatusCode, String) {
    warn!(user_id = %user.0, contact_id = id, "contact not found");
    (StatusCode::NOT_FOUND, "Not Found".into())
}

#[instrument(skip(state))]
pub async fn list_contacts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ContactResponse>>, (StatusCode, String)> {
    let (limit, offset) = p.window();
    let contacts = services::list(state.contacts.as_ref(), user.owner(), limit, offset)
        .await
        .map_err(internal)?;
    Ok(Json(contacts.into_iter().map(ContactResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ContactResponse>, (StatusCode, String)> {
    services::get_by_id(state.contacts.as_ref(), user.owner(), id)
        .await
        .map_err(internal)?
        .map(|c| Json(c.into()))
        .ok_or_else(|| not_found(user, id))
}

#[instrument(skip(state, body))]
pub async fn create_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ContactFields>,
) -> Result<(StatusCode, Json<ContactResponse>), (StatusCode, String)> {
    let contact = services::create(state.contacts.as_ref(), user.owner(), &body)
        .await
        .map_err(internal)?;
    info!(user_id = %user.0, contact_id = contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact.into())))
}

#[instrument(skip(state, body))]
pub async fn update_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<ContactFields>,
) -> Result<Json<ContactResponse>, (StatusCode, String)> {
    services::update(state.contacts.as_ref(), user.owner(), id, &body)
        .await
        .map_err(internal)?
        .map(|c| Json(c.into()))
        .ok_or_else(|| not_found(user, id))
}

#[instrument(skip(state))]
pub async fn remove_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ContactResponse>, (StatusCode, String)> {
    services::remove(state.contacts.as_ref(), user.owner(), id)
        .await
        .map_err(internal)?
        .map(|c| Json(c.into()))
        .ok_or_else(|| not_found(user, id))
}

#[instrument(skip(state))]
pub async fn set_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<FavoriteFlag>,
) -> Result<Json<ContactResponse>, (StatusCode, String)> {
    services::set_favorite(state.contacts.as_ref(), user.owner(), id, body.is_favorite)
        .await
        .map_err(internal)?
        .map(|c| Json(c.into()))
        .ok_or_else(|| not_found(user, id))
}
