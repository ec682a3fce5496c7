use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{instrument, warn};

use super::services;
use crate::{
    app::internal, auth::AuthUser, contacts::dto::ContactResponse, error::SearchError,
    state::AppState,
};

pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/search/shift/:shift", get(birthday_list))
        .route("/search/find/:partial_info", get(find_contacts))
}

fn search_failed(e: SearchError) -> (StatusCode, String) {
    match &e {
        SearchError::NegativeShift(_) => {
            warn!(error = %e, "bad birthday window");
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        SearchError::Repo(inner) => internal(inner),
    }
}

/// Contacts with a birthday in the next `shift` days, today included.
#[instrument(skip(state))]
pub async fn birthday_list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(shift): Path<i64>,
) -> Result<Json<Vec<ContactResponse>>, (StatusCode, String)> {
    let today = OffsetDateTime::now_utc().date();
    let contacts = services::birthday_window(state.contacts.as_ref(), user.owner(), today, shift)
        .await
        .map_err(search_failed)?;
    Ok(Json(contacts.into_iter().map(ContactResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn find_contacts(
    State(state): State<AppState>,
    user: AuthUser,
    Path(partial_info): Path<String>,
) -> Result<Json<Vec<ContactResponse>>, (StatusCode, String)> {
    let contacts = services::partial_match(state.contacts.as_ref(), user.owner(), &partial_info)
        .await
        .map_err(search_failed)?;
    Ok(Json(contacts.into_iter().map(ContactResponse::from).collect()))
}
