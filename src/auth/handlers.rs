use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    claims::TokenKind,
    dto::{
        LoginRequest, MessageResponse, RefreshRequest, RegisterRequest, RegisterResponse,
        RequestResetPassword, ResetPasswordRequest, TokenResponse,
    },
    jwt::JwtKeys,
    password::{generate_reset_token, hash_password, verify_password},
};
use crate::{
    app::internal,
    state::AppState,
    users::{dto::PublicUser, repo_types::NewUser},
};

const MIN_PASSWORD_LEN: usize = 8;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/confirmed_email/:token", get(confirmed_email))
        .route("/auth/request_reset_password", post(request_reset_password))
        .route("/auth/reset_password", post(reset_password))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> Result<String, (StatusCode, String)> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }
    Ok(email)
}

fn check_password_len(password: &str) -> Result<(), (StatusCode, String)> {
    if password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }
    Ok(())
}

fn unauthorized(msg: &str) -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, msg.to_string())
}

/// Sign an access/refresh pair and remember the refresh token on the user.
async fn issue_tokens(
    state: &AppState,
    user_id: uuid::Uuid,
) -> Result<TokenResponse, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user_id).map_err(internal)?;
    let refresh_token = keys.sign_refresh(user_id).map_err(internal)?;
    state
        .users
        .update_token(user_id, Some(&refresh_token))
        .await
        .map_err(internal)?;
    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer".into(),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), (StatusCode, String)> {
    let email = normalize_email(&payload.email)?;
    check_password_len(&payload.password)?;

    if state.users.get_by_email(&email).await.map_err(internal)?.is_some() {
        warn!(email = %email, "email already registered");
        return Err((StatusCode::CONFLICT, "Account already exists".into()));
    }

    let password_hash = hash_password(&payload.password).map_err(internal)?;
    let user = state
        .users
        .create(&NewUser {
            email,
            password_hash,
            avatar: None,
        })
        .await
        .map_err(internal)?;

    let confirm_token = JwtKeys::from_ref(&state)
        .sign_email_confirm(user.id)
        .map_err(internal)?;
    // A failed send does not roll back the stored account.
    if let Err(e) = state
        .notifier
        .email_confirmation(&user.email, &confirm_token)
        .await
    {
        warn!(user_id = %user.id, error = %e, "email confirmation not delivered");
    }

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: PublicUser::from(user),
            detail: "User successfully created. Check your email for confirmation.".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, (StatusCode, String)> {
    let email = normalize_email(&payload.email)?;

    let Some(user) = state.users.get_by_email(&email).await.map_err(internal)? else {
        warn!(email = %email, "login unknown email");
        return Err(unauthorized("Invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash).map_err(internal)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(unauthorized("Invalid credentials"));
    }

    let tokens = issue_tokens(&state, user.id).await?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(tokens))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_kind(&payload.refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            warn!(error = %e, "refresh token rejected");
            unauthorized("Invalid refresh token")
        })?;

    let user = state
        .users
        .get_by_id(claims.sub)
        .await
        .map_err(internal)?
        .ok_or_else(|| unauthorized("User not found"))?;

    // A token that is valid but no longer stored was rotated out or revoked.
    if user.refresh_token.as_deref() != Some(payload.refresh_token.as_str()) {
        warn!(user_id = %user.id, "stale refresh token, revoking");
        state
            .users
            .update_token(user.id, None)
            .await
            .map_err(internal)?;
        return Err(unauthorized("Invalid refresh token"));
    }

    Ok(Json(issue_tokens(&state, user.id).await?))
}

#[instrument(skip(state, token))]
pub async fn confirmed_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let claims = JwtKeys::from_ref(&state)
        .verify_kind(&token, TokenKind::EmailConfirm)
        .map_err(|e| {
            warn!(error = %e, "email confirmation token rejected");
            (StatusCode::UNPROCESSABLE_ENTITY, "Invalid token for email verification".to_string())
        })?;

    let user = state
        .users
        .get_by_id(claims.sub)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::BAD_REQUEST, "Verification error".to_string()))?;

    if user.confirmed {
        return Ok(Json(MessageResponse::new("Your email is already confirmed")));
    }
    state
        .users
        .confirm_email(&user.email)
        .await
        .map_err(internal)?;
    info!(user_id = %user.id, "email confirmed");
    Ok(Json(MessageResponse::new("Email confirmed")))
}

/// Always answers the same way so the endpoint cannot be used to probe emails.
#[instrument(skip(state, payload))]
pub async fn request_reset_password(
    State(state): State<AppState>,
    Json(payload): Json<RequestResetPassword>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let email = normalize_email(&payload.email)?;
    if let Some(user) = state.users.get_by_email(&email).await.map_err(internal)? {
        let token = generate_reset_token();
        state
            .users
            .update_reset_token(user.id, Some(&token))
            .await
            .map_err(internal)?;
        state
            .notifier
            .password_reset(&user.email, &token)
            .await
            .map_err(internal)?;
        info!(user_id = %user.id, "password reset requested");
    }
    Ok(Json(MessageResponse::new(
        "If the account exists, a reset token has been sent",
    )))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let email = normalize_email(&payload.email)?;
    check_password_len(&payload.new_password)?;

    let user = state
        .users
        .get_by_email(&email)
        .await
        .map_err(internal)?
        .filter(|u| u.password_reset_token.as_deref() == Some(payload.reset_token.as_str()))
        .ok_or((StatusCode::BAD_REQUEST, "Invalid reset token".to_string()))?;

    let password_hash = hash_password(&payload.new_password).map_err(internal)?;
    state
        .users
        .update_password(user.id, &password_hash)
        .await
        .map_err(internal)?;
    state
        .users
        .update_reset_token(user.id, None)
        .await
        .map_err(internal)?;

    info!(user_id = %user.id, "password reset");
    Ok(Json(MessageResponse::new("Password has been reset")))
}
