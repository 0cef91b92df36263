use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use base64ct::{Base64, Encoding};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{MessageResponse, PublicUser, RegisterRequest, TokenResponse, UsersMeta, UsersResponse},
        extractors::AuthUser,
        password::{hash_password, verify_credentials},
        repo_types::User,
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/user", get(list_users))
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    lazy_static! {
        static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{1,64}$").unwrap();
    }
    NAME_RE.is_match(name)
}

/// Checks a `{name, password}` pair before anything is hashed or stored.
pub(crate) fn validate_credentials(name: &str, password: &str) -> AppResult<()> {
    if name.is_empty() || password.is_empty() {
        return Err(AppError::validation("missing name and/or password in input"));
    }
    if !is_valid_name(name) {
        return Err(AppError::validation(
            "name must be 1-64 characters of letters, digits, '_', '.' or '-'",
        ));
    }
    Ok(())
}

/// Splits a `Basic` authorization header into user and password.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = Base64::decode_vec(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    if user.is_empty() || password.is_empty() {
        return None;
    }
    Some((user.to_string(), password.to_string()))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(mut payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    payload.name = payload.name.trim().to_string();
    validate_credentials(&payload.name, &payload.password)?;

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.name, &hash).await.map_err(|e| {
        match AppError::from(e) {
            AppError::Conflict(_) => {
                warn!(name = %payload.name, "name already registered");
                AppError::conflict(format!("{} is already registered", payload.name))
            }
            other => other,
        }
    })?;

    info!(user_id = user.id, name = %user.name, "user registered");
    Ok(Json(MessageResponse {
        message: format!("{} registered successfully", user.name),
    }))
}

#[instrument(skip(state, headers))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<TokenResponse>> {
    let Some((name, password)) = basic_credentials(&headers) else {
        warn!("login without basic credentials");
        return Err(AppError::BadCredentials);
    };

    let user = User::find_by_name(&state.db, &name).await?;
    if !verify_credentials(&password, user.as_ref().map(|u| u.password_hash.as_str())) {
        warn!(name = %name, "could not verify");
        return Err(AppError::BadCredentials);
    }
    let Some(user) = user else {
        return Err(AppError::BadCredentials);
    };

    let token = state.keys.issue(user.public_id)?;
    info!(user_id = user.id, "token generated");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, caller))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> AppResult<Json<UsersResponse>> {
    let users = User::list(&state.db).await?;
    info!(count = users.len(), "listed users");
    Ok(Json(UsersResponse {
        users: users.into_iter().map(PublicUser::from).collect(),
        meta: UsersMeta {
            logged_in_as: caller.name,
        },
    }))
}
