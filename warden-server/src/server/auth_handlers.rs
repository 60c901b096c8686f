//! Login and signup handlers

use super::handlers::AppState;
use crate::core::WardenError;
use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckEmailQuery {
    pub email: String,
}

/// POST /login - Exchange credentials for a token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, WardenError> {
    debug!("Login attempt for username: {}", req.username);

    let account = state
        .accounts
        .authenticate(&req.username, &req.password)
        .map_err(|e| {
            warn!("Authentication failed for user: {}", req.username);
            e
        })?;

    let token = state.tokens.issue(&account.username)?;
    info!("Member logged in: {}", account.username);

    Ok(Json(LoginResponse {
        token,
        username: account.username,
        message: "login successful".to_string(),
    }))
}

/// POST /signup - Register a new account
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<MessageResponse>, WardenError> {
    state
        .accounts
        .register(&req.username, &req.password, &req.password_confirm, &req.email)?;

    Ok(Json(MessageResponse {
        message: "signup completed".to_string(),
    }))
}

/// POST /validate-signup - Pre-flight check of a signup form
pub async fn validate_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<MessageResponse>, WardenError> {
    debug!("Validating signup form for username: {}", req.username);

    if req.password != req.password_confirm {
        return Err(WardenError::PasswordMismatch);
    }
    if state.accounts.member_info(&req.username).is_ok() {
        return Err(WardenError::DuplicateUsername);
    }

    Ok(Json(MessageResponse {
        message: "signup request is valid".to_string(),
    }))
}

/// GET /check-email?email= - Whether the address is still available
pub async fn check_email(
    State(state): State<AppState>,
    Query(query): Query<CheckEmailQuery>,
) -> Result<Json<bool>, WardenError> {
    debug!("Checking email availability: {}", query.email);
    Ok(Json(state.accounts.email_available(&query.email)?))
}
