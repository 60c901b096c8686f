//! Application state and member-facing handlers

use crate::auth::{
    AccountService, AuthorizationEngine, AuthContextExtractor, MemberInfo, PasswordRequirements,
    PermissionAdmin, TokenService,
};
use crate::config::ServerConfig;
use crate::core::WardenError;
use crate::store::{AccountStore, PageStore, RoleStore, RuleStore};
use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// Application state shared across handlers and middleware
#[derive(Clone)]
pub struct AppState {
    pub roles: Arc<RoleStore>,
    pub pages: Arc<PageStore>,
    pub rules: Arc<RuleStore>,
    pub account_store: Arc<AccountStore>,
    pub accounts: Arc<AccountService>,
    pub admin: Arc<PermissionAdmin>,
    pub engine: Arc<AuthorizationEngine>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Wire up stores, services and the engine from configuration
    pub fn from_config(config: &ServerConfig) -> Self {
        let roles = Arc::new(RoleStore::new());
        let pages = Arc::new(PageStore::new());
        let rules = Arc::new(RuleStore::new(roles.clone(), pages.clone()));
        let account_store = Arc::new(AccountStore::new());

        let accounts = Arc::new(AccountService::new(
            account_store.clone(),
            roles.clone(),
            PasswordRequirements::default(),
            config.auth.default_role.clone(),
        ));
        let admin = Arc::new(PermissionAdmin::new(
            roles.clone(),
            pages.clone(),
            rules.clone(),
            account_store.clone(),
        ));
        let engine = Arc::new(AuthorizationEngine::new(rules.clone()));
        let tokens = Arc::new(TokenService::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_secs,
        ));

        Self {
            roles,
            pages,
            rules,
            account_store,
            accounts,
            admin,
            engine,
            tokens,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/user/info - Current member's own info
pub async fn my_info(
    State(state): State<AppState>,
    ctx: AuthContextExtractor,
) -> Result<Json<MemberInfo>, WardenError> {
    let username = ctx.require_subject()?;
    debug!("Getting info for authenticated user: {}", username);

    Ok(Json(state.accounts.member_info(username)?))
}

/// GET /api/user/info/{username} - Another member's info, admin or self only
pub async fn member_info(
    State(state): State<AppState>,
    ctx: AuthContextExtractor,
    Path(username): Path<String>,
) -> Result<Json<MemberInfo>, WardenError> {
    let current = ctx.require_subject()?;
    debug!("User {} requesting info for user {}", current, username);

    if current != username && !ctx.0.has_role("ROLE_ADMIN") {
        return Err(WardenError::AccessDenied(format!(
            "/api/user/info/{}",
            username
        )));
    }

    Ok(Json(state.accounts.member_info(&username)?))
}
