//! Admin permission-management handlers
//!
//! Reached only through the `/api/admin/**` grant seeded for `ROLE_ADMIN`;
//! the authorization middleware has already made the access decision by the
//! time these run.

use super::auth_handlers::MessageResponse;
use super::handlers::AppState;
use crate::auth::MemberInfo;
use crate::core::WardenError;
use crate::store::{AccessPage, Role, RuleDetails};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct RuleRequest {
    pub role_id: u64,
    pub page_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceRulesRequest {
    pub page_ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RoleNameQuery {
    pub role_name: String,
}

#[derive(Debug, Deserialize)]
pub struct MemberRoleRequest {
    pub role_name: String,
}

// ==================== Roles ====================

/// POST /api/admin/roles
pub async fn create_role(
    State(state): State<AppState>,
    Json(req): Json<RoleRequest>,
) -> Result<Json<Role>, WardenError> {
    debug!("Admin creating role: {}", req.name);
    Ok(Json(state.admin.create_role(&req.name)?))
}

/// GET /api/admin/roles
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, WardenError> {
    Ok(Json(state.admin.list_roles()?))
}

/// DELETE /api/admin/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, WardenError> {
    debug!("Admin deleting role with id: {}", id);
    state.admin.delete_role(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/admin/roles/{id}/permissions - Replace all rules of a role
pub async fn replace_role_rules(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ReplaceRulesRequest>,
) -> Result<Json<Vec<RuleDetails>>, WardenError> {
    debug!("Admin replacing rules for role: {}", id);
    Ok(Json(state.admin.replace_role_rules(id, &req.page_ids)?))
}

// ==================== Access pages ====================

/// POST /api/admin/access-pages
pub async fn create_page(
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> Result<Json<AccessPage>, WardenError> {
    debug!("Admin creating access page: {}", req.path);
    Ok(Json(state.admin.create_page(&req.path)?))
}

/// GET /api/admin/access-pages
pub async fn list_pages(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccessPage>>, WardenError> {
    Ok(Json(state.admin.list_pages()?))
}

/// DELETE /api/admin/access-pages/{id}
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, WardenError> {
    debug!("Admin deleting access page with id: {}", id);
    state.admin.delete_page(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Access rules ====================

/// POST /api/admin/permissions
pub async fn create_rule(
    State(state): State<AppState>,
    Json(req): Json<RuleRequest>,
) -> Result<Json<RuleDetails>, WardenError> {
    debug!(
        "Admin adding permission: role_id={}, page_id={}",
        req.role_id, req.page_id
    );
    Ok(Json(state.admin.create_rule(req.role_id, req.page_id)?))
}

/// GET /api/admin/permissions
pub async fn list_rules(
    State(state): State<AppState>,
) -> Result<Json<Vec<RuleDetails>>, WardenError> {
    Ok(Json(state.admin.list_rules()?))
}

/// GET /api/admin/permissions/by-role?role_name=
pub async fn rules_by_role(
    State(state): State<AppState>,
    Query(query): Query<RoleNameQuery>,
) -> Result<Json<Vec<RuleDetails>>, WardenError> {
    Ok(Json(state.admin.rules_for_role(&query.role_name)?))
}

/// DELETE /api/admin/permissions/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, WardenError> {
    debug!("Admin removing permission with id: {}", id);
    state.admin.delete_rule(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Members ====================

/// GET /api/admin/members
pub async fn list_members(
    State(state): State<AppState>,
) -> Result<Json<Vec<MemberInfo>>, WardenError> {
    Ok(Json(state.accounts.list_members()?))
}

/// POST /api/admin/members/{username}/roles
pub async fn add_member_role(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<MemberRoleRequest>,
) -> Result<Json<MessageResponse>, WardenError> {
    debug!("Admin adding role {} to user {}", req.role_name, username);
    state.accounts.add_role(&username, &req.role_name)?;

    Ok(Json(MessageResponse {
        message: "role added".to_string(),
    }))
}

/// DELETE /api/admin/members/{username}/roles/{role_name}
pub async fn remove_member_role(
    State(state): State<AppState>,
    Path((username, role_name)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, WardenError> {
    debug!("Admin removing role {} from user {}", role_name, username);
    state.accounts.remove_role(&username, &role_name)?;

    Ok(Json(MessageResponse {
        message: "role removed".to_string(),
    }))
}
