//! First-run data seeding
//!
//! Provisions the default roles, the protected page patterns, their grants
//! and the admin account. Every step is create-if-absent, so restarting the
//! server never duplicates rows.

use crate::config::AuthConfig;
use crate::core::WardenResult;
use crate::server::AppState;
use crate::store::{AccessPage, Role};
use bcrypt::{DEFAULT_COST, hash};
use tracing::info;

pub fn seed(state: &AppState, auth: &AuthConfig) -> WardenResult<()> {
    let admin_role = role_if_absent(state, "ROLE_ADMIN")?;
    let user_role = role_if_absent(state, &auth.default_role)?;
    let guest_role = role_if_absent(state, "ROLE_GUEST")?;

    let admin_pages = page_if_absent(state, "/api/admin/**")?;
    let user_pages = page_if_absent(state, "/api/user/**")?;
    let play_pages = page_if_absent(state, "/play/**")?;

    grant_if_absent(state, &admin_role, &admin_pages)?;
    grant_if_absent(state, &admin_role, &user_pages)?;
    grant_if_absent(state, &admin_role, &play_pages)?;

    grant_if_absent(state, &user_role, &user_pages)?;
    grant_if_absent(state, &user_role, &play_pages)?;

    grant_if_absent(state, &guest_role, &play_pages)?;

    admin_account_if_absent(state, auth, &admin_role)?;

    info!("Initial data seeded");
    Ok(())
}

fn role_if_absent(state: &AppState, name: &str) -> WardenResult<Role> {
    match state.roles.find_by_name(name)? {
        Some(role) => Ok(role),
        None => state.roles.create(name),
    }
}

fn page_if_absent(state: &AppState, path: &str) -> WardenResult<AccessPage> {
    match state.pages.find_by_path(path)? {
        Some(page) => Ok(page),
        None => state.pages.create(path),
    }
}

fn grant_if_absent(state: &AppState, role: &Role, page: &AccessPage) -> WardenResult<()> {
    if !state.rules.exists(role.id, page.id)? {
        state.rules.create(role.id, page.id)?;
    }
    Ok(())
}

fn admin_account_if_absent(state: &AppState, auth: &AuthConfig, admin_role: &Role) -> WardenResult<()> {
    let admin = &auth.bootstrap_admin;
    if state.account_store.exists_by_username(&admin.username)? {
        return Ok(());
    }

    let password_hash = hash(&admin.password, DEFAULT_COST)
        .map_err(|e| crate::core::WardenError::Internal(format!("failed to hash password: {}", e)))?;

    state
        .account_store
        .create(&admin.username, &password_hash, &admin.email, admin_role.id)?;

    info!("Admin account created (username: {})", admin.username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    #[test]
    fn test_seed_is_idempotent() {
        let config = ServerConfig::default();
        let state = AppState::from_config(&config);

        seed(&state, &config.auth).unwrap();
        seed(&state, &config.auth).unwrap();

        assert_eq!(state.roles.list().unwrap().len(), 3);
        assert_eq!(state.pages.list().unwrap().len(), 3);
        assert_eq!(state.rules.list_detailed().unwrap().len(), 6);
        assert_eq!(state.account_store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_seeded_admin_reaches_admin_pages() {
        let config = ServerConfig::default();
        let state = AppState::from_config(&config);
        seed(&state, &config.auth).unwrap();

        let admin_roles = vec!["ROLE_ADMIN".to_string()];
        assert!(state.engine.has_permission("/api/admin/roles", &admin_roles));

        let user_roles = vec!["ROLE_USER".to_string()];
        assert!(!state.engine.has_permission("/api/admin/roles", &user_roles));
        assert!(state.engine.has_permission("/api/user/info", &user_roles));
    }
}
