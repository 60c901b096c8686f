use super::handlers::{self, AppState};
use super::{admin_handlers, auth_handlers};
use crate::auth::middleware::{authenticate, authorize};
use crate::core::error_envelope;
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the Axum router with all endpoints
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Public endpoints
        .route("/health", get(handlers::health_check))
        .route("/login", post(auth_handlers::login))
        .route("/signup", post(auth_handlers::signup))
        .route("/validate-signup", post(auth_handlers::validate_signup))
        .route("/check-email", get(auth_handlers::check_email))
        // Member endpoints (gated by the /api/user/** grant)
        .route("/api/user/info", get(handlers::my_info))
        .route("/api/user/info/{username}", get(handlers::member_info))
        // Admin: roles
        .route(
            "/api/admin/roles",
            post(admin_handlers::create_role).get(admin_handlers::list_roles),
        )
        .route("/api/admin/roles/{id}", delete(admin_handlers::delete_role))
        .route(
            "/api/admin/roles/{id}/permissions",
            put(admin_handlers::replace_role_rules),
        )
        // Admin: access pages
        .route(
            "/api/admin/access-pages",
            post(admin_handlers::create_page).get(admin_handlers::list_pages),
        )
        .route(
            "/api/admin/access-pages/{id}",
            delete(admin_handlers::delete_page),
        )
        // Admin: access rules
        .route(
            "/api/admin/permissions",
            post(admin_handlers::create_rule).get(admin_handlers::list_rules),
        )
        .route(
            "/api/admin/permissions/by-role",
            get(admin_handlers::rules_by_role),
        )
        .route(
            "/api/admin/permissions/{id}",
            delete(admin_handlers::delete_rule),
        )
        // Admin: members
        .route("/api/admin/members", get(admin_handlers::list_members))
        .route(
            "/api/admin/members/{username}/roles",
            post(admin_handlers::add_member_role),
        )
        .route(
            "/api/admin/members/{username}/roles/{role_name}",
            delete(admin_handlers::remove_member_role),
        )
        // Middleware, innermost first: the access decision runs after the
        // principal is resolved, and the error envelope wraps everything.
        .layer(from_fn_with_state(state.clone(), authorize))
        .layer(from_fn_with_state(state.clone(), authenticate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(error_envelope))
        .with_state(state)
}
