//! Authentication and authorization middleware
//!
//! Two ordered layers, run for every request:
//!
//! 1. `authenticate` turns a `Bearer` token into an `AuthContext` with the
//!    subject's roles resolved fresh from storage. Requests without a usable
//!    `Authorization` header stay anonymous and proceed (some routes are
//!    public). An invalid token terminates the request immediately.
//! 2. `authorize` lets public paths through, then asks the engine to
//!    decide for everything else.
//!
//! Tokens carry no role claims, so a role revoked after login takes effect
//! on the very next request.

use super::AuthContext;
use crate::core::WardenError;
use crate::server::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

/// Routes reachable without authentication. Everything else is decided by
/// the authorization engine against the stored rules.
const PUBLIC_PATHS: &[&str] = &[
    "/login",
    "/signup",
    "/validate-signup",
    "/check-email",
    "/health",
];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Token extraction and principal resolution
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = bearer_token(&req).map(str::to_owned);
    let Some(token) = token else {
        // No bearer credentials; stay anonymous and let authorization decide.
        req.extensions_mut().insert(AuthContext::anonymous());
        return next.run(req).await;
    };

    let subject = match state.tokens.validate(&token) {
        Ok(subject) => subject,
        Err(e) => {
            debug!("Rejecting request with invalid token");
            return e.into_response();
        }
    };

    // Roles are looked up per request, never read from the token.
    let roles = match state.accounts.roles_of(&subject) {
        Ok(roles) => roles,
        Err(_) => {
            // The subject vanished since issuance; the token is as good as
            // forged.
            debug!("Token subject {} no longer resolves to an account", subject);
            return WardenError::InvalidToken.into_response();
        }
    };

    debug!("Authenticated {} with roles {:?}", subject, roles);
    req.extensions_mut()
        .insert(AuthContext::authenticated(subject, roles));
    next.run(req).await
}

/// Per-request access decision, gating the downstream handler
pub async fn authorize(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    if is_public(&path) {
        return next.run(req).await;
    }

    let ctx = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .unwrap_or_else(AuthContext::anonymous);

    if !ctx.is_authenticated() {
        return WardenError::AuthenticationRequired.into_response();
    }

    if !state.engine.has_permission(&path, &ctx.roles) {
        debug!(
            "Denying {} access to {}",
            ctx.subject.as_deref().unwrap_or("?"),
            path
        );
        return WardenError::AccessDenied(path).into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public("/login"));
        assert!(is_public("/signup"));
        assert!(is_public("/health"));
        assert!(!is_public("/api/admin/roles"));
        // Exact matches only; nested paths are not public.
        assert!(!is_public("/login/extra"));
    }
}
