//! Axum extractor for AuthContext
//!
//! Retrieves the AuthContext that the authentication middleware stored in
//! request extensions. A missing context means the middleware is not wired
//! up, which is a server bug, not a client error.

use super::AuthContext;
use crate::core::WardenError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub struct AuthContextExtractor(pub AuthContext);

impl<S> axum::extract::FromRequestParts<S> for AuthContextExtractor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Self)
            .ok_or_else(|| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AuthContext not found in request extensions",
                )
                    .into_response()
            })
    }
}

impl AuthContextExtractor {
    /// The authenticated subject, or `AuthenticationRequired`
    pub fn require_subject(&self) -> Result<&str, WardenError> {
        self.0
            .subject
            .as_deref()
            .ok_or(WardenError::AuthenticationRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_subject() {
        let authenticated =
            AuthContextExtractor(AuthContext::authenticated("alice", Vec::new()));
        assert_eq!(authenticated.require_subject().unwrap(), "alice");

        let anonymous = AuthContextExtractor(AuthContext::anonymous());
        assert!(matches!(
            anonymous.require_subject().unwrap_err(),
            WardenError::AuthenticationRequired
        ));
    }
}
