pub mod accounts;
pub mod admin;
pub mod engine;
pub mod extractor;
pub mod middleware;
pub mod password_validation;
pub mod path_matcher;
pub mod token;

pub use accounts::{AccountService, MemberInfo};
pub use admin::PermissionAdmin;
pub use engine::{AuthorizationEngine, PermissionSource};
pub use extractor::AuthContextExtractor;
pub use password_validation::PasswordRequirements;
pub use token::TokenService;

/// Authenticated context attached to a request after the pipeline runs.
///
/// Carried only through request extensions and passed explicitly, never
/// ambient state. Roles reflect storage at request time, not at token
/// issuance.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Subject (username), when a valid token was presented
    pub subject: Option<String>,
    /// The subject's current role names
    pub roles: Vec<String>,
}

impl AuthContext {
    /// Context for a request with no (or no usable) credentials
    pub fn anonymous() -> Self {
        Self {
            subject: None,
            roles: Vec::new(),
        }
    }

    pub fn authenticated(subject: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            roles,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.subject.is_some()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_context() {
        let ctx = AuthContext::anonymous();
        assert!(!ctx.is_authenticated());
        assert!(ctx.roles.is_empty());
    }

    #[test]
    fn test_authenticated_context() {
        let ctx = AuthContext::authenticated("alice", vec!["ROLE_USER".to_string()]);
        assert!(ctx.is_authenticated());
        assert!(ctx.has_role("ROLE_USER"));
        assert!(!ctx.has_role("ROLE_ADMIN"));
    }
}
