//! Authorization decision engine
//!
//! A single explicit decision function, invoked from the middleware list.
//! Every check re-queries the stores; there is no cache, so rule mutations
//! take effect on the very next request.

use super::path_matcher;
use crate::core::WardenResult;
use crate::store::{AccessRule, RuleStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-only view of the permission data the engine evaluates against.
///
/// `RuleStore` is the production implementation; tests substitute a failing
/// source to exercise the fail-closed rule.
pub trait PermissionSource: Send + Sync {
    /// Rules whose role is in the name set and whose pattern equals the path
    fn rules_for_role_names_and_path(
        &self,
        role_names: &[String],
        path: &str,
    ) -> WardenResult<Vec<AccessRule>>;

    /// All rules whose role is in the name set
    fn rules_for_role_names(&self, role_names: &[String]) -> WardenResult<Vec<AccessRule>>;

    /// The stored pattern of a rule's page
    fn pattern_of(&self, page_id: u64) -> WardenResult<Option<String>>;
}

impl PermissionSource for RuleStore {
    fn rules_for_role_names_and_path(
        &self,
        role_names: &[String],
        path: &str,
    ) -> WardenResult<Vec<AccessRule>> {
        RuleStore::rules_for_role_names_and_path(self, role_names, path)
    }

    fn rules_for_role_names(&self, role_names: &[String]) -> WardenResult<Vec<AccessRule>> {
        RuleStore::rules_for_role_names(self, role_names)
    }

    fn pattern_of(&self, page_id: u64) -> WardenResult<Option<String>> {
        RuleStore::pattern_of(self, page_id)
    }
}

/// Decides allow/deny for a request path against a principal's role set
#[derive(Clone)]
pub struct AuthorizationEngine {
    source: Arc<dyn PermissionSource>,
}

impl AuthorizationEngine {
    pub fn new(source: Arc<dyn PermissionSource>) -> Self {
        Self { source }
    }

    /// Two-phase check: exact pattern equality first, then a wildcard scan
    /// over every rule the role set holds. Never panics and never errors:
    /// any storage failure during evaluation is swallowed into a deny.
    pub fn has_permission(&self, request_path: &str, role_names: &[String]) -> bool {
        debug!(
            "Checking permission for path: {} with roles: {:?}",
            request_path, role_names
        );

        if role_names.is_empty() {
            debug!("No roles provided, denying access");
            return false;
        }

        match self.check(request_path, role_names) {
            Ok(allowed) => {
                debug!("Permission check result for path {}: {}", request_path, allowed);
                allowed
            }
            Err(e) => {
                // Fail closed: an evaluation error must never grant access.
                warn!(
                    "Permission evaluation failed for path {}, denying: {}",
                    request_path, e
                );
                false
            }
        }
    }

    fn check(&self, request_path: &str, role_names: &[String]) -> WardenResult<bool> {
        let exact = self
            .source
            .rules_for_role_names_and_path(role_names, request_path)?;
        if !exact.is_empty() {
            debug!("Exact path match found for: {}", request_path);
            return Ok(true);
        }

        for rule in self.source.rules_for_role_names(role_names)? {
            if let Some(pattern) = self.source.pattern_of(rule.page_id)? {
                if path_matcher::matches(&pattern, request_path) {
                    debug!("Pattern match found for: {}", request_path);
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
