//! Permission administration
//!
//! Create/delete of roles, access pages and access rules, the mutation
//! surface the authorization engine reads from. Cascading deletes are
//! explicit here: removing a role or page removes its rules (and, for
//! roles, its account assignments) so no orphaned grant survives.

use crate::core::{WardenError, WardenResult};
use crate::store::{AccessPage, AccountStore, PageStore, Role, RoleStore, RuleDetails, RuleStore};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct PermissionAdmin {
    roles: Arc<RoleStore>,
    pages: Arc<PageStore>,
    rules: Arc<RuleStore>,
    accounts: Arc<AccountStore>,
}

impl PermissionAdmin {
    pub fn new(
        roles: Arc<RoleStore>,
        pages: Arc<PageStore>,
        rules: Arc<RuleStore>,
        accounts: Arc<AccountStore>,
    ) -> Self {
        Self {
            roles,
            pages,
            rules,
            accounts,
        }
    }

    // ==================== Roles ====================

    pub fn create_role(&self, name: &str) -> WardenResult<Role> {
        if name.trim().is_empty() {
            return Err(WardenError::validation_field(
                "name",
                "role name must not be blank",
            ));
        }
        self.roles.create(name)
    }

    pub fn list_roles(&self) -> WardenResult<Vec<Role>> {
        self.roles.list()
    }

    /// Delete a role together with its rules and account assignments
    pub fn delete_role(&self, id: u64) -> WardenResult<()> {
        if self.roles.get(id)?.is_none() {
            return Err(WardenError::NotFound(format!("role {}", id)));
        }

        let removed_rules = self.rules.delete_for_role(id)?;
        let detached = self.accounts.detach_role_everywhere(id)?;
        self.roles.delete(id)?;

        info!(
            "Deleted role {} ({} rules removed, {} accounts detached)",
            id, removed_rules, detached
        );
        Ok(())
    }

    // ==================== Access pages ====================

    pub fn create_page(&self, path: &str) -> WardenResult<AccessPage> {
        if !path.starts_with('/') {
            return Err(WardenError::validation_field(
                "path",
                "path pattern must start with /",
            ));
        }
        self.pages.create(path)
    }

    pub fn list_pages(&self) -> WardenResult<Vec<AccessPage>> {
        self.pages.list()
    }

    /// Delete an access page together with its rules
    pub fn delete_page(&self, id: u64) -> WardenResult<()> {
        if self.pages.get(id)?.is_none() {
            return Err(WardenError::NotFound(format!("access page {}", id)));
        }

        let removed_rules = self.rules.delete_for_page(id)?;
        self.pages.delete(id)?;

        info!("Deleted access page {} ({} rules removed)", id, removed_rules);
        Ok(())
    }

    // ==================== Access rules ====================

    /// Grant a role access to a page pattern
    pub fn create_rule(&self, role_id: u64, page_id: u64) -> WardenResult<RuleDetails> {
        let role = self
            .roles
            .get(role_id)?
            .ok_or_else(|| WardenError::NotFound(format!("role {}", role_id)))?;
        let page = self
            .pages
            .get(page_id)?
            .ok_or_else(|| WardenError::NotFound(format!("access page {}", page_id)))?;

        let rule = self.rules.create(role.id, page.id)?;
        debug!("Granted role {} access to {}", role.name, page.path);

        Ok(RuleDetails {
            id: rule.id,
            role_id: role.id,
            role_name: role.name,
            page_id: page.id,
            path: page.path,
        })
    }

    pub fn delete_rule(&self, id: u64) -> WardenResult<()> {
        if !self.rules.delete(id)? {
            return Err(WardenError::NotFound(format!("access rule {}", id)));
        }
        Ok(())
    }

    pub fn list_rules(&self) -> WardenResult<Vec<RuleDetails>> {
        self.rules.list_detailed()
    }

    pub fn rules_for_role(&self, role_name: &str) -> WardenResult<Vec<RuleDetails>> {
        if self.roles.find_by_name(role_name)?.is_none() {
            return Err(WardenError::NotFound(format!("role {}", role_name)));
        }
        self.rules.list_for_role_name(role_name)
    }

    /// Replace every rule of a role with grants for the given page set
    pub fn replace_role_rules(
        &self,
        role_id: u64,
        page_ids: &[u64],
    ) -> WardenResult<Vec<RuleDetails>> {
        let role = self
            .roles
            .get(role_id)?
            .ok_or_else(|| WardenError::NotFound(format!("role {}", role_id)))?;

        for &page_id in page_ids {
            if self.pages.get(page_id)?.is_none() {
                return Err(WardenError::NotFound(format!("access page {}", page_id)));
            }
        }

        let created = self.rules.replace_for_role(role.id, page_ids)?;
        info!(
            "Replaced rules for role {}: {} grants",
            role.name,
            created.len()
        );

        let mut details = self.rules.list_for_role_name(&role.name)?;
        details.sort_by_key(|d| d.id);
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> PermissionAdmin {
        let roles = Arc::new(RoleStore::new());
        let pages = Arc::new(PageStore::new());
        let rules = Arc::new(RuleStore::new(roles.clone(), pages.clone()));
        let accounts = Arc::new(AccountStore::new());
        PermissionAdmin::new(roles, pages, rules, accounts)
    }

    #[test]
    fn test_create_role_conflict() {
        let admin = admin();
        admin.create_role("ROLE_X").unwrap();
        let err = admin.create_role("ROLE_X").unwrap_err();
        assert!(matches!(err, WardenError::Conflict(_)));
    }

    #[test]
    fn test_create_rule_conflict_and_not_found() {
        let admin = admin();
        let role = admin.create_role("ROLE_X").unwrap();
        let page = admin.create_page("/x/**").unwrap();

        admin.create_rule(role.id, page.id).unwrap();
        let err = admin.create_rule(role.id, page.id).unwrap_err();
        assert!(matches!(err, WardenError::Conflict(_)));

        let err = admin.create_rule(999, page.id).unwrap_err();
        assert!(matches!(err, WardenError::NotFound(_)));
    }

    #[test]
    fn test_delete_role_cascades_to_rules() {
        let admin = admin();
        let role = admin.create_role("ROLE_X").unwrap();
        let p1 = admin.create_page("/a/**").unwrap();
        let p2 = admin.create_page("/b/**").unwrap();
        admin.create_rule(role.id, p1.id).unwrap();
        admin.create_rule(role.id, p2.id).unwrap();

        admin.delete_role(role.id).unwrap();

        // No orphaned rules survive the parent deletion.
        assert!(admin.list_rules().unwrap().is_empty());
        assert!(matches!(
            admin.delete_role(role.id).unwrap_err(),
            WardenError::NotFound(_)
        ));
    }

    #[test]
    fn test_delete_page_cascades_to_rules() {
        let admin = admin();
        let role = admin.create_role("ROLE_X").unwrap();
        let page = admin.create_page("/a/**").unwrap();
        admin.create_rule(role.id, page.id).unwrap();

        admin.delete_page(page.id).unwrap();
        assert!(admin.list_rules().unwrap().is_empty());
        // The role itself is untouched.
        assert_eq!(admin.list_roles().unwrap().len(), 1);
    }

    #[test]
    fn test_replace_role_rules() {
        let admin = admin();
        let role = admin.create_role("ROLE_X").unwrap();
        let p1 = admin.create_page("/a/**").unwrap();
        let p2 = admin.create_page("/b/**").unwrap();
        let p3 = admin.create_page("/c/**").unwrap();
        admin.create_rule(role.id, p1.id).unwrap();

        let details = admin.replace_role_rules(role.id, &[p2.id, p3.id]).unwrap();
        assert_eq!(details.len(), 2);
        assert!(details.iter().all(|d| d.path != "/a/**"));

        let err = admin.replace_role_rules(role.id, &[999]).unwrap_err();
        assert!(matches!(err, WardenError::NotFound(_)));
    }

    #[test]
    fn test_page_path_must_be_rooted() {
        let admin = admin();
        let err = admin.create_page("admin/**").unwrap_err();
        assert!(matches!(err, WardenError::Validation { .. }));
    }
}
