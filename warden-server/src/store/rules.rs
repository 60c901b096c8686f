//! Access rule table (role ↔ page grants)
//!
//! Each row grants one role access to one page pattern. The (role, page)
//! pair is unique; duplicate grants fail instead of silently succeeding.
//! Reads take a role-name set, never a single role; a principal typically
//! holds more than one role.

use super::pages::PageStore;
use super::roles::RoleStore;
use crate::core::{WardenError, WardenResult};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A grant of a role's access to a page pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRule {
    pub id: u64,
    pub role_id: u64,
    pub page_id: u64,
}

/// An access rule joined with its role name and page pattern, for the admin
/// listing surface
#[derive(Debug, Clone, Serialize)]
pub struct RuleDetails {
    pub id: u64,
    pub role_id: u64,
    pub role_name: String,
    pub page_id: u64,
    pub path: String,
}

struct RuleTable {
    rows: HashMap<u64, AccessRule>,
    next_id: u64,
}

/// Store for access rule rows
///
/// Holds handles to the role and page stores so that name/path joins stay
/// inside the storage layer, mirroring the relational queries they stand for.
#[derive(Clone)]
pub struct RuleStore {
    roles: Arc<RoleStore>,
    pages: Arc<PageStore>,
    inner: Arc<RwLock<RuleTable>>,
}

impl RuleStore {
    pub fn new(roles: Arc<RoleStore>, pages: Arc<PageStore>) -> Self {
        Self {
            roles,
            pages,
            inner: Arc::new(RwLock::new(RuleTable {
                rows: HashMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Insert a new grant. Fails with `Conflict` if the (role, page) pair
    /// already exists.
    pub fn create(&self, role_id: u64, page_id: u64) -> WardenResult<AccessRule> {
        debug!("Creating access rule: role_id={} page_id={}", role_id, page_id);

        let mut table = self.inner.write();
        if table
            .rows
            .values()
            .any(|r| r.role_id == role_id && r.page_id == page_id)
        {
            return Err(WardenError::Conflict(format!(
                "access rule for role {} and page {}",
                role_id, page_id
            )));
        }

        let id = table.next_id;
        table.next_id += 1;

        let rule = AccessRule {
            id,
            role_id,
            page_id,
        };
        table.rows.insert(id, rule.clone());
        Ok(rule)
    }

    pub fn exists(&self, role_id: u64, page_id: u64) -> WardenResult<bool> {
        Ok(self
            .inner
            .read()
            .rows
            .values()
            .any(|r| r.role_id == role_id && r.page_id == page_id))
    }

    pub fn get(&self, id: u64) -> WardenResult<Option<AccessRule>> {
        Ok(self.inner.read().rows.get(&id).cloned())
    }

    pub fn delete(&self, id: u64) -> WardenResult<bool> {
        debug!("Deleting access rule with id: {}", id);
        Ok(self.inner.write().rows.remove(&id).is_some())
    }

    /// Remove every grant referencing the role. Returns the number removed.
    pub fn delete_for_role(&self, role_id: u64) -> WardenResult<usize> {
        let mut table = self.inner.write();
        let before = table.rows.len();
        table.rows.retain(|_, r| r.role_id != role_id);
        Ok(before - table.rows.len())
    }

    /// Remove every grant referencing the page. Returns the number removed.
    pub fn delete_for_page(&self, page_id: u64) -> WardenResult<usize> {
        let mut table = self.inner.write();
        let before = table.rows.len();
        table.rows.retain(|_, r| r.page_id != page_id);
        Ok(before - table.rows.len())
    }

    /// Replace all grants of a role with the given page set, atomically under
    /// one write lock. Duplicate page ids in the input collapse to one grant.
    pub fn replace_for_role(&self, role_id: u64, page_ids: &[u64]) -> WardenResult<Vec<AccessRule>> {
        debug!("Replacing access rules for role_id={}", role_id);

        let mut table = self.inner.write();
        table.rows.retain(|_, r| r.role_id != role_id);

        let mut created = Vec::new();
        for &page_id in page_ids {
            if created.iter().any(|r: &AccessRule| r.page_id == page_id) {
                continue;
            }
            let id = table.next_id;
            table.next_id += 1;
            let rule = AccessRule {
                id,
                role_id,
                page_id,
            };
            table.rows.insert(id, rule.clone());
            created.push(rule);
        }
        Ok(created)
    }

    /// Rules whose role is in the given name set and whose page pattern
    /// equals the path literally (the exact-match phase of authorization)
    pub fn rules_for_role_names_and_path(
        &self,
        role_names: &[String],
        path: &str,
    ) -> WardenResult<Vec<AccessRule>> {
        let role_ids = self.roles.ids_for_names(role_names)?;
        let page = self.pages.find_by_path(path)?;

        let Some(page) = page else {
            return Ok(Vec::new());
        };

        Ok(self
            .inner
            .read()
            .rows
            .values()
            .filter(|r| r.page_id == page.id && role_ids.contains(&r.role_id))
            .cloned()
            .collect())
    }

    /// All rules whose role is in the given name set (the pattern-scan phase)
    pub fn rules_for_role_names(&self, role_names: &[String]) -> WardenResult<Vec<AccessRule>> {
        let role_ids = self.roles.ids_for_names(role_names)?;

        Ok(self
            .inner
            .read()
            .rows
            .values()
            .filter(|r| role_ids.contains(&r.role_id))
            .cloned()
            .collect())
    }

    /// Resolve a rule's page to its stored pattern string
    pub fn pattern_of(&self, page_id: u64) -> WardenResult<Option<String>> {
        Ok(self.pages.get(page_id)?.map(|p| p.path))
    }

    fn details_of(&self, rule: &AccessRule) -> WardenResult<Option<RuleDetails>> {
        let role = self.roles.get(rule.role_id)?;
        let page = self.pages.get(rule.page_id)?;
        Ok(match (role, page) {
            (Some(role), Some(page)) => Some(RuleDetails {
                id: rule.id,
                role_id: role.id,
                role_name: role.name,
                page_id: page.id,
                path: page.path,
            }),
            _ => None,
        })
    }

    /// All rules joined with role name and page pattern. Rules whose role or
    /// page row has vanished are omitted.
    pub fn list_detailed(&self) -> WardenResult<Vec<RuleDetails>> {
        let rules: Vec<AccessRule> = self.inner.read().rows.values().cloned().collect();

        let mut details = Vec::new();
        for rule in &rules {
            if let Some(d) = self.details_of(rule)? {
                details.push(d);
            }
        }
        details.sort_by_key(|d| d.id);
        Ok(details)
    }

    /// Detailed rules for one role name
    pub fn list_for_role_name(&self, role_name: &str) -> WardenResult<Vec<RuleDetails>> {
        let mut details = self.list_detailed()?;
        details.retain(|d| d.role_name == role_name);
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stores() -> (Arc<RoleStore>, Arc<PageStore>, RuleStore) {
        let roles = Arc::new(RoleStore::new());
        let pages = Arc::new(PageStore::new());
        let rules = RuleStore::new(roles.clone(), pages.clone());
        (roles, pages, rules)
    }

    #[test]
    fn test_duplicate_pair_is_conflict() {
        let (roles, pages, rules) = stores();
        let role = roles.create("ROLE_ADMIN").unwrap();
        let page = pages.create("/api/admin/**").unwrap();

        rules.create(role.id, page.id).unwrap();
        let err = rules.create(role.id, page.id).unwrap_err();
        assert!(matches!(err, WardenError::Conflict(_)));
    }

    #[test]
    fn test_exact_path_join() {
        let (roles, pages, rules) = stores();
        let admin = roles.create("ROLE_ADMIN").unwrap();
        roles.create("ROLE_USER").unwrap();
        let page = pages.create("/dashboard").unwrap();
        rules.create(admin.id, page.id).unwrap();

        let hits = rules
            .rules_for_role_names_and_path(&["ROLE_ADMIN".to_string()], "/dashboard")
            .unwrap();
        assert_eq!(hits.len(), 1);

        // Same path, a role without the grant
        let misses = rules
            .rules_for_role_names_and_path(&["ROLE_USER".to_string()], "/dashboard")
            .unwrap();
        assert!(misses.is_empty());

        // Unknown path resolves to no page, hence no rules
        let none = rules
            .rules_for_role_names_and_path(&["ROLE_ADMIN".to_string()], "/nowhere")
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_rules_for_role_names_spans_roles() {
        let (roles, pages, rules) = stores();
        let admin = roles.create("ROLE_ADMIN").unwrap();
        let user = roles.create("ROLE_USER").unwrap();
        let p1 = pages.create("/a/**").unwrap();
        let p2 = pages.create("/b/**").unwrap();
        rules.create(admin.id, p1.id).unwrap();
        rules.create(user.id, p2.id).unwrap();

        let both = rules
            .rules_for_role_names(&["ROLE_ADMIN".to_string(), "ROLE_USER".to_string()])
            .unwrap();
        assert_eq!(both.len(), 2);

        let one = rules
            .rules_for_role_names(&["ROLE_USER".to_string()])
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].page_id, p2.id);
    }

    #[test]
    fn test_delete_for_role_and_page() {
        let (roles, pages, rules) = stores();
        let admin = roles.create("ROLE_ADMIN").unwrap();
        let user = roles.create("ROLE_USER").unwrap();
        let p1 = pages.create("/a/**").unwrap();
        let p2 = pages.create("/b/**").unwrap();
        rules.create(admin.id, p1.id).unwrap();
        rules.create(admin.id, p2.id).unwrap();
        rules.create(user.id, p1.id).unwrap();

        assert_eq!(rules.delete_for_role(admin.id).unwrap(), 2);
        assert_eq!(rules.delete_for_page(p1.id).unwrap(), 1);
        assert!(rules.list_detailed().unwrap().is_empty());
    }

    #[test]
    fn test_replace_for_role() {
        let (roles, pages, rules) = stores();
        let role = roles.create("ROLE_USER").unwrap();
        let p1 = pages.create("/a/**").unwrap();
        let p2 = pages.create("/b/**").unwrap();
        let p3 = pages.create("/c/**").unwrap();
        rules.create(role.id, p1.id).unwrap();

        let created = rules
            .replace_for_role(role.id, &[p2.id, p3.id, p3.id])
            .unwrap();
        assert_eq!(created.len(), 2);

        let remaining = rules.rules_for_role_names(&["ROLE_USER".to_string()]).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|r| r.page_id != p1.id));
    }

    #[test]
    fn test_list_detailed_joins_names() {
        let (roles, pages, rules) = stores();
        let role = roles.create("ROLE_GUEST").unwrap();
        let page = pages.create("/play/**").unwrap();
        rules.create(role.id, page.id).unwrap();

        let details = rules.list_detailed().unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].role_name, "ROLE_GUEST");
        assert_eq!(details[0].path, "/play/**");
    }
}
