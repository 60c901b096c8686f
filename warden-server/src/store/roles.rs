//! Role table

use crate::core::{WardenError, WardenResult};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A named permission group, e.g. `ROLE_ADMIN`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: u64,
    pub name: String,
}

struct RoleTable {
    rows: HashMap<u64, Role>,
    next_id: u64,
}

/// Store for role rows. Name uniqueness is enforced under the write lock at
/// insert time; callers treat a duplicate insert as a conflict regardless of
/// any earlier existence check.
#[derive(Clone)]
pub struct RoleStore {
    inner: Arc<RwLock<RoleTable>>,
}

impl RoleStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RoleTable {
                rows: HashMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Insert a new role. Fails with `Conflict` if the name is taken.
    pub fn create(&self, name: &str) -> WardenResult<Role> {
        debug!("Creating role: {}", name);

        let mut table = self.inner.write();
        if table.rows.values().any(|r| r.name == name) {
            return Err(WardenError::Conflict(format!("role {}", name)));
        }

        let id = table.next_id;
        table.next_id += 1;

        let role = Role {
            id,
            name: name.to_string(),
        };
        table.rows.insert(id, role.clone());
        Ok(role)
    }

    pub fn get(&self, id: u64) -> WardenResult<Option<Role>> {
        Ok(self.inner.read().rows.get(&id).cloned())
    }

    pub fn find_by_name(&self, name: &str) -> WardenResult<Option<Role>> {
        Ok(self
            .inner
            .read()
            .rows
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    /// Resolve a role-name set to ids. Unknown names are skipped, not errors;
    /// a principal may hold a role that was deleted since login.
    pub fn ids_for_names(&self, names: &[String]) -> WardenResult<Vec<u64>> {
        let table = self.inner.read();
        Ok(table
            .rows
            .values()
            .filter(|r| names.contains(&r.name))
            .map(|r| r.id)
            .collect())
    }

    pub fn list(&self) -> WardenResult<Vec<Role>> {
        let mut roles: Vec<Role> = self.inner.read().rows.values().cloned().collect();
        roles.sort_by_key(|r| r.id);
        Ok(roles)
    }

    pub fn delete(&self, id: u64) -> WardenResult<bool> {
        debug!("Deleting role with id: {}", id);
        Ok(self.inner.write().rows.remove(&id).is_some())
    }
}

impl Default for RoleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_find() {
        let store = RoleStore::new();
        let role = store.create("ROLE_ADMIN").unwrap();
        assert_eq!(role.name, "ROLE_ADMIN");

        let found = store.find_by_name("ROLE_ADMIN").unwrap().unwrap();
        assert_eq!(found.id, role.id);
        assert!(store.find_by_name("ROLE_MISSING").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_name_is_conflict() {
        let store = RoleStore::new();
        store.create("ROLE_X").unwrap();

        let err = store.create("ROLE_X").unwrap_err();
        assert!(matches!(err, WardenError::Conflict(_)));
    }

    #[test]
    fn test_ids_for_names_skips_unknown() {
        let store = RoleStore::new();
        let admin = store.create("ROLE_ADMIN").unwrap();
        store.create("ROLE_USER").unwrap();

        let ids = store
            .ids_for_names(&["ROLE_ADMIN".to_string(), "ROLE_GONE".to_string()])
            .unwrap();
        assert_eq!(ids, vec![admin.id]);
    }

    #[test]
    fn test_delete() {
        let store = RoleStore::new();
        let role = store.create("ROLE_TEMP").unwrap();

        assert!(store.delete(role.id).unwrap());
        assert!(!store.delete(role.id).unwrap());
        assert!(store.get(role.id).unwrap().is_none());
    }
}
