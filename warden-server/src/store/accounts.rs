//! Account table and the account ↔ role join

use crate::core::{WardenError, WardenResult};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// A registered user account
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Attached roles (explicit join). May be emptied by admin action after
    /// creation; a role-less account simply has zero permissions.
    pub role_ids: HashSet<u64>,
}

struct AccountTable {
    rows: HashMap<u64, Account>,
    next_id: u64,
}

/// Store for account rows. Username and email uniqueness are enforced under
/// the write lock at insert time.
#[derive(Clone)]
pub struct AccountStore {
    inner: Arc<RwLock<AccountTable>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(AccountTable {
                rows: HashMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Insert a new account with one initial role attached
    pub fn create(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
        role_id: u64,
    ) -> WardenResult<Account> {
        debug!("Creating account: {}", username);

        let mut table = self.inner.write();
        if table.rows.values().any(|a| a.username == username) {
            return Err(WardenError::DuplicateUsername);
        }
        if table.rows.values().any(|a| a.email == email) {
            return Err(WardenError::DuplicateEmail);
        }

        let id = table.next_id;
        table.next_id += 1;

        let now = Utc::now();
        let account = Account {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            email: email.to_string(),
            created_at: now,
            updated_at: now,
            role_ids: HashSet::from([role_id]),
        };
        table.rows.insert(id, account.clone());
        Ok(account)
    }

    pub fn find_by_username(&self, username: &str) -> WardenResult<Option<Account>> {
        Ok(self
            .inner
            .read()
            .rows
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    pub fn exists_by_username(&self, username: &str) -> WardenResult<bool> {
        Ok(self
            .inner
            .read()
            .rows
            .values()
            .any(|a| a.username == username))
    }

    pub fn exists_by_email(&self, email: &str) -> WardenResult<bool> {
        Ok(self.inner.read().rows.values().any(|a| a.email == email))
    }

    pub fn list(&self) -> WardenResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self.inner.read().rows.values().cloned().collect();
        accounts.sort_by_key(|a| a.id);
        Ok(accounts)
    }

    /// Attach a role. Fails with `NotFound` for an unknown account and
    /// `DuplicateAssignment` if the role is already held.
    pub fn add_role(&self, username: &str, role_id: u64, role_name: &str) -> WardenResult<()> {
        debug!("Adding role {} to account {}", role_name, username);

        let mut table = self.inner.write();
        let account = table
            .rows
            .values_mut()
            .find(|a| a.username == username)
            .ok_or_else(|| WardenError::NotFound(format!("account {}", username)))?;

        if !account.role_ids.insert(role_id) {
            return Err(WardenError::DuplicateAssignment(role_name.to_string()));
        }
        account.updated_at = Utc::now();
        Ok(())
    }

    /// Detach a role. Fails with `NotFound` for an unknown account or a role
    /// the account does not hold.
    pub fn remove_role(&self, username: &str, role_id: u64, role_name: &str) -> WardenResult<()> {
        debug!("Removing role {} from account {}", role_name, username);

        let mut table = self.inner.write();
        let account = table
            .rows
            .values_mut()
            .find(|a| a.username == username)
            .ok_or_else(|| WardenError::NotFound(format!("account {}", username)))?;

        if !account.role_ids.remove(&role_id) {
            return Err(WardenError::NotFound(format!(
                "assignment of role {} to account {}",
                role_name, username
            )));
        }
        account.updated_at = Utc::now();
        Ok(())
    }

    /// Detach a role from every account that holds it (cascade step for role
    /// deletion). Returns the number of accounts touched.
    pub fn detach_role_everywhere(&self, role_id: u64) -> WardenResult<usize> {
        let mut table = self.inner.write();
        let mut touched = 0;
        for account in table.rows.values_mut() {
            if account.role_ids.remove(&role_id) {
                account.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_find() {
        let store = AccountStore::new();
        let account = store.create("alice", "hash", "a@x.com", 1).unwrap();

        assert_eq!(account.role_ids, HashSet::from([1]));
        assert!(store.find_by_username("alice").unwrap().is_some());
        assert!(store.exists_by_email("a@x.com").unwrap());
    }

    #[test]
    fn test_unique_username_and_email() {
        let store = AccountStore::new();
        store.create("alice", "hash", "a@x.com", 1).unwrap();

        let err = store.create("alice", "hash", "other@x.com", 1).unwrap_err();
        assert!(matches!(err, WardenError::DuplicateUsername));

        let err = store.create("bob", "hash", "a@x.com", 1).unwrap_err();
        assert!(matches!(err, WardenError::DuplicateEmail));
    }

    #[test]
    fn test_add_and_remove_role() {
        let store = AccountStore::new();
        store.create("alice", "hash", "a@x.com", 1).unwrap();

        store.add_role("alice", 2, "ROLE_EXTRA").unwrap();
        let err = store.add_role("alice", 2, "ROLE_EXTRA").unwrap_err();
        assert!(matches!(err, WardenError::DuplicateAssignment(_)));

        store.remove_role("alice", 2, "ROLE_EXTRA").unwrap();
        let err = store.remove_role("alice", 2, "ROLE_EXTRA").unwrap_err();
        assert!(matches!(err, WardenError::NotFound(_)));
    }

    #[test]
    fn test_account_may_end_up_role_less() {
        let store = AccountStore::new();
        store.create("alice", "hash", "a@x.com", 1).unwrap();
        store.remove_role("alice", 1, "ROLE_USER").unwrap();

        let account = store.find_by_username("alice").unwrap().unwrap();
        assert!(account.role_ids.is_empty());
    }

    #[test]
    fn test_detach_role_everywhere() {
        let store = AccountStore::new();
        store.create("alice", "hash", "a@x.com", 7).unwrap();
        store.create("bob", "hash", "b@x.com", 7).unwrap();
        store.create("carol", "hash", "c@x.com", 9).unwrap();

        assert_eq!(store.detach_role_everywhere(7).unwrap(), 2);
        assert!(store
            .find_by_username("alice")
            .unwrap()
            .unwrap()
            .role_ids
            .is_empty());
    }

    #[test]
    fn test_unknown_account_is_not_found() {
        let store = AccountStore::new();
        let err = store.add_role("ghost", 1, "ROLE_USER").unwrap_err();
        assert!(matches!(err, WardenError::NotFound(_)));
    }
}
