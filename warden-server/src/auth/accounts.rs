//! Account service - registration, credential validation, role assignment
//!
//! Mutates the data the authorization engine reads. Registration assigns the
//! configured default role; role attachment/detachment is admin-driven and
//! takes effect on the member's next request.

use super::password_validation::PasswordRequirements;
use crate::core::{WardenError, WardenResult};
use crate::store::{Account, AccountStore, RoleStore};
use bcrypt::{DEFAULT_COST, hash, verify};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Account data exposed to the API, without the credential hash
#[derive(Debug, Clone, Serialize)]
pub struct MemberInfo {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<AccountStore>,
    roles: Arc<RoleStore>,
    password_requirements: PasswordRequirements,
    default_role: String,
}

impl AccountService {
    pub fn new(
        accounts: Arc<AccountStore>,
        roles: Arc<RoleStore>,
        password_requirements: PasswordRequirements,
        default_role: impl Into<String>,
    ) -> Self {
        Self {
            accounts,
            roles,
            password_requirements,
            default_role: default_role.into(),
        }
    }

    /// Register a new account with the default role attached.
    ///
    /// Nothing is persisted unless every validation passes.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        password_confirm: &str,
        email: &str,
    ) -> WardenResult<Account> {
        debug!("Signup attempt for username: {}", username);

        if username.trim().is_empty() {
            return Err(WardenError::validation_field(
                "username",
                "username must not be blank",
            ));
        }
        if !email.contains('@') || email.trim().is_empty() {
            return Err(WardenError::validation_field(
                "email",
                "not a valid email address",
            ));
        }
        if password != password_confirm {
            return Err(WardenError::PasswordMismatch);
        }
        self.password_requirements.validate(password)?;

        if self.accounts.exists_by_username(username)? {
            return Err(WardenError::DuplicateUsername);
        }
        if self.accounts.exists_by_email(email)? {
            return Err(WardenError::DuplicateEmail);
        }

        // A missing default role is a deployment fault, not a client error.
        let default_role = self
            .roles
            .find_by_name(&self.default_role)?
            .ok_or_else(|| WardenError::MissingDefaultRole(self.default_role.clone()))?;

        let password_hash = hash(password, DEFAULT_COST)
            .map_err(|e| WardenError::Internal(format!("failed to hash password: {}", e)))?;

        let account = self
            .accounts
            .create(username, &password_hash, email, default_role.id)?;

        info!("Member signup completed: {}", username);
        Ok(account)
    }

    /// Validate credentials for login.
    ///
    /// Unknown username and wrong password produce the same error so the
    /// response cannot be used to enumerate accounts.
    pub fn authenticate(&self, username: &str, password: &str) -> WardenResult<Account> {
        debug!("Authenticating user: {}", username);

        let account = self
            .accounts
            .find_by_username(username)?
            .ok_or(WardenError::LoginFailed)?;

        if !verify(password, &account.password_hash).unwrap_or(false) {
            return Err(WardenError::LoginFailed);
        }

        Ok(account)
    }

    /// The subject's current role names, looked up fresh from storage
    pub fn roles_of(&self, username: &str) -> WardenResult<Vec<String>> {
        let account = self
            .accounts
            .find_by_username(username)?
            .ok_or_else(|| WardenError::NotFound(format!("account {}", username)))?;

        self.role_names(&account)
    }

    /// Attach a role to an account
    pub fn add_role(&self, username: &str, role_name: &str) -> WardenResult<()> {
        let role = self
            .roles
            .find_by_name(role_name)?
            .ok_or_else(|| WardenError::NotFound(format!("role {}", role_name)))?;

        self.accounts.add_role(username, role.id, role_name)?;
        info!("Added role {} to member {}", role_name, username);
        Ok(())
    }

    /// Detach a role from an account
    pub fn remove_role(&self, username: &str, role_name: &str) -> WardenResult<()> {
        let role = self
            .roles
            .find_by_name(role_name)?
            .ok_or_else(|| WardenError::NotFound(format!("role {}", role_name)))?;

        self.accounts.remove_role(username, role.id, role_name)?;
        info!("Removed role {} from member {}", role_name, username);
        Ok(())
    }

    pub fn member_info(&self, username: &str) -> WardenResult<MemberInfo> {
        let account = self
            .accounts
            .find_by_username(username)?
            .ok_or_else(|| WardenError::NotFound(format!("account {}", username)))?;

        Ok(MemberInfo {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            roles: self.role_names(&account)?,
        })
    }

    pub fn list_members(&self) -> WardenResult<Vec<MemberInfo>> {
        let mut members = Vec::new();
        for account in self.accounts.list()? {
            members.push(MemberInfo {
                id: account.id,
                username: account.username.clone(),
                email: account.email.clone(),
                roles: self.role_names(&account)?,
            });
        }
        Ok(members)
    }

    /// Whether the email address is still available for signup
    pub fn email_available(&self, email: &str) -> WardenResult<bool> {
        Ok(!self.accounts.exists_by_email(email)?)
    }

    fn role_names(&self, account: &Account) -> WardenResult<Vec<String>> {
        let mut names = Vec::new();
        for &role_id in &account.role_ids {
            // A role deleted since assignment simply drops out of the set.
            if let Some(role) = self.roles.get(role_id)? {
                names.push(role.name);
            }
        }
        names.sort();
        Ok(names)
    }
}
