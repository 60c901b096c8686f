pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod core;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use auth::{
    AccountService, AuthContext, AuthorizationEngine, MemberInfo, PasswordRequirements,
    PermissionAdmin, PermissionSource, TokenService,
};
pub use config::ServerConfig;
pub use core::{ErrorBody, WardenError, WardenResult};
pub use server::{AppState, create_router};
pub use store::{AccessPage, AccessRule, Account, AccountStore, PageStore, Role, RoleStore, RuleDetails, RuleStore};
