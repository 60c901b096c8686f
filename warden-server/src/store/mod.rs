//! Persistent state
//!
//! Row stores keyed by surrogate ids, one per entity, behind `RwLock`s. The
//! stores are the single source of truth shared between requests; uniqueness
//! constraints are enforced by each store's insert under its write lock, so
//! callers must treat a duplicate-on-insert as a conflict even after a
//! passing existence check.

pub mod accounts;
pub mod pages;
pub mod roles;
pub mod rules;

pub use accounts::{Account, AccountStore};
pub use pages::{AccessPage, PageStore};
pub use roles::{Role, RoleStore};
pub use rules::{AccessRule, RuleDetails, RuleStore};
