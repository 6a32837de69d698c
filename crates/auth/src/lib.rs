//! `rihla-auth`: pure authorization boundary for the back office.
//!
//! This crate is intentionally decoupled from storage and transport: it
//! consumes user records already loaded by the caller and answers access
//! questions deterministically.

pub mod authorize;
pub mod bootstrap;
pub mod catalog;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod sections;
pub mod user;

pub use authorize::{AccessExplanation, AccessPolicy, Decision, DecisionRule, DefaultPolicy};
pub use bootstrap::{AccountBootstrap, BootstrapChange, BootstrapResult, EmployeeRecord};
pub use catalog::{CatalogError, CategoryDefinition, CategoryGroup, PermissionCatalog};
pub use permissions::{Permission, PermissionDefinition, PermissionLevel};
pub use principal::{ADMIN_JOB_TITLE, Principal};
pub use roles::{Role, RoleDefinition, RoleGrant, SectionGrant};
pub use sections::SectionTable;
pub use user::{UserRecord, UserStatus};
