use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role stored on a user record.
///
/// Known roles map to a [`RoleDefinition`] in the catalog. Anything else is
/// kept verbatim in [`Role::Other`] (older records use free-form strings such
/// as `"manager"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    GeneralManager,
    ExecutiveManager,
    BranchManager,
    ShiftSupervisor,
    BookingAgent,
    Accountant,
    Employee,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::GeneralManager => "general_manager",
            Role::ExecutiveManager => "executive_manager",
            Role::BranchManager => "branch_manager",
            Role::ShiftSupervisor => "shift_supervisor",
            Role::BookingAgent => "booking_agent",
            Role::Accountant => "accountant",
            Role::Employee => "employee",
            Role::Other(s) => s,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.trim() {
            "admin" => Role::Admin,
            "general_manager" => Role::GeneralManager,
            "executive_manager" => Role::ExecutiveManager,
            "branch_manager" => Role::BranchManager,
            "shift_supervisor" => Role::ShiftSupervisor,
            "booking_agent" => Role::BookingAgent,
            "accountant" => Role::Accountant,
            "employee" => Role::Employee,
            other => Role::Other(other.to_string()),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permissions granted by a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleGrant {
    /// The `"all"` sentinel: every catalog entry.
    All,
    Only(Vec<Permission>),
}

/// Sections listed for a role (navigation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionGrant {
    All,
    Only(Vec<String>),
}

/// Role definition with its granted permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub role: Role,
    pub title: String,
    pub description: String,
    pub permissions: RoleGrant,
    pub sections: SectionGrant,
}

impl RoleDefinition {
    pub fn grants_all(&self) -> bool {
        matches!(self.permissions, RoleGrant::All)
    }
}
