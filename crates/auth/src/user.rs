//! Stored user record, exactly as older and newer documents look.
//!
//! Three overlapping authorization representations live on this record
//! (`role`, `job_title`, `permissions`). They are only ever read by
//! [`crate::Principal::resolve`]; nothing else should branch on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rihla_core::{EmployeeId, UserId};

use crate::{Permission, Role};

/// Account status. Anything other than `"active"` (including a missing
/// value) is treated as inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    #[default]
    #[serde(other)]
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "name")]
    pub display_name: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_super_admin: bool,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EmployeeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// A blank, inactive record; tests and bootstrap fill in the rest.
    pub fn new(id: UserId, email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            display_name: display_name.into(),
            role: None,
            job_title: None,
            permissions: Vec::new(),
            is_admin: false,
            is_super_admin: false,
            status: UserStatus::Inactive,
            employee_id: None,
            last_login: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}
