//! Account bootstrap: the only place a user record is changed as a side
//! effect of signing in.
//!
//! Runs once per login (or at first creation), before the record is
//! normalized into a [`crate::Principal`]. Access decisions never mutate.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use rihla_core::{EmployeeId, UserId};

use crate::{Role, UserRecord, UserStatus};

/// Employee document that a user account can be derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// A single change made by the bootstrap step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum BootstrapChange {
    DerivedFromEmployee { employee_id: EmployeeId },
    PromotedToAdmin,
    LastLoginStamped { at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapResult {
    pub record: UserRecord,
    pub changes: Vec<BootstrapChange>,
}

impl BootstrapResult {
    /// Document patch covering exactly the fields that changed.
    pub fn patch(&self) -> Map<String, JsonValue> {
        let mut patch = Map::new();
        for change in &self.changes {
            match change {
                BootstrapChange::DerivedFromEmployee { .. } => {
                    if let Ok(JsonValue::Object(full)) = serde_json::to_value(&self.record) {
                        patch.extend(full);
                    }
                }
                BootstrapChange::PromotedToAdmin => {
                    patch.insert("role".to_string(), json!(Role::Admin));
                    patch.insert("isAdmin".to_string(), json!(true));
                }
                BootstrapChange::LastLoginStamped { at } => {
                    patch.insert("lastLogin".to_string(), json!(at));
                }
            }
        }
        patch
    }

    pub fn is_new_account(&self) -> bool {
        self.changes
            .iter()
            .any(|c| matches!(c, BootstrapChange::DerivedFromEmployee { .. }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountBootstrap {
    reserved_admin_emails: BTreeSet<String>,
}

impl AccountBootstrap {
    pub fn new<I, S>(reserved_admin_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            reserved_admin_emails: reserved_admin_emails
                .into_iter()
                .map(|e| normalize_email(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_reserved_admin(&self, email: &str) -> bool {
        self.reserved_admin_emails.contains(&normalize_email(email))
    }

    /// Bootstrap an existing record at login.
    pub fn on_login(&self, record: UserRecord, now: DateTime<Utc>) -> BootstrapResult {
        let mut result = BootstrapResult {
            record,
            changes: Vec::new(),
        };
        self.promote_reserved(&mut result);
        result.record.last_login = Some(now);
        result.changes.push(BootstrapChange::LastLoginStamped { at: now });
        result
    }

    /// Create a user record from an employee at their first login.
    pub fn from_employee(
        &self,
        user_id: UserId,
        employee: &EmployeeRecord,
        now: DateTime<Utc>,
    ) -> BootstrapResult {
        let email = normalize_email(&employee.email);
        let mut record = UserRecord::new(user_id, email, employee.name.trim());
        record.job_title = employee.job_title.clone();
        record.role = employee.role.clone();
        record.employee_id = Some(employee.id.clone());
        record.status = UserStatus::Active;

        let mut result = BootstrapResult {
            record,
            changes: vec![BootstrapChange::DerivedFromEmployee {
                employee_id: employee.id.clone(),
            }],
        };
        self.promote_reserved(&mut result);
        result.record.last_login = Some(now);
        result.changes.push(BootstrapChange::LastLoginStamped { at: now });
        result
    }

    fn promote_reserved(&self, result: &mut BootstrapResult) {
        let record = &mut result.record;
        if !self.is_reserved_admin(&record.email) {
            return;
        }
        if record.role == Some(Role::Admin) && record.is_admin {
            return;
        }
        record.role = Some(Role::Admin);
        record.is_admin = true;
        result.changes.push(BootstrapChange::PromotedToAdmin);
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
