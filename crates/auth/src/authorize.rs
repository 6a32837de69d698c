use serde::{Deserialize, Serialize};

use crate::{Permission, PermissionCatalog, Principal, SectionTable};

/// What to do with a section that has no entry in the section table.
///
/// This is passed in explicitly at construction; it is never inferred from
/// the build or runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    #[default]
    DenyByDefault,
    AllowByDefault,
}

/// The rule that produced a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DecisionRule {
    /// No user in the session.
    NoUser,
    /// User status is not active.
    Inactive,
    /// Admin override (flag, role, job title or `all`).
    Admin,
    /// Held one of the required permissions.
    Permission { matched: Permission },
    /// Held none of the required permissions.
    MissingPermission,
    /// Section is not in the table; the default policy decided.
    Unmapped { policy: DefaultPolicy },
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub granted: bool,
    pub rule: DecisionRule,
}

impl Decision {
    fn allow(rule: DecisionRule) -> Self {
        Self { granted: true, rule }
    }

    fn deny(rule: DecisionRule) -> Self {
        Self { granted: false, rule }
    }
}

/// Access decision function.
///
/// - No IO
/// - No panics
/// - Unknown or missing input resolves to deny (unless the section is
///   unmapped and the configured default policy allows it)
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    sections: SectionTable,
    default_policy: DefaultPolicy,
}

impl AccessPolicy {
    pub fn new(catalog: &PermissionCatalog, default_policy: DefaultPolicy) -> Self {
        Self {
            sections: catalog.sections().clone(),
            default_policy,
        }
    }

    pub fn default_policy(&self) -> DefaultPolicy {
        self.default_policy
    }

    pub fn can_access_section(&self, user: Option<&Principal>, section: &str) -> bool {
        self.decide_section(user, section).granted
    }

    pub fn has_permission(&self, user: Option<&Principal>, permission: &str) -> bool {
        self.decide_permission(user, permission).granted
    }

    pub fn decide_section(&self, user: Option<&Principal>, section: &str) -> Decision {
        let user = match gate(user) {
            Ok(user) => user,
            Err(decision) => return decision,
        };
        if user.admin {
            return Decision::allow(DecisionRule::Admin);
        }

        let Some(required) = self.sections.required(section) else {
            let rule = DecisionRule::Unmapped {
                policy: self.default_policy,
            };
            return match self.default_policy {
                DefaultPolicy::AllowByDefault => Decision::allow(rule),
                DefaultPolicy::DenyByDefault => Decision::deny(rule),
            };
        };

        match required.iter().find(|p| user.permissions.contains(*p)) {
            Some(matched) => Decision::allow(DecisionRule::Permission {
                matched: matched.clone(),
            }),
            None => Decision::deny(DecisionRule::MissingPermission),
        }
    }

    pub fn decide_permission(&self, user: Option<&Principal>, permission: &str) -> Decision {
        let user = match gate(user) {
            Ok(user) => user,
            Err(decision) => return decision,
        };
        if user.admin {
            return Decision::allow(DecisionRule::Admin);
        }

        match user.permissions.iter().find(|p| p.as_str() == permission) {
            Some(matched) => Decision::allow(DecisionRule::Permission {
                matched: matched.clone(),
            }),
            None => Decision::deny(DecisionRule::MissingPermission),
        }
    }

    /// Explain a section decision for audit screens.
    pub fn explain_section(&self, user: Option<&Principal>, section: &str) -> AccessExplanation {
        let decision = self.decide_section(user, section);
        let required: Vec<String> = self
            .sections
            .required(section)
            .map(|r| r.iter().map(|p| p.as_str().to_string()).collect())
            .unwrap_or_default();

        let held: Vec<String> = user
            .map(|u| u.permissions.iter().map(|p| p.as_str().to_string()).collect())
            .unwrap_or_default();

        let reason = match &decision.rule {
            DecisionRule::NoUser => "no user is signed in".to_string(),
            DecisionRule::Inactive => "the account is not active".to_string(),
            DecisionRule::Admin => "administrators may access every section".to_string(),
            DecisionRule::Permission { matched } => {
                format!("holds '{matched}', one of the permissions required by '{section}'")
            }
            DecisionRule::MissingPermission => format!(
                "holds none of the permissions required by '{section}': {required:?}"
            ),
            DecisionRule::Unmapped { policy } => {
                format!("section '{section}' is not mapped; default policy is {policy:?}")
            }
        };

        AccessExplanation {
            section: section.to_string(),
            granted: decision.granted,
            reason,
            rule: decision.rule,
            required_permissions: required,
            held_permissions: held,
        }
    }
}

fn gate(user: Option<&Principal>) -> Result<&Principal, Decision> {
    match user {
        None => Err(Decision::deny(DecisionRule::NoUser)),
        Some(u) if !u.active => Err(Decision::deny(DecisionRule::Inactive)),
        Some(u) => Ok(u),
    }
}

/// Detailed explanation of a section decision.
#[derive(Debug, Clone, Serialize)]
pub struct AccessExplanation {
    pub section: String,
    pub granted: bool,
    pub reason: String,
    pub rule: DecisionRule,
    pub required_permissions: Vec<String>,
    pub held_permissions: Vec<String>,
}
