//! Session principal: the normalized, canonical form of a user record.
//!
//! Stored user documents carry up to three authorization representations
//! (structured role, free-text Arabic job title, permission list). They are
//! folded into one permission set here, once per login, so access decisions
//! only ever look at that set.

use std::collections::BTreeSet;

use serde::Serialize;

use rihla_core::UserId;

use crate::{Permission, PermissionCatalog, Role, UserRecord};

/// Job title that historically marked system administrators.
pub const ADMIN_JOB_TITLE: &str = "مسؤول النظام";

/// Section allow-lists for records that predate permission lists.
const LEGACY_ROLE_SECTIONS: &[(&str, &[&str])] = &[
    (
        "manager",
        &[
            "dashboard", "customers", "flights", "hotels", "vehicles", "events", "visas",
            "tours", "accounting", "expenses", "revenues", "invoices", "receipts", "reports",
            "employees",
        ],
    ),
    (
        "employee",
        &["dashboard", "customers", "flights", "hotels", "vehicles", "events", "visas", "tours"],
    ),
    (
        "accountant",
        &[
            "dashboard", "customers", "accounting", "expenses", "revenues", "invoices",
            "receipts", "reports",
        ],
    ),
];

/// Job title → legacy role key.
const JOB_TITLE_ROLES: &[(&str, &str)] = &[
    ("مدير عام", "manager"),
    ("مدير تنفيذي", "manager"),
    ("مدير فرع", "manager"),
    ("مشرف وردية", "employee"),
    ("موظف حجوزات", "employee"),
    ("موظف", "employee"),
    ("محاسب", "accountant"),
];

/// In-memory session object consulted by every access decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub active: bool,
    pub admin: bool,
    pub permissions: BTreeSet<Permission>,
}

impl Principal {
    /// Normalize a stored user record against the catalog.
    ///
    /// The permission set is the union of:
    /// - the explicit permission list,
    /// - the structured role's definition, or the legacy allow-list when
    ///   the role string is not a catalog role,
    /// - the legacy allow-list implied by the job title.
    ///
    /// Legacy allow-lists contribute each section's canonical permission.
    pub fn resolve(record: &UserRecord, catalog: &PermissionCatalog) -> Self {
        let job_title = record.job_title.as_deref().map(str::trim);

        let admin = record.is_admin
            || record.is_super_admin
            || record.role == Some(Role::Admin)
            || job_title == Some(ADMIN_JOB_TITLE)
            || record.permissions.iter().any(Permission::is_all)
            || record
                .role
                .as_ref()
                .and_then(|r| catalog.role(r))
                .is_some_and(|d| d.grants_all());

        let mut permissions: BTreeSet<Permission> = record
            .permissions
            .iter()
            .filter(|p| !p.is_all())
            .cloned()
            .collect();

        // Structured roles use their catalog definition only; the legacy
        // allow-lists apply to role strings the catalog does not define.
        if let Some(role) = &record.role {
            match catalog.role(role) {
                Some(_) => permissions.extend(catalog.role_permissions(role)),
                None => permissions.extend(legacy_permissions(catalog, role.as_str())),
            }
        }

        if let Some(legacy) = job_title.and_then(legacy_role_for_job_title) {
            permissions.extend(legacy_permissions(catalog, legacy));
        }

        Self {
            user_id: record.id.clone(),
            email: record.email.clone(),
            display_name: record.display_name.clone(),
            active: record.is_active(),
            admin,
            permissions,
        }
    }

    pub fn holds(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p.as_str() == permission)
    }
}

fn legacy_role_for_job_title(title: &str) -> Option<&'static str> {
    JOB_TITLE_ROLES
        .iter()
        .find(|(t, _)| *t == title)
        .map(|(_, role)| *role)
}

fn legacy_permissions(catalog: &PermissionCatalog, legacy_role: &str) -> Vec<Permission> {
    let Some((_, sections)) = LEGACY_ROLE_SECTIONS.iter().find(|(r, _)| *r == legacy_role) else {
        return Vec::new();
    };

    sections
        .iter()
        .filter_map(|s| catalog.sections().canonical_permission(s))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserStatus;

    fn record(id: &str) -> UserRecord {
        let mut r = UserRecord::new(UserId::parse(id).unwrap(), format!("{id}@agency.example"), id);
        r.status = UserStatus::Active;
        r
    }

    fn perms(p: &Principal) -> Vec<&str> {
        p.permissions.iter().map(Permission::as_str).collect()
    }

    #[test]
    fn explicit_permissions_pass_through() {
        let catalog = PermissionCatalog::standard();
        let mut r = record("agent");
        r.permissions = vec![Permission::from_static("manage_flights")];

        let p = Principal::resolve(&r, &catalog);
        assert!(!p.admin);
        assert_eq!(perms(&p), vec!["manage_flights"]);
    }

    #[test]
    fn every_admin_marker_yields_admin() {
        let catalog = PermissionCatalog::standard();

        let mut flag = record("a1");
        flag.is_admin = true;
        let mut super_flag = record("a2");
        super_flag.is_super_admin = true;
        let mut role = record("a3");
        role.role = Some(Role::Admin);
        let mut title = record("a4");
        title.job_title = Some(format!(" {ADMIN_JOB_TITLE} "));
        let mut all = record("a5");
        all.permissions = vec![Permission::ALL];

        for r in [flag, super_flag, role, title, all] {
            assert!(Principal::resolve(&r, &catalog).admin, "{} should be admin", r.id);
        }
    }

    #[test]
    fn all_sentinel_is_not_kept_as_a_permission() {
        let catalog = PermissionCatalog::standard();
        let mut r = record("a6");
        r.permissions = vec![Permission::ALL];
        let p = Principal::resolve(&r, &catalog);
        assert!(p.permissions.is_empty());
    }

    #[test]
    fn legacy_manager_role_maps_to_canonical_permissions() {
        let catalog = PermissionCatalog::standard();
        let mut r = record("m1");
        r.role = Some(Role::Other("manager".to_string()));

        let p = Principal::resolve(&r, &catalog);
        assert!(p.holds("manage_accounting"));
        assert!(p.holds("manage_flights"));
        assert!(!p.holds("manage_users"));
    }

    #[test]
    fn accountant_job_title_matches_accountant_sections() {
        let catalog = PermissionCatalog::standard();
        let mut r = record("acc");
        r.job_title = Some("محاسب".to_string());

        let p = Principal::resolve(&r, &catalog);
        assert!(p.holds("manage_expenses"));
        assert!(p.holds("view_reports"));
        assert!(!p.holds("manage_flights"));
    }

    #[test]
    fn structured_role_uses_catalog_definition() {
        let catalog = PermissionCatalog::standard();
        let mut r = record("ba");
        r.role = Some(Role::BookingAgent);

        let p = Principal::resolve(&r, &catalog);
        assert!(p.holds("manage_visas"));
        assert!(!p.holds("manage_accounting"));
    }

    #[test]
    fn structured_roles_do_not_inherit_legacy_allow_lists() {
        let catalog = PermissionCatalog::standard();

        let mut accountant = record("acc2");
        accountant.role = Some(Role::Accountant);
        let p = Principal::resolve(&accountant, &catalog);
        assert!(p.holds("view_customers"));
        assert!(!p.holds("manage_customers"));

        let mut employee = record("emp2");
        employee.role = Some(Role::Employee);
        let p = Principal::resolve(&employee, &catalog);
        assert!(!p.holds("manage_tours"));

        for role in [Role::Accountant, Role::Employee] {
            let mut r = record("any");
            r.role = Some(role.clone());
            let expected: BTreeSet<Permission> =
                catalog.role_permissions(&role).into_iter().collect();
            assert_eq!(Principal::resolve(&r, &catalog).permissions, expected);
        }
    }

    #[test]
    fn inactive_record_resolves_inactive() {
        let catalog = PermissionCatalog::standard();
        let mut r = record("off");
        r.status = UserStatus::Inactive;
        r.is_admin = true;

        let p = Principal::resolve(&r, &catalog);
        assert!(!p.active);
        assert!(p.admin);
    }
}
