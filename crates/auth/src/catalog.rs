//! Static permission catalog: categories, permissions, role definitions and
//! the section table.
//!
//! The catalog is validated once at startup. A role that references an
//! unknown permission is a configuration bug and must stop the process.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

use crate::permissions::PermissionLevel::{Delete, Read, Write};
use crate::{
    Permission, PermissionDefinition, PermissionLevel, Role, RoleDefinition, RoleGrant,
    SectionGrant, SectionTable,
};

/// Category registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDefinition {
    pub id: String,
    pub title: String,
}

/// One category with its member permissions (catalog order).
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup<'a> {
    pub category: &'a CategoryDefinition,
    pub permissions: Vec<&'a PermissionDefinition>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid permission catalog: {}", .problems.join("; "))]
pub struct CatalogError {
    pub problems: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    categories: Vec<CategoryDefinition>,
    permissions: Vec<PermissionDefinition>,
    roles: BTreeMap<Role, RoleDefinition>,
    sections: SectionTable,
}

const CATEGORIES: &[(&str, &str)] = &[
    ("system", "System"),
    ("customers", "Customers"),
    ("bookings", "Bookings"),
    ("visas", "Visas"),
    ("tours", "Tours"),
    ("finance", "Finance"),
    ("reports", "Reports"),
];

const GENERAL_MANAGER: &[&str] = &[
    "view_dashboard", "view_employees", "manage_employees", "view_customers",
    "manage_customers", "delete_customers", "view_bookings", "manage_flights",
    "manage_hotels", "manage_vehicles", "manage_events", "delete_bookings", "view_visas",
    "manage_visas", "view_tours", "manage_tours", "view_accounting", "manage_accounting",
    "manage_expenses", "manage_revenues", "manage_invoices", "manage_receipts",
    "delete_financial", "view_reports", "export_reports",
];

const EXECUTIVE_MANAGER: &[&str] = &[
    "view_dashboard", "view_employees", "manage_employees", "view_customers",
    "manage_customers", "view_bookings", "manage_flights", "manage_hotels",
    "manage_vehicles", "manage_events", "delete_bookings", "view_visas", "manage_visas",
    "view_tours", "manage_tours", "view_accounting", "manage_accounting", "manage_expenses",
    "manage_revenues", "manage_invoices", "manage_receipts", "view_reports", "export_reports",
];

const BRANCH_MANAGER: &[&str] = &[
    "view_dashboard", "view_employees", "view_customers", "manage_customers", "view_bookings",
    "manage_flights", "manage_hotels", "manage_vehicles", "manage_events", "delete_bookings",
    "view_visas", "manage_visas", "view_tours", "manage_tours", "view_accounting",
    "view_reports",
];

const SHIFT_SUPERVISOR: &[&str] = &[
    "view_dashboard", "view_customers", "manage_customers", "view_bookings", "manage_flights",
    "manage_hotels", "manage_vehicles", "manage_events", "view_visas", "manage_visas",
    "view_tours", "view_reports",
];

const BOOKING_AGENT: &[&str] = &[
    "view_dashboard", "view_customers", "manage_customers", "view_bookings", "manage_flights",
    "manage_hotels", "manage_vehicles", "manage_events", "view_visas", "manage_visas",
    "view_tours", "manage_tours",
];

const ACCOUNTANT: &[&str] = &[
    "view_dashboard", "view_customers", "view_bookings", "view_accounting",
    "manage_accounting", "manage_expenses", "manage_revenues", "manage_invoices",
    "manage_receipts", "view_reports", "export_reports",
];

const EMPLOYEE: &[&str] = &[
    "view_dashboard", "view_customers", "manage_customers", "view_bookings", "manage_flights",
    "manage_hotels", "manage_vehicles", "manage_events", "view_visas", "manage_visas",
];

impl PermissionCatalog {
    /// Build a catalog from parts without validating it.
    pub fn from_parts(
        categories: Vec<CategoryDefinition>,
        permissions: Vec<PermissionDefinition>,
        roles: Vec<RoleDefinition>,
        sections: SectionTable,
    ) -> Self {
        Self {
            categories,
            permissions,
            roles: roles.into_iter().map(|r| (r.role.clone(), r)).collect(),
            sections,
        }
    }

    /// The travel-agency catalog, validated.
    pub fn load_standard() -> Result<Self, CatalogError> {
        let catalog = Self::standard();
        catalog.validate()?;
        Ok(catalog)
    }

    /// The travel-agency catalog (unvalidated; prefer [`Self::load_standard`]).
    pub fn standard() -> Self {
        let categories = CATEGORIES
            .iter()
            .map(|(id, title)| CategoryDefinition {
                id: id.to_string(),
                title: title.to_string(),
            })
            .collect();

        let permissions = vec![
            PermissionDefinition::new("view_dashboard", "View dashboard", "system", Read),
            PermissionDefinition::new("manage_users", "Manage users", "system", Write),
            PermissionDefinition::new("manage_settings", "Manage settings", "system", Write),
            PermissionDefinition::new("view_employees", "View employees", "system", Read),
            PermissionDefinition::new("manage_employees", "Manage employees", "system", Write),
            PermissionDefinition::new("view_customers", "View customers", "customers", Read),
            PermissionDefinition::new("manage_customers", "Manage customers", "customers", Write),
            PermissionDefinition::new(
                "delete_customers",
                "Delete customers",
                "customers",
                Delete,
            ),
            PermissionDefinition::new("view_bookings", "View bookings", "bookings", Read),
            PermissionDefinition::new(
                "manage_flights",
                "Manage flight bookings",
                "bookings",
                Write,
            ),
            PermissionDefinition::new("manage_hotels", "Manage hotel bookings", "bookings", Write),
            PermissionDefinition::new(
                "manage_vehicles",
                "Manage vehicle bookings",
                "bookings",
                Write,
            ),
            PermissionDefinition::new("manage_events", "Manage event bookings", "bookings", Write),
            PermissionDefinition::new("delete_bookings", "Delete bookings", "bookings", Delete),
            PermissionDefinition::new("view_visas", "View visas", "visas", Read),
            PermissionDefinition::new("manage_visas", "Manage visas", "visas", Write),
            PermissionDefinition::new("view_tours", "View tours", "tours", Read),
            PermissionDefinition::new("manage_tours", "Manage tours", "tours", Write),
            PermissionDefinition::new("view_accounting", "View accounting", "finance", Read),
            PermissionDefinition::new("manage_accounting", "Manage accounting", "finance", Write),
            PermissionDefinition::new("manage_expenses", "Manage expenses", "finance", Write)
                .with_parent("accounting"),
            PermissionDefinition::new("manage_revenues", "Manage revenues", "finance", Write)
                .with_parent("accounting"),
            PermissionDefinition::new("manage_invoices", "Manage invoices", "finance", Write)
                .with_parent("accounting"),
            PermissionDefinition::new("manage_receipts", "Manage receipts", "finance", Write)
                .with_parent("accounting"),
            PermissionDefinition::new(
                "delete_financial",
                "Delete financial records",
                "finance",
                Delete,
            ),
            PermissionDefinition::new("view_reports", "View reports", "reports", Read),
            PermissionDefinition::new("export_reports", "Export reports", "reports", Write),
        ];

        let sections = SectionTable::standard();

        let roles = vec![
            RoleDefinition {
                role: Role::Admin,
                title: "System administrator".to_string(),
                description: "Full access to every section and action".to_string(),
                permissions: RoleGrant::All,
                sections: SectionGrant::All,
            },
            role_definition(
                &sections,
                Role::GeneralManager,
                "General manager",
                "Runs the agency; everything except user administration",
                GENERAL_MANAGER,
            ),
            role_definition(
                &sections,
                Role::ExecutiveManager,
                "Executive manager",
                "Operations and finance without destructive finance actions",
                EXECUTIVE_MANAGER,
            ),
            role_definition(
                &sections,
                Role::BranchManager,
                "Branch manager",
                "Branch bookings, customers and read-only finance",
                BRANCH_MANAGER,
            ),
            role_definition(
                &sections,
                Role::ShiftSupervisor,
                "Shift supervisor",
                "Supervises booking agents during a shift",
                SHIFT_SUPERVISOR,
            ),
            role_definition(
                &sections,
                Role::BookingAgent,
                "Booking agent",
                "Creates customer bookings",
                BOOKING_AGENT,
            ),
            role_definition(
                &sections,
                Role::Accountant,
                "Accountant",
                "Expenses, revenues, invoices and receipts",
                ACCOUNTANT,
            ),
            role_definition(
                &sections,
                Role::Employee,
                "Employee",
                "Day-to-day customer and booking work",
                EMPLOYEE,
            ),
        ];

        Self::from_parts(categories, permissions, roles, sections)
    }

    /// Check every cross reference in the catalog.
    ///
    /// All problems are collected so a broken deployment reports them at once.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut problems = Vec::new();

        let categories: BTreeSet<&str> = self.categories.iter().map(|c| c.id.as_str()).collect();
        let ids: BTreeSet<&str> = self.permissions.iter().map(|p| p.id.as_str()).collect();

        let mut seen = BTreeSet::new();
        for p in &self.permissions {
            if p.id.is_all() {
                problems.push("permission id 'all' is reserved".to_string());
            }
            if !seen.insert(p.id.as_str()) {
                problems.push(format!("duplicate permission '{}'", p.id));
            }
            if !categories.contains(p.category.as_str()) {
                problems.push(format!(
                    "permission '{}' references unknown category '{}'",
                    p.id, p.category
                ));
            }
            if let Some(parent) = &p.parent {
                if !self.sections.contains(parent) && !ids.contains(parent.as_str()) {
                    problems.push(format!(
                        "permission '{}' references unknown parent '{}'",
                        p.id, parent
                    ));
                }
            }
        }

        for def in self.roles.values() {
            if let RoleGrant::Only(perms) = &def.permissions {
                for perm in perms {
                    if !perm.is_all() && !ids.contains(perm.as_str()) {
                        problems.push(format!(
                            "role '{}' references unknown permission '{}'",
                            def.role, perm
                        ));
                    }
                }
            }
            if let SectionGrant::Only(sections) = &def.sections {
                for section in sections {
                    if !self.sections.contains(section) {
                        problems.push(format!(
                            "role '{}' references unknown section '{}'",
                            def.role, section
                        ));
                    }
                }
            }
        }

        for (section, required) in self.sections.iter() {
            if required.is_empty() {
                problems.push(format!("section '{section}' has no required permissions"));
            }
            for perm in required {
                if !ids.contains(perm.as_str()) {
                    problems.push(format!(
                        "section '{section}' references unknown permission '{perm}'"
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CatalogError { problems })
        }
    }

    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    pub fn permissions(&self) -> &[PermissionDefinition] {
        &self.permissions
    }

    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    pub fn get(&self, id: &str) -> Option<&PermissionDefinition> {
        self.permissions.iter().find(|p| p.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn role(&self, role: &Role) -> Option<&RoleDefinition> {
        self.roles.get(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.roles.values()
    }

    /// Every category (registry order) with its member permissions.
    pub fn permissions_by_category(&self) -> Vec<CategoryGroup<'_>> {
        self.categories
            .iter()
            .map(|category| CategoryGroup {
                category,
                permissions: self
                    .permissions
                    .iter()
                    .filter(|p| p.category == category.id)
                    .collect(),
            })
            .collect()
    }

    pub fn permissions_by_level(&self, level: PermissionLevel) -> Vec<&PermissionDefinition> {
        self.permissions.iter().filter(|p| p.level == level).collect()
    }

    /// Permissions grouped under a parent (UI grouping, e.g. `accounting`).
    pub fn children_of(&self, parent: &str) -> Vec<&PermissionDefinition> {
        self.permissions
            .iter()
            .filter(|p| p.parent.as_deref() == Some(parent))
            .collect()
    }

    /// Permission set granted by a role definition, with `all` expanded.
    pub fn role_permissions(&self, role: &Role) -> Vec<Permission> {
        match self.role(role).map(|d| &d.permissions) {
            Some(RoleGrant::All) => self.permissions.iter().map(|p| p.id.clone()).collect(),
            Some(RoleGrant::Only(perms)) => perms.clone(),
            None => Vec::new(),
        }
    }
}

/// Role definition whose section list is every section its permissions reach.
fn role_definition(
    sections: &SectionTable,
    role: Role,
    title: &str,
    description: &str,
    permissions: &[&'static str],
) -> RoleDefinition {
    let reachable = sections
        .iter()
        .filter(|(_, required)| required.iter().any(|r| permissions.contains(&r.as_str())))
        .map(|(section, _)| section.to_string())
        .collect();

    RoleDefinition {
        role,
        title: title.to_string(),
        description: description.to_string(),
        permissions: RoleGrant::Only(
            permissions.iter().map(|p| Permission::from_static(p)).collect(),
        ),
        sections: SectionGrant::Only(reachable),
    }
}
