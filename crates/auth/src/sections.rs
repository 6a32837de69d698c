//! Section → required-permission table.
//!
//! A section is reachable when the user holds at least one of its required
//! permissions. The first permission listed is the section's canonical
//! permission, used when legacy section allow-lists are turned into
//! permission sets.

use std::collections::BTreeMap;

use crate::Permission;

const STANDARD_SECTIONS: &[(&str, &[&str])] = &[
    ("dashboard", &["view_dashboard"]),
    ("customers", &["manage_customers", "view_customers"]),
    ("flights", &["manage_flights", "view_bookings"]),
    ("hotels", &["manage_hotels", "view_bookings"]),
    ("vehicles", &["manage_vehicles", "view_bookings"]),
    ("events", &["manage_events", "view_bookings"]),
    ("visas", &["manage_visas", "view_visas"]),
    ("tours", &["manage_tours", "view_tours"]),
    ("accounting", &["manage_accounting", "view_accounting"]),
    ("expenses", &["manage_expenses", "manage_accounting"]),
    ("revenues", &["manage_revenues", "manage_accounting"]),
    ("invoices", &["manage_invoices", "manage_accounting"]),
    ("receipts", &["manage_receipts", "manage_accounting"]),
    ("reports", &["view_reports", "export_reports"]),
    ("employees", &["manage_employees", "view_employees"]),
    ("users", &["manage_users"]),
    ("settings", &["manage_settings"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionTable {
    rules: BTreeMap<String, Vec<Permission>>,
}

impl SectionTable {
    pub fn standard() -> Self {
        let mut table = Self::default();
        for (section, required) in STANDARD_SECTIONS {
            table.insert(section, required.iter().map(|p| Permission::from_static(p)).collect());
        }
        table
    }

    pub fn insert(&mut self, section: &str, required: Vec<Permission>) {
        self.rules.insert(section.to_string(), required);
    }

    /// Required permissions for a section, `None` when unmapped.
    pub fn required(&self, section: &str) -> Option<&[Permission]> {
        self.rules.get(section.trim()).map(Vec::as_slice)
    }

    pub fn canonical_permission(&self, section: &str) -> Option<&Permission> {
        self.required(section).and_then(|r| r.first())
    }

    pub fn contains(&self, section: &str) -> bool {
        self.rules.contains_key(section.trim())
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Permission])> {
        self.rules.iter().map(|(s, r)| (s.as_str(), r.as_slice()))
    }
}
