use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "manage_flights").
/// The sentinel `"all"` grants every permission in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// Sentinel meaning "every catalog entry".
    pub const ALL: Permission = Permission(Cow::Borrowed("all"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_all(&self) -> bool {
        self.as_str() == "all"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a permission lets the holder do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Read,
    Write,
    Delete,
}

/// Catalog entry describing one permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    pub id: Permission,
    pub title: String,
    /// Category id; must exist in the catalog's category registry.
    pub category: String,
    pub level: PermissionLevel,
    /// UI grouping only. Authorization never walks up to the parent.
    pub parent: Option<String>,
}

impl PermissionDefinition {
    pub fn new(
        id: &'static str,
        title: &str,
        category: &str,
        level: PermissionLevel,
    ) -> Self {
        Self {
            id: Permission::from_static(id),
            title: title.to_string(),
            category: category.to_string(),
            level,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }
}
