use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings enumerated by the server (e.g.
/// "properties.manage"). The client never invents new ones; the constants in
/// [`well_known`] only name the tokens the admin navigation checks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Module prefix of a dotted token: `"properties.manage"` → `"properties"`.
    pub fn group(&self) -> &str {
        self.as_str().split('.').next().unwrap_or_default()
    }

    /// Action suffix of a dotted token: `"properties.manage"` → `"manage"`.
    pub fn action(&self) -> &str {
        self.as_str().rsplit('.').next().unwrap_or_default()
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Tokens referenced by the built-in admin navigation.
pub mod well_known {
    use super::Permission;

    pub const PROPERTIES_VIEW: Permission = Permission::from_static("properties.view");
    pub const PROPERTIES_MANAGE: Permission = Permission::from_static("properties.manage");
    pub const COMPANIES_MANAGE: Permission = Permission::from_static("companies.manage");
    pub const FACILITIES_MANAGE: Permission = Permission::from_static("facilities.manage");
    pub const PROPERTY_TYPES_MANAGE: Permission = Permission::from_static("property_types.manage");
    pub const USERS_VIEW: Permission = Permission::from_static("users.view");
    pub const USERS_MANAGE: Permission = Permission::from_static("users.manage");
    pub const ROLES_MANAGE: Permission = Permission::from_static("roles.manage");
    pub const CONTENT_MANAGE: Permission = Permission::from_static("content.manage");
}

/// Permissions sharing a module prefix, as listed by the role form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionGroup {
    pub name: String,
    pub permissions: Vec<Permission>,
}

/// Server-enumerated permissions grouped by module prefix.
///
/// Groups and the permissions within them are sorted by name so the role form
/// renders deterministically regardless of server ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionCatalog {
    groups: Vec<PermissionGroup>,
}

impl PermissionCatalog {
    pub fn from_permissions<I>(permissions: I) -> Self
    where
        I: IntoIterator<Item = Permission>,
    {
        let mut by_group: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
        for perm in permissions {
            by_group.entry(perm.group().to_string()).or_default().push(perm);
        }

        let groups = by_group
            .into_iter()
            .map(|(name, mut permissions)| {
                permissions.sort();
                permissions.dedup();
                PermissionGroup { name, permissions }
            })
            .collect();

        Self { groups }
    }

    pub fn groups(&self) -> &[PermissionGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&PermissionGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.permissions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_group_and_action() {
        let p = Permission::new("property_types.manage");
        assert_eq!(p.group(), "property_types");
        assert_eq!(p.action(), "manage");

        let flat = Permission::new("dashboard");
        assert_eq!(flat.group(), "dashboard");
        assert_eq!(flat.action(), "dashboard");
    }

    #[test]
    fn catalog_groups_and_sorts() {
        let catalog = PermissionCatalog::from_permissions([
            Permission::new("users.manage"),
            Permission::new("companies.manage"),
            Permission::new("users.view"),
            Permission::new("users.manage"),
        ]);

        let names: Vec<_> = catalog.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["companies", "users"]);

        let users = catalog.group("users").unwrap();
        assert_eq!(
            users.permissions,
            vec![Permission::new("users.manage"), Permission::new("users.view")]
        );
        assert_eq!(catalog.len(), 3);
    }
}
