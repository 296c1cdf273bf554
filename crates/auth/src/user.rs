//! The current user, as supplied by the authentication collaborator.
//!
//! This crate never mutates the user; it only reads roles and permissions
//! when evaluating access.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use shopno_core::EntityId;

use crate::{Permission, Role};

/// Authenticated user with flattened role and permission sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "named_or_plain")]
    pub roles: BTreeSet<Role>,
    #[serde(default, deserialize_with = "named_or_plain")]
    pub permissions: BTreeSet<Permission>,
}

impl AuthUser {
    pub fn new(id: EntityId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            roles: BTreeSet::new(),
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<Role>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_permission(mut self, permission: impl Into<Permission>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    pub fn with_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }
}

/// The API serializes roles/permissions either as plain strings or as
/// `{ "name": "..." }` objects depending on the endpoint; accept both.
pub fn named_or_plain<'de, D, T>(deserializer: D) -> Result<BTreeSet<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String> + Ord,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Plain(String),
        Named { name: String },
    }

    let entries = Option::<Vec<Entry>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .map(|e| match e {
            Entry::Plain(name) | Entry::Named { name } => T::from(name),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_plain_and_named_entries() {
        let user: AuthUser = serde_json::from_str(
            r#"{
                "id": 3,
                "name": "Rahim",
                "email": "rahim@example.com",
                "roles": [{"id": 1, "name": "editor"}],
                "permissions": ["companies.manage", {"name": "users.view"}]
            }"#,
        )
        .unwrap();

        assert_eq!(user.id, EntityId::new(3));
        assert!(user.roles.contains(&Role::new("editor")));
        assert!(user.has_permission(&Permission::new("companies.manage")));
        assert!(user.has_permission(&Permission::new("users.view")));
    }

    #[test]
    fn missing_or_null_sets_default_to_empty() {
        let user: AuthUser =
            serde_json::from_str(r#"{"id": 1, "roles": null}"#).unwrap();
        assert!(user.roles.is_empty());
        assert!(user.permissions.is_empty());
        assert!(user.name.is_empty());
    }
}
