//! Roles and their permission bundles. Roles travel as JSON.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use shopno_auth::user::named_or_plain;
use shopno_auth::{Permission, Role};
use shopno_client::{Encoding, FormData, FormPayload};
use shopno_core::{Entity, EntityId, FieldErrors};

use crate::schema::{self, FormMode, Resource, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: EntityId,
    pub name: String,
    #[serde(default, deserialize_with = "named_or_plain")]
    pub permissions: BTreeSet<Permission>,
}

impl RoleRecord {
    pub fn role(&self) -> Role {
        Role::new(self.name.clone())
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }
}

impl Entity for RoleRecord {
    type Id = EntityId;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleForm {
    pub name: String,
    pub permissions: BTreeSet<Permission>,
}

impl RoleForm {
    /// Checkbox handler of the permission grid.
    pub fn toggle(&mut self, permission: Permission) {
        if !self.permissions.remove(&permission) {
            self.permissions.insert(permission);
        }
    }
}

impl FormData for RoleForm {
    fn to_form(&self) -> FormPayload {
        FormPayload::new()
            .text("name", self.name.trim())
            .list("permissions", self.permissions.iter().map(|p| p.as_str().to_string()))
    }
}

impl Validate for RoleForm {
    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        schema::require(&mut errors, "name", &self.name);
        schema::max_len(&mut errors, "name", &self.name, 64);
        if self.permissions.is_empty() && !Role::new(self.name.clone()).is_admin() {
            errors.add("permissions", "Select at least one permission.");
        }
        errors
    }
}

pub struct Roles;

impl Resource for Roles {
    type Entity = RoleRecord;
    type Form = RoleForm;

    const NAME: &'static str = "Role";
    const PATH: &'static str = "roles";
    const ENCODING: Encoding = Encoding::Json;

    fn form_for(r: &RoleRecord) -> RoleForm {
        RoleForm {
            name: r.name.clone(),
            permissions: r.permissions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_spatie_style_permission_objects() {
        let role: RoleRecord = serde_json::from_value(json!({
            "id": 2,
            "name": "Editor",
            "permissions": [{"id": 1, "name": "companies.manage"}, "facilities.manage"]
        }))
        .unwrap();
        assert_eq!(role.permissions.len(), 2);
        assert!(!role.is_admin());
    }

    #[test]
    fn toggle_and_encode() {
        let mut form = RoleForm {
            name: "editor".into(),
            ..RoleForm::default()
        };
        form.toggle(Permission::new("users.view"));
        form.toggle(Permission::new("companies.manage"));
        form.toggle(Permission::new("users.view"));

        assert_eq!(
            form.to_form().to_json().unwrap(),
            json!({ "name": "editor", "permissions": ["companies.manage"] })
        );
    }

    #[test]
    fn non_admin_roles_need_permissions() {
        let form = RoleForm {
            name: "viewer".into(),
            ..RoleForm::default()
        };
        assert!(form.validate(FormMode::Create).first("permissions").is_some());

        let admin = RoleForm {
            name: "Admin".into(),
            ..RoleForm::default()
        };
        assert!(admin.validate(FormMode::Create).is_empty());
    }
}
