//! Back-office users. Roles are assigned from a separate permissions view.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopno_auth::Role;
use shopno_auth::user::named_or_plain;
use shopno_client::{Encoding, FormData, FormPayload, UploadFile};
use shopno_core::{Entity, EntityId, FieldErrors};

use super::{default_true, flexible_bool};
use crate::schema::{self, Capabilities, FormMode, Resource, Validate};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "named_or_plain")]
    pub roles: BTreeSet<Role>,
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for UserRecord {
    type Id = EntityId;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Required on create; empty on edit keeps the current password.
    pub password: String,
    pub password_confirmation: String,
    pub avatar: Option<UploadFile>,
    pub is_active: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: None,
            password: String::new(),
            password_confirmation: String::new(),
            avatar: None,
            is_active: true,
        }
    }
}

impl FormData for UserForm {
    fn to_form(&self) -> FormPayload {
        let mut form = FormPayload::new()
            .text("name", self.name.trim())
            .text("email", self.email.trim())
            .opt_text("phone", self.phone.as_deref())
            .flag("is_active", self.is_active);
        if !self.password.is_empty() {
            form = form
                .text("password", self.password.as_str())
                .text("password_confirmation", self.password_confirmation.as_str());
        }
        form.file("avatar", self.avatar.as_ref())
    }
}

impl Validate for UserForm {
    fn validate(&self, mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        schema::require(&mut errors, "name", &self.name);
        schema::require_email(&mut errors, "email", &self.email);

        let password_given = !self.password.is_empty();
        if mode == FormMode::Create && !password_given {
            schema::require(&mut errors, "password", &self.password);
        }
        if password_given {
            if self.password.chars().count() < MIN_PASSWORD_LEN {
                errors.add(
                    "password",
                    format!("The password must be at least {MIN_PASSWORD_LEN} characters."),
                );
            }
            if self.password != self.password_confirmation {
                errors.add("password", "The password confirmation does not match.");
            }
        }
        errors
    }
}

pub struct Users;

impl Resource for Users {
    type Entity = UserRecord;
    type Form = UserForm;

    const NAME: &'static str = "User";
    const PATH: &'static str = "users";
    const ENCODING: Encoding = Encoding::Multipart;
    const CAPABILITIES: Capabilities = Capabilities {
        permissions: true,
        ..Capabilities::PLAIN
    };

    fn form_for(u: &UserRecord) -> UserForm {
        UserForm {
            name: u.name.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
            is_active: u.is_active,
            ..UserForm::default()
        }
    }
}
