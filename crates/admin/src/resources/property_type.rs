//! Property types (apartment, duplex, commercial space, ...).

use serde::{Deserialize, Serialize};

use shopno_client::{Encoding, FormData, FormPayload, UploadFile};
use shopno_core::{Entity, EntityId, FieldErrors};

use super::{default_true, flexible_bool};
use crate::schema::{self, FormMode, Resource, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyType {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub is_active: bool,
}

impl Entity for PropertyType {
    type Id = EntityId;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTypeForm {
    pub name: String,
    pub icon: Option<UploadFile>,
    pub is_active: bool,
}

impl Default for PropertyTypeForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            icon: None,
            is_active: true,
        }
    }
}

impl FormData for PropertyTypeForm {
    fn to_form(&self) -> FormPayload {
        FormPayload::new()
            .text("name", self.name.trim())
            .flag("is_active", self.is_active)
            .file("icon", self.icon.as_ref())
    }
}

impl Validate for PropertyTypeForm {
    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        schema::require(&mut errors, "name", &self.name);
        schema::max_len(&mut errors, "name", &self.name, 100);
        errors
    }
}

pub struct PropertyTypes;

impl Resource for PropertyTypes {
    type Entity = PropertyType;
    type Form = PropertyTypeForm;

    const NAME: &'static str = "Property type";
    const PATH: &'static str = "property-types";
    const ENCODING: Encoding = Encoding::Multipart;

    fn form_for(t: &PropertyType) -> PropertyTypeForm {
        PropertyTypeForm {
            name: t.name.clone(),
            icon: None,
            is_active: t.is_active,
        }
    }
}
