//! Property facilities (lift, parking, generator, ...). The only resource with
//! a dedicated detail view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopno_client::{Encoding, FormData, FormPayload, UploadFile};
use shopno_core::{Entity, EntityId, FieldErrors};

use super::{default_true, flexible_bool};
use crate::schema::{self, Capabilities, FormMode, Resource, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Facility {
    type Id = EntityId;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityForm {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<UploadFile>,
    pub is_active: bool,
}

impl Default for FacilityForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            icon: None,
            is_active: true,
        }
    }
}

impl FormData for FacilityForm {
    fn to_form(&self) -> FormPayload {
        FormPayload::new()
            .text("name", self.name.trim())
            .opt_text("description", self.description.as_deref())
            .flag("is_active", self.is_active)
            .file("icon", self.icon.as_ref())
    }
}

impl Validate for FacilityForm {
    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        schema::require(&mut errors, "name", &self.name);
        schema::max_len(&mut errors, "name", &self.name, 100);
        if let Some(icon) = &self.icon {
            if !icon.mime.starts_with("image/") {
                errors.add("icon", "The icon must be an image.");
            }
        }
        errors
    }
}

pub struct Facilities;

impl Resource for Facilities {
    type Entity = Facility;
    type Form = FacilityForm;

    const NAME: &'static str = "Facility";
    const PATH: &'static str = "facilities";
    const ENCODING: Encoding = Encoding::Multipart;
    const CAPABILITIES: Capabilities = Capabilities {
        details: true,
        ..Capabilities::PLAIN
    };

    fn form_for(f: &Facility) -> FacilityForm {
        FacilityForm {
            name: f.name.clone(),
            description: f.description.clone(),
            icon: None,
            is_active: f.is_active,
        }
    }
}
