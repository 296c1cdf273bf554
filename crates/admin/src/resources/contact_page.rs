use serde::{Deserialize, Serialize};

use shopno_client::{Encoding, FormData, FormPayload};
use shopno_core::{Entity, EntityId, FieldErrors};

use crate::schema::{self, FormMode, Resource, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPage {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub map_embed_url: Option<String>,
    #[serde(default)]
    pub office_hours: Option<String>,
}

impl Entity for ContactPage {
    type Id = EntityId;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPageForm {
    pub title: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub map_embed_url: Option<String>,
    pub office_hours: Option<String>,
}

impl FormData for ContactPageForm {
    fn to_form(&self) -> FormPayload {
        FormPayload::new()
            .text("title", self.title.trim())
            .opt_text("address", self.address.as_deref())
            .opt_text("phone", self.phone.as_deref())
            .opt_text("email", self.email.as_deref())
            .opt_text("map_embed_url", self.map_embed_url.as_deref())
            .opt_text("office_hours", self.office_hours.as_deref())
    }
}

impl Validate for ContactPageForm {
    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        schema::require(&mut errors, "title", &self.title);
        schema::max_len(&mut errors, "title", &self.title, 150);
        schema::optional_email(&mut errors, "email", self.email.as_deref());
        schema::optional_url(&mut errors, "map_embed_url", self.map_embed_url.as_deref());
        errors
    }
}

pub struct ContactPages;

impl Resource for ContactPages {
    type Entity = ContactPage;
    type Form = ContactPageForm;

    const NAME: &'static str = "Contact page";
    const PATH: &'static str = "contact-pages";
    const ENCODING: Encoding = Encoding::Json;

    fn form_for(p: &ContactPage) -> ContactPageForm {
        ContactPageForm {
            title: p.title.clone(),
            address: p.address.clone(),
            phone: p.phone.clone(),
            email: p.email.clone(),
            map_embed_url: p.map_embed_url.clone(),
            office_hours: p.office_hours.clone(),
        }
    }
}
