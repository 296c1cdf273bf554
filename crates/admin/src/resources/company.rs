//! Developer/agency companies listed on the platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopno_client::{Encoding, FormData, FormPayload, UploadFile};
use shopno_core::{Entity, EntityId, FieldErrors};

use crate::schema::{self, FormMode, Resource, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Public URL of the uploaded logo.
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Company {
    type Id = EntityId;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyForm {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    /// New logo; `None` keeps the current one.
    pub logo: Option<UploadFile>,
}

impl FormData for CompanyForm {
    fn to_form(&self) -> FormPayload {
        FormPayload::new()
            .text("name", self.name.trim())
            .opt_text("email", self.email.as_deref())
            .opt_text("phone", self.phone.as_deref())
            .opt_text("address", self.address.as_deref())
            .opt_text("website", self.website.as_deref())
            .opt_text("description", self.description.as_deref())
            .file("logo", self.logo.as_ref())
    }
}

impl Validate for CompanyForm {
    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        schema::require(&mut errors, "name", &self.name);
        schema::max_len(&mut errors, "name", &self.name, 255);
        schema::optional_email(&mut errors, "email", self.email.as_deref());
        schema::optional_url(&mut errors, "website", self.website.as_deref());
        errors
    }
}

pub struct Companies;

impl Resource for Companies {
    type Entity = Company;
    type Form = CompanyForm;

    const NAME: &'static str = "Company";
    const PATH: &'static str = "companies";
    const ENCODING: Encoding = Encoding::Multipart;

    fn form_for(c: &Company) -> CompanyForm {
        CompanyForm {
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            address: c.address.clone(),
            website: c.website.clone(),
            description: c.description.clone(),
            logo: None,
        }
    }
}
