//! Typed records for each admin resource.

pub mod company;
pub mod contact_page;
pub mod facility;
pub mod navigation;
pub mod property_type;
pub mod role;
pub mod user;

pub use company::{Companies, Company, CompanyForm};
pub use contact_page::{ContactPage, ContactPageForm, ContactPages};
pub use facility::{Facilities, Facility, FacilityForm};
pub use navigation::{FooterLinks, HeaderLinks, NavigationLink, NavigationLinkForm};
pub use property_type::{PropertyType, PropertyTypeForm, PropertyTypes};
pub use role::{RoleForm, RoleRecord, Roles};
pub use user::{UserForm, UserRecord, Users};

use serde::{Deserialize, Deserializer};

/// Flags arrive as `true`, `1` or `"1"` depending on the endpoint.
pub(crate) fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Raw::Bool(b)) => Ok(b),
        Some(Raw::Int(n)) => Ok(n != 0),
        Some(Raw::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid flag '{other}'"))),
        },
    }
}

pub(crate) fn default_true() -> bool {
    true
}
