//! Header and footer navigation links of the public site.
//!
//! Both screens share one record and form; they differ only in path and in
//! the footer's optional column grouping.

use serde::{Deserialize, Serialize};

use shopno_client::{Encoding, FormData, FormPayload};
use shopno_core::{Entity, EntityId, FieldErrors};

use super::{default_true, flexible_bool};
use crate::schema::{self, Capabilities, FormMode, Resource, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationLink {
    pub id: EntityId,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub open_in_new_tab: bool,
    /// Footer column heading; unused for header links.
    #[serde(default)]
    pub section: Option<String>,
}

impl Entity for NavigationLink {
    type Id = EntityId;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLinkForm {
    pub title: String,
    pub url: String,
    pub order: i64,
    pub is_active: bool,
    pub open_in_new_tab: bool,
    pub section: Option<String>,
}

impl Default for NavigationLinkForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            order: 0,
            is_active: true,
            open_in_new_tab: false,
            section: None,
        }
    }
}

impl From<&NavigationLink> for NavigationLinkForm {
    fn from(link: &NavigationLink) -> Self {
        Self {
            title: link.title.clone(),
            url: link.url.clone(),
            order: link.order,
            is_active: link.is_active,
            open_in_new_tab: link.open_in_new_tab,
            section: link.section.clone(),
        }
    }
}

impl FormData for NavigationLinkForm {
    fn to_form(&self) -> FormPayload {
        FormPayload::new()
            .text("title", self.title.trim())
            .text("url", self.url.trim())
            .int("order", self.order)
            .flag("is_active", self.is_active)
            .flag("open_in_new_tab", self.open_in_new_tab)
            .opt_text("section", self.section.as_deref())
    }
}

impl Validate for NavigationLinkForm {
    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        schema::require(&mut errors, "title", &self.title);
        schema::max_len(&mut errors, "title", &self.title, 60);
        schema::require(&mut errors, "url", &self.url);
        schema::optional_url(&mut errors, "url", Some(&self.url));
        if self.order < 0 {
            errors.add("order", "The order must be at least 0.");
        }
        errors
    }
}

const LINK_CAPABILITIES: Capabilities = Capabilities {
    active_toggle: true,
    ..Capabilities::PLAIN
};

fn toggled(link: &NavigationLink) -> NavigationLinkForm {
    NavigationLinkForm {
        is_active: !link.is_active,
        ..NavigationLinkForm::from(link)
    }
}

pub struct HeaderLinks;

impl Resource for HeaderLinks {
    type Entity = NavigationLink;
    type Form = NavigationLinkForm;

    const NAME: &'static str = "Header link";
    const PATH: &'static str = "header-links";
    const ENCODING: Encoding = Encoding::Multipart;
    const CAPABILITIES: Capabilities = LINK_CAPABILITIES;

    fn form_for(link: &NavigationLink) -> NavigationLinkForm {
        NavigationLinkForm::from(link)
    }

    fn order_key(link: &NavigationLink) -> Option<i64> {
        Some(link.order)
    }

    fn toggled(link: &NavigationLink) -> Option<NavigationLinkForm> {
        Some(toggled(link))
    }
}

pub struct FooterLinks;

impl Resource for FooterLinks {
    type Entity = NavigationLink;
    type Form = NavigationLinkForm;

    const NAME: &'static str = "Footer link";
    const PATH: &'static str = "footer-links";
    const ENCODING: Encoding = Encoding::Multipart;
    const CAPABILITIES: Capabilities = LINK_CAPABILITIES;

    fn form_for(link: &NavigationLink) -> NavigationLinkForm {
        NavigationLinkForm::from(link)
    }

    fn order_key(link: &NavigationLink) -> Option<i64> {
        Some(link.order)
    }

    fn toggled(link: &NavigationLink) -> Option<NavigationLinkForm> {
        Some(toggled(link))
    }
}
