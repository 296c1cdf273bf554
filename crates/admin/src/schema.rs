//! Per-resource schema: what a CRUD screen needs to know about its entity.

use serde::de::DeserializeOwned;

use shopno_client::{Encoding, FormData};
use shopno_core::{Entity, EntityId, FieldErrors};

/// Whether a form creates a new entity or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Optional views and actions a resource screen offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Read-only detail view (`list → details`).
    pub details: bool,
    /// Role-assignment view (`list → permissions`).
    pub permissions: bool,
    /// Inline `is_active` toggle from the list.
    pub active_toggle: bool,
}

impl Capabilities {
    pub const PLAIN: Capabilities = Capabilities {
        details: false,
        permissions: false,
        active_toggle: false,
    };
}

/// Client-side form validation.
///
/// Produces the same per-field map the server returns on a 422, so both end
/// up in one error display.
pub trait Validate {
    fn validate(&self, mode: FormMode) -> FieldErrors;
}

/// One admin resource type.
///
/// Implemented on marker types (`Companies`, `Facilities`, ...); the
/// controller is generic over this trait instead of being rewritten per screen.
pub trait Resource: Send + Sync + 'static {
    type Entity: Entity<Id = EntityId> + Clone + core::fmt::Debug + DeserializeOwned + Send + Sync + 'static;
    type Form: FormData + Validate + Clone + Default + core::fmt::Debug + Send + Sync + 'static;

    /// Singular display name used in notifications ("Company").
    const NAME: &'static str;
    /// Path under `/api/`.
    const PATH: &'static str;
    const ENCODING: Encoding;
    const CAPABILITIES: Capabilities = Capabilities::PLAIN;

    /// Prefill the edit form from an entity.
    fn form_for(entity: &Self::Entity) -> Self::Form;

    /// Display ordering key; `None` keeps server order.
    fn order_key(_entity: &Self::Entity) -> Option<i64> {
        None
    }

    /// Form that flips the entity's active flag, for resources that have one.
    fn toggled(_entity: &Self::Entity) -> Option<Self::Form> {
        None
    }
}

pub(crate) fn require(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("The {} field is required.", field.replace('_', " ")));
    }
}

pub(crate) fn require_email(errors: &mut FieldErrors, field: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        require(errors, field, value);
        return;
    }
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if !valid {
        errors.add(field, format!("The {} must be a valid email address.", field.replace('_', " ")));
    }
}

pub(crate) fn optional_email(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        require_email(errors, field, v);
    }
}

pub(crate) fn max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("The {} may not be greater than {max} characters.", field.replace('_', " ")),
        );
    }
}

pub(crate) fn optional_url(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
        let ok = v.starts_with("http://") || v.starts_with("https://") || v.starts_with('/');
        if !ok {
            errors.add(field, format!("The {} format is invalid.", field.replace('_', " ")));
        }
    }
}
