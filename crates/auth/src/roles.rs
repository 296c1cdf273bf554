use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Reserved role name that grants every permission.
pub const ADMIN_ROLE: &str = "admin";

/// Role name as carried on a user.
///
/// Roles are opaque strings at this layer; the role → permission mapping is
/// owned by the server and already flattened into the user's permission set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self(Cow::Borrowed(ADMIN_ROLE))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive name comparison (`"Admin"` matches `"admin"`).
    pub fn matches(&self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name)
    }

    pub fn is_admin(&self) -> bool {
        self.matches(ADMIN_ROLE)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
