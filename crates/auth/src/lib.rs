//! `shopno-auth`: pure permission gating for the admin client.
//!
//! This crate is intentionally decoupled from HTTP and storage: it only reads
//! the user value supplied by the authentication collaborator.

pub mod authorize;
pub mod menu;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{
    AccessPolicy, AuthorizationExplanation, AuthzError, ExplanationKind, Requirement, can, ensure, explain,
    has_role, is_admin,
};
pub use menu::{MenuItem, default_admin_menu, visible_menu, visible_menu_with};
pub use permissions::{Permission, PermissionCatalog, PermissionGroup};
pub use roles::{ADMIN_ROLE, Role};
pub use user::AuthUser;
