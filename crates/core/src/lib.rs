//! `shopno-core`: shared building blocks for the admin client.
//!
//! Identifiers, the domain error model, per-field validation errors and the
//! entity contract every remote resource implements.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, FieldErrors};
pub use id::EntityId;
