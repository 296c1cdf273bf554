//! `shopno-client`: HTTP service layer for the Shopno admin API.
//!
//! **Responsibility:** talk to the remote REST API (`/api/<resource>`). All
//! canonical state lives server-side; this crate holds no cache.
//!
//! This crate provides:
//! - Environment-driven configuration
//! - An explicit [`Session`] carrying the bearer and CSRF tokens
//! - Typed form payloads encoded as multipart or JSON
//! - A generic [`RemoteResource`] seam over the CRUD endpoints

pub mod auth;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod resource;
pub mod session;

pub use auth::{AuthApi, LoginResponse};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use form::{Encoding, FormData, FormPayload, FormValue, UploadFile};
pub use http::ApiClient;
pub use resource::{HttpResource, RemoteResource};
pub use session::Session;
