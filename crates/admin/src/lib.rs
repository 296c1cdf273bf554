//! `shopno-admin`: screen controllers for the Shopno Property back office.
//!
//! Each admin screen is a [`CrudController`] over one [`Resource`]. The
//! controller keeps the screen's list cache, view state and form state, and
//! talks to the API only through the [`shopno_client::RemoteResource`] seam.

pub mod controller;
pub mod notification;
pub mod resources;
pub mod schema;

pub use controller::{ControllerError, CrudController, DeleteTicket, RoleAssignment, SubmitTicket, View};
pub use notification::{Notification, Severity};
pub use schema::{Capabilities, FormMode, Resource, Validate};
