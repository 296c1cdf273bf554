//! Generic list/form/details controller behind every admin CRUD screen.
//!
//! The controller owns its screen's cached list exclusively. The cache is
//! fully reloaded on mount and afterwards patched only after the server has
//! confirmed a mutation; ids always come from the server.
//!
//! Remote calls are split in two phases (`begin_*` / `finish_*`) so an
//! event-driven UI can dispatch the request and feed the response back later;
//! the `loading`/`submit_loading` flags set by `begin_*` reject duplicate
//! submissions until the matching `finish_*`. The async convenience methods
//! (`submit`, `confirm_delete`, ...) run both phases back to back.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use shopno_auth::Role;
use shopno_client::{ApiClient, ApiError, ApiResult, AuthApi, HttpResource, RemoteResource};
use shopno_core::{Entity, EntityId, FieldErrors};

use crate::notification::Notification;
use crate::schema::{FormMode, Resource, Validate};

/// Current screen of a CRUD controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View<E> {
    List,
    /// `selected` is `None` when creating, the edited entity otherwise.
    Form { selected: Option<E> },
    Details(E),
    /// Role assignment for a user.
    Permissions(E),
}

impl<E> View<E> {
    pub fn name(&self) -> &'static str {
        match self {
            View::List => "list",
            View::Form { .. } => "form",
            View::Details(_) => "details",
            View::Permissions(_) => "permissions",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("cannot {action} from the {from} view")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    #[error("{0} is not available for this resource")]
    Unsupported(&'static str),

    #[error("another request is still in flight")]
    Busy,

    #[error("no entity with id {0} in the list")]
    UnknownEntity(EntityId),

    #[error("no delete is awaiting confirmation")]
    NothingToConfirm,

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Server-side role assignment for the permissions view.
#[async_trait]
pub trait RoleAssignment<E>: Send + Sync
where
    E: Send + 'static,
{
    async fn assign_roles(&self, user_id: EntityId, roles: &[Role]) -> ApiResult<E>;
}

#[async_trait]
impl<E> RoleAssignment<E> for AuthApi
where
    E: DeserializeOwned + Send + 'static,
{
    async fn assign_roles(&self, user_id: EntityId, roles: &[Role]) -> ApiResult<E> {
        AuthApi::assign_roles(self, user_id, roles).await
    }
}

/// An accepted form submission awaiting its server response.
#[derive(Debug)]
pub struct SubmitTicket<F> {
    pub mode: FormMode,
    /// Target id in edit mode.
    pub id: Option<EntityId>,
    pub form: F,
}

/// An accepted delete awaiting its server response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteTicket {
    pub id: EntityId,
}

pub struct CrudController<R: Resource> {
    remote: Arc<dyn RemoteResource<R::Entity, R::Form>>,
    items: Vec<R::Entity>,
    view: View<R::Entity>,
    form: R::Form,
    form_errors: FieldErrors,
    loading: bool,
    submit_loading: bool,
    pending_delete: Option<EntityId>,
    notification: Option<Notification>,
}

impl<R: Resource> core::fmt::Debug for CrudController<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CrudController")
            .field("resource", &R::PATH)
            .field("items", &self.items.len())
            .field("view", &self.view.name())
            .field("loading", &self.loading)
            .field("submit_loading", &self.submit_loading)
            .finish()
    }
}

impl<R: Resource> CrudController<R> {
    pub fn new(remote: Arc<dyn RemoteResource<R::Entity, R::Form>>) -> Self {
        Self {
            remote,
            items: Vec::new(),
            view: View::List,
            form: R::Form::default(),
            form_errors: FieldErrors::new(),
            loading: false,
            submit_loading: false,
            pending_delete: None,
            notification: None,
        }
    }

    /// Controller talking to `/api/<R::PATH>` through `client`.
    pub fn over_http(client: &ApiClient) -> Self {
        Self::new(Arc::new(HttpResource::<R::Entity, R::Form>::new(
            client.clone(),
            R::PATH,
            R::ENCODING,
        )))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read-side accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Cached list in server order (with local patches).
    pub fn items(&self) -> &[R::Entity] {
        &self.items
    }

    /// Cached list in display order (stable by [`Resource::order_key`]).
    pub fn sorted_items(&self) -> Vec<&R::Entity> {
        let mut items: Vec<&R::Entity> = self.items.iter().collect();
        items.sort_by_key(|e| R::order_key(e).unwrap_or(i64::MAX));
        items
    }

    pub fn view(&self) -> &View<R::Entity> {
        &self.view
    }

    pub fn form(&self) -> &R::Form {
        &self.form
    }

    /// Edit the in-progress form values.
    pub fn form_mut(&mut self) -> &mut R::Form {
        &mut self.form
    }

    pub fn form_errors(&self) -> &FieldErrors {
        &self.form_errors
    }

    pub fn mode(&self) -> Option<FormMode> {
        match &self.view {
            View::Form { selected: None } => Some(FormMode::Create),
            View::Form { selected: Some(_) } => Some(FormMode::Edit),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_loading
    }

    /// Blocking overlay shown while any request is in flight.
    pub fn is_busy(&self) -> bool {
        self.loading || self.submit_loading
    }

    pub fn pending_delete(&self) -> Option<EntityId> {
        self.pending_delete
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }

    fn find(&self, id: EntityId) -> Result<&R::Entity, ControllerError> {
        self.items
            .iter()
            .find(|e| e.id() == id)
            .ok_or(ControllerError::UnknownEntity(id))
    }

    fn expect_view(&self, expected: &'static str, action: &'static str) -> Result<(), ControllerError> {
        if self.view.name() == expected {
            Ok(())
        } else {
            Err(ControllerError::InvalidTransition {
                from: self.view.name(),
                action,
            })
        }
    }

    fn ensure_idle(&self) -> Result<(), ControllerError> {
        if self.is_busy() {
            Err(ControllerError::Busy)
        } else {
            Ok(())
        }
    }

    fn reset_form(&mut self, form: R::Form) {
        self.form = form;
        self.form_errors.clear();
    }

    /// Replace the entry with the same id in place, or append it.
    fn upsert(&mut self, entity: R::Entity) {
        match self.items.iter().position(|e| e.id() == entity.id()) {
            Some(idx) => self.items[idx] = entity,
            None => self.items.push(entity),
        }
    }

    fn fail(&mut self, err: ApiError) -> ControllerError {
        self.notification = Some(Notification::from_api_error(&err));
        ControllerError::Api(err)
    }

    // ─────────────────────────────────────────────────────────────────────
    // List
    // ─────────────────────────────────────────────────────────────────────

    /// Full reload of the cached list (initial mount).
    ///
    /// Refused while any request is in flight, so a pending create cannot
    /// land in the cache twice.
    pub async fn reload(&mut self) -> Result<(), ControllerError> {
        self.ensure_idle()?;
        self.loading = true;
        let result = self.remote.list().await;
        self.loading = false;

        match result {
            Ok(items) => {
                tracing::debug!(resource = R::PATH, count = items.len(), "list loaded");
                self.items = items;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(resource = R::PATH, error = %err, "list load failed");
                Err(self.fail(err))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Navigation between views
    // ─────────────────────────────────────────────────────────────────────

    /// `list → form` in create mode.
    pub fn open_create(&mut self) -> Result<(), ControllerError> {
        self.expect_view("list", "add")?;
        self.ensure_idle()?;
        self.reset_form(R::Form::default());
        self.view = View::Form { selected: None };
        Ok(())
    }

    /// `list | details → form` in edit mode.
    pub fn open_edit(&mut self, id: EntityId) -> Result<(), ControllerError> {
        self.ensure_idle()?;
        let entity = match &self.view {
            View::List => self.find(id)?.clone(),
            View::Details(e) if e.id() == id => e.clone(),
            View::Details(_) => return Err(ControllerError::UnknownEntity(id)),
            other => {
                return Err(ControllerError::InvalidTransition {
                    from: other.name(),
                    action: "edit",
                });
            }
        };
        self.reset_form(R::form_for(&entity));
        self.view = View::Form {
            selected: Some(entity),
        };
        Ok(())
    }

    /// `list → details`.
    pub fn open_details(&mut self, id: EntityId) -> Result<(), ControllerError> {
        if !R::CAPABILITIES.details {
            return Err(ControllerError::Unsupported("details view"));
        }
        self.expect_view("list", "view")?;
        self.ensure_idle()?;
        let entity = self.find(id)?.clone();
        self.view = View::Details(entity);
        Ok(())
    }

    /// `list → permissions`.
    pub fn open_permissions(&mut self, id: EntityId) -> Result<(), ControllerError> {
        if !R::CAPABILITIES.permissions {
            return Err(ControllerError::Unsupported("permissions view"));
        }
        self.expect_view("list", "manage permissions")?;
        self.ensure_idle()?;
        let entity = self.find(id)?.clone();
        self.view = View::Permissions(entity);
        Ok(())
    }

    /// `details | permissions → list`.
    pub fn back(&mut self) -> Result<(), ControllerError> {
        match self.view {
            View::Details(_) | View::Permissions(_) => {
                self.view = View::List;
                Ok(())
            }
            _ => Err(ControllerError::InvalidTransition {
                from: self.view.name(),
                action: "go back",
            }),
        }
    }

    /// `form → list`, discarding the in-progress edit.
    pub fn cancel_form(&mut self) -> Result<(), ControllerError> {
        self.expect_view("form", "cancel")?;
        self.ensure_idle()?;
        self.reset_form(R::Form::default());
        self.view = View::List;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Submit
    // ─────────────────────────────────────────────────────────────────────

    /// Validate the form and mark a submission in flight.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket<R::Form>, ControllerError> {
        let (mode, id) = match &self.view {
            View::Form { selected: None } => (FormMode::Create, None),
            View::Form { selected: Some(e) } => (FormMode::Edit, Some(e.id())),
            other => {
                return Err(ControllerError::InvalidTransition {
                    from: other.name(),
                    action: "submit",
                });
            }
        };
        if self.submit_loading {
            return Err(ControllerError::Busy);
        }

        let errors = self.form.validate(mode);
        if !errors.is_empty() {
            self.form_errors = errors.clone();
            return Err(ControllerError::Validation(errors));
        }

        self.form_errors.clear();
        self.submit_loading = true;
        Ok(SubmitTicket {
            mode,
            id,
            form: self.form.clone(),
        })
    }

    /// Apply the server response of a submission.
    ///
    /// On success the cache is patched and the view returns to the list; on
    /// failure the form stays open with server field errors merged in.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket<R::Form>,
        result: ApiResult<R::Entity>,
    ) -> Result<(), ControllerError> {
        self.submit_loading = false;

        match result {
            Ok(entity) => {
                let verb = match ticket.mode {
                    FormMode::Create => {
                        self.upsert(entity);
                        "created"
                    }
                    FormMode::Edit => {
                        self.upsert(entity);
                        "updated"
                    }
                };
                tracing::info!(resource = R::PATH, id = ?ticket.id, verb, "entity saved");
                self.notification = Some(Notification::success(format!("{} {verb} successfully.", R::NAME)));
                self.reset_form(R::Form::default());
                self.view = View::List;
                Ok(())
            }
            Err(err) => {
                if let Some(fields) = err.field_errors() {
                    self.form_errors.merge(fields.clone());
                }
                Err(self.fail(err))
            }
        }
    }

    /// `form → list` through the server: create or update, then patch the cache.
    pub async fn submit(&mut self) -> Result<(), ControllerError> {
        let ticket = self.begin_submit()?;
        let result = match ticket.id {
            Some(id) => self.remote.update(id, &ticket.form).await,
            None => self.remote.create(&ticket.form).await,
        };
        self.finish_submit(ticket, result)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Delete
    // ─────────────────────────────────────────────────────────────────────

    /// Open the confirmation dialog for `id`.
    pub fn request_delete(&mut self, id: EntityId) -> Result<(), ControllerError> {
        self.expect_view("list", "delete")?;
        self.find(id)?;
        self.pending_delete = Some(id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Confirm the pending delete and mark it in flight.
    pub fn begin_delete(&mut self) -> Result<DeleteTicket, ControllerError> {
        if self.loading {
            return Err(ControllerError::Busy);
        }
        let id = self.pending_delete.take().ok_or(ControllerError::NothingToConfirm)?;
        self.loading = true;
        Ok(DeleteTicket { id })
    }

    /// Drop the entry only once the server confirmed the delete.
    pub fn finish_delete(&mut self, ticket: DeleteTicket, result: ApiResult<()>) -> Result<(), ControllerError> {
        self.loading = false;
        match result {
            Ok(()) => {
                self.items.retain(|e| e.id() != ticket.id);
                tracing::info!(resource = R::PATH, id = %ticket.id, "entity deleted");
                self.notification = Some(Notification::success(format!("{} deleted successfully.", R::NAME)));
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub async fn confirm_delete(&mut self) -> Result<(), ControllerError> {
        let ticket = self.begin_delete()?;
        let result = self.remote.delete(ticket.id).await;
        self.finish_delete(ticket, result)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Extras
    // ─────────────────────────────────────────────────────────────────────

    /// Flip the `is_active` flag of a list entry through an update.
    pub async fn toggle_active(&mut self, id: EntityId) -> Result<(), ControllerError> {
        if !R::CAPABILITIES.active_toggle {
            return Err(ControllerError::Unsupported("active toggle"));
        }
        self.expect_view("list", "toggle")?;
        if self.loading {
            return Err(ControllerError::Busy);
        }
        let form = R::toggled(self.find(id)?).ok_or(ControllerError::Unsupported("active toggle"))?;

        self.loading = true;
        let result = self.remote.update(id, &form).await;
        self.loading = false;

        match result {
            Ok(entity) => {
                self.upsert(entity);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// `permissions → list` after the server accepted the new role set.
    pub async fn save_permissions<A>(&mut self, assigner: &A, roles: Vec<Role>) -> Result<(), ControllerError>
    where
        A: RoleAssignment<R::Entity> + ?Sized,
    {
        let id = match &self.view {
            View::Permissions(e) => e.id(),
            other => {
                return Err(ControllerError::InvalidTransition {
                    from: other.name(),
                    action: "save permissions",
                });
            }
        };
        if self.submit_loading {
            return Err(ControllerError::Busy);
        }

        self.submit_loading = true;
        let result = assigner.assign_roles(id, &roles).await;
        self.submit_loading = false;

        match result {
            Ok(entity) => {
                self.upsert(entity);
                self.notification = Some(Notification::success("Roles updated successfully."));
                self.view = View::List;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }
}
