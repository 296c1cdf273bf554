use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use proptest::prelude::*;

use shopno_admin::resources::{
    Companies, Company, CompanyForm, Facilities, Facility, FacilityForm, HeaderLinks, NavigationLink,
    NavigationLinkForm, UserForm, UserRecord, Users,
};
use shopno_admin::{ControllerError, CrudController, FormMode, RoleAssignment, Severity, View};
use shopno_auth::Role;
use shopno_client::error::FALLBACK_MESSAGE;
use shopno_client::{ApiError, ApiResult, RemoteResource};
use shopno_core::{Entity, EntityId, FieldErrors};

/// In-memory stand-in for `/api/<resource>` that assigns ids like the server.
struct InMemory<E, P> {
    rows: Mutex<Vec<E>>,
    next_id: AtomicU64,
    build: fn(EntityId, &P) -> E,
    fail_next: Mutex<Option<ApiError>>,
    calls: Mutex<Vec<(&'static str, Option<EntityId>)>>,
}

impl<E, P> InMemory<E, P> {
    fn new(rows: Vec<E>, next_id: u64, build: fn(EntityId, &P) -> E) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            next_id: AtomicU64::new(next_id),
            build,
            fail_next: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn fail_next(&self, err: ApiError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(m, _)| *m == method).count()
    }

    fn record(&self, method: &'static str, id: Option<EntityId>) -> ApiResult<()> {
        self.calls.lock().unwrap().push((method, id));
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<E, P> RemoteResource<E, P> for InMemory<E, P>
where
    E: Entity<Id = EntityId> + Clone + Send + Sync + 'static,
    P: Sync,
{
    async fn list(&self) -> ApiResult<Vec<E>> {
        self.record("list", None)?;
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn fetch(&self, id: EntityId) -> ApiResult<E> {
        self.record("fetch", Some(id))?;
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id() == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("{id}")))
    }

    async fn create(&self, payload: &P) -> ApiResult<E> {
        self.record("create", None)?;
        let id = EntityId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let entity = (self.build)(id, payload);
        self.rows.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: EntityId, payload: &P) -> ApiResult<E> {
        self.record("update", Some(id))?;
        let mut rows = self.rows.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| ApiError::NotFound(format!("{id}")))?;
        *slot = (self.build)(id, payload);
        Ok(slot.clone())
    }

    async fn delete(&self, id: EntityId) -> ApiResult<()> {
        self.record("delete", Some(id))?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|e| e.id() != id);
        if rows.len() == before {
            return Err(ApiError::NotFound(format!("{id}")));
        }
        Ok(())
    }
}

fn company(id: u64, name: &str) -> Company {
    Company {
        id: EntityId::new(id),
        name: name.to_string(),
        email: None,
        phone: None,
        address: None,
        website: None,
        description: None,
        logo: None,
        created_at: None,
    }
}

fn company_from_form(id: EntityId, form: &CompanyForm) -> Company {
    Company {
        email: form.email.clone(),
        phone: form.phone.clone(),
        address: form.address.clone(),
        website: form.website.clone(),
        description: form.description.clone(),
        ..company(id.get(), form.name.trim())
    }
}

fn facility_from_form(id: EntityId, form: &FacilityForm) -> Facility {
    Facility {
        id,
        name: form.name.clone(),
        description: form.description.clone(),
        icon: None,
        is_active: form.is_active,
        created_at: None,
        updated_at: None,
    }
}

fn link(id: u64, title: &str, order: i64) -> NavigationLink {
    NavigationLink {
        id: EntityId::new(id),
        title: title.to_string(),
        url: format!("/{}", title.to_lowercase()),
        order,
        is_active: true,
        open_in_new_tab: false,
        section: None,
    }
}

fn link_from_form(id: EntityId, form: &NavigationLinkForm) -> NavigationLink {
    NavigationLink {
        id,
        title: form.title.clone(),
        url: form.url.clone(),
        order: form.order,
        is_active: form.is_active,
        open_in_new_tab: form.open_in_new_tab,
        section: form.section.clone(),
    }
}

fn user(id: u64, name: &str) -> UserRecord {
    UserRecord {
        id: EntityId::new(id),
        name: name.to_string(),
        email: format!("{}@shopno.test", name.to_lowercase()),
        phone: None,
        avatar: None,
        roles: Default::default(),
        is_active: true,
        created_at: None,
    }
}

fn user_from_form(id: EntityId, form: &UserForm) -> UserRecord {
    UserRecord {
        email: form.email.clone(),
        ..user(id.get(), &form.name)
    }
}

async fn companies(rows: Vec<Company>) -> (CrudController<Companies>, Arc<InMemory<Company, CompanyForm>>) {
    let remote = InMemory::new(rows, 100, company_from_form);
    let mut controller = CrudController::<Companies>::new(remote.clone());
    controller.reload().await.unwrap();
    (controller, remote)
}

fn ids(items: &[Company]) -> Vec<u64> {
    items.iter().map(|c| c.id.get()).collect()
}

#[tokio::test]
async fn create_appends_entity_with_server_id() {
    let (mut controller, remote) = companies(vec![company(1, "Shanta"), company(2, "Bashundhara")]).await;

    controller.open_create().unwrap();
    assert_eq!(controller.mode(), Some(FormMode::Create));
    controller.form_mut().name = "Concord".into();
    controller.submit().await.unwrap();

    assert_eq!(ids(controller.items()), vec![1, 2, 100]);
    assert_eq!(controller.items()[2].name, "Concord");
    assert_eq!(controller.view(), &View::List);
    assert_eq!(remote.calls("create"), 1);

    let note = controller.take_notification().unwrap();
    assert_eq!(note.severity, Severity::Success);
    assert_eq!(note.message, "Company created successfully.");
    assert!(controller.notification().is_none());
}

#[tokio::test]
async fn edit_replaces_only_the_matching_entry() {
    let (mut controller, remote) =
        companies(vec![company(3, "Alpha"), company(5, "Beta"), company(9, "Gamma")]).await;

    controller.open_edit(EntityId::new(5)).unwrap();
    assert_eq!(controller.mode(), Some(FormMode::Edit));
    assert_eq!(controller.form().name, "Beta");

    controller.form_mut().name = "Beta Holdings".into();
    controller.submit().await.unwrap();

    assert_eq!(ids(controller.items()), vec![3, 5, 9]);
    assert_eq!(controller.items()[0].name, "Alpha");
    assert_eq!(controller.items()[1].name, "Beta Holdings");
    assert_eq!(controller.items()[2].name, "Gamma");
    assert_eq!(remote.calls("update"), 1);
    assert_eq!(remote.calls("create"), 0);
    assert_eq!(controller.form(), &CompanyForm::default());
}

#[tokio::test]
async fn delete_removes_entry_after_one_confirmed_call() {
    let (mut controller, remote) = companies(vec![company(7, "Seven"), company(8, "Eight")]).await;

    controller.request_delete(EntityId::new(7)).unwrap();
    assert_eq!(controller.pending_delete(), Some(EntityId::new(7)));
    controller.confirm_delete().await.unwrap();

    assert_eq!(ids(controller.items()), vec![8]);
    assert_eq!(remote.calls("delete"), 1);
    assert_eq!(controller.confirm_delete().await, Err(ControllerError::NothingToConfirm));
    assert_eq!(remote.calls("delete"), 1);
}

#[tokio::test]
async fn cancelled_delete_sends_nothing() {
    let (mut controller, remote) = companies(vec![company(7, "Seven")]).await;

    controller.request_delete(EntityId::new(7)).unwrap();
    controller.cancel_delete();
    assert_eq!(controller.confirm_delete().await, Err(ControllerError::NothingToConfirm));
    assert_eq!(remote.calls("delete"), 0);
    assert_eq!(controller.items().len(), 1);
}

#[tokio::test]
async fn unknown_ids_are_rejected_before_any_request() {
    let (mut controller, remote) = companies(vec![company(1, "One")]).await;

    let missing = EntityId::new(42);
    assert_eq!(controller.open_edit(missing), Err(ControllerError::UnknownEntity(missing)));
    assert_eq!(controller.request_delete(missing), Err(ControllerError::UnknownEntity(missing)));
    assert_eq!(remote.calls("update") + remote.calls("delete"), 0);
}

#[tokio::test]
async fn server_validation_keeps_cache_and_form() {
    let (mut controller, remote) = companies(vec![company(1, "Shanta")]).await;
    remote.fail_next(ApiError::Validation {
        message: "The given data was invalid.".into(),
        errors: FieldErrors::new().with("name", "The name has already been taken."),
    });

    controller.open_create().unwrap();
    controller.form_mut().name = "Shanta".into();
    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, ControllerError::Api(ApiError::Validation { .. })));
    assert_eq!(ids(controller.items()), vec![1]);
    assert_eq!(controller.view().name(), "form");
    assert_eq!(controller.form().name, "Shanta");
    assert_eq!(controller.form_errors().first("name"), Some("The name has already been taken."));
    assert!(!controller.is_submitting());

    let note = controller.notification().unwrap();
    assert_eq!(note.severity, Severity::Warning);
    assert_eq!(note.message, "The given data was invalid.");
}

#[tokio::test]
async fn client_validation_blocks_the_request() {
    let (mut controller, remote) = companies(Vec::new()).await;

    controller.open_create().unwrap();
    controller.form_mut().email = Some("broken".into());
    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, ControllerError::Validation(_)));
    assert_eq!(controller.form_errors().first("name"), Some("The name field is required."));
    assert!(controller.form_errors().first("email").is_some());
    assert_eq!(remote.calls("create"), 0);
    assert!(!controller.is_submitting());
}

#[tokio::test]
async fn duplicate_submission_is_rejected_while_in_flight() {
    let (mut controller, _remote) = companies(Vec::new()).await;

    controller.open_create().unwrap();
    controller.form_mut().name = "Concord".into();
    let ticket = controller.begin_submit().unwrap();
    assert!(controller.is_submitting());
    assert!(controller.is_busy());
    assert!(matches!(controller.begin_submit(), Err(ControllerError::Busy)));

    controller
        .finish_submit(ticket, Ok(company(55, "Concord")))
        .unwrap();
    assert!(!controller.is_submitting());
    assert_eq!(ids(controller.items()), vec![55]);
}

#[tokio::test]
async fn reload_waits_for_pending_create() {
    let (mut controller, remote) = companies(vec![company(1, "Shanta")]).await;

    controller.open_create().unwrap();
    controller.form_mut().name = "Concord".into();
    let ticket = controller.begin_submit().unwrap();
    let created = remote.create(&ticket.form).await;

    assert_eq!(controller.reload().await, Err(ControllerError::Busy));
    assert_eq!(remote.calls("list"), 1);

    controller.finish_submit(ticket, created).unwrap();
    assert_eq!(ids(controller.items()), vec![1, 100]);

    controller.reload().await.unwrap();
    assert_eq!(ids(controller.items()), vec![1, 100]);
}

#[tokio::test]
async fn create_response_already_cached_is_not_duplicated() {
    let (mut controller, _remote) = companies(vec![company(1, "Shanta")]).await;

    controller.open_create().unwrap();
    controller.form_mut().name = "Shanta".into();
    let ticket = controller.begin_submit().unwrap();
    controller.finish_submit(ticket, Ok(company(1, "Shanta"))).unwrap();

    assert_eq!(ids(controller.items()), vec![1]);
}

#[tokio::test]
async fn form_stays_put_while_submit_is_in_flight() {
    let (mut controller, _remote) = companies(vec![company(1, "One")]).await;

    controller.open_edit(EntityId::new(1)).unwrap();
    let ticket = controller.begin_submit().unwrap();

    assert_eq!(controller.cancel_form(), Err(ControllerError::Busy));
    assert_eq!(controller.view().name(), "form");

    controller.finish_submit(ticket, Ok(company(1, "One"))).unwrap();
    assert_eq!(controller.view(), &View::List);
    assert_eq!(controller.open_create(), Ok(()));
}

#[tokio::test]
async fn navigation_is_refused_while_delete_is_in_flight() {
    let (mut controller, _remote) = companies(vec![company(1, "One"), company(2, "Two")]).await;

    controller.request_delete(EntityId::new(1)).unwrap();
    let ticket = controller.begin_delete().unwrap();

    assert_eq!(controller.open_create(), Err(ControllerError::Busy));
    assert_eq!(controller.open_edit(EntityId::new(2)), Err(ControllerError::Busy));

    controller.finish_delete(ticket, Ok(())).unwrap();
    assert_eq!(ids(controller.items()), vec![2]);
    controller.open_edit(EntityId::new(2)).unwrap();
}

#[tokio::test]
async fn failed_delete_keeps_entry() {
    let (mut controller, remote) = companies(vec![company(7, "Seven")]).await;
    remote.fail_next(ApiError::Server {
        status: 500,
        message: "boom".into(),
    });

    controller.request_delete(EntityId::new(7)).unwrap();
    let err = controller.confirm_delete().await.unwrap_err();

    assert_eq!(
        err,
        ControllerError::Api(ApiError::Server {
            status: 500,
            message: "boom".into()
        })
    );
    assert_eq!(ids(controller.items()), vec![7]);
    assert!(!controller.is_loading());
    assert_eq!(remote.calls("delete"), 1);
    assert_eq!(controller.notification().map(|n| n.severity), Some(Severity::Error));
}

#[tokio::test]
async fn failed_update_keeps_cache_and_form() {
    let (mut controller, remote) = companies(vec![company(3, "Alpha"), company(5, "Beta")]).await;
    remote.fail_next(ApiError::Server {
        status: 500,
        message: "boom".into(),
    });

    controller.open_edit(EntityId::new(5)).unwrap();
    controller.form_mut().name = "Beta Holdings".into();
    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, ControllerError::Api(ApiError::Server { status: 500, .. })));
    assert_eq!(controller.items()[1].name, "Beta");
    assert_eq!(controller.mode(), Some(FormMode::Edit));
    assert_eq!(controller.form().name, "Beta Holdings");
    assert!(!controller.is_submitting());
    assert_eq!(controller.notification().map(|n| n.message.as_str()), Some("boom"));
}

#[tokio::test]
async fn reload_failure_raises_error_toast() {
    let remote = InMemory::new(vec![company(1, "One")], 10, company_from_form);
    remote.fail_next(ApiError::Transport("connection refused".into()));
    let mut controller = CrudController::<Companies>::new(remote.clone());

    assert!(controller.reload().await.is_err());
    assert!(controller.items().is_empty());
    assert!(!controller.is_loading());
    let note = controller.notification().unwrap();
    assert_eq!(note.severity, Severity::Error);
    assert_eq!(note.message, FALLBACK_MESSAGE);

    controller.reload().await.unwrap();
    assert_eq!(ids(controller.items()), vec![1]);
}

#[tokio::test]
async fn view_transitions() {
    let (mut controller, _remote) = companies(vec![company(1, "One")]).await;

    assert_eq!(
        controller.open_details(EntityId::new(1)),
        Err(ControllerError::Unsupported("details view"))
    );
    assert!(matches!(controller.back(), Err(ControllerError::InvalidTransition { .. })));
    assert!(matches!(controller.cancel_form(), Err(ControllerError::InvalidTransition { .. })));

    controller.open_create().unwrap();
    assert!(matches!(controller.open_create(), Err(ControllerError::InvalidTransition { .. })));
    controller.form_mut().name = "Draft".into();
    controller.cancel_form().unwrap();
    assert_eq!(controller.view(), &View::List);
    assert_eq!(controller.form().name, "");
}

#[tokio::test]
async fn facilities_have_a_details_view() {
    let seed = facility_from_form(
        EntityId::new(1),
        &FacilityForm {
            name: "Gym".into(),
            ..FacilityForm::default()
        },
    );
    let remote = InMemory::new(vec![seed.clone()], 2, facility_from_form);
    let mut controller = CrudController::<Facilities>::new(remote);
    controller.reload().await.unwrap();

    controller.open_details(EntityId::new(1)).unwrap();
    assert_eq!(controller.view(), &View::Details(seed));

    controller.open_edit(EntityId::new(1)).unwrap();
    assert_eq!(controller.form().name, "Gym");
    controller.cancel_form().unwrap();

    controller.open_details(EntityId::new(1)).unwrap();
    controller.back().unwrap();
    assert_eq!(controller.view(), &View::List);
}

struct FakeRoles {
    calls: Mutex<Vec<(EntityId, Vec<Role>)>>,
}

#[async_trait]
impl RoleAssignment<UserRecord> for FakeRoles {
    async fn assign_roles(&self, user_id: EntityId, roles: &[Role]) -> ApiResult<UserRecord> {
        self.calls.lock().unwrap().push((user_id, roles.to_vec()));
        let mut updated = user(user_id.get(), "Nadia");
        updated.roles = roles.iter().cloned().collect();
        Ok(updated)
    }
}

#[tokio::test]
async fn permissions_view_saves_roles_and_returns_to_list() {
    let remote = InMemory::new(vec![user(1, "Karim"), user(2, "Nadia")], 3, user_from_form);
    let mut controller = CrudController::<Users>::new(remote);
    controller.reload().await.unwrap();
    let assigner = FakeRoles {
        calls: Mutex::new(Vec::new()),
    };

    let err = controller.save_permissions(&assigner, vec![Role::new("editor")]).await;
    assert!(matches!(err, Err(ControllerError::InvalidTransition { .. })));

    controller.open_permissions(EntityId::new(2)).unwrap();
    assert_eq!(controller.view().name(), "permissions");
    controller
        .save_permissions(&assigner, vec![Role::new("editor")])
        .await
        .unwrap();

    assert_eq!(controller.view(), &View::List);
    assert!(controller.items()[1].roles.contains(&Role::new("editor")));
    assert!(controller.items()[0].roles.is_empty());
    assert_eq!(assigner.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn permissions_view_is_user_only() {
    let (mut controller, _remote) = companies(vec![company(1, "One")]).await;
    assert_eq!(
        controller.open_permissions(EntityId::new(1)),
        Err(ControllerError::Unsupported("permissions view"))
    );
}

#[tokio::test]
async fn toggle_active_flips_flag_through_update() {
    let remote = InMemory::new(vec![link(1, "Home", 0), link(2, "About", 1)], 3, link_from_form);
    let mut controller = CrudController::<HeaderLinks>::new(remote.clone());
    controller.reload().await.unwrap();

    controller.toggle_active(EntityId::new(2)).await.unwrap();
    assert!(!controller.items()[1].is_active);
    assert!(controller.items()[0].is_active);
    assert_eq!(remote.calls("update"), 1);

    let (mut plain, _) = companies(vec![company(1, "One")]).await;
    assert_eq!(
        plain.toggle_active(EntityId::new(1)).await,
        Err(ControllerError::Unsupported("active toggle"))
    );
}

#[tokio::test]
async fn links_display_in_order_but_cache_keeps_server_order() {
    let remote = InMemory::new(
        vec![link(1, "Contact", 3), link(2, "Home", 1), link(3, "Projects", 2)],
        4,
        link_from_form,
    );
    let mut controller = CrudController::<HeaderLinks>::new(remote);
    controller.reload().await.unwrap();

    let titles: Vec<&str> = controller.sorted_items().iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, ["Home", "Projects", "Contact"]);
    assert_eq!(controller.items()[0].title, "Contact");
}

proptest! {
    #[test]
    fn sorted_items_is_an_ordered_permutation(orders in proptest::collection::vec(0i64..20, 0..12)) {
        let rows: Vec<NavigationLink> = orders
            .iter()
            .enumerate()
            .map(|(i, order)| link(i as u64 + 1, "Link", *order))
            .collect();
        let remote = InMemory::new(rows, 100, link_from_form);
        let mut controller = CrudController::<HeaderLinks>::new(remote);

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(controller.reload()).unwrap();

        let sorted = controller.sorted_items();
        prop_assert_eq!(sorted.len(), orders.len());
        prop_assert!(sorted.windows(2).all(|w| w[0].order <= w[1].order));
        // Stable: equal orders keep server (id) order.
        prop_assert!(sorted
            .windows(2)
            .all(|w| w[0].order != w[1].order || w[0].id < w[1].id));
    }
}
