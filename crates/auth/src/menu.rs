//! Authorization-aware navigation.

use serde::Serialize;

use crate::permissions::well_known;
use crate::{AccessPolicy, AuthUser, Requirement};

/// A navigation entry of the admin sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: String,
    pub path: String,
    pub required: Option<Requirement>,
    pub require_all: bool,
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            required: None,
            require_all: false,
            children: Vec::new(),
        }
    }

    pub fn requires(mut self, requirement: impl Into<Requirement>) -> Self {
        self.required = Some(requirement.into());
        self
    }

    pub fn requires_all(mut self, requirement: Requirement) -> Self {
        self.required = Some(requirement);
        self.require_all = true;
        self
    }

    pub fn child(mut self, item: MenuItem) -> Self {
        self.children.push(item);
        self
    }
}

/// Filter `items` down to what `user` may see under `policy`.
///
/// A parent with children stays only if it is itself permitted and at least
/// one child survives; it is returned with the surviving children only.
pub fn visible_menu_with(
    policy: &AccessPolicy,
    user: Option<&AuthUser>,
    items: &[MenuItem],
) -> Vec<MenuItem> {
    items
        .iter()
        .filter(|item| policy.can(user, item.required.as_ref(), item.require_all))
        .filter_map(|item| {
            if item.children.is_empty() {
                return Some(item.clone());
            }
            let children = visible_menu_with(policy, user, &item.children);
            if children.is_empty() {
                None
            } else {
                Some(MenuItem {
                    children,
                    ..item.clone()
                })
            }
        })
        .collect()
}

/// [`visible_menu_with`] under the strict policy.
pub fn visible_menu(user: Option<&AuthUser>, items: &[MenuItem]) -> Vec<MenuItem> {
    visible_menu_with(&AccessPolicy::strict(), user, items)
}

/// Sidebar of the admin panel.
pub fn default_admin_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("Dashboard", "/admin"),
        MenuItem::new("Properties", "/admin/properties").requires(Requirement::set([
            well_known::PROPERTIES_VIEW,
            well_known::PROPERTIES_MANAGE,
        ])),
        MenuItem::new("Companies", "/admin/companies").requires(well_known::COMPANIES_MANAGE),
        MenuItem::new("Facilities", "/admin/facilities").requires(well_known::FACILITIES_MANAGE),
        MenuItem::new("Property Types", "/admin/property-types")
            .requires(well_known::PROPERTY_TYPES_MANAGE),
        MenuItem::new("Users", "/admin/users").requires(Requirement::set([
            well_known::USERS_VIEW,
            well_known::USERS_MANAGE,
        ])),
        MenuItem::new("Roles", "/admin/roles").requires_all(Requirement::set([
            well_known::ROLES_MANAGE,
            well_known::USERS_MANAGE,
        ])),
        MenuItem::new("Site Content", "/admin/content")
            .requires(well_known::CONTENT_MANAGE)
            .child(MenuItem::new("Header", "/admin/content/header"))
            .child(MenuItem::new("Footer", "/admin/content/footer"))
            .child(MenuItem::new("Contact Page", "/admin/content/contact")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopno_core::EntityId;

    fn labels(items: &[MenuItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn anonymous_sees_dashboard_only() {
        let menu = visible_menu(None, &default_admin_menu());
        assert_eq!(labels(&menu), ["Dashboard"]);
    }

    #[test]
    fn admin_sees_everything() {
        let admin = AuthUser::new(EntityId::new(1), "a", "a@x.test").with_role("admin");
        let all = default_admin_menu();
        let menu = visible_menu(Some(&admin), &all);
        assert_eq!(menu, all);
    }

    #[test]
    fn roles_entry_needs_both_permissions() {
        let menu = default_admin_menu();

        let one = AuthUser::new(EntityId::new(2), "b", "b@x.test").with_permission("roles.manage");
        assert!(!labels(&visible_menu(Some(&one), &menu)).contains(&"Roles"));

        let both = one.clone().with_permission("users.manage");
        let visible = visible_menu(Some(&both), &menu);
        assert!(labels(&visible).contains(&"Roles"));
        assert!(labels(&visible).contains(&"Users"));
    }

    #[test]
    fn parent_without_visible_children_is_dropped() {
        let items = vec![
            MenuItem::new("Content", "/c")
                .child(MenuItem::new("Header", "/c/h").requires(well_known::CONTENT_MANAGE)),
        ];
        let u = AuthUser::new(EntityId::new(3), "c", "c@x.test");
        assert!(visible_menu(Some(&u), &items).is_empty());

        let editor = u.with_permission(well_known::CONTENT_MANAGE);
        let visible = visible_menu(Some(&editor), &items);
        assert_eq!(visible[0].children.len(), 1);
    }
}
