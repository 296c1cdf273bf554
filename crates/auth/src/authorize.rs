use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AuthUser, Permission, Role};

/// What a UI action or navigation entry requires.
///
/// A `Set` is evaluated either as "any of" or "all of" depending on the
/// `require_all` flag passed alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Requirement {
    Single(Permission),
    Set(BTreeSet<Permission>),
}

impl Requirement {
    pub fn single(permission: impl Into<Permission>) -> Self {
        Self::Single(permission.into())
    }

    pub fn set<I, P>(permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self::Set(permissions.into_iter().map(Into::into).collect())
    }

    /// An empty string or an empty set requires nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Requirement::Single(p) => p.as_str().is_empty(),
            Requirement::Set(set) => set.is_empty(),
        }
    }

    pub fn permissions(&self) -> Vec<&Permission> {
        match self {
            Requirement::Single(p) => vec![p],
            Requirement::Set(set) => set.iter().collect(),
        }
    }
}

impl From<Permission> for Requirement {
    fn from(value: Permission) -> Self {
        Self::Single(value)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Access policy used by the evaluator.
///
/// The strict policy grants unconditional access only through the admin
/// role. The legacy marker list (matching admin-ish substrings in a user's
/// name or email) exists for old accounts that predate role assignment and
/// is off unless explicitly enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    legacy_admin_markers: Vec<String>,
}

impl AccessPolicy {
    pub fn strict() -> Self {
        Self::default()
    }

    /// Also treat users whose name or email contains one of `markers` as admins.
    #[deprecated(note = "name/email substring matching is not an authorization mechanism; assign the admin role instead")]
    pub fn with_legacy_admin_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            legacy_admin_markers: markers
                .into_iter()
                .map(|m| m.into().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn is_strict(&self) -> bool {
        self.legacy_admin_markers.is_empty()
    }

    pub fn is_admin(&self, user: &AuthUser) -> bool {
        is_admin(user) || self.legacy_marker_match(user).is_some()
    }

    fn legacy_marker_match(&self, user: &AuthUser) -> Option<&str> {
        let name = user.name.to_lowercase();
        let email = user.email.to_lowercase();
        self.legacy_admin_markers
            .iter()
            .find(|m| name.contains(m.as_str()) || email.contains(m.as_str()))
            .map(String::as_str)
    }

    /// Decide whether `user` may see/use something guarded by `requirement`.
    pub fn can(
        &self,
        user: Option<&AuthUser>,
        requirement: Option<&Requirement>,
        require_all: bool,
    ) -> bool {
        self.decide(user, requirement, require_all).granted()
    }

    fn decide(
        &self,
        user: Option<&AuthUser>,
        requirement: Option<&Requirement>,
        require_all: bool,
    ) -> Decision {
        let requirement = requirement.filter(|r| !r.is_empty());

        let Some(user) = user else {
            return match requirement {
                None => Decision::NoRequirement,
                Some(r) => Decision::Unauthenticated(r.permissions().into_iter().cloned().collect()),
            };
        };

        if is_admin(user) {
            return Decision::AdminRole;
        }

        if let Some(marker) = self.legacy_marker_match(user) {
            tracing::warn!(
                user_id = %user.id,
                marker,
                "granting access through deprecated admin marker match; assign the admin role instead"
            );
            return Decision::LegacyMarker;
        }

        let Some(requirement) = requirement else {
            return Decision::NoRequirement;
        };

        match requirement {
            Requirement::Single(p) => {
                if user.has_permission(p) {
                    Decision::Held(vec![p.clone()])
                } else {
                    Decision::Missing(vec![p.clone()])
                }
            }
            Requirement::Set(set) => {
                let (held, missing): (Vec<&Permission>, Vec<&Permission>) =
                    set.iter().partition(|p| user.has_permission(p));

                let granted = if require_all {
                    missing.is_empty()
                } else {
                    !held.is_empty()
                };

                if granted {
                    Decision::Held(held.into_iter().cloned().collect())
                } else {
                    Decision::Missing(missing.into_iter().cloned().collect())
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Decision {
    Unauthenticated(Vec<Permission>),
    AdminRole,
    LegacyMarker,
    NoRequirement,
    Held(Vec<Permission>),
    Missing(Vec<Permission>),
}

impl Decision {
    fn granted(&self) -> bool {
        !matches!(self, Decision::Unauthenticated(_) | Decision::Missing(_))
    }
}

/// Strict-policy check.
///
/// - No IO
/// - No panics
/// - No caching: permission sets are small and change only on user reload
pub fn can(user: Option<&AuthUser>, requirement: Option<&Requirement>, require_all: bool) -> bool {
    AccessPolicy::strict().can(user, requirement, require_all)
}

/// Like [`can`], but reports the first missing permission as an error.
pub fn ensure(
    user: Option<&AuthUser>,
    requirement: Option<&Requirement>,
    require_all: bool,
) -> Result<(), AuthzError> {
    match AccessPolicy::strict().decide(user, requirement, require_all) {
        Decision::Unauthenticated(_) => Err(AuthzError::Unauthenticated),
        Decision::Missing(missing) => Err(AuthzError::Forbidden(
            missing
                .iter()
                .map(Permission::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        )),
        _ => Ok(()),
    }
}

/// Case-insensitive role membership.
pub fn has_role(user: &AuthUser, role: &str) -> bool {
    user.roles.iter().any(|r| r.matches(role))
}

/// Whether the user carries the reserved admin role.
pub fn is_admin(user: &AuthUser) -> bool {
    user.roles.iter().any(Role::is_admin)
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Why a UI gate was opened or kept closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationExplanation {
    pub granted: bool,
    pub kind: ExplanationKind,
    pub reason: String,
    /// Permissions that satisfied the requirement (empty for admin/no requirement).
    pub held: Vec<Permission>,
    /// Permissions the user lacks when denied.
    pub missing: Vec<Permission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationKind {
    Unauthenticated,
    AdminRole,
    LegacyMarker,
    NoRequirement,
    PermissionHeld,
    PermissionMissing,
}

/// Explain the decision [`AccessPolicy::can`] would make.
pub fn explain(
    policy: &AccessPolicy,
    user: Option<&AuthUser>,
    requirement: Option<&Requirement>,
    require_all: bool,
) -> AuthorizationExplanation {
    let decision = policy.decide(user, requirement, require_all);
    let granted = decision.granted();

    match decision {
        Decision::Unauthenticated(missing) => AuthorizationExplanation {
            granted,
            kind: ExplanationKind::Unauthenticated,
            reason: "no user loaded; only unguarded entries are available".to_string(),
            held: Vec::new(),
            missing,
        },
        Decision::AdminRole => AuthorizationExplanation {
            granted,
            kind: ExplanationKind::AdminRole,
            reason: "user has the admin role".to_string(),
            held: Vec::new(),
            missing: Vec::new(),
        },
        Decision::LegacyMarker => AuthorizationExplanation {
            granted,
            kind: ExplanationKind::LegacyMarker,
            reason: "name or email matched a deprecated admin marker".to_string(),
            held: Vec::new(),
            missing: Vec::new(),
        },
        Decision::NoRequirement => AuthorizationExplanation {
            granted,
            kind: ExplanationKind::NoRequirement,
            reason: "entry has no permission requirement".to_string(),
            held: Vec::new(),
            missing: Vec::new(),
        },
        Decision::Held(held) => AuthorizationExplanation {
            granted,
            kind: ExplanationKind::PermissionHeld,
            reason: format!("user holds {}", join(&held)),
            held,
            missing: Vec::new(),
        },
        Decision::Missing(missing) => AuthorizationExplanation {
            granted,
            kind: ExplanationKind::PermissionMissing,
            reason: if require_all {
                format!("user lacks {}", join(&missing))
            } else {
                format!("user holds none of {}", join(&missing))
            },
            held: Vec::new(),
            missing,
        },
    }
}

fn join(perms: &[Permission]) -> String {
    perms
        .iter()
        .map(|p| format!("'{p}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shopno_core::EntityId;

    fn user(perms: &[&'static str]) -> AuthUser {
        AuthUser::new(EntityId::new(1), "Karim", "karim@example.com").with_permissions(perms.iter().copied())
    }

    fn admin() -> AuthUser {
        AuthUser::new(EntityId::new(2), "Boss", "boss@example.com").with_role("Admin")
    }

    #[test]
    fn absent_user_only_sees_unguarded_entries() {
        assert!(can(None, None, false));
        assert!(can(None, Some(&Requirement::set(Vec::<Permission>::new())), true));
        assert!(!can(None, Some(&Requirement::single("users.view")), false));
    }

    #[test]
    fn admin_role_bypasses_requirements() {
        let admin = admin();
        assert!(can(Some(&admin), Some(&Requirement::single("anything.at_all")), false));
        assert!(can(Some(&admin), Some(&Requirement::set(["a.x", "b.y"])), true));
    }

    #[test]
    fn single_requirement_checks_membership() {
        let u = user(&["companies.manage"]);
        assert!(can(Some(&u), Some(&Requirement::single("companies.manage")), false));
        assert!(!can(Some(&u), Some(&Requirement::single("users.manage")), false));
    }

    #[test]
    fn set_requirement_honours_require_all() {
        let u = user(&["users.view"]);
        let req = Requirement::set(["users.view", "users.manage"]);
        assert!(can(Some(&u), Some(&req), false));
        assert!(!can(Some(&u), Some(&req), true));
    }

    #[test]
    fn role_checks_ignore_case() {
        let u = user(&[]).with_role("Editor");
        assert!(has_role(&u, "editor"));
        assert!(has_role(&u, "EDITOR"));
        assert!(!has_role(&u, "admin"));
        assert!(!is_admin(&u));
        assert!(is_admin(&u.with_role("ADMIN")));
    }

    #[test]
    fn strict_policy_ignores_admin_looking_emails() {
        let u = AuthUser::new(EntityId::new(9), "Site Admin", "admin@shopno.test");
        assert!(!can(Some(&u), Some(&Requirement::single("users.manage")), false));
    }

    #[test]
    #[allow(deprecated)]
    fn legacy_markers_grant_only_when_enabled() {
        let policy = AccessPolicy::with_legacy_admin_markers(["Admin"]);
        let u = AuthUser::new(EntityId::new(9), "Rina", "admin@shopno.test");
        assert!(!policy.is_strict());
        assert!(policy.is_admin(&u));
        assert!(policy.can(Some(&u), Some(&Requirement::single("users.manage")), false));

        let explanation = explain(&policy, Some(&u), Some(&Requirement::single("users.manage")), false);
        assert_eq!(explanation.kind, ExplanationKind::LegacyMarker);
    }

    #[test]
    fn ensure_reports_missing_permissions() {
        let u = user(&[]);
        let err = ensure(Some(&u), Some(&Requirement::set(["a.x", "b.y"])), true).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden("a.x, b.y".to_string()));
        assert_eq!(
            ensure(None, Some(&Requirement::single("a.x")), false),
            Err(AuthzError::Unauthenticated)
        );
    }

    #[test]
    fn explain_lists_missing_permissions() {
        let u = user(&["a.x"]);
        let e = explain(&AccessPolicy::strict(), Some(&u), Some(&Requirement::set(["a.x", "b.y"])), true);
        assert!(!e.granted);
        assert_eq!(e.kind, ExplanationKind::PermissionMissing);
        assert_eq!(e.missing, vec![Permission::new("b.y")]);
        assert_eq!(e.reason, "user lacks 'b.y'");
    }

    #[test]
    fn requirement_deserializes_from_string_or_list() {
        let single: Requirement = serde_json::from_str(r#""users.view""#).unwrap();
        assert_eq!(single, Requirement::single("users.view"));
        let set: Requirement = serde_json::from_str(r#"["a.x","b.y"]"#).unwrap();
        assert_eq!(set, Requirement::set(["a.x", "b.y"]));
    }

    fn perm_strategy() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["a.read", "a.write", "b.read", "b.write", "c.manage"])
            .prop_map(str::to_string)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: admins pass every requirement.
        #[test]
        fn admin_always_permitted(
            req in prop::collection::btree_set(perm_strategy(), 0..4),
            require_all in any::<bool>(),
        ) {
            let requirement = Requirement::set(req);
            prop_assert!(can(Some(&admin()), Some(&requirement), require_all));
        }

        /// Property: a single requirement is met iff the permission is held.
        #[test]
        fn single_iff_member(
            held in prop::collection::btree_set(perm_strategy(), 0..5),
            wanted in perm_strategy(),
        ) {
            let u = AuthUser::new(EntityId::new(1), "u", "u@example.com").with_permissions(held.clone());
            let expected = held.contains(&wanted);
            prop_assert_eq!(can(Some(&u), Some(&Requirement::single(wanted)), false), expected);
        }

        /// Property: "all" is subset inclusion, "any" is non-empty intersection.
        #[test]
        fn set_semantics(
            held in prop::collection::btree_set(perm_strategy(), 0..5),
            wanted in prop::collection::btree_set(perm_strategy(), 1..4),
        ) {
            let u = AuthUser::new(EntityId::new(1), "u", "u@example.com").with_permissions(held.clone());
            let req = Requirement::set(wanted.clone());

            prop_assert_eq!(can(Some(&u), Some(&req), true), wanted.is_subset(&held));
            prop_assert_eq!(can(Some(&u), Some(&req), false), !wanted.is_disjoint(&held));
        }
    }
}
