//! Roles, capabilities and the permission predicate.
//!
//! Every portal account is either an `admin` or an `editor`. Admins implicitly
//! hold every capability; editors hold exactly the capabilities set to `true`
//! in their [`PermissionMap`].
//!
//! # Example
//!
//! ```ignore
//! use coursehub_core::capabilities::{Capability, has_permission};
//!
//! if has_permission(Some(&auth_user), Capability::NoticesEdit) {
//!     // edit notices
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Editor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A named permission bit granted per editor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CoursesEdit,
    SyllabusEdit,
    ScheduleEdit,
    NoticesEdit,
    DeletionRequestsEdit,
    WelcomeMessageEdit,
    ExamsEdit,
    CourseMaterialsEdit,
    BreakingNewsEdit,
    ClassCancellationEdit,
    MessagesView,
    ComplaintsView,
    OpinionsView,
}

impl Capability {
    pub const ALL: [Capability; 13] = [
        Capability::CoursesEdit,
        Capability::SyllabusEdit,
        Capability::ScheduleEdit,
        Capability::NoticesEdit,
        Capability::DeletionRequestsEdit,
        Capability::WelcomeMessageEdit,
        Capability::ExamsEdit,
        Capability::CourseMaterialsEdit,
        Capability::BreakingNewsEdit,
        Capability::ClassCancellationEdit,
        Capability::MessagesView,
        Capability::ComplaintsView,
        Capability::OpinionsView,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CoursesEdit => "courses_edit",
            Capability::SyllabusEdit => "syllabus_edit",
            Capability::ScheduleEdit => "schedule_edit",
            Capability::NoticesEdit => "notices_edit",
            Capability::DeletionRequestsEdit => "deletion_requests_edit",
            Capability::WelcomeMessageEdit => "welcome_message_edit",
            Capability::ExamsEdit => "exams_edit",
            Capability::CourseMaterialsEdit => "course_materials_edit",
            Capability::BreakingNewsEdit => "breaking_news_edit",
            Capability::ClassCancellationEdit => "class_cancellation_edit",
            Capability::MessagesView => "messages_view",
            Capability::ComplaintsView => "complaints_view",
            Capability::OpinionsView => "opinions_view",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown capability: {}", s))
    }
}

/// Sparse capability map. Absent keys read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap(BTreeMap<Capability, bool>);

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, capability: Capability) -> bool {
        self.0.get(&capability).copied().unwrap_or(false)
    }

    pub fn set(&mut self, capability: Capability, granted: bool) {
        self.0.insert(capability, granted);
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.set(capability, true);
        self
    }

    /// Capabilities explicitly set to `true`, in declaration order.
    pub fn granted(&self) -> Vec<Capability> {
        self.0
            .iter()
            .filter_map(|(capability, granted)| granted.then_some(*capability))
            .collect()
    }
}

impl FromIterator<Capability> for PermissionMap {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().map(|c| (c, true)).collect())
    }
}

/// Anything the permission predicate can be asked about: a stored user or an
/// authenticated session.
pub trait Principal {
    fn role(&self) -> Role;

    /// Whether the capability is explicitly granted, ignoring the role.
    fn holds(&self, capability: Capability) -> bool;
}

/// Permission predicate shared by every mutation path.
///
/// - no user: `false`
/// - admin: `true` for every capability
/// - editor: `true` only when the capability is explicitly granted
pub fn has_permission<P>(user: Option<&P>, capability: Capability) -> bool
where
    P: Principal + ?Sized,
{
    match user {
        None => false,
        Some(user) if user.role() == Role::Admin => true,
        Some(user) => user.holds(capability),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestUser {
        role: Role,
        permissions: PermissionMap,
    }

    impl Principal for TestUser {
        fn role(&self) -> Role {
            self.role
        }

        fn holds(&self, capability: Capability) -> bool {
            self.permissions.get(capability)
        }
    }

    fn editor(permissions: PermissionMap) -> TestUser {
        TestUser {
            role: Role::Editor,
            permissions,
        }
    }

    #[test]
    fn test_missing_user_has_no_permission() {
        for capability in Capability::ALL {
            assert!(!has_permission::<TestUser>(None, capability));
        }
    }

    #[test]
    fn test_admin_has_every_capability() {
        let admin = TestUser {
            role: Role::Admin,
            permissions: PermissionMap::new(),
        };
        for capability in Capability::ALL {
            assert!(has_permission(Some(&admin), capability));
        }
    }

    #[test]
    fn test_editor_permission_closure() {
        let mut permissions = PermissionMap::new();
        permissions.set(Capability::CoursesEdit, true);
        permissions.set(Capability::NoticesEdit, false);
        let user = editor(permissions);

        for capability in Capability::ALL {
            let expected = capability == Capability::CoursesEdit;
            assert_eq!(has_permission(Some(&user), capability), expected, "{}", capability);
        }
    }

    #[test]
    fn test_admin_ignores_explicit_false() {
        let mut permissions = PermissionMap::new();
        permissions.set(Capability::ExamsEdit, false);
        let admin = TestUser {
            role: Role::Admin,
            permissions,
        };
        assert!(has_permission(Some(&admin), Capability::ExamsEdit));
    }

    #[test]
    fn test_permission_map_json_shape() {
        let map: PermissionMap =
            serde_json::from_str(r#"{"courses_edit":true,"exams_edit":false}"#).unwrap();
        assert!(map.get(Capability::CoursesEdit));
        assert!(!map.get(Capability::ExamsEdit));
        assert!(!map.get(Capability::MessagesView));
        assert_eq!(map.granted(), vec![Capability::CoursesEdit]);
    }

    #[test]
    fn test_permission_map_rejects_unknown_capability() {
        let result = serde_json::from_str::<PermissionMap>(r#"{"launch_rockets":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_permission_map_rejects_non_boolean_values() {
        let result = serde_json::from_str::<PermissionMap>(r#"{"courses_edit":"yes"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_capability_names_round_trip_through_from_str() {
        for capability in Capability::ALL {
            assert_eq!(capability.as_str().parse::<Capability>(), Ok(capability));
        }
        assert!("courses_delete".parse::<Capability>().is_err());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("editor".parse::<Role>(), Ok(Role::Editor));
        assert!("Admin".parse::<Role>().is_err());
    }
}
