//! Well-known role names and the authorization predicates built on them.
//!
//! These must match the seed data in `20260301000002_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MODERATOR: &str = "moderator";
pub const ROLE_USER: &str = "user";

/// Seeded `roles.id` of the default role assigned on self-registration.
pub const DEFAULT_ROLE_ID: i64 = 3;

/// Role hierarchy: every role includes the permissions of the ones below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    /// Parse a role name as stored in the `roles` table.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ROLE_ADMIN => Some(Role::Admin),
            ROLE_MODERATOR => Some(Role::Moderator),
            ROLE_USER => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Moderator => ROLE_MODERATOR,
            Role::User => ROLE_USER,
        }
    }

    /// Whether this role grants at least the permissions of `required`.
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
    }
}

/// Any authenticated user may create and edit catalog entries.
pub fn can_edit_catalog(role: &str) -> bool {
    Role::from_name(role).is_some()
}

/// Deleting catalog entries (single or bulk) needs moderator or admin.
pub fn can_delete_catalog(role: &str) -> bool {
    Role::from_name(role).is_some_and(|r| r.satisfies(Role::Moderator))
}

/// User management is admin-only.
pub fn can_manage_users(role: &str) -> bool {
    Role::from_name(role).is_some_and(|r| r.satisfies(Role::Admin))
}
