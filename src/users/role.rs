use crate::error::{Error, Result};
use crate::users::dto::Role;

/// Role as persisted in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbRole {
    Admin,
    User,
}

impl DbRole {
    pub fn as_str(self) -> &'static str {
        match self {
            DbRole::Admin => "ADMIN",
            DbRole::User => "USER",
        }
    }
}

/// Wire role to stored role. Storage never receives an ambiguous role.
pub fn role_to_db(role: Role) -> Result<DbRole> {
    match role {
        Role::Admin => Ok(DbRole::Admin),
        Role::User => Ok(DbRole::User),
        Role::Unspecified => Err(Error::InvalidRole(format!(
            "cannot store role {role:?}, expected ADMIN or USER"
        ))),
    }
}

/// Stored role text to wire role. Never fails; drifted values read back as `Unspecified`.
pub fn role_from_db(raw: &str) -> Role {
    match raw {
        "ADMIN" => Role::Admin,
        "USER" => Role::User,
        _ => Role::Unspecified,
    }
}
