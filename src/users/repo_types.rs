use sqlx::FromRow;
use time::OffsetDateTime;

use crate::users::role::DbRole;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,                         // raw text, decoded on the way out
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,   // null until the first real update
}

/// Values for a fresh `users` row; storage fills in id and created_at.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: DbRole,
}

/// Columns an update is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    Name,
    Email,
    Role,
    UpdatedAt,
}

impl UserColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            UserColumn::Name => "name",
            UserColumn::Email => "email",
            UserColumn::Role => "role",
            UserColumn::UpdatedAt => "updated_at",
        }
    }
}

/// Column assignments for one partial update. `updated_at` is always set.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAssignments {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<DbRole>,
    pub updated_at: OffsetDateTime,
}

impl UserAssignments {
    pub fn columns(&self) -> Vec<UserColumn> {
        let mut cols = Vec::with_capacity(4);
        if self.name.is_some() {
            cols.push(UserColumn::Name);
        }
        if self.email.is_some() {
            cols.push(UserColumn::Email);
        }
        if self.role.is_some() {
            cols.push(UserColumn::Role);
        }
        cols.push(UserColumn::UpdatedAt);
        cols
    }
}

/// Outcome of the partial-update builder.
#[derive(Debug, Clone, PartialEq)]
pub enum UserUpdate {
    /// Nothing effective was supplied; storage is left alone.
    Noop,
    Assign(UserAssignments),
}
