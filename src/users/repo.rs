use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{Error, Result};
use crate::users::repo_types::{NewUser, User, UserAssignments, UserColumn, UserUpdate};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return the id storage assigned to it.
    async fn insert(&self, new_user: &NewUser) -> Result<i64>;

    /// Load a user, failing with [`Error::NotFound`] when no row matches.
    async fn find_by_id(&self, id: i64) -> Result<User>;

    /// Apply a partial update. Returns whether a row matched; a no-op update
    /// returns `false` without issuing a statement.
    async fn apply_update(&self, id: i64, update: &UserUpdate) -> Result<bool>;

    /// Delete a user. Returns whether a row was removed; a missing id is not an error.
    async fn delete_by_id(&self, id: i64) -> Result<bool>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, new_user: &NewUser) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (name, email, role)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::NotFound(id))
    }

    async fn apply_update(&self, id: i64, update: &UserUpdate) -> Result<bool> {
        let assignments = match update {
            UserUpdate::Noop => return Ok(false),
            UserUpdate::Assign(a) => a,
        };

        let mut query = update_query(id, assignments);
        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// `UPDATE users SET ... WHERE id = $n` for the supplied assignments.
/// Column names come from [`UserColumn`] only; every value is bound.
pub(crate) fn update_query(id: i64, a: &UserAssignments) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("UPDATE users SET ");
    let mut first = true;

    if let Some(name) = &a.name {
        push_column(&mut query, &mut first, UserColumn::Name);
        query.push_bind(name.clone());
    }
    if let Some(email) = &a.email {
        push_column(&mut query, &mut first, UserColumn::Email);
        query.push_bind(email.clone());
    }
    if let Some(role) = a.role {
        push_column(&mut query, &mut first, UserColumn::Role);
        query.push_bind(role.as_str());
    }
    push_column(&mut query, &mut first, UserColumn::UpdatedAt);
    query.push_bind(a.updated_at);

    query.push(" WHERE id = ").push_bind(id);
    query
}

fn push_column(
    query: &mut QueryBuilder<'static, Postgres>,
    first: &mut bool,
    column: UserColumn,
) {
    if !*first {
        query.push(", ");
    }
    *first = false;
    query.push(column.as_str()).push(" = ");
}
