//! In-memory stand-ins used by handler tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::state::AppState;
use crate::users::repo::UserRepository;
use crate::users::repo_types::{NewUser, User, UserUpdate};

/// Repository backed by a map. Ids come from a counter so they are never reused.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<BTreeMap<i64, User>>,
    next_id: AtomicI64,
    updates: AtomicUsize,
    fail: bool,
}

impl InMemoryUserRepository {
    /// Every call fails as if the pool could not hand out a connection.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Number of UPDATE statements that would have reached storage.
    pub fn update_statements(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(Error::Storage(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, new_user: &NewUser) -> Result<i64> {
        self.check()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = User {
            id,
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            role: new_user.role.as_str().to_string(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };
        self.rows.lock().unwrap().insert(id, user);
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<User> {
        self.check()?;
        self.rows
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound(id))
    }

    async fn apply_update(&self, id: i64, update: &UserUpdate) -> Result<bool> {
        let a = match update {
            UserUpdate::Noop => return Ok(false),
            UserUpdate::Assign(a) => a,
        };
        self.check()?;
        self.updates.fetch_add(1, Ordering::SeqCst);

        let mut rows = self.rows.lock().unwrap();
        let Some(user) = rows.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(name) = &a.name {
            user.name = name.clone();
        }
        if let Some(email) = &a.email {
            user.email = email.clone();
        }
        if let Some(role) = a.role {
            user.role = role.as_str().to_string();
        }
        user.updated_at = Some(a.updated_at);
        Ok(true)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        self.check()?;
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

pub fn test_state(repo: Arc<InMemoryUserRepository>) -> AppState {
    AppState::new(repo)
}
