use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::dtos::{CreateUserRequest, UpdateUserRequest};
use crate::models::User;

use super::{parse_object_id, StoreError, UserRepository};

/// In-memory `UserRepository` with the same observable contract as the
/// Mongo-backed one: ObjectId-format keys, unique emails, `updated_at`
/// refreshed on every write. Backs the HTTP test suite.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<ObjectId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // Every write under the lock is a single logical step, so a poisoned
    // lock still guards a coherent map; recover the guard rather than
    // panicking in the request path.
    fn lock(&self) -> MutexGuard<'_, HashMap<ObjectId, User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, data: CreateUserRequest) -> Result<User, StoreError> {
        let name = data.name.ok_or_else(|| StoreError::missing_field("name"))?;
        let email = data.email.ok_or_else(|| StoreError::missing_field("email"))?;
        let password = data
            .password
            .ok_or_else(|| StoreError::missing_field("password"))?;

        let mut users = self.lock();
        if users.values().any(|user| user.email == email) {
            return Err(StoreError::DuplicateKey(format!(
                "email `{email}` already exists"
            )));
        }

        let user = User::new(name, email, password);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let id = parse_object_id(id)?;
        let users = self.lock();
        Ok(users.get(&id).cloned())
    }

    async fn update_by_id(
        &self,
        id: &str,
        data: UpdateUserRequest,
    ) -> Result<Option<User>, StoreError> {
        let id = parse_object_id(id)?;
        let mut users = self.lock();

        // A missing id is a plain no-match, even when the payload would also
        // collide with another user's email.
        if !users.contains_key(&id) {
            return Ok(None);
        }

        if let Some(email) = data.email.as_deref() {
            if users.values().any(|user| user.id != id && user.email == email) {
                return Err(StoreError::DuplicateKey(format!(
                    "email `{email}` already exists"
                )));
            }
        }

        let user = match users.get_mut(&id) {
            Some(user) => user,
            None => return Ok(None),
        };

        if let Some(name) = data.name {
            user.name = name;
        }
        if let Some(email) = data.email {
            user.email = email;
        }
        if let Some(password) = data.password {
            user.password = password;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let id = parse_object_id(id)?;
        let mut users = self.lock();
        Ok(users.remove(&id).is_some())
    }
}
