use std::sync::Arc;

use anyhow::anyhow;

use crate::dtos::{CreateUserRequest, UpdateUserRequest};
use crate::error::AppError;
use crate::models::User;
use crate::repositories::UserRepository;

/// Application-level user operations on top of a [`UserRepository`].
///
/// This is where absence turns into an error: a lookup for an id with no
/// user behind it becomes a 404, while update and delete keep the store's
/// "no match" result and leave the interpretation to the caller.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn register_user(&self, data: CreateUserRequest) -> Result<User, AppError> {
        let user = self.repo.create(data).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, AppError> {
        let user = self.repo.find_by_id(id).await?;
        user.ok_or_else(|| AppError::NotFound(anyhow!("User not found")))
    }

    pub async fn update_user_info(
        &self,
        id: &str,
        data: UpdateUserRequest,
    ) -> Result<Option<User>, AppError> {
        let user = self.repo.update_by_id(id, data).await?;
        Ok(user)
    }

    pub async fn remove_user(&self, id: &str) -> Result<bool, AppError> {
        let deleted = self.repo.delete_by_id(id).await?;
        if deleted {
            tracing::info!(user_id = %id, "User removed");
        }
        Ok(deleted)
    }
}
