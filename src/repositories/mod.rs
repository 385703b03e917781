use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::dtos::{CreateUserRequest, UpdateUserRequest};
use crate::models::User;

#[cfg(test)]
use mockall::automock;

mod memory;
mod mongo;

pub use memory::InMemoryUserRepository;
pub use mongo::MongoUserRepository;

/// Failure classes surfaced by the user store.
///
/// Absence of a user is never an error here: `find_by_id` and `update_by_id`
/// report it as `Ok(None)`, `delete_by_id` as `Ok(false)`. Deciding whether
/// absence is worth a 404 belongs to the service layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The identifier is not a 24-character hex ObjectId.
    #[error("malformed user id `{0}`")]
    MalformedId(String),

    /// A unique index rejected the write (already-registered email).
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The document broke the collection's schema rules.
    #[error("user validation failed: {0}")]
    SchemaViolation(String),

    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
}

impl StoreError {
    pub(crate) fn missing_field(field: &str) -> Self {
        StoreError::SchemaViolation(format!("`{field}` is required"))
    }
}

pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::MalformedId(id.to_string()))
}

/// Persistence operations for users, behind a trait so the service layer can
/// run against MongoDB, the in-memory store or a mock.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user document.
    async fn create(&self, data: CreateUserRequest) -> Result<User, StoreError>;

    /// Fetch a user by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Apply the supplied fields to an existing user and return the updated
    /// document, or `None` when no user matches the id.
    async fn update_by_id(
        &self,
        id: &str,
        data: UpdateUserRequest,
    ) -> Result<Option<User>, StoreError>;

    /// Delete a user by id, reporting whether a document was removed.
    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError>;
}
