use async_trait::async_trait;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Collection;

use crate::dtos::{CreateUserRequest, UpdateUserRequest};
use crate::models::User;

use super::{parse_object_id, StoreError, UserRepository};

// Server error codes: unique index violation and schema validation failure.
const DUPLICATE_KEY: i32 = 11000;
const DOCUMENT_FAILED_VALIDATION: i32 = 121;

/// `UserRepository` backed by the `users` collection.
pub struct MongoUserRepository {
    users: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(users: Collection<User>) -> Self {
        Self { users }
    }
}

fn classify(err: mongodb::error::Error) -> StoreError {
    let code = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => Some(write_err.code),
        ErrorKind::Command(command_err) => Some(command_err.code),
        _ => None,
    };

    match code {
        Some(DUPLICATE_KEY) => StoreError::DuplicateKey(err.to_string()),
        Some(DOCUMENT_FAILED_VALIDATION) => StoreError::SchemaViolation(err.to_string()),
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, data: CreateUserRequest) -> Result<User, StoreError> {
        let name = data.name.ok_or_else(|| StoreError::missing_field("name"))?;
        let email = data.email.ok_or_else(|| StoreError::missing_field("email"))?;
        let password = data
            .password
            .ok_or_else(|| StoreError::missing_field("password"))?;

        let user = User::new(name, email, password);
        self.users.insert_one(&user, None).await.map_err(classify)?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let id = parse_object_id(id)?;
        let user = self
            .users
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(classify)?;
        Ok(user)
    }

    async fn update_by_id(
        &self,
        id: &str,
        data: UpdateUserRequest,
    ) -> Result<Option<User>, StoreError> {
        let id = parse_object_id(id)?;

        let mut changes = doc! { "updated_at": BsonDateTime::now() };
        if let Some(name) = data.name {
            changes.insert("name", name);
        }
        if let Some(email) = data.email {
            changes.insert("email", email);
        }
        if let Some(password) = data.password {
            changes.insert("password", password);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .users
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": changes }, options)
            .await
            .map_err(classify)?;
        Ok(updated)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let id = parse_object_id(id)?;
        let result = self
            .users
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(classify)?;
        Ok(result.deleted_count > 0)
    }
}
