//! User service providing registration and profile management.

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString};
use chrono::Utc;
use common::RecordId;
use document_store::{DocumentStore, DocumentStoreExt, Filter};
use validator::Validate;

use super::{EMAIL_UNIQUE, Role, User, UserDetails};
use crate::cart::Cart;
use crate::error::DomainError;
use crate::order::Order;

const EMAIL_TAKEN: &str = "Email is already registered";

/// Service for managing user accounts.
#[derive(Clone)]
pub struct UserService<S> {
    store: S,
}

impl<S: DocumentStore> UserService<S> {
    /// Creates a new user service backed by `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists every user in registration order.
    #[tracing::instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.store.find_all().await?)
    }

    /// Loads a user by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, id: &RecordId) -> Result<User, DomainError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    /// Registers a new user.
    #[tracing::instrument(skip(self, details), fields(email = %details.email))]
    pub async fn create_user(&self, details: UserDetails) -> Result<User, DomainError> {
        details.validate()?;

        let now = Utc::now();
        let user = User {
            id: RecordId::new(),
            name: details.name.trim().to_string(),
            email: details.email.trim().to_string(),
            age: details.age,
            password_hash: hash_password(&details.password)?,
            address: details.address,
            role: Role::User,
            is_active: true,
            hobbies: details.hobbies,
            posts: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert(&user)
            .await
            .map_err(DomainError::conflict_on(EMAIL_UNIQUE, EMAIL_TAKEN))?;

        metrics::counter!("users_created_total").increment(1);
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Replaces a user's profile fields.
    ///
    /// Identity, role, activation, authored posts and creation time are kept.
    #[tracing::instrument(skip(self, details))]
    pub async fn update_user(
        &self,
        id: &RecordId,
        details: UserDetails,
    ) -> Result<User, DomainError> {
        details.validate()?;

        let mut user = self.get_user(id).await?;
        user.name = details.name.trim().to_string();
        user.email = details.email.trim().to_string();
        user.age = details.age;
        user.password_hash = hash_password(&details.password)?;
        user.address = details.address;
        user.hobbies = details.hobbies;
        user.updated_at = Utc::now();

        let replaced = self
            .store
            .replace(&user)
            .await
            .map_err(DomainError::conflict_on(EMAIL_UNIQUE, EMAIL_TAKEN))?;
        if !replaced {
            return Err(DomainError::not_found("User", id));
        }

        Ok(user)
    }

    /// Deletes a user that no cart or order refers to.
    ///
    /// The reference check and the delete are separate store calls, so a cart
    /// or order created in between can still end up pointing at nothing.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: &RecordId) -> Result<User, DomainError> {
        self.get_user(id).await?;

        let owner = Filter::new().eq("user_id", id.as_str());
        if self.store.exists::<Cart>(owner.clone()).await?
            || self.store.exists::<Order>(owner).await?
        {
            return Err(DomainError::Conflict(
                "User still has carts or orders".to_string(),
            ));
        }

        let user = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))?;

        metrics::counter!("users_deleted_total").increment(1);
        Ok(user)
    }
}

fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| DomainError::PasswordHash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::PasswordHash(e.to_string()))
}
