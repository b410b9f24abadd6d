//! # User Repository
//!
//! Lookup and idempotent creation of internal user records keyed by the
//! identity provider's subject id.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::user::{
    ActiveModel as UserActiveModel, Column, Entity as User, Model as UserModel, UserRole,
    UserStatus,
};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
});

/// Identity-provider data used to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Result of an idempotent sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Created(UserModel),
    Existing(UserModel),
}

impl SyncOutcome {
    pub fn into_user(self) -> UserModel {
        match self {
            SyncOutcome::Created(user) | SyncOutcome::Existing(user) => user,
        }
    }
}

/// Repository for User database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get a user by identity-provider subject id
    pub async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(Column::ExternalId.eq(external_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Create a user with `PENDING` status and the standard role
    pub async fn create(&self, new_user: NewUser) -> Result<UserModel, RepositoryError> {
        let new_user = validate_new_user(new_user)?;

        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            external_id: Set(new_user.external_id),
            email: Set(new_user.email),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            role: Set(UserRole::Standard),
            status: Set(UserStatus::Pending),
            created_at: Set(Utc::now().into()),
        };

        user.insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Return the existing user for `external_id` or create it.
    ///
    /// A concurrent sync that wins the insert race surfaces as a unique
    /// violation; the record it created is returned instead.
    pub async fn get_or_create(&self, new_user: NewUser) -> Result<SyncOutcome, RepositoryError> {
        if let Some(existing) = self.find_by_external_id(&new_user.external_id).await? {
            return Ok(SyncOutcome::Existing(existing));
        }

        let external_id = new_user.external_id.clone();
        match self.create(new_user).await {
            Ok(created) => Ok(SyncOutcome::Created(created)),
            Err(err) if err.is_unique_violation() => self
                .find_by_external_id(&external_id)
                .await?
                .map(SyncOutcome::Existing)
                .ok_or(err),
            Err(err) => Err(err),
        }
    }
}

fn validate_new_user(new_user: NewUser) -> Result<NewUser, RepositoryError> {
    let external_id = new_user.external_id.trim().to_string();
    if external_id.is_empty() {
        return Err(RepositoryError::validation_error(
            "External id cannot be empty",
        ));
    }

    let email = new_user.email.trim().to_lowercase();
    if email.len() > 320 || !EMAIL_PATTERN.is_match(&email) {
        return Err(RepositoryError::validation_error("Email address is invalid"));
    }

    let clean = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(NewUser {
        external_id,
        email,
        first_name: clean(new_user.first_name),
        last_name: clean(new_user.last_name),
    })
}
