//! Persistence seams
//!
//! The services only talk to these traits. [`PgStore`] backs them with
//! PostgreSQL, [`MemoryStore`] keeps everything in process for tests and
//! database-less local runs.

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Course, User, UserRole};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Duplicate key: {0}")]
    Duplicate(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.message().to_string())
            }
            _ => StoreError::Database(e.to_string()),
        }
    }
}

/// Credential store: user records including their password and refresh token hashes
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Overwrite (or clear, with `None`) the stored refresh token hash.
    /// Unknown ids are a no-op.
    async fn set_refresh_token(&self, id: Uuid, hash: Option<String>) -> Result<(), StoreError>;

    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    /// Substring match on each present text filter, exact match on role,
    /// ordered by username.
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;

    /// Writes the profile, password hash, role and active flag. The refresh
    /// token hash and creation time are left alone. `None` when the id does
    /// not exist.
    async fn update_user(&self, user: User) -> Result<Option<User>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// User filter, already normalised: `None` means "do not filter"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
}

/// Course filter, already normalised: `None` means "do not filter"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn insert_course(&self, course: Course) -> Result<Course, StoreError>;

    /// Case-insensitive substring match on every present filter, ordered by
    /// name then description.
    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, StoreError>;

    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, StoreError>;

    /// Returns the stored row, or `None` when the id does not exist.
    async fn update_course(&self, course: Course) -> Result<Option<Course>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete_course(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn count_courses(&self) -> Result<u64, StoreError>;
}
