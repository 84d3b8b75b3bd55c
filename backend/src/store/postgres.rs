//! PostgreSQL-backed stores

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CourseFilter, CourseStore, StoreError, UserFilter, UserStore};
use crate::models::{Course, User};

const USER_COLUMNS: &str = "id, username, first_name, last_name, password_hash, refresh_token_hash, role, is_active, created_at";

/// Stores backed by a shared connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turn user input into an `ILIKE` substring pattern, escaping wildcards
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_refresh_token(&self, id: Uuid, hash: Option<String>) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $1
            WHERE id = $2
            "#,
        )
        .bind(hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, first_name, last_name, password_hash, refresh_token_hash, role, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(&user.refresh_token_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE ($1::text IS NULL OR username ILIKE $1)
              AND ($2::text IS NULL OR first_name ILIKE $2)
              AND ($3::text IS NULL OR last_name ILIKE $3)
              AND ($4::user_role IS NULL OR role = $4)
            ORDER BY username ASC
            "#,
            USER_COLUMNS
        ))
        .bind(filter.username.as_deref().map(like_pattern))
        .bind(filter.first_name.as_deref().map(like_pattern))
        .bind(filter.last_name.as_deref().map(like_pattern))
        .bind(filter.role)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn update_user(&self, user: User) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $1, first_name = $2, last_name = $3,
                password_hash = $4, role = $5, is_active = $6
            WHERE id = $7
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}

#[async_trait]
impl CourseStore for PgStore {
    async fn insert_course(&self, course: Course) -> Result<Course, StoreError> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (id, name, description, date_created)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, date_created
            "#,
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.description)
        .bind(course.date_created)
        .fetch_one(&self.pool)
        .await?;

        Ok(course)
    }

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, StoreError> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, description, date_created
            FROM courses
            WHERE ($1::text IS NULL OR name ILIKE $1)
              AND ($2::text IS NULL OR description ILIKE $2)
            ORDER BY name ASC, description ASC
            "#,
        )
        .bind(filter.name.as_deref().map(like_pattern))
        .bind(filter.description.as_deref().map(like_pattern))
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, name, description, date_created FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    async fn update_course(&self, course: Course) -> Result<Option<Course>, StoreError> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
            SET name = $1, description = $2
            WHERE id = $3
            RETURNING id, name, description, date_created
            "#,
        )
        .bind(&course.name)
        .bind(&course.description)
        .bind(course.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    async fn delete_course(&self, id: Uuid) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn count_courses(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("rust"), "%rust%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }
}
