//! In-process stores

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CourseFilter, CourseStore, StoreError, UserFilter, UserStore};
use crate::models::{Course, User};

/// Users and courses kept in memory behind async locks
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    courses: RwLock<HashMap<Uuid, Course>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_term(value: &str, term: Option<&str>) -> bool {
    term.map_or(true, |t| contains_ignore_case(value, t))
}

/// Case-folded ordering with a byte-wise tiebreak, close to how a
/// locale-aware database collation sorts mixed-case text
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn set_refresh_token(&self, id: Uuid, hash: Option<String>) -> Result<(), StoreError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.refresh_token_hash = hash;
        }
        Ok(())
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.id == user.id || u.username == user.username)
        {
            return Err(StoreError::Duplicate(format!(
                "user {} already exists",
                user.username
            )));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        let mut matching: Vec<User> = users
            .values()
            .filter(|u| matches_term(&u.username, filter.username.as_deref()))
            .filter(|u| matches_term(&u.first_name, filter.first_name.as_deref()))
            .filter(|u| matches_term(&u.last_name, filter.last_name.as_deref()))
            .filter(|u| filter.role.map_or(true, |role| u.role == role))
            .cloned()
            .collect();

        matching.sort_by(|a, b| collate(&a.username, &b.username));
        Ok(matching)
    }

    async fn update_user(&self, user: User) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(StoreError::Duplicate(format!(
                "user {} already exists",
                user.username
            )));
        }

        match users.get_mut(&user.id) {
            Some(existing) => {
                existing.username = user.username;
                existing.first_name = user.first_name;
                existing.last_name = user.last_name;
                existing.password_hash = user.password_hash;
                existing.role = user.role;
                existing.is_active = user.is_active;
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn insert_course(&self, course: Course) -> Result<Course, StoreError> {
        let mut courses = self.courses.write().await;
        if courses.contains_key(&course.id) {
            return Err(StoreError::Duplicate(format!(
                "course {} already exists",
                course.id
            )));
        }
        courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, StoreError> {
        let courses = self.courses.read().await;
        let mut matching: Vec<Course> = courses
            .values()
            .filter(|c| matches_term(&c.name, filter.name.as_deref()))
            .filter(|c| matches_term(&c.description, filter.description.as_deref()))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            collate(&a.name, &b.name).then_with(|| collate(&a.description, &b.description))
        });
        Ok(matching)
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        Ok(self.courses.read().await.get(&id).cloned())
    }

    async fn update_course(&self, course: Course) -> Result<Option<Course>, StoreError> {
        let mut courses = self.courses.write().await;
        match courses.get_mut(&course.id) {
            Some(existing) => {
                existing.name = course.name;
                existing.description = course.description;
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_course(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.courses.write().await.remove(&id).is_some())
    }

    async fn count_courses(&self) -> Result<u64, StoreError> {
        Ok(self.courses.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use chrono::Utc;

    fn user(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
            password_hash: "hash".to_string(),
            refresh_token_hash: None,
            role: UserRole::User,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn course(name: &str, description: &str) -> Course {
        Course {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            date_created: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        store.insert_user(user("alice")).await.unwrap();

        let result = store.insert_user(user("alice")).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_set_refresh_token_unknown_id_is_noop() {
        let store = MemoryStore::new();
        store
            .set_refresh_token(Uuid::new_v4(), Some("hash".to_string()))
            .await
            .unwrap();
        assert!(store.users.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_courses_filters_and_orders() {
        let store = MemoryStore::new();
        store.insert_course(course("Rust", "Systems")).await.unwrap();
        store.insert_course(course("Go", "Backend systems")).await.unwrap();
        store.insert_course(course("Art", "Painting")).await.unwrap();

        let all = store.list_courses(&CourseFilter::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Art", "Go", "Rust"]);

        let filter = CourseFilter {
            name: None,
            description: Some("SYSTEMS".to_string()),
        };
        let systems = store.list_courses(&filter).await.unwrap();
        let names: Vec<&str> = systems.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Go", "Rust"]);

        let filter = CourseFilter {
            name: Some("us".to_string()),
            description: Some("sys".to_string()),
        };
        let both = store.list_courses(&filter).await.unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].name, "Rust");
    }

    #[tokio::test]
    async fn test_list_courses_ignores_case_when_ordering() {
        let store = MemoryStore::new();
        store.insert_course(course("Zeta", "Last")).await.unwrap();
        store.insert_course(course("alpha", "First")).await.unwrap();
        store.insert_course(course("Beta", "Middle")).await.unwrap();

        let all = store.list_courses(&CourseFilter::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Beta", "Zeta"]);
    }

    #[tokio::test]
    async fn test_list_users_filters_by_role_and_name() {
        let store = MemoryStore::new();
        let mut editor = user("bob");
        editor.role = UserRole::Editor;
        store.insert_user(editor).await.unwrap();
        store.insert_user(user("Carol")).await.unwrap();
        store.insert_user(user("alice")).await.unwrap();

        let all = store.list_users(&UserFilter::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "Carol"]);

        let filter = UserFilter {
            role: Some(UserRole::User),
            username: Some("AR".to_string()),
            ..UserFilter::default()
        };
        let found = store.list_users(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "Carol");
    }

    #[tokio::test]
    async fn test_update_user_keeps_session_and_rejects_taken_username() {
        let store = MemoryStore::new();
        let mut alice = store.insert_user(user("alice")).await.unwrap();
        store.insert_user(user("bob")).await.unwrap();
        store
            .set_refresh_token(alice.id, Some("hash".to_string()))
            .await
            .unwrap();

        alice.first_name = "Alicia".to_string();
        alice.refresh_token_hash = None;
        let updated = store.update_user(alice.clone()).await.unwrap().unwrap();
        assert_eq!(updated.first_name, "Alicia");
        assert_eq!(updated.refresh_token_hash.as_deref(), Some("hash"));

        alice.username = "bob".to_string();
        assert!(matches!(
            store.update_user(alice).await,
            Err(StoreError::Duplicate(_))
        ));

        assert!(store.update_user(user("ghost")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let store = MemoryStore::new();
        let alice = store.insert_user(user("alice")).await.unwrap();

        assert!(store.delete_user(alice.id).await.unwrap());
        assert!(!store.delete_user(alice.id).await.unwrap());
        assert!(store.find_by_id(alice.id).await.unwrap().is_none());
    }
}
