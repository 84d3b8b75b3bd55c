use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::course::model::{Course, CourseQuery, CreateCourseRequest, UpdateCourseRequest};
use crate::error::ApiError;
use crate::store::CourseStore;

#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn CourseStore>,
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Could not find course with matching id {}", id))
}

impl CourseService {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, request: CreateCourseRequest) -> Result<Course, ApiError> {
        let course = self
            .store
            .insert_course(Course {
                id: Uuid::new_v4(),
                name: request.name,
                description: request.description,
                date_created: Utc::now(),
            })
            .await?;

        tracing::info!(course_id = %course.id, name = %course.name, "Course created");

        Ok(course)
    }

    pub async fn find_all(&self, query: CourseQuery) -> Result<Vec<Course>, ApiError> {
        let filter = query.into_filter();
        Ok(self.store.list_courses(&filter).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Course, ApiError> {
        self.store
            .find_course(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update(&self, id: Uuid, request: UpdateCourseRequest) -> Result<Course, ApiError> {
        let mut course = self.find_by_id(id).await?;

        if let Some(name) = request.name {
            course.name = name;
        }
        if let Some(description) = request.description {
            course.description = description;
        }

        let course = self
            .store
            .update_course(course)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(course_id = %course.id, "Course updated");

        Ok(course)
    }

    pub async fn delete(&self, id: Uuid) -> Result<Uuid, ApiError> {
        if !self.store.delete_course(id).await? {
            return Err(not_found(id));
        }

        tracing::info!(course_id = %id, "Course deleted");

        Ok(id)
    }

    pub async fn count(&self) -> Result<u64, ApiError> {
        Ok(self.store.count_courses().await?)
    }
}
