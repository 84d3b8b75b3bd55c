use serde::Deserialize;
use validator::Validate;

pub use crate::models::Course;
use crate::store::CourseFilter;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "description should not be empty"))]
    pub description: String,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "description should not be empty"))]
    pub description: Option<String>,
}

/// Query string for listing courses
#[derive(Debug, Default, Deserialize)]
pub struct CourseQuery {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CourseQuery {
    /// Blank or whitespace-only terms mean "no filter"
    pub fn into_filter(self) -> CourseFilter {
        fn term(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        CourseFilter {
            name: term(self.name),
            description: term(self.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_terms_are_dropped() {
        let query = CourseQuery {
            name: Some("   ".to_string()),
            description: Some(String::new()),
        };
        assert_eq!(query.into_filter(), CourseFilter::default());
    }

    #[test]
    fn test_terms_are_kept() {
        let query = CourseQuery {
            name: Some("rust".to_string()),
            description: None,
        };
        let filter = query.into_filter();
        assert_eq!(filter.name.as_deref(), Some("rust"));
        assert_eq!(filter.description, None);
    }

    #[test]
    fn test_create_request_validation() {
        let empty = CreateCourseRequest {
            name: String::new(),
            description: "Intro".to_string(),
        };
        assert!(empty.validate().is_err());

        let ok = CreateCourseRequest {
            name: "Rust".to_string(),
            description: "Intro".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_update_request_validation() {
        assert!(UpdateCourseRequest::default().validate().is_ok());

        let blank_name = UpdateCourseRequest {
            name: Some(String::new()),
            description: None,
        };
        assert!(blank_name.validate().is_err());
    }
}
