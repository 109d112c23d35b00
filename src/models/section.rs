use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sanitize;

/// A section of a course; owned by the course and deleted with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    id: Uuid,
    course_id: String,
    name: String,
}

impl Section {
    pub fn new(course_id: &str, name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            course_id: sanitize::sanitize_title(course_id),
            name: sanitize::sanitize_name(name),
        }
    }

    pub fn from_storage(id: Uuid, course_id: &str, name: &str) -> Self {
        let mut section = Self::new(course_id, name);
        section.id = id;
        section
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
