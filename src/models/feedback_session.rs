use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sanitize;

/// A feedback session within a course. Owned by the course but pruned by
/// its own lifecycle, so course deletion leaves sessions behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSession {
    id: Uuid,
    course_id: String,
    name: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl FeedbackSession {
    pub fn new(
        course_id: &str,
        name: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            course_id: sanitize::sanitize_title(course_id),
            name: sanitize::sanitize_name(name),
            start_time,
            end_time,
            created_at: Utc::now(),
        }
    }

    pub fn from_storage(
        id: Uuid,
        course_id: &str,
        name: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut session = Self::new(course_id, name, start_time, end_time);
        session.id = id;
        session.created_at = created_at;
        session
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

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PartialEq for FeedbackSession {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FeedbackSession {}
