use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{FeedbackSession, Section};
use crate::sanitize;

pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// A course with its owned sections and (independently pruned) feedback
/// sessions. Soft-deleted by setting `deleted_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    id: String,
    name: String,
    time_zone: String,
    institute: String,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    sections: Vec<Section>,
    feedback_sessions: Vec<FeedbackSession>,
}

impl Course {
    pub fn new(id: &str, name: &str, time_zone: &str, institute: &str) -> Self {
        let time_zone = time_zone.trim();
        Self {
            id: sanitize::sanitize_title(id),
            name: sanitize::sanitize_name(name),
            time_zone: if time_zone.is_empty() {
                DEFAULT_TIME_ZONE.to_string()
            } else {
                time_zone.to_string()
            },
            institute: sanitize::sanitize_title(institute),
            created_at: Utc::now(),
            deleted_at: None,
            sections: Vec::new(),
            feedback_sessions: Vec::new(),
        }
    }

    pub fn from_storage(
        id: &str,
        name: &str,
        time_zone: &str,
        institute: &str,
        created_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut course = Self::new(id, name, time_zone, institute);
        course.created_at = created_at;
        course.deleted_at = deleted_at;
        course
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = sanitize::sanitize_name(name);
    }

    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    pub fn set_time_zone(&mut self, time_zone: &str) {
        let time_zone = time_zone.trim();
        self.time_zone = if time_zone.is_empty() {
            DEFAULT_TIME_ZONE.to_string()
        } else {
            time_zone.to_string()
        };
    }

    pub fn institute(&self) -> &str {
        &self.institute
    }

    pub fn set_institute(&mut self, institute: &str) {
        self.institute = sanitize::sanitize_title(institute);
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// A deletion timestamp before the creation timestamp is a programming
    /// error, never valid user input.
    pub fn set_deleted_at(&mut self, deleted_at: Option<DateTime<Utc>>) -> Result<(), AppError> {
        if let Some(at) = deleted_at {
            if at < self.created_at {
                return Err(AppError::BadRequest(
                    "Deleted time cannot be before creation time.".to_string(),
                ));
            }
        }
        self.deleted_at = deleted_at;
        Ok(())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Replaces the whole collection; no partial updates.
    pub fn set_sections(&mut self, sections: Vec<Section>) {
        self.sections.clear();
        self.sections.extend(sections);
    }

    pub fn feedback_sessions(&self) -> &[FeedbackSession] {
        &self.feedback_sessions
    }

    pub fn set_feedback_sessions(&mut self, feedback_sessions: Vec<FeedbackSession>) {
        self.feedback_sessions.clear();
        self.feedback_sessions.extend(feedback_sessions);
    }

    pub fn invalidity_info(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(sanitize::invalidity_for_course_id(&self.id));
        errors.extend(sanitize::invalidity_for_course_name(&self.name));
        errors.extend(sanitize::invalidity_for_institute(&self.institute));
        errors
    }
}

impl PartialEq for Course {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Course {}

impl Hash for Course {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
