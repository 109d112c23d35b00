#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::SqlitePool;
use tower::ServiceExt;

use peerfeedback::api::router;
use peerfeedback::email::{EmailMessage, EmailSender};
use peerfeedback::error::AppError;
use peerfeedback::models::{
    Account, Course, FeedbackSession, Instructor, InstructorPermission, InstructorPrivileges,
    generate_registration_key,
};
use peerfeedback::services::InstructorLogic;
use peerfeedback::state::AppState;

pub const COURSE_ID: &str = "course-id";

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum RegenOutcome {
    Success,
    NotFound,
    UpdateFailure,
}

/// In-memory stand-in for the SQL-backed lifecycle service, recording
/// every cascade-delete invocation.
pub struct MockLogic {
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub sessions: Vec<FeedbackSession>,
    pub regen_outcome: RegenOutcome,
    pub cascade_calls: Mutex<Vec<(String, String)>>,
}

impl MockLogic {
    pub fn new(courses: Vec<Course>, instructors: Vec<Instructor>) -> Self {
        Self {
            courses,
            instructors,
            sessions: Vec::new(),
            regen_outcome: RegenOutcome::Success,
            cascade_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn cascade_calls(&self) -> Vec<(String, String)> {
        self.cascade_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InstructorLogic for MockLogic {
    async fn get_course(&self, course_id: &str) -> Result<Option<Course>, AppError> {
        Ok(self.courses.iter().find(|c| c.id() == course_id).cloned())
    }

    async fn get_instructor_by_google_id(
        &self,
        course_id: &str,
        google_id: &str,
    ) -> Result<Option<Instructor>, AppError> {
        Ok(self
            .instructors
            .iter()
            .find(|i| i.course_id() == course_id && i.google_id() == Some(google_id))
            .cloned())
    }

    async fn get_instructor_for_email(
        &self,
        course_id: &str,
        email: &str,
    ) -> Result<Option<Instructor>, AppError> {
        Ok(self
            .instructors
            .iter()
            .find(|i| i.course_id() == course_id && i.email() == email)
            .cloned())
    }

    async fn get_instructors_by_course(
        &self,
        course_id: &str,
    ) -> Result<Vec<Instructor>, AppError> {
        Ok(self
            .instructors
            .iter()
            .filter(|i| i.course_id() == course_id)
            .cloned()
            .collect())
    }

    async fn get_feedback_sessions(
        &self,
        course_id: &str,
    ) -> Result<Vec<FeedbackSession>, AppError> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.course_id() == course_id)
            .cloned()
            .collect())
    }

    async fn delete_instructor_cascade(
        &self,
        course_id: &str,
        email: &str,
    ) -> Result<(), AppError> {
        self.cascade_calls
            .lock()
            .unwrap()
            .push((course_id.to_string(), email.to_string()));
        Ok(())
    }

    async fn regenerate_registration_key(
        &self,
        course_id: &str,
        email: &str,
    ) -> Result<Instructor, AppError> {
        match self.regen_outcome {
            RegenOutcome::Success => {
                let mut instructor = self
                    .instructors
                    .iter()
                    .find(|i| i.course_id() == course_id && i.email() == email)
                    .cloned()
                    .ok_or_else(|| {
                        AppError::EntityDoesNotExist("Instructor not found".to_string())
                    })?;
                instructor.set_registration_key(generate_registration_key());
                Ok(instructor)
            }
            RegenOutcome::NotFound => {
                Err(AppError::EntityDoesNotExist("Instructor not found".to_string()))
            }
            RegenOutcome::UpdateFailure => Err(AppError::InstructorUpdateFailure(
                "Instructor update failed".to_string(),
            )),
        }
    }
}

pub struct MockEmailSender {
    pub should_fail: bool,
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl MockEmailSender {
    pub fn new(should_fail: bool) -> Self {
        Self {
            should_fail,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        if self.should_fail {
            return Err(AppError::Internal("mail provider rejected message".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn typical_course() -> Course {
    Course::new(COURSE_ID, "Course Name", "UTC", "institute")
}

/// Instructor with a linked account; `can_modify` controls the
/// modify-instructor capability only.
pub fn instructor(google_id: &str, name: &str, email: &str, can_modify: bool) -> Instructor {
    let mut privileges = InstructorPrivileges::default();
    privileges.update_privilege(InstructorPermission::CanModifyInstructor, can_modify);

    let mut instructor = Instructor::new(COURSE_ID, name, email, true, "", privileges);
    instructor.set_account(Account::new(google_id, name, email));
    instructor
}

pub async fn test_app(logic: Arc<MockLogic>, emails: Arc<MockEmailSender>) -> Router {
    let db = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");
    router(AppState {
        db,
        logic,
        emails,
        base_url: "http://localhost:3000".to_string(),
    })
}

pub async fn request(
    app: Router,
    method: &str,
    uri: &str,
    auth: Option<(&str, &str)>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((role, user)) = auth {
        builder = builder
            .header("x-auth-role", role)
            .header("x-auth-user", user);
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .expect("request failed");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("invalid response json")
    };
    (status, json)
}

pub const ADMIN: Option<(&str, &str)> = Some(("admin", "admin"));
