use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository::{self, InstructorDeleteOutcome};
use crate::error::AppError;
use crate::models::{Course, FeedbackSession, Instructor, generate_registration_key};

/// Fixed user-facing explanation for a rejected last-instructor deletion.
pub const DELETE_LAST_INSTRUCTOR_ERROR: &str =
    "The instructor you are trying to delete is the last instructor in the course. \
     Deleting the last instructor from the course is not allowed.";

/// Bounded retries for registration-key collisions before giving up.
const MAX_KEY_REGENERATION_ATTEMPTS: usize = 5;

/// Lifecycle facade over the instructor store. Handlers depend on this
/// trait so tests can substitute a double.
#[async_trait]
pub trait InstructorLogic: Send + Sync {
    async fn get_course(&self, course_id: &str) -> Result<Option<Course>, AppError>;

    async fn get_instructor_by_google_id(
        &self,
        course_id: &str,
        google_id: &str,
    ) -> Result<Option<Instructor>, AppError>;

    async fn get_instructor_for_email(
        &self,
        course_id: &str,
        email: &str,
    ) -> Result<Option<Instructor>, AppError>;

    async fn get_instructors_by_course(
        &self,
        course_id: &str,
    ) -> Result<Vec<Instructor>, AppError>;

    async fn get_feedback_sessions(
        &self,
        course_id: &str,
    ) -> Result<Vec<FeedbackSession>, AppError>;

    /// Idempotent cascading delete keyed by (course, email); a missing
    /// target is a no-op.
    async fn delete_instructor_cascade(&self, course_id: &str, email: &str)
    -> Result<(), AppError>;

    /// Issues a fresh unique registration key, invalidating the old one.
    /// Fails with `EntityDoesNotExist` for an unknown instructor and with
    /// `InstructorUpdateFailure` when the update cannot be committed.
    async fn regenerate_registration_key(
        &self,
        course_id: &str,
        email: &str,
    ) -> Result<Instructor, AppError>;
}

pub struct SqlInstructorLogic {
    db: SqlitePool,
}

impl SqlInstructorLogic {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InstructorLogic for SqlInstructorLogic {
    async fn get_course(&self, course_id: &str) -> Result<Option<Course>, AppError> {
        Ok(repository::find_course_by_id(&self.db, course_id).await?)
    }

    async fn get_instructor_by_google_id(
        &self,
        course_id: &str,
        google_id: &str,
    ) -> Result<Option<Instructor>, AppError> {
        Ok(repository::find_instructor_by_google_id(&self.db, course_id, google_id).await?)
    }

    async fn get_instructor_for_email(
        &self,
        course_id: &str,
        email: &str,
    ) -> Result<Option<Instructor>, AppError> {
        Ok(repository::find_instructor_by_email(&self.db, course_id, email).await?)
    }

    async fn get_instructors_by_course(
        &self,
        course_id: &str,
    ) -> Result<Vec<Instructor>, AppError> {
        Ok(repository::list_instructors(&self.db, course_id).await?)
    }

    async fn get_feedback_sessions(
        &self,
        course_id: &str,
    ) -> Result<Vec<FeedbackSession>, AppError> {
        Ok(repository::list_feedback_sessions(&self.db, course_id).await?)
    }

    async fn delete_instructor_cascade(
        &self,
        course_id: &str,
        email: &str,
    ) -> Result<(), AppError> {
        match repository::delete_instructor_in_course(&self.db, course_id, email).await? {
            InstructorDeleteOutcome::Deleted => {
                info!("deleted instructor {} from course {}", email, course_id);
                Ok(())
            }
            InstructorDeleteOutcome::NotFound => Ok(()),
            InstructorDeleteOutcome::LastInstructor => Err(AppError::InvalidOperation(
                DELETE_LAST_INSTRUCTOR_ERROR.to_string(),
            )),
        }
    }

    async fn regenerate_registration_key(
        &self,
        course_id: &str,
        email: &str,
    ) -> Result<Instructor, AppError> {
        let mut instructor = repository::find_instructor_by_email(&self.db, course_id, email)
            .await?
            .ok_or_else(|| {
                AppError::EntityDoesNotExist(format!(
                    "Instructor with email {} does not exist in course {}",
                    email, course_id
                ))
            })?;

        for _ in 0..MAX_KEY_REGENERATION_ATTEMPTS {
            let key = generate_registration_key();
            match repository::update_instructor_key(&self.db, instructor.id(), &key).await {
                Ok(true) => {
                    info!(
                        "regenerated registration key for instructor {} in course {}",
                        email, course_id
                    );
                    instructor.set_registration_key(key);
                    return Ok(instructor);
                }
                // Row vanished between lookup and update.
                Ok(false) => {
                    return Err(AppError::InstructorUpdateFailure(format!(
                        "Instructor with email {} in course {} disappeared during key regeneration",
                        email, course_id
                    )));
                }
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::InstructorUpdateFailure(format!(
            "Could not issue a unique registration key for instructor {} in course {}",
            email, course_id
        )))
    }
}
