use axum::Json;
use axum::extract::Query;
use axum::routing::{delete, get, post};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::{InstructorTarget, Principal, can_delete_instructor};
use crate::email;
use crate::error::AppError;
use crate::models::Instructor;
use crate::sanitize;
use crate::services::DELETE_LAST_INSTRUCTOR_ERROR;
use crate::state::AppState;

pub const INSTRUCTOR_DELETED: &str = "Instructor is successfully deleted.";
pub const SUCCESSFUL_REGENERATION_WITH_EMAIL_SENT: &str =
    "SUCCESSFUL_REGENERATION_WITH_EMAIL_SENT";
pub const SUCCESSFUL_REGENERATION_BUT_EMAIL_FAILED: &str =
    "SUCCESSFUL_REGENERATION_BUT_EMAIL_FAILED";
pub const UNSUCCESSFUL_REGENERATION: &str = "UNSUCCESSFUL_REGENERATION";

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageOutput {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegenerateKeyData {
    pub message: String,
    pub new_registration_key: String,
}

#[derive(Debug, Deserialize)]
struct DeleteInstructorParams {
    course_id: Option<String>,
    instructor_id: Option<String>,
    instructor_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegenerateKeyParams {
    course_id: Option<String>,
    instructor_email: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/instructor", delete(delete_instructor))
        .route("/instructor/key", post(regenerate_instructor_key))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

fn require_param(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("The {} parameter is required", name)))
}

/// Deletes an instructor from a course. Absent course or target is a
/// silent success so the response never reveals what exists.
async fn delete_instructor(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<DeleteInstructorParams>,
) -> Result<Json<MessageOutput>, AppError> {
    let course_id = sanitize::sanitize_title(&require_param(params.course_id, "course_id")?);

    // The google id identifier wins when both are supplied.
    let target = match (params.instructor_id, params.instructor_email) {
        (Some(id), _) if !id.trim().is_empty() => {
            InstructorTarget::GoogleId(sanitize::sanitize_google_id(&id))
        }
        (_, Some(email)) if !email.trim().is_empty() => {
            InstructorTarget::Email(sanitize::sanitize_email(&email))
        }
        _ => {
            return Err(AppError::BadRequest(
                "Either the instructor_id or the instructor_email parameter is required"
                    .to_string(),
            ));
        }
    };

    check_delete_access(&state, &principal, &course_id, &target).await?;

    if state.logic.get_course(&course_id).await?.is_none() {
        return Ok(deleted_response());
    }

    let instructor = match &target {
        InstructorTarget::GoogleId(google_id) => {
            state
                .logic
                .get_instructor_by_google_id(&course_id, google_id)
                .await?
        }
        InstructorTarget::Email(email) => {
            state.logic.get_instructor_for_email(&course_id, email).await?
        }
    };
    let Some(instructor) = instructor else {
        return Ok(deleted_response());
    };

    let instructors = state.logic.get_instructors_by_course(&course_id).await?;
    if instructors.len() <= 1 {
        return Err(AppError::InvalidOperation(
            DELETE_LAST_INSTRUCTOR_ERROR.to_string(),
        ));
    }

    // Email is the stable cascade key even when resolution started from
    // the google id.
    state
        .logic
        .delete_instructor_cascade(&course_id, instructor.email())
        .await?;

    Ok(deleted_response())
}

fn deleted_response() -> Json<MessageOutput> {
    Json(MessageOutput {
        message: INSTRUCTOR_DELETED.to_string(),
    })
}

async fn check_delete_access(
    state: &AppState,
    principal: &Principal,
    course_id: &str,
    target: &InstructorTarget,
) -> Result<(), AppError> {
    match principal {
        Principal::Admin => Ok(()),
        Principal::Instructor { google_id } => {
            let acting = state
                .logic
                .get_instructor_by_google_id(course_id, google_id)
                .await?
                .ok_or_else(|| {
                    AppError::Unauthorized(
                        "You are not an instructor of this course".to_string(),
                    )
                })?;
            if can_delete_instructor(&acting, target) {
                Ok(())
            } else {
                Err(AppError::Unauthorized(
                    "You do not have the permission to modify instructors in this course"
                        .to_string(),
                ))
            }
        }
        Principal::Student { .. } | Principal::Anonymous => Err(AppError::Unauthorized(
            "Instructor or admin privilege is required to access this resource".to_string(),
        )),
    }
}

/// Regenerates an instructor's registration key, then sends the updated
/// session links as a best-effort email. A failed dispatch downgrades the
/// message but never the status: the key change has already committed.
async fn regenerate_instructor_key(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<RegenerateKeyParams>,
) -> Result<Response, AppError> {
    let course_id = sanitize::sanitize_title(&require_param(params.course_id, "course_id")?);
    let instructor_email =
        sanitize::sanitize_email(&require_param(params.instructor_email, "instructor_email")?);

    if principal != Principal::Admin {
        return Err(AppError::Unauthorized(
            "Admin privilege is required to access this resource".to_string(),
        ));
    }

    let instructor = match state
        .logic
        .regenerate_registration_key(&course_id, &instructor_email)
        .await
    {
        Ok(instructor) => instructor,
        Err(AppError::InstructorUpdateFailure(reason)) => {
            warn!("key regeneration failed: {}", reason);
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageOutput {
                    message: UNSUCCESSFUL_REGENERATION.to_string(),
                }),
            )
                .into_response());
        }
        Err(e) => return Err(e),
    };

    let email_sent = send_regeneration_email(&state, &course_id, &instructor).await;
    let message = if email_sent {
        SUCCESSFUL_REGENERATION_WITH_EMAIL_SENT
    } else {
        SUCCESSFUL_REGENERATION_BUT_EMAIL_FAILED
    };

    Ok(Json(RegenerateKeyData {
        message: message.to_string(),
        new_registration_key: instructor.registration_key().to_string(),
    })
    .into_response())
}

async fn send_regeneration_email(
    state: &AppState,
    course_id: &str,
    instructor: &Instructor,
) -> bool {
    let course = match state.logic.get_course(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return false,
        Err(e) => {
            warn!("could not load course for regeneration email: {}", e);
            return false;
        }
    };
    let sessions = match state.logic.get_feedback_sessions(course_id).await {
        Ok(sessions) => sessions,
        Err(e) => {
            warn!("could not load sessions for regeneration email: {}", e);
            return false;
        }
    };

    let message =
        email::course_links_regenerated_email(&state.base_url, &course, instructor, &sessions);
    match state.emails.send(&message).await {
        Ok(()) => true,
        Err(e) => {
            warn!("course links email failed: {}", e);
            false
        }
    }
}
