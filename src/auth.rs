use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::models::{Instructor, InstructorPermission};

/// The acting caller, as established by the authentication gateway in
/// front of this service. The gateway forwards the verified role and user
/// id in headers; anything absent or unrecognized is anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Admin,
    Instructor { google_id: String },
    Student { google_id: String },
    Anonymous,
}

const ROLE_HEADER: &str = "x-auth-role";
const USER_HEADER: &str = "x-auth-user";

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        Ok(match role {
            "admin" => Principal::Admin,
            "instructor" if !user.is_empty() => Principal::Instructor { google_id: user },
            "student" if !user.is_empty() => Principal::Student { google_id: user },
            _ => Principal::Anonymous,
        })
    }
}

/// How the deletion target was identified in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructorTarget {
    GoogleId(String),
    Email(String),
}

/// Whether an instructor of the course may delete the targeted instructor.
/// Self-deletion is always allowed; deleting anyone else requires the
/// modify-instructor capability.
pub fn can_delete_instructor(acting: &Instructor, target: &InstructorTarget) -> bool {
    let is_self = match target {
        InstructorTarget::GoogleId(google_id) => acting.google_id() == Some(google_id.as_str()),
        InstructorTarget::Email(email) => acting.email() == email,
    };
    is_self || acting
        .privileges()
        .has_privilege(InstructorPermission::CanModifyInstructor)
}
