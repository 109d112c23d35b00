use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Account, InstructorPrivileges};
use crate::sanitize;

/// Shown to students when an instructor leaves the display name blank.
pub const DEFAULT_DISPLAY_NAME: &str = "Instructor";

/// An instructor role within a course. At most one per (course, email);
/// the linked account carries the Google ID. The last-instructor invariant
/// is enforced by the lifecycle service, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    id: Uuid,
    course_id: String,
    name: String,
    email: String,
    is_displayed_to_students: bool,
    display_name: String,
    registration_key: String,
    privileges: InstructorPrivileges,
    account: Option<Account>,
    created_at: DateTime<Utc>,
}

/// Registration keys are opaque; uniqueness is enforced by the store.
pub fn generate_registration_key() -> String {
    Uuid::new_v4().simple().to_string()
}

impl Instructor {
    pub fn new(
        course_id: &str,
        name: &str,
        email: &str,
        is_displayed_to_students: bool,
        display_name: &str,
        privileges: InstructorPrivileges,
    ) -> Self {
        let display_name = sanitize::sanitize_name(display_name);
        Self {
            id: Uuid::new_v4(),
            course_id: sanitize::sanitize_title(course_id),
            name: sanitize::sanitize_name(name),
            email: sanitize::sanitize_email(email),
            is_displayed_to_students,
            display_name: if display_name.is_empty() {
                DEFAULT_DISPLAY_NAME.to_string()
            } else {
                display_name
            },
            registration_key: generate_registration_key(),
            privileges,
            account: None,
            created_at: Utc::now(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        id: Uuid,
        course_id: &str,
        name: &str,
        email: &str,
        is_displayed_to_students: bool,
        display_name: &str,
        registration_key: String,
        privileges: InstructorPrivileges,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut instructor = Self::new(
            course_id,
            name,
            email,
            is_displayed_to_students,
            display_name,
            privileges,
        );
        instructor.id = id;
        instructor.registration_key = registration_key;
        instructor.created_at = created_at;
        instructor
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

    pub fn set_name(&mut self, name: &str) {
        self.name = sanitize::sanitize_name(name);
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_email(&mut self, email: &str) {
        self.email = sanitize::sanitize_email(email);
    }

    pub fn is_displayed_to_students(&self) -> bool {
        self.is_displayed_to_students
    }

    pub fn set_is_displayed_to_students(&mut self, displayed: bool) {
        self.is_displayed_to_students = displayed;
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, display_name: &str) {
        let display_name = sanitize::sanitize_name(display_name);
        self.display_name = if display_name.is_empty() {
            DEFAULT_DISPLAY_NAME.to_string()
        } else {
            display_name
        };
    }

    pub fn registration_key(&self) -> &str {
        &self.registration_key
    }

    pub fn set_registration_key(&mut self, registration_key: String) {
        self.registration_key = registration_key;
    }

    pub fn privileges(&self) -> &InstructorPrivileges {
        &self.privileges
    }

    pub fn set_privileges(&mut self, privileges: InstructorPrivileges) {
        self.privileges = privileges;
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn set_account(&mut self, account: Account) {
        self.account = Some(account);
    }

    /// The Google ID comes through the linked account; unregistered
    /// instructors have none.
    pub fn google_id(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.google_id())
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn invalidity_info(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(sanitize::invalidity_for_course_id(&self.course_id));
        errors.extend(sanitize::invalidity_for_person_name(&self.name));
        errors.extend(sanitize::invalidity_for_email(&self.email));
        errors
    }
}

impl PartialEq for Instructor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Instructor {}

impl Hash for Instructor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
