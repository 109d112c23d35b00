//! Field sanitization and validation.
//!
//! Sanitizers are idempotent: running one on its own output is a no-op.
//! Validators are pure; they return `Some(problem)` for an invalid value
//! and never panic, so callers decide whether to reject.

pub const COURSE_ID_MAX_LENGTH: usize = 64;
pub const COURSE_NAME_MAX_LENGTH: usize = 80;
pub const INSTITUTE_NAME_MAX_LENGTH: usize = 128;
pub const PERSON_NAME_MAX_LENGTH: usize = 100;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const GOOGLE_ID_MAX_LENGTH: usize = 254;

/// Titles and user-chosen ids: drop control characters, trim.
pub fn sanitize_title(value: &str) -> String {
    let stripped: String = value.chars().filter(|c| !c.is_control()).collect();
    stripped.trim().to_string()
}

/// Person names: drop control characters and collapse whitespace runs.
pub fn sanitize_name(value: &str) -> String {
    let stripped: String = value.chars().filter(|c| !c.is_control()).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Emails are stored lower-cased.
pub fn sanitize_email(value: &str) -> String {
    let stripped: String = value.chars().filter(|c| !c.is_control()).collect();
    stripped.trim().to_lowercase()
}

/// Google ids are stored without the redundant `@gmail.com` suffix.
pub fn sanitize_google_id(value: &str) -> String {
    let stripped: String = value.chars().filter(|c| !c.is_control()).collect();
    stripped.trim().trim_end_matches("@gmail.com").trim().to_string()
}

fn is_course_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '$')
}

pub fn invalidity_for_course_id(id: &str) -> Option<String> {
    if id.is_empty() {
        return Some("The course ID cannot be empty.".to_string());
    }
    if id.chars().count() > COURSE_ID_MAX_LENGTH {
        return Some(format!(
            "The course ID \"{}\" is too long: it cannot exceed {} characters.",
            id, COURSE_ID_MAX_LENGTH
        ));
    }
    if !id.chars().all(is_course_id_char) {
        return Some(format!(
            "The course ID \"{}\" may only contain letters, digits, hyphens, underscores, dots and dollar signs.",
            id
        ));
    }
    None
}

pub fn invalidity_for_course_name(name: &str) -> Option<String> {
    invalidity_for_text_field("course name", name, COURSE_NAME_MAX_LENGTH)
}

pub fn invalidity_for_institute(institute: &str) -> Option<String> {
    invalidity_for_text_field("institute name", institute, INSTITUTE_NAME_MAX_LENGTH)
}

pub fn invalidity_for_person_name(name: &str) -> Option<String> {
    invalidity_for_text_field("person name", name, PERSON_NAME_MAX_LENGTH)
}

pub fn invalidity_for_email(email: &str) -> Option<String> {
    if email.is_empty() {
        return Some("The email cannot be empty.".to_string());
    }
    if email.chars().count() > EMAIL_MAX_LENGTH {
        return Some(format!(
            "The email \"{}\" is too long: it cannot exceed {} characters.",
            email, EMAIL_MAX_LENGTH
        ));
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next();
    let well_formed = match domain {
        Some(domain) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Some(format!("\"{}\" is not a valid email address.", email));
    }
    None
}

pub fn invalidity_for_google_id(google_id: &str) -> Option<String> {
    if google_id.is_empty() {
        return Some("The Google ID cannot be empty.".to_string());
    }
    if google_id.chars().count() > GOOGLE_ID_MAX_LENGTH {
        return Some(format!(
            "The Google ID \"{}\" is too long: it cannot exceed {} characters.",
            google_id, GOOGLE_ID_MAX_LENGTH
        ));
    }
    if google_id.chars().any(char::is_whitespace) {
        return Some(format!(
            "The Google ID \"{}\" cannot contain whitespace.",
            google_id
        ));
    }
    None
}

fn invalidity_for_text_field(field: &str, value: &str, max_length: usize) -> Option<String> {
    if value.is_empty() {
        return Some(format!("The {} cannot be empty.", field));
    }
    if value.chars().count() > max_length {
        return Some(format!(
            "The {} \"{}\" is too long: it cannot exceed {} characters.",
            field, value, max_length
        ));
    }
    None
}
