use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::models::{
    Account, Course, FeedbackSession, Instructor, InstructorPrivileges, ReadNotification, Section,
};

fn decode_err<E>(e: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(e))
}

fn parse_uuid(value: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(value).map_err(decode_err)
}

#[derive(FromRow)]
struct CourseRow {
    id: String,
    name: String,
    time_zone: String,
    institute: String,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl CourseRow {
    fn into_course(self) -> Course {
        Course::from_storage(
            &self.id,
            &self.name,
            &self.time_zone,
            &self.institute,
            self.created_at,
            self.deleted_at,
        )
    }
}

#[derive(FromRow)]
struct InstructorRow {
    id: String,
    course_id: String,
    name: String,
    email: String,
    is_displayed_to_students: bool,
    display_name: String,
    registration_key: String,
    privileges: String,
    created_at: DateTime<Utc>,
    account_id: Option<String>,
    account_google_id: Option<String>,
    account_name: Option<String>,
    account_email: Option<String>,
    account_created_at: Option<DateTime<Utc>>,
}

impl InstructorRow {
    fn into_instructor(self) -> Result<Instructor, sqlx::Error> {
        let privileges: InstructorPrivileges =
            serde_json::from_str(&self.privileges).map_err(decode_err)?;
        let mut instructor = Instructor::from_storage(
            parse_uuid(&self.id)?,
            &self.course_id,
            &self.name,
            &self.email,
            self.is_displayed_to_students,
            &self.display_name,
            self.registration_key,
            privileges,
            self.created_at,
        );
        if let (Some(id), Some(google_id), Some(name), Some(email), Some(created_at)) = (
            self.account_id,
            self.account_google_id,
            self.account_name,
            self.account_email,
            self.account_created_at,
        ) {
            instructor.set_account(Account::from_storage(
                parse_uuid(&id)?,
                &google_id,
                &name,
                &email,
                created_at,
            ));
        }
        Ok(instructor)
    }
}

const INSTRUCTOR_SELECT: &str = "\
    SELECT i.id, i.course_id, i.name, i.email, i.is_displayed_to_students, \
           i.display_name, i.registration_key, i.privileges, i.created_at, \
           a.id AS account_id, a.google_id AS account_google_id, \
           a.name AS account_name, a.email AS account_email, \
           a.created_at AS account_created_at \
    FROM instructors i LEFT JOIN accounts a ON i.account_id = a.id";

pub async fn insert_course(db: &SqlitePool, course: &Course) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO courses (id, name, time_zone, institute, created_at, deleted_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(course.id())
    .bind(course.name())
    .bind(course.time_zone())
    .bind(course.institute())
    .bind(course.created_at())
    .bind(course.deleted_at())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    let row = sqlx::query_as::<_, CourseRow>(
        "SELECT id, name, time_zone, institute, created_at, deleted_at FROM courses WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(CourseRow::into_course))
}

pub async fn update_course_deleted_at(
    db: &SqlitePool,
    id: &str,
    deleted_at: Option<DateTime<Utc>>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE courses SET deleted_at = ? WHERE id = ?")
        .bind(deleted_at)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_account(db: &SqlitePool, account: &Account) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO accounts (id, google_id, name, email, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(account.id().to_string())
    .bind(account.google_id())
    .bind(account.name())
    .bind(account.email())
    .bind(account.created_at())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn insert_read_notification(
    db: &SqlitePool,
    read_notification: &ReadNotification,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO read_notifications (id, account_id, notification_id, created_at) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(read_notification.id().to_string())
    .bind(read_notification.account_id().to_string())
    .bind(read_notification.notification_id().to_string())
    .bind(read_notification.created_at())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn count_read_notifications(
    db: &SqlitePool,
    account_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM read_notifications WHERE account_id = ?")
            .bind(account_id.to_string())
            .fetch_one(db)
            .await?;
    Ok(count)
}

pub async fn insert_section(db: &SqlitePool, section: &Section) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO sections (id, course_id, name) VALUES (?, ?, ?)")
        .bind(section.id().to_string())
        .bind(section.course_id())
        .bind(section.name())
        .execute(db)
        .await?;
    Ok(())
}

pub async fn count_sections(db: &SqlitePool, course_id: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sections WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn insert_feedback_session(
    db: &SqlitePool,
    session: &FeedbackSession,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO feedback_sessions (id, course_id, name, start_time, end_time, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(session.id().to_string())
    .bind(session.course_id())
    .bind(session.name())
    .bind(session.start_time())
    .bind(session.end_time())
    .bind(session.created_at())
    .execute(db)
    .await?;
    Ok(())
}

#[derive(FromRow)]
struct FeedbackSessionRow {
    id: String,
    course_id: String,
    name: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

pub async fn list_feedback_sessions(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Vec<FeedbackSession>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FeedbackSessionRow>(
        "SELECT id, course_id, name, start_time, end_time, created_at \
         FROM feedback_sessions WHERE course_id = ? ORDER BY start_time, name",
    )
    .bind(course_id)
    .fetch_all(db)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(FeedbackSession::from_storage(
                parse_uuid(&row.id)?,
                &row.course_id,
                &row.name,
                row.start_time,
                row.end_time,
                row.created_at,
            ))
        })
        .collect()
}

pub async fn insert_instructor(
    db: &SqlitePool,
    instructor: &Instructor,
) -> Result<(), sqlx::Error> {
    let privileges =
        serde_json::to_string(instructor.privileges()).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    sqlx::query(
        "INSERT INTO instructors \
            (id, course_id, account_id, name, email, is_displayed_to_students, \
             display_name, registration_key, privileges, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(instructor.id().to_string())
    .bind(instructor.course_id())
    .bind(instructor.account().map(|a| a.id().to_string()))
    .bind(instructor.name())
    .bind(instructor.email())
    .bind(instructor.is_displayed_to_students())
    .bind(instructor.display_name())
    .bind(instructor.registration_key())
    .bind(privileges)
    .bind(instructor.created_at())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_instructor_by_email(
    db: &SqlitePool,
    course_id: &str,
    email: &str,
) -> Result<Option<Instructor>, sqlx::Error> {
    let row = sqlx::query_as::<_, InstructorRow>(&format!(
        "{INSTRUCTOR_SELECT} WHERE i.course_id = ? AND i.email = ?"
    ))
    .bind(course_id)
    .bind(email)
    .fetch_optional(db)
    .await?;
    row.map(InstructorRow::into_instructor).transpose()
}

pub async fn find_instructor_by_google_id(
    db: &SqlitePool,
    course_id: &str,
    google_id: &str,
) -> Result<Option<Instructor>, sqlx::Error> {
    let row = sqlx::query_as::<_, InstructorRow>(&format!(
        "{INSTRUCTOR_SELECT} WHERE i.course_id = ? AND a.google_id = ?"
    ))
    .bind(course_id)
    .bind(google_id)
    .fetch_optional(db)
    .await?;
    row.map(InstructorRow::into_instructor).transpose()
}

pub async fn list_instructors(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Vec<Instructor>, sqlx::Error> {
    let rows = sqlx::query_as::<_, InstructorRow>(&format!(
        "{INSTRUCTOR_SELECT} WHERE i.course_id = ? ORDER BY i.name, i.email"
    ))
    .bind(course_id)
    .fetch_all(db)
    .await?;
    rows.into_iter().map(InstructorRow::into_instructor).collect()
}

pub async fn count_instructors(db: &SqlitePool, course_id: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM instructors WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn update_instructor_key(
    db: &SqlitePool,
    instructor_id: Uuid,
    registration_key: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE instructors SET registration_key = ? WHERE id = ?")
        .bind(registration_key)
        .bind(instructor_id.to_string())
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructorDeleteOutcome {
    Deleted,
    NotFound,
    LastInstructor,
}

/// Deletes an instructor keyed by (course, email) inside one transaction.
/// The transaction re-counts the course's instructors so that concurrent
/// requests cannot remove the final one.
pub async fn delete_instructor_in_course(
    db: &SqlitePool,
    course_id: &str,
    email: &str,
) -> Result<InstructorDeleteOutcome, sqlx::Error> {
    let mut tx = db.begin().await?;

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM instructors WHERE course_id = ? AND email = ?")
            .bind(course_id)
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((instructor_id,)) = existing else {
        return Ok(InstructorDeleteOutcome::NotFound);
    };

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM instructors WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await?;
    if count <= 1 {
        tx.rollback().await?;
        return Ok(InstructorDeleteOutcome::LastInstructor);
    }

    sqlx::query("DELETE FROM instructors WHERE id = ?")
        .bind(&instructor_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(InstructorDeleteOutcome::Deleted)
}

/// Explicit, ordered cascade: sections first, then the course row.
/// Feedback sessions are left for their own lifecycle to prune.
pub async fn delete_course_cascade(db: &SqlitePool, course_id: &str) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM sections WHERE course_id = ?")
        .bind(course_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(course_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Explicit, ordered cascade: read notifications, instructor links, then
/// the account row.
pub async fn delete_account_cascade(db: &SqlitePool, account_id: Uuid) -> Result<(), sqlx::Error> {
    let id = account_id.to_string();
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM read_notifications WHERE account_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE instructors SET account_id = NULL WHERE account_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM accounts WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::models::InstructorRole;

    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite://:memory:")
            .await
            .expect("Failed to create test db");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    async fn seed_instructor(
        pool: &SqlitePool,
        course_id: &str,
        google_id: &str,
        name: &str,
        email: &str,
    ) -> Instructor {
        let account = Account::new(google_id, name, email);
        insert_account(pool, &account).await.expect("Failed to insert account");

        let mut instructor = Instructor::new(
            course_id,
            name,
            email,
            true,
            "",
            InstructorPrivileges::new(InstructorRole::CoOwner),
        );
        instructor.set_account(account);
        insert_instructor(pool, &instructor)
            .await
            .expect("Failed to insert instructor");
        instructor
    }

    #[tokio::test]
    async fn test_insert_and_find_course() {
        let pool = setup_test_db().await;

        let course = Course::new("course-id", "Course Name", "", "Institute");
        insert_course(&pool, &course).await.expect("Failed to insert course");

        let found = find_course_by_id(&pool, "course-id")
            .await
            .expect("Failed to fetch course")
            .expect("Course not found");
        assert_eq!(found.name(), "Course Name");
        assert_eq!(found.time_zone(), "UTC");
        assert!(!found.is_deleted());

        assert!(find_course_by_id(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_soft_delete_and_restore_course() {
        let pool = setup_test_db().await;

        let course = Course::new("course-id", "Course Name", "", "Institute");
        insert_course(&pool, &course).await.unwrap();

        let updated = update_course_deleted_at(&pool, "course-id", Some(Utc::now()))
            .await
            .unwrap();
        assert!(updated);
        let reloaded = find_course_by_id(&pool, "course-id").await.unwrap().unwrap();
        assert!(reloaded.is_deleted());

        update_course_deleted_at(&pool, "course-id", None).await.unwrap();
        let reloaded = find_course_by_id(&pool, "course-id").await.unwrap().unwrap();
        assert!(!reloaded.is_deleted());

        assert!(!update_course_deleted_at(&pool, "missing", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_instructor_by_google_id_and_email() {
        let pool = setup_test_db().await;

        let course = Course::new("course-id", "Course Name", "", "Institute");
        insert_course(&pool, &course).await.unwrap();
        let instructor =
            seed_instructor(&pool, "course-id", "ada-gid", "Ada", "ada@example.com").await;

        let by_gid = find_instructor_by_google_id(&pool, "course-id", "ada-gid")
            .await
            .unwrap()
            .expect("Instructor not found by google id");
        assert_eq!(by_gid.id(), instructor.id());
        assert_eq!(by_gid.google_id(), Some("ada-gid"));
        assert_eq!(by_gid.registration_key(), instructor.registration_key());

        let by_email = find_instructor_by_email(&pool, "course-id", "ada@example.com")
            .await
            .unwrap()
            .expect("Instructor not found by email");
        assert_eq!(by_email.id(), instructor.id());

        assert!(
            find_instructor_by_google_id(&pool, "course-id", "nobody")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_instructors_is_ordered() {
        let pool = setup_test_db().await;

        let course = Course::new("course-id", "Course Name", "", "Institute");
        insert_course(&pool, &course).await.unwrap();
        seed_instructor(&pool, "course-id", "gid-b", "Bob", "bob@example.com").await;
        seed_instructor(&pool, "course-id", "gid-a", "Ada", "ada@example.com").await;

        let instructors = list_instructors(&pool, "course-id").await.unwrap();
        assert_eq!(instructors.len(), 2);
        assert_eq!(instructors[0].name(), "Ada");
        assert_eq!(instructors[1].name(), "Bob");
        assert_eq!(count_instructors(&pool, "course-id").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_instructor_outcomes() {
        let pool = setup_test_db().await;

        let course = Course::new("course-id", "Course Name", "", "Institute");
        insert_course(&pool, &course).await.unwrap();
        seed_instructor(&pool, "course-id", "gid-a", "Ada", "ada@example.com").await;
        seed_instructor(&pool, "course-id", "gid-b", "Bob", "bob@example.com").await;

        let missing = delete_instructor_in_course(&pool, "course-id", "nobody@example.com")
            .await
            .unwrap();
        assert_eq!(missing, InstructorDeleteOutcome::NotFound);

        let deleted = delete_instructor_in_course(&pool, "course-id", "bob@example.com")
            .await
            .unwrap();
        assert_eq!(deleted, InstructorDeleteOutcome::Deleted);
        assert_eq!(count_instructors(&pool, "course-id").await.unwrap(), 1);

        // The transaction refuses to empty the course.
        let last = delete_instructor_in_course(&pool, "course-id", "ada@example.com")
            .await
            .unwrap();
        assert_eq!(last, InstructorDeleteOutcome::LastInstructor);
        assert_eq!(count_instructors(&pool, "course-id").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_regeneration_key_update() {
        let pool = setup_test_db().await;

        let course = Course::new("course-id", "Course Name", "", "Institute");
        insert_course(&pool, &course).await.unwrap();
        let instructor =
            seed_instructor(&pool, "course-id", "gid-a", "Ada", "ada@example.com").await;

        let updated = update_instructor_key(&pool, instructor.id(), "new-key-value")
            .await
            .unwrap();
        assert!(updated);

        let reloaded = find_instructor_by_email(&pool, "course-id", "ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.registration_key(), "new-key-value");

        let missing = update_instructor_key(&pool, Uuid::new_v4(), "other-key")
            .await
            .unwrap();
        assert!(!missing);
    }

    #[tokio::test]
    async fn test_course_cascade_keeps_feedback_sessions() {
        let pool = setup_test_db().await;

        let course = Course::new("course-id", "Course Name", "", "Institute");
        insert_course(&pool, &course).await.unwrap();
        insert_section(&pool, &Section::new("course-id", "Group 1")).await.unwrap();
        insert_section(&pool, &Section::new("course-id", "Group 2")).await.unwrap();
        let session = FeedbackSession::new(
            "course-id",
            "Midterm Feedback",
            Utc::now(),
            Utc::now() + chrono::Duration::days(7),
        );
        insert_feedback_session(&pool, &session).await.unwrap();

        delete_course_cascade(&pool, "course-id").await.unwrap();

        assert!(find_course_by_id(&pool, "course-id").await.unwrap().is_none());
        assert_eq!(count_sections(&pool, "course-id").await.unwrap(), 0);
        let sessions = list_feedback_sessions(&pool, "course-id").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].name(), "Midterm Feedback");
    }

    #[tokio::test]
    async fn test_account_cascade_removes_read_notifications() {
        let pool = setup_test_db().await;

        let account = Account::new("gid-a", "Ada", "ada@example.com");
        insert_account(&pool, &account).await.unwrap();
        insert_read_notification(&pool, &ReadNotification::new(account.id(), Uuid::new_v4()))
            .await
            .unwrap();
        insert_read_notification(&pool, &ReadNotification::new(account.id(), Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(count_read_notifications(&pool, account.id()).await.unwrap(), 2);

        delete_account_cascade(&pool, account.id()).await.unwrap();
        assert_eq!(count_read_notifications(&pool, account.id()).await.unwrap(), 0);
    }
}
