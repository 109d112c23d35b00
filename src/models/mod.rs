pub mod account;
pub mod course;
pub mod feedback_session;
pub mod instructor;
pub mod privileges;
pub mod read_notification;
pub mod section;

pub use account::Account;
pub use course::{Course, DEFAULT_TIME_ZONE};
pub use feedback_session::FeedbackSession;
pub use instructor::{DEFAULT_DISPLAY_NAME, Instructor, generate_registration_key};
pub use privileges::{InstructorPermission, InstructorPrivileges, InstructorRole};
pub use read_notification::ReadNotification;
pub use section::Section;
