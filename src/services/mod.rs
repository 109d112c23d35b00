pub mod instructor_logic;

pub use instructor_logic::{DELETE_LAST_INSTRUCTOR_ERROR, InstructorLogic, SqlInstructorLogic};
