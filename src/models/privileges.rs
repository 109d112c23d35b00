use serde::{Deserialize, Serialize};

/// The individual capabilities an instructor can hold within a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructorPermission {
    CanModifyCourse,
    CanModifyInstructor,
    CanModifySession,
    CanModifyStudent,
    CanViewStudentInSections,
    CanViewSessionInSections,
    CanSubmitSessionInSections,
    CanModifySessionCommentsInSections,
}

/// Named permission templates. `Custom` starts from nothing and is shaped
/// with [`InstructorPrivileges::update_privilege`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructorRole {
    CoOwner,
    Manager,
    Observer,
    Tutor,
    Custom,
}

/// An instructor's capability set, stored as one JSON document per
/// instructor row. Every capability is explicit so older rows keep their
/// meaning when new capabilities appear with a `serde` default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorPrivileges {
    #[serde(default)]
    can_modify_course: bool,
    #[serde(default)]
    can_modify_instructor: bool,
    #[serde(default)]
    can_modify_session: bool,
    #[serde(default)]
    can_modify_student: bool,
    #[serde(default)]
    can_view_student_in_sections: bool,
    #[serde(default)]
    can_view_session_in_sections: bool,
    #[serde(default)]
    can_submit_session_in_sections: bool,
    #[serde(default)]
    can_modify_session_comments_in_sections: bool,
}

impl InstructorPrivileges {
    pub fn new(role: InstructorRole) -> Self {
        match role {
            InstructorRole::CoOwner => Self {
                can_modify_course: true,
                can_modify_instructor: true,
                can_modify_session: true,
                can_modify_student: true,
                can_view_student_in_sections: true,
                can_view_session_in_sections: true,
                can_submit_session_in_sections: true,
                can_modify_session_comments_in_sections: true,
            },
            InstructorRole::Manager => Self {
                can_modify_course: false,
                can_modify_instructor: true,
                can_modify_session: true,
                can_modify_student: true,
                can_view_student_in_sections: true,
                can_view_session_in_sections: true,
                can_submit_session_in_sections: true,
                can_modify_session_comments_in_sections: true,
            },
            InstructorRole::Observer => Self {
                can_view_student_in_sections: true,
                can_view_session_in_sections: true,
                ..Self::default()
            },
            InstructorRole::Tutor => Self {
                can_view_student_in_sections: true,
                can_view_session_in_sections: true,
                can_submit_session_in_sections: true,
                ..Self::default()
            },
            InstructorRole::Custom => Self::default(),
        }
    }

    pub fn has_privilege(&self, permission: InstructorPermission) -> bool {
        match permission {
            InstructorPermission::CanModifyCourse => self.can_modify_course,
            InstructorPermission::CanModifyInstructor => self.can_modify_instructor,
            InstructorPermission::CanModifySession => self.can_modify_session,
            InstructorPermission::CanModifyStudent => self.can_modify_student,
            InstructorPermission::CanViewStudentInSections => self.can_view_student_in_sections,
            InstructorPermission::CanViewSessionInSections => self.can_view_session_in_sections,
            InstructorPermission::CanSubmitSessionInSections => {
                self.can_submit_session_in_sections
            }
            InstructorPermission::CanModifySessionCommentsInSections => {
                self.can_modify_session_comments_in_sections
            }
        }
    }

    pub fn update_privilege(&mut self, permission: InstructorPermission, granted: bool) {
        match permission {
            InstructorPermission::CanModifyCourse => self.can_modify_course = granted,
            InstructorPermission::CanModifyInstructor => self.can_modify_instructor = granted,
            InstructorPermission::CanModifySession => self.can_modify_session = granted,
            InstructorPermission::CanModifyStudent => self.can_modify_student = granted,
            InstructorPermission::CanViewStudentInSections => {
                self.can_view_student_in_sections = granted
            }
            InstructorPermission::CanViewSessionInSections => {
                self.can_view_session_in_sections = granted
            }
            InstructorPermission::CanSubmitSessionInSections => {
                self.can_submit_session_in_sections = granted
            }
            InstructorPermission::CanModifySessionCommentsInSections => {
                self.can_modify_session_comments_in_sections = granted
            }
        }
    }
}
