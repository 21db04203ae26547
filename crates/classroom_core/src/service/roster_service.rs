//! Roster use-case service.
//!
//! # Responsibility
//! - Answer membership queries over the registration edge set.
//! - Apply registration and suspension writes with typed outcomes.
//! - Resolve notification recipients from roster plus mentions.
//!
//! # Invariants
//! - Writes reject unknown identities with `*NotFound`.
//! - Reads over unknown identities yield `false` or an empty set.
//! - Notification recipients are always active students.

use crate::model::identity::MailId;
use crate::model::roster::{Student, Teacher};
use crate::repo::roster_repo::{RepoError, RosterRepository};
use crate::service::mention::extract_mentions;
use log::{error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for roster use-cases.
#[derive(Debug)]
pub enum RosterServiceError {
    /// Referenced teacher does not exist.
    TeacherNotFound(MailId),
    /// Referenced student does not exist.
    StudentNotFound(MailId),
    /// Store failure; the operation had no effect.
    Repo(RepoError),
}

impl RosterServiceError {
    /// Returns whether this error means a referenced identity is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TeacherNotFound(_) | Self::StudentNotFound(_))
    }
}

impl Display for RosterServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TeacherNotFound(mail) => write!(f, "teacher not found: {mail}"),
            Self::StudentNotFound(mail) => write!(f, "student not found: {mail}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RosterServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RosterServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TeacherNotFound(mail) => Self::TeacherNotFound(mail),
            RepoError::StudentNotFound(mail) => Self::StudentNotFound(mail),
            other => Self::Repo(other),
        }
    }
}

pub type RosterResult<T> = Result<T, RosterServiceError>;

/// Roster service facade over repository implementations.
pub struct RosterService<R: RosterRepository> {
    repo: R,
}

impl<R: RosterRepository> RosterService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Provisions a teacher row. Returns `false` when it already existed.
    pub fn provision_teacher(&self, teacher: &MailId) -> RosterResult<bool> {
        Ok(self.repo.provision_teacher(teacher)?)
    }

    /// Provisions an active student row. An existing student keeps its
    /// suspension state.
    pub fn provision_student(&self, student: &MailId) -> RosterResult<bool> {
        Ok(self.repo.provision_student(student)?)
    }

    pub fn teacher_exists(&self, teacher: &MailId) -> RosterResult<bool> {
        Ok(self.repo.teacher_exists(teacher)?)
    }

    pub fn student_exists(&self, student: &MailId) -> RosterResult<bool> {
        Ok(self.repo.student_exists(student)?)
    }

    pub fn get_teacher(&self, teacher: &MailId) -> RosterResult<Option<Teacher>> {
        Ok(self.repo.get_teacher(teacher)?)
    }

    pub fn get_student(&self, student: &MailId) -> RosterResult<Option<Student>> {
        Ok(self.repo.get_student(student)?)
    }

    /// Returns `true` only for an existing, unsuspended student.
    ///
    /// Unknown and suspended students are indistinguishable here.
    pub fn is_active(&self, student: &MailId) -> RosterResult<bool> {
        Ok(self
            .repo
            .get_student(student)?
            .is_some_and(|row| row.is_active()))
    }

    /// Lists students registered under `teacher`. Unknown teacher yields an
    /// empty set.
    pub fn students_of(
        &self,
        teacher: &MailId,
        active_only: bool,
    ) -> RosterResult<BTreeSet<MailId>> {
        Ok(self.repo.students_of(teacher, active_only)?)
    }

    /// Lists students registered under every teacher in `teachers`.
    ///
    /// This is an intersection, not a union. Input order and duplicates do
    /// not matter; an empty list or any unknown teacher yields an empty set.
    pub fn common_students(&self, teachers: &[MailId]) -> RosterResult<BTreeSet<MailId>> {
        let students = self.repo.students_of_all(teachers)?;
        info!(
            "event=common_students module=roster status=ok teachers={} students={}",
            teachers.len(),
            students.len()
        );
        Ok(students)
    }

    /// Lists teachers a student is registered under.
    pub fn teachers_of(&self, student: &MailId) -> RosterResult<BTreeSet<MailId>> {
        Ok(self.repo.teachers_of(student)?)
    }

    /// Registers `students` under `teacher`.
    ///
    /// # Contract
    /// - Teacher and every student must exist, otherwise nothing is written.
    /// - Existing edges and duplicate ids are no-ops; repeating a call
    ///   succeeds and leaves the same edge set.
    pub fn register(&mut self, teacher: &MailId, students: &[MailId]) -> RosterResult<()> {
        match self.repo.register_students(teacher, students) {
            Ok(created) => {
                info!(
                    "event=register module=roster status=ok students={} created={created}",
                    students.len()
                );
                Ok(())
            }
            Err(err) => Err(self.log_failure("register", err.into())),
        }
    }

    /// Suspends one student. Suspending twice is a no-op success.
    pub fn suspend(&self, student: &MailId) -> RosterResult<()> {
        match self.repo.suspend_student(student) {
            Ok(()) => {
                info!("event=suspend module=roster status=ok");
                Ok(())
            }
            Err(err) => Err(self.log_failure("suspend", err.into())),
        }
    }

    /// Resolves who receives a notification from `teacher`.
    ///
    /// Recipients are the active students registered under the teacher plus
    /// every active student mentioned as `@<mail>` in `text`.
    pub fn resolve_recipients(
        &self,
        teacher: &MailId,
        text: &str,
    ) -> RosterResult<BTreeSet<MailId>> {
        if !self.repo.teacher_exists(teacher)? {
            return Err(self.log_failure(
                "resolve_recipients",
                RosterServiceError::TeacherNotFound(teacher.clone()),
            ));
        }

        let mentions = extract_mentions(text);
        let mention_count = mentions.len();
        let mut recipients = self.repo.students_of(teacher, true)?;
        for student in mentions {
            if self.is_active(&student)? {
                recipients.insert(student);
            }
        }

        info!(
            "event=resolve_recipients module=roster status=ok mentions={mention_count} recipients={}",
            recipients.len()
        );
        Ok(recipients)
    }

    fn log_failure(&self, event: &str, err: RosterServiceError) -> RosterServiceError {
        if err.is_not_found() {
            info!("event={event} module=roster status=not_found");
        } else {
            error!("event={event} module=roster status=error error={err}");
        }
        err
    }
}
