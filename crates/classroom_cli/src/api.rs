//! Roster API handlers for the command-line surface.
//!
//! # Responsibility
//! - Validate request shape before anything reaches core.
//! - Map core outcomes onto HTTP-style status codes and JSON bodies.
//!
//! # Invariants
//! - Handlers never panic; every outcome is an `ApiResponse`.
//! - Set-valued bodies use the `students` field.
//! - Store failures never surface as 404.

use classroom_core::{MailId, RosterRepository, RosterService, RosterServiceError};
use log::error;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::process::ExitCode;

const NOT_FOUND_MESSAGE: &str = "Provided mail(s) not found in database";
const TEACHER_NOT_FOUND_MESSAGE: &str = "Provided teacher mail not found in database";
const INTERNAL_ERROR_MESSAGE: &str = "Roster store failure; no changes were applied";

/// Transport-agnostic response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    fn ok(body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => Self {
                status: 200,
                body: Some(value),
            },
            Err(err) => {
                error!("event=api_response module=cli status=error error={err}");
                Self::failure(500, INTERNAL_ERROR_MESSAGE)
            }
        }
    }

    fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(json!({ "message": message.into() })),
        }
    }

    fn invalid_usage(message: impl Into<String>) -> Self {
        Self::failure(400, message)
    }

    /// Process exit status: `0` for 2xx, `2` for 400, `3` for 404, `1` otherwise.
    pub fn exit_status(&self) -> u8 {
        match self.status {
            200..=299 => 0,
            400 => 2,
            404 => 3,
            _ => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

#[derive(Debug, Serialize)]
struct StudentsBody {
    students: Vec<String>,
}

impl From<BTreeSet<MailId>> for StudentsBody {
    fn from(value: BTreeSet<MailId>) -> Self {
        Self {
            students: value.into_iter().map(String::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreatedBody {
    created: usize,
}

/// Which kind of row `provision` creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Teacher,
    Student,
}

pub fn register<R: RosterRepository>(
    service: &mut RosterService<R>,
    teacher: &str,
    students: &[String],
) -> ApiResponse {
    let Some(teacher) = non_blank(teacher) else {
        return ApiResponse::invalid_usage(
            "Invalid request, provide non-empty teacher mail under 'teacher'",
        );
    };
    if students.is_empty() {
        return ApiResponse::invalid_usage(
            "Invalid request, provide non-empty list of students under 'students'",
        );
    }
    let Some(students) = all_non_blank(students) else {
        return ApiResponse::invalid_usage("Invalid request, student mails must be non-empty");
    };

    match service.register(&teacher, &students) {
        Ok(()) => ApiResponse::no_content(),
        Err(err) => from_service_error("register", err),
    }
}

pub fn common_students<R: RosterRepository>(
    service: &RosterService<R>,
    teachers: &[String],
) -> ApiResponse {
    if teachers.is_empty() {
        return ApiResponse::invalid_usage(
            "Invalid parameter format, provide teacher mail(s) under 'teacher'",
        );
    }
    let Some(teachers) = all_non_blank(teachers) else {
        return ApiResponse::invalid_usage("Invalid request, teacher mails must be non-empty");
    };

    match service.common_students(&teachers) {
        Ok(students) => ApiResponse::ok(StudentsBody::from(students)),
        Err(err) => from_service_error("common_students", err),
    }
}

pub fn suspend<R: RosterRepository>(service: &RosterService<R>, student: &str) -> ApiResponse {
    let Some(student) = non_blank(student) else {
        return ApiResponse::invalid_usage(
            "Invalid request, provide non-empty student mail under 'student'",
        );
    };

    match service.suspend(&student) {
        Ok(()) => ApiResponse::no_content(),
        Err(err) => from_service_error("suspend", err),
    }
}

pub fn retrieve_for_notifications<R: RosterRepository>(
    service: &RosterService<R>,
    teacher: &str,
    notification: &str,
) -> ApiResponse {
    let Some(teacher) = non_blank(teacher) else {
        return ApiResponse::invalid_usage(
            "Invalid request, provide non-empty teacher mail under 'teacher'",
        );
    };

    match service.resolve_recipients(&teacher, notification) {
        Ok(students) => ApiResponse::ok(StudentsBody::from(students)),
        Err(RosterServiceError::TeacherNotFound(_)) => {
            ApiResponse::failure(404, TEACHER_NOT_FOUND_MESSAGE)
        }
        Err(err) => from_service_error("retrieve_for_notifications", err),
    }
}

pub fn provision<R: RosterRepository>(
    service: &RosterService<R>,
    role: Role,
    mails: &[String],
) -> ApiResponse {
    if mails.is_empty() {
        return ApiResponse::invalid_usage("Invalid request, provide at least one mail");
    }
    let Some(mails) = all_non_blank(mails) else {
        return ApiResponse::invalid_usage("Invalid request, mails must be non-empty");
    };

    let mut created = 0;
    for mail in &mails {
        let outcome = match role {
            Role::Teacher => service.provision_teacher(mail),
            Role::Student => service.provision_student(mail),
        };
        match outcome {
            Ok(true) => created += 1,
            Ok(false) => {}
            Err(err) => return from_service_error("provision", err),
        }
    }
    ApiResponse::ok(CreatedBody { created })
}

fn from_service_error(operation: &str, err: RosterServiceError) -> ApiResponse {
    if err.is_not_found() {
        return ApiResponse::failure(404, NOT_FOUND_MESSAGE);
    }
    error!("event={operation} module=cli status=error error={err}");
    ApiResponse::failure(500, INTERNAL_ERROR_MESSAGE)
}

fn non_blank(raw: &str) -> Option<MailId> {
    let mail = MailId::new(raw);
    (!mail.is_blank()).then_some(mail)
}

fn all_non_blank(raws: &[String]) -> Option<Vec<MailId>> {
    raws.iter().map(|raw| non_blank(raw)).collect()
}

#[cfg(test)]
mod tests {
    use super::{
        common_students, provision, register, retrieve_for_notifications, suspend, ApiResponse,
        Role,
    };
    use classroom_core::db::open_db_in_memory;
    use classroom_core::{RosterService, SqliteRosterRepository};
    use rusqlite::Connection;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn seeded() -> Connection {
        let mut conn = open_db_in_memory().unwrap();
        {
            let mut service = RosterService::new(SqliteRosterRepository::try_new(&mut conn).unwrap());
            let teachers = strings(&["teacherken@gmail.com", "teacherkatherine@yahoo.com"]);
            let students = strings(&["studentjon@example.com", "studenthon@example.com"]);
            assert_eq!(
                provision(&service, Role::Teacher, &teachers).body,
                Some(json!({ "created": 2 }))
            );
            assert_eq!(provision(&service, Role::Student, &students).status, 200);
            assert_eq!(
                register(&mut service, "teacherken@gmail.com", &students[..1]).status,
                204
            );
            assert_eq!(
                register(&mut service, "teacherkatherine@yahoo.com", &students).status,
                204
            );
        }
        conn
    }

    #[test]
    fn register_validates_shape_before_core() {
        let mut conn = seeded();
        let mut service = RosterService::new(SqliteRosterRepository::try_new(&mut conn).unwrap());

        assert_eq!(register(&mut service, "  ", &strings(&["a@b.c"])).status, 400);
        assert_eq!(register(&mut service, "teacherken@gmail.com", &[]).status, 400);
        assert_eq!(
            register(&mut service, "teacherken@gmail.com", &strings(&[""])).status,
            400
        );
    }

    #[test]
    fn register_maps_unknown_ids_to_404() {
        let mut conn = seeded();
        let mut service = RosterService::new(SqliteRosterRepository::try_new(&mut conn).unwrap());

        let response = register(
            &mut service,
            "studentjon@example.com",
            &strings(&["studenthon@example.com"]),
        );
        assert_eq!(response.status, 404);
        assert_eq!(
            response.body,
            Some(json!({ "message": "Provided mail(s) not found in database" }))
        );
    }

    #[test]
    fn common_students_returns_students_field() {
        let mut conn = seeded();
        let service = RosterService::new(SqliteRosterRepository::try_new(&mut conn).unwrap());

        let response = common_students(
            &service,
            &strings(&["teacherken@gmail.com", "teacherkatherine@yahoo.com"]),
        );
        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            Some(json!({ "students": ["studentjon@example.com"] }))
        );

        let unknown = common_students(&service, &strings(&["studentjon@example.com"]));
        assert_eq!(unknown.body, Some(json!({ "students": [] })));
        assert_eq!(common_students(&service, &[]).status, 400);
    }

    #[test]
    fn suspend_then_notify_excludes_student() {
        let mut conn = seeded();
        let service = RosterService::new(SqliteRosterRepository::try_new(&mut conn).unwrap());

        assert_eq!(suspend(&service, "studentjon@example.com").status, 204);
        assert_eq!(suspend(&service, "teacherken@gmail.com").status, 404);
        assert_eq!(suspend(&service, "").status, 400);

        let response = retrieve_for_notifications(
            &service,
            "teacherkatherine@yahoo.com",
            "Hi @studentjon@example.com",
        );
        assert_eq!(
            response.body,
            Some(json!({ "students": ["studenthon@example.com"] }))
        );
        let unknown = retrieve_for_notifications(&service, "studenthon@example.com", "Hello");
        assert_eq!(unknown.status, 404);
        assert_eq!(
            unknown.body,
            Some(json!({ "message": "Provided teacher mail not found in database" }))
        );
    }

    #[test]
    fn exit_codes_follow_status_class() {
        let exit = |status| {
            ApiResponse {
                status,
                body: None,
            }
            .exit_status()
        };
        assert_eq!(exit(204), 0);
        assert_eq!(exit(200), 0);
        assert_eq!(exit(400), 2);
        assert_eq!(exit(404), 3);
        assert_eq!(exit(500), 1);
    }
}
