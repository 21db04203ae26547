use serde_json::{json, Value};
use std::path::Path;
use std::process::{Command, Output};

fn classroom(db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_classroom"))
        .arg("--db")
        .arg(db)
        .args(args)
        .env_remove("CLASSROOM_LOG_DIR")
        .output()
        .unwrap()
}

fn body(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn register_suspend_and_notify_through_binary() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("roster.db");

    let added = classroom(&db, &["add-teacher", "teacherken@gmail.com"]);
    assert!(added.status.success());
    assert_eq!(body(&added), json!({ "created": 1 }));
    let added = classroom(
        &db,
        &["add-student", "studentjon@example.com", "student_agnes@example.com"],
    );
    assert_eq!(body(&added), json!({ "created": 2 }));

    let registered = classroom(
        &db,
        &[
            "register",
            "--teacher",
            "teacherken@gmail.com",
            "--student",
            "studentjon@example.com",
            "--student",
            "student_agnes@example.com",
        ],
    );
    assert!(registered.status.success());
    assert!(registered.stdout.is_empty());

    let common = classroom(&db, &["common-students", "--teacher", "teacherken@gmail.com"]);
    assert_eq!(
        body(&common),
        json!({ "students": ["student_agnes@example.com", "studentjon@example.com"] })
    );

    let suspended = classroom(&db, &["suspend", "--student", "studentjon@example.com"]);
    assert!(suspended.status.success());

    let recipients = classroom(
        &db,
        &[
            "retrieve-for-notifications",
            "--teacher",
            "teacherken@gmail.com",
            "--notification",
            "Hi @studentjon@example.com",
        ],
    );
    assert_eq!(
        body(&recipients),
        json!({ "students": ["student_agnes@example.com"] })
    );
}

#[test]
fn unknown_identity_exits_with_not_found_code() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("roster.db");

    let output = classroom(&db, &["suspend", "--student", "ghost@example.com"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(
        body(&output),
        json!({ "message": "Provided mail(s) not found in database" })
    );
}

#[test]
fn missing_students_exit_with_invalid_usage_code() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("roster.db");

    let output = classroom(&db, &["register", "--teacher", "teacherken@gmail.com"]);
    assert_eq!(output.status.code(), Some(2));
}
