#![allow(dead_code)]

use classroom_core::db::open_db_in_memory;
use classroom_core::{MailId, RosterService, SqliteRosterRepository};
use rusqlite::Connection;

pub const KEN: &str = "teacherken@gmail.com";
pub const KATHERINE: &str = "teacherkatherine@yahoo.com";
pub const BOB: &str = "teacherbob@mail.edu.sg";

pub const JON: &str = "studentjon@example.com";
pub const HON: &str = "studenthon@example.com";
pub const AGNES: &str = "student_agnes@example.com";
pub const MICHE: &str = "studentmiche@example.com";

/// Opens an in-memory roster with 3 teachers, 4 students and the edges
/// ken->jon, katherine->jon, katherine->hon.
pub fn seeded() -> Connection {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut roster = service(&mut conn);
        for teacher in [KEN, KATHERINE, BOB] {
            assert!(roster.provision_teacher(&mail(teacher)).unwrap());
        }
        for student in [JON, HON, AGNES, MICHE] {
            assert!(roster.provision_student(&mail(student)).unwrap());
        }
        roster.register(&mail(KEN), &mails(&[JON])).unwrap();
        roster.register(&mail(KATHERINE), &mails(&[JON, HON])).unwrap();
    }
    conn
}

pub fn service(conn: &mut Connection) -> RosterService<SqliteRosterRepository<'_>> {
    RosterService::new(SqliteRosterRepository::try_new(conn).unwrap())
}

pub fn mail(value: &str) -> MailId {
    MailId::new(value)
}

pub fn mails(values: &[&str]) -> Vec<MailId> {
    values.iter().map(|value| MailId::new(value)).collect()
}

pub fn edge_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM registrations;", [], |row| row.get(0))
        .unwrap()
}
