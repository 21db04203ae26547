//! Roster repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own teacher/student rows and the registration edge set.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every key reaching SQL is a canonical `MailId`.
//! - A (teacher, student) edge exists at most once.
//! - `register_students` writes all of its edges or none of them.
//! - Read queries treat unknown identities as contributing nothing.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::identity::MailId;
use crate::model::roster::{Student, Teacher};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const TEACHER_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM teachers WHERE mail = ?1);";
const STUDENT_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM students WHERE mail = ?1);";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("teachers", &["mail"]),
    ("students", &["mail", "suspended"]),
    ("registrations", &["teacher_mail", "student_mail"]),
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for roster persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A write referenced a teacher that does not exist.
    TeacherNotFound(MailId),
    /// A write referenced a student that does not exist.
    StudentNotFound(MailId),
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted into a read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::TeacherNotFound(mail) => write!(f, "teacher not found: {mail}"),
            Self::StudentNotFound(mail) => write!(f, "student not found: {mail}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "roster repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "roster repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "roster repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface over the teacher/student relationship store.
pub trait RosterRepository {
    /// Inserts a teacher row; returns `false` when it already existed.
    fn provision_teacher(&self, teacher: &MailId) -> RepoResult<bool>;
    /// Inserts an active student row; returns `false` when it already existed.
    fn provision_student(&self, student: &MailId) -> RepoResult<bool>;
    fn teacher_exists(&self, teacher: &MailId) -> RepoResult<bool>;
    fn student_exists(&self, student: &MailId) -> RepoResult<bool>;
    fn get_teacher(&self, teacher: &MailId) -> RepoResult<Option<Teacher>>;
    fn get_student(&self, student: &MailId) -> RepoResult<Option<Student>>;
    /// Students with an edge to `teacher`, optionally excluding suspended ones.
    fn students_of(&self, teacher: &MailId, active_only: bool) -> RepoResult<BTreeSet<MailId>>;
    /// Students with an edge to every teacher in `teachers`.
    fn students_of_all(&self, teachers: &[MailId]) -> RepoResult<BTreeSet<MailId>>;
    /// Teachers with an edge to `student`.
    fn teachers_of(&self, student: &MailId) -> RepoResult<BTreeSet<MailId>>;
    /// Adds missing edges in one transaction and returns how many were new.
    fn register_students(&mut self, teacher: &MailId, students: &[MailId]) -> RepoResult<usize>;
    /// Sets the suspension flag on an existing student.
    fn suspend_student(&self, student: &MailId) -> RepoResult<()>;
}

/// SQLite-backed roster repository.
pub struct SqliteRosterRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRosterRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_roster_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RosterRepository for SqliteRosterRepository<'_> {
    fn provision_teacher(&self, teacher: &MailId) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO teachers (mail) VALUES (?1);",
            [teacher.as_str()],
        )?;
        Ok(inserted == 1)
    }

    fn provision_student(&self, student: &MailId) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO students (mail, suspended) VALUES (?1, 0);",
            [student.as_str()],
        )?;
        Ok(inserted == 1)
    }

    fn teacher_exists(&self, teacher: &MailId) -> RepoResult<bool> {
        mail_exists(self.conn, TEACHER_EXISTS_SQL, teacher)
    }

    fn student_exists(&self, student: &MailId) -> RepoResult<bool> {
        mail_exists(self.conn, STUDENT_EXISTS_SQL, student)
    }

    fn get_teacher(&self, teacher: &MailId) -> RepoResult<Option<Teacher>> {
        let mail: Option<String> = self
            .conn
            .query_row(
                "SELECT mail FROM teachers WHERE mail = ?1;",
                [teacher.as_str()],
                |row| row.get("mail"),
            )
            .optional()?;
        Ok(mail.map(|mail| Teacher {
            mail: MailId::new(mail),
        }))
    }

    fn get_student(&self, student: &MailId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare("SELECT mail, suspended FROM students WHERE mail = ?1;")?;
        let mut rows = stmt.query([student.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn students_of(&self, teacher: &MailId, active_only: bool) -> RepoResult<BTreeSet<MailId>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.student_mail
             FROM registrations r
             INNER JOIN students s ON s.mail = r.student_mail
             WHERE r.teacher_mail = ?1
               AND (?2 = 0 OR s.suspended = 0);",
        )?;
        let rows = stmt.query(params![teacher.as_str(), bool_to_int(active_only)])?;
        collect_mails(rows)
    }

    fn students_of_all(&self, teachers: &[MailId]) -> RepoResult<BTreeSet<MailId>> {
        let unique: BTreeSet<&str> = teachers.iter().map(MailId::as_str).collect();
        if unique.is_empty() {
            return Ok(BTreeSet::new());
        }

        let teacher_list = serde_json::to_string(&unique)
            .map_err(|err| RepoError::InvalidData(format!("teacher list encoding: {err}")))?;
        let mut stmt = self.conn.prepare(
            "SELECT student_mail
             FROM registrations
             WHERE teacher_mail IN (SELECT value FROM json_each(?1))
             GROUP BY student_mail
             HAVING COUNT(*) = ?2;",
        )?;
        let rows = stmt.query(params![teacher_list, unique.len() as i64])?;
        collect_mails(rows)
    }

    fn teachers_of(&self, student: &MailId) -> RepoResult<BTreeSet<MailId>> {
        let mut stmt = self.conn.prepare(
            "SELECT teacher_mail
             FROM registrations
             WHERE student_mail = ?1;",
        )?;
        let rows = stmt.query([student.as_str()])?;
        collect_mails(rows)
    }

    fn register_students(&mut self, teacher: &MailId, students: &[MailId]) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !mail_exists(&tx, TEACHER_EXISTS_SQL, teacher)? {
            return Err(RepoError::TeacherNotFound(teacher.clone()));
        }
        let unique: BTreeSet<&MailId> = students.iter().collect();
        for student in students {
            if !mail_exists(&tx, STUDENT_EXISTS_SQL, student)? {
                return Err(RepoError::StudentNotFound(student.clone()));
            }
        }

        let mut created = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO registrations (teacher_mail, student_mail)
                 VALUES (?1, ?2);",
            )?;
            for student in unique {
                created += stmt.execute(params![teacher.as_str(), student.as_str()])?;
            }
        }

        tx.commit()?;
        Ok(created)
    }

    fn suspend_student(&self, student: &MailId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students SET suspended = 1 WHERE mail = ?1;",
            [student.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::StudentNotFound(student.clone()));
        }

        Ok(())
    }
}

fn mail_exists(conn: &Connection, sql: &str, mail: &MailId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, [mail.as_str()], |row| row.get(0))?;
    Ok(exists == 1)
}

fn collect_mails(mut rows: rusqlite::Rows<'_>) -> RepoResult<BTreeSet<MailId>> {
    let mut mails = BTreeSet::new();
    while let Some(row) = rows.next()? {
        let mail: String = row.get(0)?;
        mails.insert(MailId::new(mail));
    }
    Ok(mails)
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let mail: String = row.get("mail")?;
    let suspended = match row.get::<_, i64>("suspended")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid suspended value `{other}` in students.suspended"
            )));
        }
    };
    Ok(Student {
        mail: MailId::new(mail),
        suspended,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_roster_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
