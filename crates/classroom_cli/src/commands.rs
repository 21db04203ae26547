//! Command-line surface and process configuration.
//!
//! # Responsibility
//! - Parse subcommands mirroring the roster API operations.
//! - Resolve DB path and logging settings from flags or environment.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "classroom.sqlite3";

#[derive(Parser)]
#[command(name = "classroom", version)]
#[command(about = "Teacher/student registrations, suspensions and notification recipients.")]
pub struct CommandLine {
    /// SQLite database file
    #[arg(long, env = "CLASSROOM_DB_PATH", default_value_os_t = default_db_path())]
    pub db: PathBuf,
    /// Log level: trace|debug|info|warn|error
    #[arg(long, env = "CLASSROOM_LOG_LEVEL", default_value = classroom_core::default_log_level())]
    pub log_level: String,
    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "CLASSROOM_LOG_DIR")]
    pub log_dir: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register one or more students under a teacher
    Register {
        #[arg(long)]
        teacher: String,
        #[arg(long = "student")]
        students: Vec<String>,
    },
    /// List students registered under every given teacher
    #[command(name = "common-students", alias = "commonstudents")]
    CommonStudents {
        #[arg(long = "teacher")]
        teachers: Vec<String>,
    },
    /// Suspend a student
    Suspend {
        #[arg(long)]
        student: String,
    },
    /// List students who should receive a teacher's notification
    #[command(
        name = "retrieve-for-notifications",
        alias = "retrievefornotifications"
    )]
    RetrieveForNotifications {
        #[arg(long)]
        teacher: String,
        #[arg(long)]
        notification: String,
    },
    /// Provision teachers
    #[command(name = "add-teacher")]
    AddTeacher { mails: Vec<String> },
    /// Provision students
    #[command(name = "add-student")]
    AddStudent { mails: Vec<String> },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
