//! Command-line entry point for the classroom roster.
//!
//! # Responsibility
//! - Own the store handle for the lifetime of one invocation.
//! - Print the JSON response body and exit with a status-derived code.

mod api;
mod commands;

use anyhow::{anyhow, Context};
use api::{ApiResponse, Role};
use classroom_core::db::open_db;
use classroom_core::{init_logging, RosterRepository, RosterService, SqliteRosterRepository};
use commands::{CommandLine, Commands};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    let commands = CommandLine::parse_args();
    match run(commands) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("classroom: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(commands: CommandLine) -> anyhow::Result<ExitCode> {
    if let Some(log_dir) = commands.log_dir.as_deref() {
        init_logging(&commands.log_level, log_dir)
            .map_err(|err| anyhow!("failed to initialize logging: {err}"))?;
    }

    let mut conn = open_db(&commands.db)
        .with_context(|| format!("failed to open roster database {}", commands.db.display()))?;
    let repo = SqliteRosterRepository::try_new(&mut conn)
        .context("roster database is not usable")?;
    let mut service = RosterService::new(repo);

    let response = dispatch(&mut service, commands.command);
    info!(
        "event=cli_command module=cli status=done http_status={} exit_status={}",
        response.status,
        response.exit_status()
    );

    if let Some(body) = &response.body {
        println!("{}", serde_json::to_string(body)?);
    }
    Ok(response.exit_code())
}

fn dispatch<R: RosterRepository>(service: &mut RosterService<R>, command: Commands) -> ApiResponse {
    match command {
        Commands::Register { teacher, students } => api::register(service, &teacher, &students),
        Commands::CommonStudents { teachers } => api::common_students(service, &teachers),
        Commands::Suspend { student } => api::suspend(service, &student),
        Commands::RetrieveForNotifications {
            teacher,
            notification,
        } => api::retrieve_for_notifications(service, &teacher, &notification),
        Commands::AddTeacher { mails } => api::provision(service, Role::Teacher, &mails),
        Commands::AddStudent { mails } => api::provision(service, Role::Student, &mails),
    }
}
