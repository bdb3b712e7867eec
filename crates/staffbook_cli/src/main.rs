//! Command-line front end for Staffbook.
//!
//! # Responsibility
//! - Map subcommands onto employee controller actions.
//! - Print each action result as JSON; exit non-zero on failure outcomes.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use staffbook_core::db::open_db;
use staffbook_core::{
    init_logging, parse_log_level, ActionResult, ConfigError, CoreConfig, EmployeeController,
    EmployeeForm, EmployeeId, EmployeeRepository, EmployeeService, ListingPolicy,
    SqliteEmployeeRepository,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Employee records over SQLite.
///
/// Settings come from `STAFFBOOK_DB_PATH`, `STAFFBOOK_LISTING`,
/// `STAFFBOOK_LOG_LEVEL` and `STAFFBOOK_LOG_DIR`; flags override them.
#[derive(Parser, Debug)]
#[command(name = "staffbook", author, version, long_about = None)]
struct Cli {
    /// SQLite database file.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Listing policy for `list`: all | active-only.
    #[arg(long)]
    listing: Option<ListingPolicy>,

    /// Log level: trace | debug | info | warn | error.
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check core linkage.
    Ping,
    /// List employees.
    List,
    /// Show one employee.
    Show { id: EmployeeId },
    /// Create an employee.
    Create(FieldArgs),
    /// Edit an employee; omitted fields keep their stored values.
    Edit {
        id: EmployeeId,
        #[command(flatten)]
        fields: FieldArgs,
        /// Row version the edit is based on; defaults to the current one.
        #[arg(long)]
        expected_version: Option<i64>,
    },
    /// Delete an employee (no-op when it does not exist).
    Delete { id: EmployeeId },
}

#[derive(Args, Debug, Default)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    address: Option<String>,
    /// YYYY-MM-DD or MM/DD/YYYY.
    #[arg(long)]
    dob: Option<String>,
    #[arg(long)]
    salary: Option<String>,
    /// true | false.
    #[arg(long)]
    active: Option<String>,
}

impl FieldArgs {
    fn apply_to(self, form: &mut EmployeeForm) {
        let FieldArgs {
            name,
            address,
            dob,
            salary,
            active,
        } = self;
        if name.is_some() {
            form.name = name;
        }
        if address.is_some() {
            form.address = address;
        }
        if dob.is_some() {
            form.dob = dob;
        }
        if salary.is_some() {
            form.salary = salary;
        }
        if active.is_some() {
            form.is_active = active;
        }
    }
}

impl Cli {
    /// Environment settings from `env`, overlaid with the flags given.
    fn core_config(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<CoreConfig, ConfigError> {
        let mut config = CoreConfig::from_lookup(env)?;
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        if let Some(listing) = self.listing {
            config.listing = listing;
        }
        if let Some(level) = &self.log_level {
            config.log_level = parse_log_level(level)?;
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    match run(Cli::parse(), |key| std::env::var(key).ok()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("staffbook: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, env: impl Fn(&str) -> Option<String>) -> Result<bool> {
    let config = cli.core_config(env).context("invalid configuration")?;
    init_logging(&config).context("failed to start logging")?;

    if let Command::Ping = cli.command {
        println!("staffbook_core ping={}", staffbook_core::ping());
        println!("staffbook_core version={}", staffbook_core::core_version());
        return Ok(true);
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    info!(
        "event=cli_start module=cli status=ok listing={}",
        config.listing
    );

    let result = match SqliteEmployeeRepository::try_new(&conn) {
        Ok(repo) => {
            let controller = EmployeeController::new(EmployeeService::new(repo, config.listing));
            dispatch(&controller, cli.command)
        }
        Err(err) => ActionResult::unavailable(err),
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.is_success())
}

fn dispatch<R: EmployeeRepository>(
    controller: &EmployeeController<R>,
    command: Command,
) -> ActionResult {
    match command {
        Command::Ping | Command::List => controller.index(),
        Command::Show { id } => controller.details(Some(id)),
        Command::Create(fields) => {
            let mut form = EmployeeForm::default();
            fields.apply_to(&mut form);
            controller.create(form)
        }
        Command::Edit {
            id,
            fields,
            expected_version,
        } => {
            let mut form = match controller.edit_form(Some(id)) {
                ActionResult::EditForm { form } => form,
                other => return other,
            };
            fields.apply_to(&mut form);
            if expected_version.is_some() {
                form.row_version = expected_version;
            }
            controller.edit(id, form)
        }
        Command::Delete { id } => controller.delete_confirmed(id),
    }
}
