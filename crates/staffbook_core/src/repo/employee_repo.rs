//! Employee repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `employees` table.
//! - Keep SQL details inside the core persistence boundary.
//! - Detect stale updates through the `row_version` token.
//!
//! # Invariants
//! - Ids come from `AUTOINCREMENT` and are never reused.
//! - Every successful update increments `row_version` by one.
//! - Read paths reject malformed persisted values instead of masking them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::employee::{Employee, EmployeeData, EmployeeId};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    name,
    address,
    dob,
    salary,
    is_active,
    row_version
FROM employees";

const REQUIRED_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "address",
    "dob",
    "salary",
    "is_active",
    "row_version",
];

const DOB_STORAGE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for employee persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted employee data: {0}")]
    InvalidData(String),
    #[error(
        "connection is not migrated: schema version {actual_version}, expected {expected_version}"
    )]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
    #[error("required column `{table}.{column}` is missing")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Stable error code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(err) => err.code(),
            Self::InvalidData(_) => "repo_invalid_data",
            Self::UninitializedConnection { .. } => "repo_uninitialized_connection",
            Self::MissingRequiredTable(_) => "repo_missing_table",
            Self::MissingRequiredColumn { .. } => "repo_missing_column",
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing employees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmployeeListQuery {
    /// Only rows with `is_active = 1`.
    pub active_only: bool,
}

/// Result of a versioned update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Row replaced; carries the stored record with its new version.
    Updated(Employee),
    /// No row with this id exists.
    NotFound(EmployeeId),
    /// Row exists but its version no longer matches the one read.
    Conflict(EmployeeId),
}

/// Repository interface for employee CRUD operations.
pub trait EmployeeRepository {
    /// Lists employees ordered by id.
    fn list_employees(&self, query: &EmployeeListQuery) -> RepoResult<Vec<Employee>>;
    /// Gets one employee by id.
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    /// Checks for an exact name match, optionally ignoring one row.
    fn name_taken(&self, name: &str, exclude: Option<EmployeeId>) -> RepoResult<bool>;
    /// Inserts a new row and returns it with its assigned id.
    fn insert_employee(&self, data: &EmployeeData) -> RepoResult<Employee>;
    /// Replaces all business fields when `expected_version` still matches.
    fn update_employee(
        &self,
        id: EmployeeId,
        expected_version: i64,
        data: &EmployeeData,
    ) -> RepoResult<UpdateOutcome>;
    /// Removes a row; returns whether one was removed.
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<bool>;
    /// Whether a row with this id exists.
    fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema
    ///   does not carry the employee table shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_employee_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn list_employees(&self, query: &EmployeeListQuery) -> RepoResult<Vec<Employee>> {
        let mut sql = format!("{EMPLOYEE_SELECT_SQL} WHERE 1 = 1");
        if query.active_only {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        Ok(employees)
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }

        Ok(None)
    }

    fn name_taken(&self, name: &str, exclude: Option<EmployeeId>) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM employees
                WHERE name = ?1
                  AND (?2 IS NULL OR id <> ?2)
            );",
            params![name, exclude],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn insert_employee(&self, data: &EmployeeData) -> RepoResult<Employee> {
        self.conn.execute(
            "INSERT INTO employees (
                name,
                address,
                dob,
                salary,
                is_active,
                row_version
            ) VALUES (?1, ?2, ?3, ?4, ?5, 1);",
            params![
                data.name.as_str(),
                data.address.as_str(),
                dob_to_db(data.dob),
                data.salary.to_string(),
                bool_to_int(data.is_active),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok(Employee::from_data(id, 1, data.clone()))
    }

    fn update_employee(
        &self,
        id: EmployeeId,
        expected_version: i64,
        data: &EmployeeData,
    ) -> RepoResult<UpdateOutcome> {
        let changed = self.conn.execute(
            "UPDATE employees
             SET
                name = ?1,
                address = ?2,
                dob = ?3,
                salary = ?4,
                is_active = ?5,
                row_version = row_version + 1
             WHERE id = ?6
               AND row_version = ?7;",
            params![
                data.name.as_str(),
                data.address.as_str(),
                dob_to_db(data.dob),
                data.salary.to_string(),
                bool_to_int(data.is_active),
                id,
                expected_version,
            ],
        )?;

        if changed == 0 {
            // Either the row vanished or someone else bumped its version.
            return if self.employee_exists(id)? {
                Ok(UpdateOutcome::Conflict(id))
            } else {
                Ok(UpdateOutcome::NotFound(id))
            };
        }

        Ok(UpdateOutcome::Updated(Employee::from_data(
            id,
            expected_version + 1,
            data.clone(),
        )))
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM employees WHERE id = ?1;", [id], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(found.is_some())
    }
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let id: EmployeeId = row.get("id")?;

    let dob_text: String = row.get("dob")?;
    let dob = NaiveDate::parse_from_str(&dob_text, DOB_STORAGE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid dob value `{dob_text}` in employees.dob (id={id})"))
    })?;

    let salary_text: String = row.get("salary")?;
    let salary = Decimal::from_str(&salary_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid salary value `{salary_text}` in employees.salary (id={id})"
        ))
    })?;

    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in employees.is_active (id={id})"
            )));
        }
    };

    Ok(Employee {
        id,
        name: row.get("name")?,
        address: row.get("address")?,
        dob,
        salary,
        is_active,
        row_version: row.get("row_version")?,
    })
}

fn ensure_employee_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "employees")? {
        return Err(RepoError::MissingRequiredTable("employees"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "employees", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "employees",
                column,
            });
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

fn dob_to_db(dob: NaiveDate) -> String {
    dob.format(DOB_STORAGE_FORMAT).to_string()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
