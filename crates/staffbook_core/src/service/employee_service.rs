//! Employee use-case service.
//!
//! # Responsibility
//! - Validate candidate employees against every business rule, including
//!   name uniqueness which needs the store.
//! - Orchestrate create/update/delete against an injected repository.
//!
//! # Invariants
//! - Rejected input never reaches the repository write path.
//! - Accepted input is stored exactly as received.
//! - Update conflicts are reported as `UpdateOutcome::Conflict`, never
//!   retried or merged.
//! - Deleting a missing id is a successful no-op.

use crate::config::ListingPolicy;
use crate::model::employee::{Employee, EmployeeData, EmployeeId, EmployeeInput};
use crate::model::validation::{FieldError, ValidationErrors};
use crate::repo::employee_repo::{
    EmployeeListQuery, EmployeeRepository, RepoError, UpdateOutcome,
};
use chrono::{Local, NaiveDate};
use log::{debug, error, info, warn};
use std::time::Instant;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Candidate input handed back together with its field errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub input: EmployeeInput,
    pub errors: ValidationErrors,
}

/// Service error for employee use-cases.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed one or more field rules; nothing was written.
    #[error("employee rejected: {}", .0.errors)]
    Validation(Box<Rejection>),
    /// Target employee does not exist.
    #[error("employee not found: {0}")]
    NotFound(EmployeeId),
    /// Store is unreachable, unmigrated or holds malformed rows.
    #[error("employee store unavailable: {0}")]
    StoreUnavailable(#[from] RepoError),
}

impl ServiceError {
    /// Stable error code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    fn rejected(input: &EmployeeInput, errors: ValidationErrors) -> Self {
        Self::Validation(Box::new(Rejection {
            input: input.clone(),
            errors,
        }))
    }
}

/// Employee service facade over repository implementations.
pub struct EmployeeService<R: EmployeeRepository> {
    repo: R,
    listing: ListingPolicy,
    fixed_today: Option<NaiveDate>,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    /// Creates a service using the provided repository and listing policy.
    pub fn new(repo: R, listing: ListingPolicy) -> Self {
        Self {
            repo,
            listing,
            fixed_today: None,
        }
    }

    /// Pins the date used as "today" by the birth date rule.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn listing(&self) -> ListingPolicy {
        self.listing
    }

    /// Upper bound for `dob`: pinned date, or the local calendar date.
    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Lists employees according to the configured listing policy.
    pub fn list(&self) -> ServiceResult<Vec<Employee>> {
        let query = EmployeeListQuery {
            active_only: self.listing == ListingPolicy::ActiveOnly,
        };
        let employees = self.repo.list_employees(&query).inspect_err(|err| {
            error!(
                "event=employee_list module=service status=error error_code={}",
                err.code()
            );
        })?;
        debug!(
            "event=employee_list module=service status=ok listing={} count={}",
            self.listing,
            employees.len()
        );
        Ok(employees)
    }

    /// Gets one employee by id.
    pub fn get(&self, id: EmployeeId) -> ServiceResult<Employee> {
        self.repo
            .get_employee(id)?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Runs every rule against `input` without writing anything.
    ///
    /// `editing` names the row being edited so it does not collide with its
    /// own name.
    pub fn validate(
        &self,
        input: &EmployeeInput,
        editing: Option<EmployeeId>,
    ) -> ServiceResult<EmployeeData> {
        let mut errors = ValidationErrors::new();

        if let Some(name) = input.name.as_deref().filter(|name| !name.trim().is_empty()) {
            if self.repo.name_taken(name, editing)? {
                errors.push(FieldError::duplicate_name());
            }
        }

        match input.check(self.today()) {
            Ok(data) if errors.is_empty() => Ok(data),
            Ok(_) => Err(ServiceError::rejected(input, errors)),
            Err(rule_errors) => {
                for rule_error in rule_errors {
                    errors.push(rule_error);
                }
                Err(ServiceError::rejected(input, errors))
            }
        }
    }

    /// Creates a new employee and returns it with its assigned id.
    pub fn create(&self, input: &EmployeeInput) -> ServiceResult<Employee> {
        let started_at = Instant::now();
        let data = self.validate(input, None).inspect_err(|err| {
            log_rejection("employee_create", None, err);
        })?;

        let employee = self.repo.insert_employee(&data).inspect_err(|err| {
            error!(
                "event=employee_create module=service status=error error_code={}",
                err.code()
            );
        })?;

        info!(
            "event=employee_create module=service status=ok employee_id={} duration_ms={}",
            employee.id,
            started_at.elapsed().as_millis()
        );
        Ok(employee)
    }

    /// Replaces every business field of an existing employee.
    ///
    /// # Contract
    /// - Missing row: `UpdateOutcome::NotFound`, checked before validation.
    /// - Invalid input: `ServiceError::Validation`, nothing written.
    /// - `expected_version` is the version the caller read; when `None` the
    ///   version read here is used.
    /// - Version mismatch: existence is re-checked once, yielding `NotFound`
    ///   for a vanished row and `Conflict` otherwise.
    pub fn update(
        &self,
        id: EmployeeId,
        input: &EmployeeInput,
        expected_version: Option<i64>,
    ) -> ServiceResult<UpdateOutcome> {
        let started_at = Instant::now();
        let Some(current) = self.repo.get_employee(id)? else {
            warn!(
                "event=employee_update module=service status=not_found employee_id={id}"
            );
            return Ok(UpdateOutcome::NotFound(id));
        };

        let data = self.validate(input, Some(id)).inspect_err(|err| {
            log_rejection("employee_update", Some(id), err);
        })?;

        let expected_version = expected_version.unwrap_or(current.row_version);
        let outcome = self
            .repo
            .update_employee(id, expected_version, &data)
            .inspect_err(|err| {
                error!(
                    "event=employee_update module=service status=error employee_id={} error_code={}",
                    id,
                    err.code()
                );
            })?;

        match &outcome {
            UpdateOutcome::Updated(employee) => info!(
                "event=employee_update module=service status=ok employee_id={} row_version={} duration_ms={}",
                id,
                employee.row_version,
                started_at.elapsed().as_millis()
            ),
            UpdateOutcome::NotFound(_) => warn!(
                "event=employee_update module=service status=not_found employee_id={id}"
            ),
            UpdateOutcome::Conflict(_) => warn!(
                "event=employee_update module=service status=conflict employee_id={} expected_version={} error_code=stale_write",
                id, expected_version
            ),
        }
        Ok(outcome)
    }

    /// Deletes an employee; a missing id is a successful no-op.
    pub fn delete(&self, id: EmployeeId) -> ServiceResult<()> {
        let removed = self.repo.delete_employee(id).inspect_err(|err| {
            error!(
                "event=employee_delete module=service status=error employee_id={} error_code={}",
                id,
                err.code()
            );
        })?;
        info!(
            "event=employee_delete module=service status=ok employee_id={id} removed={removed}"
        );
        Ok(())
    }
}

fn log_rejection(event: &str, id: Option<EmployeeId>, err: &ServiceError) {
    let id = id.map_or_else(|| "none".to_string(), |id| id.to_string());
    match err {
        ServiceError::Validation(rejection) => warn!(
            "event={} module=service status=rejected employee_id={} error_code=validation_failed fields={}",
            event,
            id,
            rejection.errors.codes()
        ),
        other => error!(
            "event={} module=service status=error employee_id={} error_code={}",
            event,
            id,
            other.code()
        ),
    }
}
