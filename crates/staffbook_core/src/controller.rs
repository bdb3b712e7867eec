//! Request-handler layer for employee screens.
//!
//! # Responsibility
//! - Map each screen action (index, details, create, edit, delete) onto the
//!   service and return a typed `ActionResult` for a front end to render.
//! - Turn store failures into a `Problem` result instead of propagating them.
//!
//! # Invariants
//! - Actions never panic and never return `Err`; every outcome is a variant.
//! - Invalid submissions come back with the form exactly as submitted.
//! - A missing or mismatched id is always `NotFound`.

use crate::config::ListingPolicy;
use crate::model::employee::{Employee, EmployeeId, EmployeeInput};
use crate::model::form::EmployeeForm;
use crate::model::validation::ValidationErrors;
use crate::repo::employee_repo::{EmployeeRepository, UpdateOutcome};
use crate::service::employee_service::{EmployeeService, ServiceError};
use serde::Serialize;
use std::fmt::Display;

/// Outcome of one controller action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ActionResult {
    /// Employee listing.
    Index {
        employees: Vec<Employee>,
        listing: ListingPolicy,
    },
    /// Read-only view of one employee.
    Details { employee: Employee },
    /// Empty create form.
    CreateForm { form: EmployeeForm },
    /// Edit form pre-filled from the stored record.
    EditForm { form: EmployeeForm },
    /// Delete confirmation view.
    DeleteConfirm { employee: Employee },
    /// Write succeeded; show the listing.
    RedirectToIndex,
    /// Submission rejected; redisplay the form with field errors.
    Invalid {
        form: EmployeeForm,
        errors: ValidationErrors,
    },
    NotFound,
    /// Row changed since the edit form was loaded.
    Conflict { id: EmployeeId },
    /// Store unavailable or misconfigured.
    Problem { message: String },
}

impl ActionResult {
    /// `Problem` result for a store that cannot serve the request.
    pub fn unavailable(reason: impl Display) -> Self {
        Self::Problem {
            message: format!("Entity set 'employees' is unavailable: {reason}"),
        }
    }

    /// Whether the action completed without a failure outcome.
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            Self::Invalid { .. } | Self::NotFound | Self::Conflict { .. } | Self::Problem { .. }
        )
    }
}

/// Employee screen controller over an injected service.
pub struct EmployeeController<R: EmployeeRepository> {
    service: EmployeeService<R>,
}

impl<R: EmployeeRepository> EmployeeController<R> {
    pub fn new(service: EmployeeService<R>) -> Self {
        Self { service }
    }

    /// Lists employees using the service listing policy.
    pub fn index(&self) -> ActionResult {
        match self.service.list() {
            Ok(employees) => ActionResult::Index {
                employees,
                listing: self.service.listing(),
            },
            Err(err) => problem(&err),
        }
    }

    pub fn details(&self, id: Option<EmployeeId>) -> ActionResult {
        self.with_employee(id, |employee| ActionResult::Details { employee })
    }

    pub fn create_form(&self) -> ActionResult {
        ActionResult::CreateForm {
            form: EmployeeForm::default(),
        }
    }

    /// Validates and stores a new employee.
    pub fn create(&self, form: EmployeeForm) -> ActionResult {
        let (input, parse_errors) = form.parse();
        if !parse_errors.is_empty() {
            return self.reject_unparsed(form, &input, parse_errors, None);
        }

        match self.service.create(&input) {
            Ok(_) => ActionResult::RedirectToIndex,
            Err(err) => self.write_failure(form, err),
        }
    }

    pub fn edit_form(&self, id: Option<EmployeeId>) -> ActionResult {
        self.with_employee(id, |employee| ActionResult::EditForm {
            form: EmployeeForm::from_employee(&employee),
        })
    }

    /// Validates and replaces an existing employee.
    ///
    /// A form carrying an id different from `id` is `NotFound`. The form's
    /// `row_version`, when present, is the version the caller edited.
    pub fn edit(&self, id: EmployeeId, form: EmployeeForm) -> ActionResult {
        if form.id.is_some_and(|form_id| form_id != id) {
            return ActionResult::NotFound;
        }

        let (input, parse_errors) = form.parse();
        if !parse_errors.is_empty() {
            return match self.service.get(id) {
                Ok(_) => self.reject_unparsed(form, &input, parse_errors, Some(id)),
                Err(err) => self.write_failure(form, err),
            };
        }

        match self.service.update(id, &input, form.row_version) {
            Ok(UpdateOutcome::Updated(_)) => ActionResult::RedirectToIndex,
            Ok(UpdateOutcome::NotFound(_)) => ActionResult::NotFound,
            Ok(UpdateOutcome::Conflict(id)) => ActionResult::Conflict { id },
            Err(err) => self.write_failure(form, err),
        }
    }

    pub fn delete_confirm(&self, id: Option<EmployeeId>) -> ActionResult {
        self.with_employee(id, |employee| ActionResult::DeleteConfirm { employee })
    }

    /// Deletes an employee; a missing id still redirects.
    pub fn delete_confirmed(&self, id: EmployeeId) -> ActionResult {
        match self.service.delete(id) {
            Ok(()) => ActionResult::RedirectToIndex,
            Err(err) => problem(&err),
        }
    }

    fn with_employee(
        &self,
        id: Option<EmployeeId>,
        render: impl FnOnce(Employee) -> ActionResult,
    ) -> ActionResult {
        let Some(id) = id else {
            return ActionResult::NotFound;
        };
        match self.service.get(id) {
            Ok(employee) => render(employee),
            Err(ServiceError::NotFound(_)) => ActionResult::NotFound,
            Err(err) => problem(&err),
        }
    }

    // Parse failures leave fields unset; run the remaining rules so the form
    // shows every problem, without doubling up on the unparsed fields.
    fn reject_unparsed(
        &self,
        form: EmployeeForm,
        input: &EmployeeInput,
        mut errors: ValidationErrors,
        editing: Option<EmployeeId>,
    ) -> ActionResult {
        match self.service.validate(input, editing) {
            Ok(_) => {}
            Err(ServiceError::Validation(rejection)) => errors.extend_unflagged(rejection.errors),
            Err(err) => return problem(&err),
        }
        ActionResult::Invalid { form, errors }
    }

    fn write_failure(&self, form: EmployeeForm, err: ServiceError) -> ActionResult {
        match err {
            ServiceError::Validation(rejection) => ActionResult::Invalid {
                form,
                errors: rejection.errors,
            },
            ServiceError::NotFound(_) => ActionResult::NotFound,
            other => problem(&other),
        }
    }
}

fn problem(err: &ServiceError) -> ActionResult {
    ActionResult::unavailable(err)
}
