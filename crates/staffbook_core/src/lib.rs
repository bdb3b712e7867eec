//! Core domain logic for Staffbook employee records.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{default_log_level, parse_log_level, ConfigError, CoreConfig, ListingPolicy};
pub use controller::{ActionResult, EmployeeController};
pub use logging::{init_logging, LoggingError};
pub use model::employee::{Employee, EmployeeData, EmployeeId, EmployeeInput};
pub use model::form::EmployeeForm;
pub use model::validation::{EmployeeField, FieldError, FieldErrorKind, ValidationErrors};
pub use repo::employee_repo::{
    EmployeeListQuery, EmployeeRepository, RepoError, RepoResult, SqliteEmployeeRepository,
    UpdateOutcome,
};
pub use service::employee_service::{EmployeeService, Rejection, ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
