//! Employee domain model.
//!
//! # Responsibility
//! - Define the persisted employee record and its validated payload.
//! - Apply the storage-independent business rules to inbound data.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - `row_version` is owned by the store; callers only echo it back.
//! - `dob` lies within `[1950-01-01, today]` and `salary` within
//!   `[100, 50000]` with at most two fractional digits.

use crate::model::validation::{EmployeeField, FieldError, ValidationErrors};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store-assigned primary key.
pub type EmployeeId = i64;

pub const NAME_MAX_CHARS: usize = 100;
pub const ADDRESS_MAX_CHARS: usize = 200;
/// Matches the `decimal(18, 2)` salary column.
pub const SALARY_MAX_SCALE: u32 = 2;
pub const SALARY_MIN: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
pub const SALARY_MAX: Decimal = Decimal::from_parts(50_000, 0, 0, false, 0);

/// Earliest accepted date of birth.
pub static MIN_DOB: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(1950, 1, 1).expect("valid minimum dob"));

/// Persisted employee row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub address: String,
    pub dob: NaiveDate,
    pub salary: Decimal,
    pub is_active: bool,
    /// Optimistic concurrency token, bumped on every update.
    pub row_version: i64,
}

impl Employee {
    /// Builds a persisted record from store-managed identity and a payload.
    pub fn from_data(id: EmployeeId, row_version: i64, data: EmployeeData) -> Self {
        Self {
            id,
            name: data.name,
            address: data.address,
            dob: data.dob,
            salary: data.salary,
            is_active: data.is_active,
            row_version,
        }
    }
}

/// Fully populated, rule-checked employee payload ready for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeData {
    pub name: String,
    pub address: String,
    pub dob: NaiveDate,
    pub salary: Decimal,
    pub is_active: bool,
}

/// Candidate employee as received from a caller.
///
/// Every field is optional so an unset required value can be reported as
/// `MissingField` instead of being defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub salary: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl EmployeeInput {
    /// Applies every storage-independent rule and collects all failures.
    ///
    /// Name uniqueness needs the store and is checked by the service.
    /// Accepted values are passed through unchanged (no trimming, no rounding).
    pub fn check(&self, today: NaiveDate) -> Result<EmployeeData, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = required_text(
            &mut errors,
            EmployeeField::Name,
            self.name.as_deref(),
            NAME_MAX_CHARS,
        );
        let address = required_text(
            &mut errors,
            EmployeeField::Address,
            self.address.as_deref(),
            ADDRESS_MAX_CHARS,
        );

        match self.dob {
            None => errors.push(FieldError::missing(EmployeeField::Dob)),
            Some(dob) if !dob_in_range(dob, today) => errors.push(FieldError::invalid_dob()),
            Some(_) => {}
        }

        match self.salary {
            None => errors.push(FieldError::missing(EmployeeField::Salary)),
            Some(salary) if !salary_in_range(salary) => {
                errors.push(FieldError::invalid_salary());
            }
            Some(salary) if salary.normalize().scale() > SALARY_MAX_SCALE => {
                errors.push(FieldError::invalid_format(
                    EmployeeField::Salary,
                    "Salary must have at most two decimal places.",
                ));
            }
            Some(_) => {}
        }

        if self.is_active.is_none() {
            errors.push(FieldError::missing(EmployeeField::IsActive));
        }

        if let (Some(name), Some(address), Some(dob), Some(salary), Some(is_active)) =
            (name, address, self.dob, self.salary, self.is_active)
        {
            if errors.is_empty() {
                return Ok(EmployeeData {
                    name,
                    address,
                    dob,
                    salary,
                    is_active,
                });
            }
        }

        Err(errors)
    }
}

impl From<&Employee> for EmployeeInput {
    fn from(employee: &Employee) -> Self {
        Self {
            name: Some(employee.name.clone()),
            address: Some(employee.address.clone()),
            dob: Some(employee.dob),
            salary: Some(employee.salary),
            is_active: Some(employee.is_active),
        }
    }
}

impl From<EmployeeData> for EmployeeInput {
    fn from(data: EmployeeData) -> Self {
        Self {
            name: Some(data.name),
            address: Some(data.address),
            dob: Some(data.dob),
            salary: Some(data.salary),
            is_active: Some(data.is_active),
        }
    }
}

/// Inclusive `[1950-01-01, today]` check.
fn dob_in_range(dob: NaiveDate, today: NaiveDate) -> bool {
    dob >= *MIN_DOB && dob <= today
}

/// Inclusive `[100, 50000]` check.
fn salary_in_range(salary: Decimal) -> bool {
    salary >= SALARY_MIN && salary <= SALARY_MAX
}

fn required_text(
    errors: &mut ValidationErrors,
    field: EmployeeField,
    value: Option<&str>,
    max_chars: usize,
) -> Option<String> {
    match value {
        None => {
            errors.push(FieldError::missing(field));
            None
        }
        Some(text) if text.trim().is_empty() => {
            errors.push(FieldError::missing(field));
            None
        }
        Some(text) if text.chars().count() > max_chars => {
            errors.push(FieldError::too_long(field, max_chars));
            None
        }
        Some(text) => Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{dob_in_range, salary_in_range, EmployeeInput, MIN_DOB};
    use crate::model::validation::{EmployeeField, FieldErrorKind};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dob_bounds_are_inclusive() {
        let today = date(2024, 6, 1);
        assert!(dob_in_range(*MIN_DOB, today));
        assert!(dob_in_range(today, today));
        assert!(!dob_in_range(date(1949, 12, 31), today));
        assert!(!dob_in_range(date(2024, 6, 2), today));
    }

    #[test]
    fn salary_bounds_are_inclusive() {
        assert!(salary_in_range(Decimal::from(100)));
        assert!(salary_in_range(Decimal::from(50_000)));
        assert!(!salary_in_range(Decimal::from_str("99.99").unwrap()));
        assert!(!salary_in_range(Decimal::from_str("50000.01").unwrap()));
    }

    #[test]
    fn whitespace_only_name_is_missing() {
        let input = EmployeeInput {
            name: Some("   ".to_string()),
            ..EmployeeInput::default()
        };
        let errors = input.check(date(2024, 6, 1)).unwrap_err();
        assert_eq!(
            errors.messages_for(EmployeeField::Name),
            vec!["Name is required."]
        );
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn salary_with_three_significant_decimals_is_rejected() {
        let input = EmployeeInput {
            name: Some("Ann".to_string()),
            address: Some("2 Side St".to_string()),
            dob: Some(date(1980, 1, 1)),
            salary: Some(Decimal::from_str("1000.005").unwrap()),
            is_active: Some(true),
        };
        let errors = input.check(date(2024, 6, 1)).unwrap_err();
        assert!(errors.has_kind(FieldErrorKind::InvalidFormat));

        let padded = EmployeeInput {
            salary: Some(Decimal::from_str("1000.500").unwrap()),
            ..input
        };
        assert!(padded.check(date(2024, 6, 1)).is_ok());
    }

    #[test]
    fn out_of_range_salary_wins_over_precision() {
        let input = EmployeeInput {
            name: Some("Ann".to_string()),
            address: Some("2 Side St".to_string()),
            dob: Some(date(1980, 1, 1)),
            salary: Some(Decimal::from_str("50000.005").unwrap()),
            is_active: Some(true),
        };
        let errors = input.check(date(2024, 6, 1)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.has_kind(FieldErrorKind::InvalidSalary));
    }
}
