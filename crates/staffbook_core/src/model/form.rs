//! Raw form binding for create/edit flows.
//!
//! # Responsibility
//! - Carry submitted text values exactly as received.
//! - Convert them into a typed `EmployeeInput`, reporting unparseable values
//!   per field.
//!
//! # Invariants
//! - Blank values bind to `None`; the rule pass reports them as missing.
//! - Parsing never substitutes defaults for bad input.

use crate::model::employee::{Employee, EmployeeId, EmployeeInput};
use crate::model::validation::{EmployeeField, FieldError, ValidationErrors};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

static PLAIN_DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").expect("valid decimal regex"));

/// Why a text value did not bind to a decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecimalParseError {
    #[error("not a plain decimal number")]
    Malformed,
    /// Plain notation, but the magnitude does not fit a `Decimal`.
    #[error("decimal magnitude out of range")]
    Overflow,
}

/// Submitted employee form.
///
/// `id` and `row_version` are the hidden fields of an edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeForm {
    pub id: Option<EmployeeId>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub dob: Option<String>,
    pub salary: Option<String>,
    pub is_active: Option<String>,
    pub row_version: Option<i64>,
}

impl EmployeeForm {
    /// Pre-fills a form from a persisted record (edit view).
    pub fn from_employee(employee: &Employee) -> Self {
        Self {
            id: Some(employee.id),
            name: Some(employee.name.clone()),
            address: Some(employee.address.clone()),
            dob: Some(employee.dob.format("%Y-%m-%d").to_string()),
            salary: Some(employee.salary.to_string()),
            is_active: Some(employee.is_active.to_string()),
            row_version: Some(employee.row_version),
        }
    }

    /// Binds text values to typed input.
    ///
    /// Returns the bound input together with format errors; a field that
    /// failed to parse is left as `None` in the input.
    pub fn parse(&self) -> (EmployeeInput, ValidationErrors) {
        let mut errors = ValidationErrors::new();

        let dob = non_blank(self.dob.as_deref()).and_then(|raw| match parse_date(raw) {
            Some(date) => Some(date),
            None => {
                errors.push(FieldError::invalid_format(
                    EmployeeField::Dob,
                    "DOB must be a date (YYYY-MM-DD or MM/DD/YYYY).",
                ));
                None
            }
        });

        let salary = non_blank(self.salary.as_deref()).and_then(|raw| match parse_decimal(raw) {
            Ok(value) => Some(value),
            Err(DecimalParseError::Overflow) => {
                errors.push(FieldError::invalid_salary());
                None
            }
            Err(DecimalParseError::Malformed) => {
                errors.push(FieldError::invalid_format(
                    EmployeeField::Salary,
                    "Salary must be a decimal number.",
                ));
                None
            }
        });

        let is_active =
            non_blank(self.is_active.as_deref()).and_then(|raw| match parse_flag(raw) {
                Some(flag) => Some(flag),
                None => {
                    errors.push(FieldError::invalid_format(
                        EmployeeField::IsActive,
                        "Active State must be true or false.",
                    ));
                    None
                }
            });

        let input = EmployeeInput {
            name: self.name.clone(),
            address: self.address.clone(),
            dob,
            salary,
            is_active,
        };
        (input, errors)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Accepts ISO dates and the `MM/DD/YYYY` display format.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Accepts plain decimal notation only (no exponent, no separators).
///
/// Well-formed numbers too large for `Decimal` are `Overflow`, not `Malformed`.
pub fn parse_decimal(raw: &str) -> Result<Decimal, DecimalParseError> {
    if !PLAIN_DECIMAL_RE.is_match(raw) {
        return Err(DecimalParseError::Malformed);
    }
    Decimal::from_str(raw).map_err(|_| DecimalParseError::Overflow)
}

/// Accepts the usual checkbox/flag spellings, case-insensitively.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_date, parse_decimal, parse_flag, DecimalParseError, EmployeeForm};
    use crate::model::validation::{EmployeeField, FieldErrorKind};
    use chrono::NaiveDate;

    #[test]
    fn parse_date_accepts_iso_and_us_formats() {
        let expected = NaiveDate::from_ymd_opt(1990, 5, 1);
        assert_eq!(parse_date("1990-05-01"), expected);
        assert_eq!(parse_date("05/01/1990"), expected);
        assert_eq!(parse_date("1990/05/01"), None);
    }

    #[test]
    fn parse_decimal_rejects_exponent_and_separators() {
        assert!(parse_decimal("5000.50").is_ok());
        assert_eq!(parse_decimal("1e3"), Err(DecimalParseError::Malformed));
        assert_eq!(parse_decimal("5,000"), Err(DecimalParseError::Malformed));
        assert_eq!(parse_decimal("5_000"), Err(DecimalParseError::Malformed));
    }

    #[test]
    fn oversized_salary_binds_as_out_of_range() {
        let huge = "9".repeat(32);
        assert_eq!(parse_decimal(&huge), Err(DecimalParseError::Overflow));

        let form = EmployeeForm {
            salary: Some(huge),
            ..EmployeeForm::default()
        };
        let (input, errors) = form.parse();
        assert_eq!(input.salary, None);
        assert_eq!(errors.len(), 1);
        assert!(errors.has_kind(FieldErrorKind::InvalidSalary));
    }

    #[test]
    fn parse_flag_accepts_checkbox_values() {
        assert_eq!(parse_flag("on"), Some(true));
        assert_eq!(parse_flag("FALSE"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn blank_values_bind_to_none_without_format_errors() {
        let form = EmployeeForm {
            dob: Some("  ".to_string()),
            salary: Some(String::new()),
            ..EmployeeForm::default()
        };
        let (input, errors) = form.parse();
        assert!(errors.is_empty());
        assert_eq!(input.dob, None);
        assert_eq!(input.salary, None);
    }

    #[test]
    fn unparseable_values_are_reported_per_field() {
        let form = EmployeeForm {
            dob: Some("yesterday".to_string()),
            salary: Some("lots".to_string()),
            is_active: Some("maybe".to_string()),
            ..EmployeeForm::default()
        };
        let (_, errors) = form.parse();
        assert_eq!(errors.len(), 3);
        assert!(errors.has_field(EmployeeField::Dob));
        assert!(errors.has_field(EmployeeField::Salary));
        assert!(errors.has_field(EmployeeField::IsActive));
        assert!(errors
            .iter()
            .all(|error| error.kind == FieldErrorKind::InvalidFormat));
    }
}
