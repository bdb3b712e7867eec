//! Field-level validation errors.
//!
//! Errors are collected, not short-circuited, so a form can be redisplayed
//! with every problem marked next to its field.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Business fields that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmployeeField {
    Name,
    Address,
    Dob,
    Salary,
    IsActive,
}

impl EmployeeField {
    pub const ALL: [EmployeeField; 5] = [
        Self::Name,
        Self::Address,
        Self::Dob,
        Self::Salary,
        Self::IsActive,
    ];

    fn required_message(self) -> &'static str {
        match self {
            Self::Name => "Name is required.",
            Self::Address => "Address is required.",
            Self::Dob => "DOB is required.",
            Self::Salary => "Salary is required.",
            Self::IsActive => "Active State is required.",
        }
    }
}

impl Display for EmployeeField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let key = match self {
            Self::Name => "Name",
            Self::Address => "Address",
            Self::Dob => "Dob",
            Self::Salary => "Salary",
            Self::IsActive => "IsActive",
        };
        f.write_str(key)
    }
}

/// Category of a field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Required value left empty or unset.
    MissingField,
    /// Text value longer than the column allows.
    TooLong,
    /// Value could not be parsed or has an unsupported shape.
    InvalidFormat,
    /// Another employee already uses this name.
    DuplicateName,
    /// Date of birth outside `[1950-01-01, today]`.
    InvalidDob,
    /// Salary outside `[100, 50000]`.
    InvalidSalary,
}

impl FieldErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::TooLong => "too_long",
            Self::InvalidFormat => "invalid_format",
            Self::DuplicateName => "duplicate_name",
            Self::InvalidDob => "invalid_dob",
            Self::InvalidSalary => "invalid_salary",
        }
    }
}

/// One validation failure attributed to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: EmployeeField,
    pub kind: FieldErrorKind,
    /// User-facing message shown next to the field.
    pub message: String,
}

impl FieldError {
    fn new(field: EmployeeField, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }

    pub fn missing(field: EmployeeField) -> Self {
        Self::new(field, FieldErrorKind::MissingField, field.required_message())
    }

    pub fn duplicate_name() -> Self {
        Self::new(
            EmployeeField::Name,
            FieldErrorKind::DuplicateName,
            "Employee with this name already exists.",
        )
    }

    pub fn invalid_dob() -> Self {
        Self::new(
            EmployeeField::Dob,
            FieldErrorKind::InvalidDob,
            "DOB must be in the range 01/01/1950 until today's date.",
        )
    }

    pub fn invalid_salary() -> Self {
        Self::new(
            EmployeeField::Salary,
            FieldErrorKind::InvalidSalary,
            "Salary must be between 100 and 50000.",
        )
    }

    pub fn too_long(field: EmployeeField, max_chars: usize) -> Self {
        Self::new(
            field,
            FieldErrorKind::TooLong,
            format!("{field} must be at most {max_chars} characters."),
        )
    }

    pub fn invalid_format(field: EmployeeField, message: impl Into<String>) -> Self {
        Self::new(field, FieldErrorKind::InvalidFormat, message)
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered collection of field errors for one candidate record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Appends errors from `other` for fields that have no error yet.
    ///
    /// Used when a form value failed to parse: the later rule pass sees that
    /// field as unset and would otherwise add a second `MissingField`.
    pub fn extend_unflagged(&mut self, other: ValidationErrors) {
        let flagged: Vec<EmployeeField> = EmployeeField::ALL
            .into_iter()
            .filter(|field| self.has_field(*field))
            .collect();
        self.errors.extend(
            other
                .errors
                .into_iter()
                .filter(|error| !flagged.contains(&error.field)),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Whether `field` already has at least one error.
    pub fn has_field(&self, field: EmployeeField) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// Whether any error of `kind` was recorded.
    pub fn has_kind(&self, kind: FieldErrorKind) -> bool {
        self.errors.iter().any(|error| error.kind == kind)
    }

    /// Messages for one field, in insertion order.
    pub fn messages_for(&self, field: EmployeeField) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|error| error.field == field)
            .map(|error| error.message.as_str())
            .collect()
    }

    /// Comma-separated kind codes, for log events.
    pub fn codes(&self) -> String {
        self.errors
            .iter()
            .map(|error| error.kind.code())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
