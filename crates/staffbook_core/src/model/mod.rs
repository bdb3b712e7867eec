//! Domain model for employee records.
//!
//! # Responsibility
//! - Define the persisted `Employee` record and the inbound shapes used by
//!   create/edit flows.
//! - Own the field-level validation rules that do not need storage access.
//!
//! # Invariants
//! - Every persisted employee is identified by a store-assigned `EmployeeId`.
//! - Inbound data is never repaired: invalid values are reported per field.

pub mod employee;
pub mod form;
pub mod validation;
