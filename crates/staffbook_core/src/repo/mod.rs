//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repositories only accept already-validated `EmployeeData` for writes.
//! - Repository construction fails on unmigrated or foreign schemas.

pub mod employee_repo;
