use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use staffbook_core::db::open_db_in_memory;
use staffbook_core::{
    EmployeeField, EmployeeInput, EmployeeService, FieldErrorKind, ListingPolicy, ServiceError,
    SqliteEmployeeRepository, UpdateOutcome,
};
use std::str::FromStr;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn service(conn: &Connection, listing: ListingPolicy) -> EmployeeService<SqliteEmployeeRepository<'_>> {
    let repo = SqliteEmployeeRepository::try_new(conn).unwrap();
    EmployeeService::new(repo, listing).with_today(today())
}

fn input(name: &str) -> EmployeeInput {
    EmployeeInput {
        name: Some(name.to_string()),
        address: Some("1 Main St".to_string()),
        dob: NaiveDate::from_ymd_opt(1990, 5, 1),
        salary: Some(Decimal::from(5000)),
        is_active: Some(true),
    }
}

fn rejected_kinds(err: ServiceError) -> Vec<FieldErrorKind> {
    match err {
        ServiceError::Validation(rejection) => {
            rejection.errors.iter().map(|error| error.kind).collect()
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn create_assigns_fresh_ids_to_valid_employees() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);

    let first = service.create(&input("Alice")).unwrap();
    let second = service.create(&input("Bob")).unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(service.get(second.id).unwrap(), second);
}

#[test]
fn create_rejects_dob_outside_window() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);

    for dob in [
        NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(1949, 12, 31).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
        NaiveDate::from_ymd_opt(2100, 1, 1).unwrap(),
    ] {
        let candidate = EmployeeInput {
            dob: Some(dob),
            ..input("Alice")
        };
        let err = service.create(&candidate).unwrap_err();
        assert_eq!(rejected_kinds(err), vec![FieldErrorKind::InvalidDob], "dob {dob}");
    }
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn create_accepts_dob_on_both_bounds() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);

    let oldest = EmployeeInput {
        dob: NaiveDate::from_ymd_opt(1950, 1, 1),
        ..input("Oldest")
    };
    let youngest = EmployeeInput {
        dob: Some(today()),
        ..input("Youngest")
    };
    service.create(&oldest).unwrap();
    service.create(&youngest).unwrap();
}

#[test]
fn create_rejects_salary_outside_range() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);

    for salary in ["0", "99", "99.99", "99.999", "50000.01", "50000.005", "60000"] {
        let candidate = EmployeeInput {
            salary: Some(Decimal::from_str(salary).unwrap()),
            ..input("Alice")
        };
        let err = service.create(&candidate).unwrap_err();
        assert_eq!(
            rejected_kinds(err),
            vec![FieldErrorKind::InvalidSalary],
            "salary {salary}"
        );
    }
}

#[test]
fn second_employee_with_same_name_is_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);

    service.create(&input("Alice")).unwrap();
    let err = service.create(&input("Alice")).unwrap_err();
    match err {
        ServiceError::Validation(rejection) => {
            assert_eq!(rejection.input, input("Alice"));
            assert_eq!(
                rejection.errors.messages_for(EmployeeField::Name),
                vec!["Employee with this name already exists."]
            );
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(service.create(&input("alice")).is_ok());
}

#[test]
fn all_failures_are_reported_together() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);
    service.create(&input("Alice")).unwrap();

    let candidate = EmployeeInput {
        address: None,
        dob: NaiveDate::from_ymd_opt(1940, 1, 1),
        salary: Some(Decimal::from(10)),
        ..input("Alice")
    };
    let kinds = rejected_kinds(service.create(&candidate).unwrap_err());
    assert_eq!(
        kinds,
        vec![
            FieldErrorKind::DuplicateName,
            FieldErrorKind::MissingField,
            FieldErrorKind::InvalidDob,
            FieldErrorKind::InvalidSalary,
        ]
    );
}

#[test]
fn update_missing_employee_is_not_found_even_with_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);

    let outcome = service.update(5, &input("Ghost"), None).unwrap();
    assert_eq!(outcome, UpdateOutcome::NotFound(5));

    let outcome = service.update(5, &EmployeeInput::default(), None).unwrap();
    assert_eq!(outcome, UpdateOutcome::NotFound(5));
}

#[test]
fn update_keeping_own_name_is_not_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);
    let alice = service.create(&input("Alice")).unwrap();
    service.create(&input("Bob")).unwrap();

    let raise = EmployeeInput {
        salary: Some(Decimal::from(6000)),
        ..input("Alice")
    };
    let outcome = service.update(alice.id, &raise, None).unwrap();
    match outcome {
        UpdateOutcome::Updated(updated) => {
            assert_eq!(updated.salary, Decimal::from(6000));
            assert_eq!(updated.row_version, 2);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let rename = input("Bob");
    let kinds = rejected_kinds(service.update(alice.id, &rename, None).unwrap_err());
    assert_eq!(kinds, vec![FieldErrorKind::DuplicateName]);
}

#[test]
fn update_from_stale_read_is_conflict() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);
    let alice = service.create(&input("Alice")).unwrap();

    let first_edit = EmployeeInput {
        address: Some("2 Side St".to_string()),
        ..input("Alice")
    };
    service
        .update(alice.id, &first_edit, Some(alice.row_version))
        .unwrap();

    let second_edit = EmployeeInput {
        address: Some("3 Other St".to_string()),
        ..input("Alice")
    };
    let outcome = service
        .update(alice.id, &second_edit, Some(alice.row_version))
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::Conflict(alice.id));
    assert_eq!(service.get(alice.id).unwrap().address, "2 Side St");
}

#[test]
fn delete_missing_employee_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);

    service.delete(12).unwrap();
    service.delete(12).unwrap();
}

#[test]
fn listing_policy_controls_inactive_rows() {
    let conn = open_db_in_memory().unwrap();
    {
        let service = service(&conn, ListingPolicy::All);
        service.create(&input("Alice")).unwrap();
        service
            .create(&EmployeeInput {
                is_active: Some(false),
                ..input("Bob")
            })
            .unwrap();
        assert_eq!(service.list().unwrap().len(), 2);
    }

    let active_only = service(&conn, ListingPolicy::ActiveOnly);
    let names: Vec<_> = active_only
        .list()
        .unwrap()
        .into_iter()
        .map(|employee| employee.name)
        .collect();
    assert_eq!(names, vec!["Alice".to_string()]);
}

#[test]
fn unavailable_store_surfaces_as_store_unavailable() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);
    conn.execute_batch("DROP TABLE employees;").unwrap();

    let err = service.list().unwrap_err();
    assert!(matches!(err, ServiceError::StoreUnavailable(_)));
    assert_eq!(err.code(), "store_unavailable");
}

#[test]
fn create_edit_delete_scenario() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ListingPolicy::All);

    let alice = service.create(&input("Alice")).unwrap();
    assert_eq!(alice.id, 1);

    let duplicate = service.create(&input("Alice")).unwrap_err();
    assert_eq!(rejected_kinds(duplicate), vec![FieldErrorKind::DuplicateName]);

    let overpaid = EmployeeInput {
        salary: Some(Decimal::from(60_000)),
        ..input("Alice")
    };
    let invalid = service.update(1, &overpaid, None).unwrap_err();
    assert_eq!(rejected_kinds(invalid), vec![FieldErrorKind::InvalidSalary]);
    assert_eq!(service.get(1).unwrap().salary, Decimal::from(5000));

    service.delete(1).unwrap();
    service.delete(1).unwrap();

    assert!(matches!(service.get(1), Err(ServiceError::NotFound(1))));
}
