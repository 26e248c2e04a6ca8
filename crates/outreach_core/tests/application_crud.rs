use outreach_core::db::open_db_in_memory;
use outreach_core::{
    Application, ApplicationRepository, ApplicationResponse, ApplicationService,
    ApplicationStatus, ApplicationStore, ErrorKind, IsoDate, RepoError,
    SqliteApplicationRepository, StoreConfig, ValidationError,
};
use rusqlite::Connection;

fn date(value: &str) -> IsoDate {
    IsoDate::parse(value).unwrap()
}

fn sample(name: &str, email: &str, country: &str) -> Application {
    Application::new(
        name,
        email,
        "Some University",
        "PhD",
        country,
        date("2025-03-01"),
    )
}

#[test]
fn create_then_get_round_trips_every_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();

    let mut app = sample("Grace Hopper", "grace@yale.edu", "US");
    app.email_subject = Some("Research inquiry".to_string());
    app.email_body = Some("Dear Prof. Hopper,\nI am writing...".to_string());
    app.email_send_date = Some(date("2024-12-01"));
    app.status = ApplicationStatus::Done;
    app.response = ApplicationResponse::Partial;

    let id = repo.create_application(&app).unwrap();
    let loaded = repo.get_application(id).unwrap().unwrap();

    assert_eq!(loaded.id, id);
    assert_eq!(loaded.application, app);
}

#[test]
fn create_applies_status_and_response_defaults() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();

    let id = repo
        .create_application(&sample("Alan Turing", "alan@princeton.edu", "US"))
        .unwrap();
    let loaded = repo.get_application(id).unwrap().unwrap();

    assert_eq!(loaded.application.status, ApplicationStatus::Pending);
    assert_eq!(loaded.application.response, ApplicationResponse::No);
    assert_eq!(loaded.application.email_subject, None);
    assert_eq!(loaded.application.email_send_date, None);
}

#[test]
fn update_replaces_fields_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    let id = repo
        .create_application(&sample("Ada", "ada@cam.ac.uk", "UK"))
        .unwrap();

    let mut changed = sample("Ada Lovelace", "ada@cam.ac.uk", "UK");
    changed.status = ApplicationStatus::Done;
    changed.response = ApplicationResponse::Yes;

    repo.update_application(id, &changed).unwrap();
    let first = repo.get_application(id).unwrap().unwrap();
    repo.update_application(id, &changed).unwrap();
    let second = repo.get_application(id).unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(second.application, changed);
}

#[test]
fn update_clears_optional_fields_set_to_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();

    let mut app = sample("Ada", "ada@cam.ac.uk", "UK");
    app.email_subject = Some("Hello".to_string());
    let id = repo.create_application(&app).unwrap();

    app.email_subject = None;
    repo.update_application(id, &app).unwrap();

    let loaded = repo.get_application(id).unwrap().unwrap();
    assert_eq!(loaded.application.email_subject, None);
}

#[test]
fn update_unknown_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();

    let err = repo
        .update_application(404, &sample("Ada", "ada@cam.ac.uk", "UK"))
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound(404)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn delete_removes_record_from_every_read_path() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    let keep = repo
        .create_application(&sample("Ada", "ada@cam.ac.uk", "UK"))
        .unwrap();
    let gone = repo
        .create_application(&sample("Alan", "alan@princeton.edu", "US"))
        .unwrap();

    repo.delete_application(gone).unwrap();

    assert!(repo.get_application(gone).unwrap().is_none());
    let listed = repo.list_applications().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep);
    let fetched = repo.fetch_by_ids(&[keep, gone]).unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].id, keep);
}

#[test]
fn delete_unknown_or_repeated_id_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    let id = repo
        .create_application(&sample("Ada", "ada@cam.ac.uk", "UK"))
        .unwrap();

    repo.delete_application(id).unwrap();
    repo.delete_application(id).unwrap();
    repo.delete_application(9_999).unwrap();

    assert!(repo.list_applications().unwrap().is_empty());
}

#[test]
fn ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    let first = repo
        .create_application(&sample("Ada", "ada@cam.ac.uk", "UK"))
        .unwrap();
    repo.delete_application(first).unwrap();

    let second = repo
        .create_application(&sample("Alan", "alan@princeton.edu", "US"))
        .unwrap();

    assert!(second > first);
}

#[test]
fn blank_required_field_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();

    let blank_email = sample("Ada", "   ", "UK");
    let err = repo.create_application(&blank_email).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingField("professor_email"))
    ));
    assert!(repo.list_applications().unwrap().is_empty());

    let id = repo
        .create_application(&sample("Ada", "ada@cam.ac.uk", "UK"))
        .unwrap();
    let blank_country = sample("Ada", "ada@cam.ac.uk", "");
    let err = repo.update_application(id, &blank_country).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        repo.get_application(id).unwrap().unwrap().application.country_name,
        "UK"
    );
}

#[test]
fn blank_persisted_status_and_response_read_back_as_defaults() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO applications (
            professor_name, professor_email, university_name, program_name,
            country_name, application_last_date, email_send_date, status, response
        ) VALUES ('Ada', 'ada@cam.ac.uk', 'Cambridge', 'PhD', 'UK', '2025-01-15', '', '', NULL);",
    )
    .unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();

    let records = repo.list_applications().unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].application.status, ApplicationStatus::Pending);
    assert_eq!(records[0].application.response, ApplicationResponse::No);
    assert_eq!(records[0].application.email_send_date, None);
}

#[test]
fn unknown_persisted_status_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO applications (
            professor_name, professor_email, university_name, program_name,
            country_name, application_last_date, status
        ) VALUES ('Ada', 'ada@cam.ac.uk', 'Cambridge', 'PhD', 'UK', '2025-01-15', 'archived');",
    )
    .unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();

    let err = repo.list_applications().unwrap_err();

    assert!(matches!(err, RepoError::InvalidData(_)));
    assert_eq!(err.kind(), ErrorKind::Persistence);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteApplicationRepository::try_new(&conn);

    assert!(matches!(
        result,
        Err(RepoError::UninitializedConnection {
            expected_version: _,
            actual_version: 0
        })
    ));
}

#[test]
fn repository_rejects_connection_without_applications_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE applications;").unwrap();

    let result = SqliteApplicationRepository::try_new(&conn);

    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("applications"))
    ));
}

#[test]
fn repository_rejects_table_missing_a_column() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "DROP TABLE applications;
         CREATE TABLE applications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            professor_name TEXT NOT NULL,
            professor_email TEXT NOT NULL
         );",
    )
    .unwrap();

    let result = SqliteApplicationRepository::try_new(&conn);

    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "applications",
            column: _
        })
    ));
}

#[test]
fn service_get_unknown_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    let service = ApplicationService::new(repo);

    let err = service.get(7).unwrap_err();

    assert!(matches!(err, RepoError::NotFound(7)));
}

#[test]
fn store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("professor_applications.db"));

    let store = ApplicationStore::open(config.clone()).unwrap();
    let id = store
        .add(&sample("Ada", "ada@cam.ac.uk", "UK"))
        .unwrap();
    store.initialize().unwrap();

    let reopened = ApplicationStore::open(config).unwrap();
    let all = reopened.get_all().unwrap();

    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(reopened.get(id).unwrap().application.professor_name, "Ada");
}

#[test]
fn store_reports_persistence_error_for_unopenable_path() {
    let dir = tempfile::tempdir().unwrap();
    // SQLite does not create missing parent directories.
    let store = ApplicationStore::new(StoreConfig::new(
        dir.path().join("missing").join("professor_applications.db"),
    ));

    let err = store.get_all().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Persistence);
}

#[test]
fn record_serializes_as_flat_object() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    let id = repo
        .create_application(&sample("Ada", "ada@cam.ac.uk", "UK"))
        .unwrap();
    let record = repo.get_application(id).unwrap().unwrap();

    let value = serde_json::to_value(&record).unwrap();

    assert_eq!(value["id"], serde_json::json!(id));
    assert_eq!(value["professor_email"], "ada@cam.ac.uk");
    assert_eq!(value["application_last_date"], "2025-03-01");
    assert_eq!(value["status"], "pending");
    assert_eq!(value["response"], "no");
    assert!(value["email_subject"].is_null());
}
