use outreach_core::db::open_db_in_memory;
use outreach_core::{
    Application, ApplicationRepository, ApplicationResponse, ApplicationStatus, ErrorKind,
    FilterField, FilterSet, IsoDate, MatchMode, RepoError, SqliteApplicationRepository,
    ValidationError,
};
use rusqlite::{params, Connection};

fn seed(repo: &SqliteApplicationRepository<'_>) {
    let rows = [
        ("Grace Hopper", "grace@yale.edu", "Yale", "MSc Math", "US", "pending", "yes"),
        ("Alan Turing", "alan@princeton.edu", "Princeton", "PhD CS", "US", "done", "no"),
        ("Ada Lovelace", "ada@cam.ac.uk", "Cambridge", "PhD Computing", "UK", "done", "partial"),
        ("Emmy Noether", "noether@goettingen.de", "Goettingen", "PhD Math", "DE", "pending", "no"),
        ("Kurt Goedel", "kurt@ias.edu", "IAS", "Postdoc Logic", "US", "done", "yes"),
    ];

    for (name, email, university, program, country, status, response) in rows {
        let mut app = Application::new(
            name,
            email,
            university,
            program,
            country,
            IsoDate::parse("2025-04-30").unwrap(),
        );
        app.status = status.parse::<ApplicationStatus>().unwrap();
        app.response = response.parse::<ApplicationResponse>().unwrap();
        repo.create_application(&app).unwrap();
    }
}

fn ids(records: &[outreach_core::ApplicationRecord]) -> Vec<i64> {
    records.iter().map(|record| record.id).collect()
}

fn add_raw(
    conn: &Connection,
    name: &str,
    university: &str,
    country: &str,
    status: &str,
    response: &str,
) {
    conn.execute(
        "INSERT INTO applications (
            professor_name, professor_email, university_name, program_name,
            country_name, application_last_date, status, response
        ) VALUES (?1, 'prof@uni.example', ?2, 'PhD', ?3, '2025-04-30', ?4, ?5);",
        params![name, university, country, status, response],
    )
    .unwrap();
}

#[test]
fn empty_filter_set_returns_every_record_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    seed(&repo);

    let filtered = repo.filter_applications(&FilterSet::new()).unwrap();
    let listed = repo.list_applications().unwrap();

    assert_eq!(filtered, listed);
    assert_eq!(ids(&filtered), vec![1, 2, 3, 4, 5]);
}

#[test]
fn filter_results_agree_with_in_memory_contains_matching() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    seed(&repo);
    add_raw(&conn, "JÜRGEN Müller", "TU MÜNCHEN", "DE", "", "");
    add_raw(&conn, "Élodie Durand", "Université Paris-Saclay", "FR", "done", "yes");
    let all = repo.list_applications().unwrap();

    let cases = [
        FilterSet::new().with(FilterField::UniversityName, "TU MÜNCHEN"),
        FilterSet::new().with(FilterField::UniversityName, "münchen"),
        FilterSet::new().with(FilterField::ProfessorName, "jürgen"),
        FilterSet::new().with(FilterField::ProfessorName, "ÉLODIE"),
        FilterSet::new().with(FilterField::Status, "pending"),
        FilterSet::new()
            .with(FilterField::CountryName, "de")
            .with(FilterField::Response, "no"),
        FilterSet::new().with(FilterField::ProfessorName, "TUR"),
        FilterSet::new().with(FilterField::ProgramName, "math"),
        FilterSet::new()
            .with(FilterField::CountryName, "us")
            .with(FilterField::Status, "done"),
        FilterSet::new()
            .with(FilterField::ProfessorEmail, ".edu")
            .with(FilterField::Response, "YES"),
        FilterSet::new().with(FilterField::UniversityName, "nowhere"),
        FilterSet::new().with(FilterField::ApplicationLastDate, "2025-04"),
        FilterSet::new().with(FilterField::EmailSendDate, "2025"),
    ];

    for filters in cases {
        let expected = all
            .iter()
            .filter(|record| filters.matches(record, MatchMode::Contains))
            .cloned()
            .collect::<Vec<_>>();
        let actual = repo.filter_applications(&filters).unwrap();
        assert_eq!(actual, expected, "filters: {filters:?}");
    }
}

#[test]
fn enum_filters_match_by_equality() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    seed(&repo);

    let partial = repo
        .filter_applications(&FilterSet::new().with(FilterField::Response, "partial"))
        .unwrap();
    assert_eq!(ids(&partial), vec![3]);

    let pending = repo
        .filter_applications(&FilterSet::new().with(FilterField::Status, "Pending"))
        .unwrap();
    assert_eq!(ids(&pending), vec![1, 4]);
}

#[test]
fn blank_filter_values_leave_field_unconstrained() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    seed(&repo);

    let filters = FilterSet::new()
        .with(FilterField::CountryName, "   ")
        .with(FilterField::Status, "");

    assert!(filters.is_empty());
    assert_eq!(repo.filter_applications(&filters).unwrap().len(), 5);
}

#[test]
fn like_wildcards_in_filter_values_match_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    seed(&repo);
    let literal = Application::new(
        "Percy 100% Match",
        "percy_shelley@ox.ac.uk",
        "Oxford",
        "DPhil",
        "UK",
        IsoDate::parse("2025-05-01").unwrap(),
    );
    let literal_id = repo.create_application(&literal).unwrap();

    let by_percent = repo
        .filter_applications(&FilterSet::new().with(FilterField::ProfessorName, "%"))
        .unwrap();
    assert_eq!(ids(&by_percent), vec![literal_id]);

    let by_underscore = repo
        .filter_applications(&FilterSet::new().with(FilterField::ProfessorEmail, "_"))
        .unwrap();
    assert_eq!(ids(&by_underscore), vec![literal_id]);
}

#[test]
fn invalid_enum_filter_value_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    seed(&repo);

    let err = repo
        .filter_applications(&FilterSet::new().with(FilterField::Status, "archived"))
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidStatus(_))
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn filter_set_from_column_name_pairs() {
    let filters = FilterSet::from_pairs([("country_name", "US"), ("response", "yes")]).unwrap();
    assert_eq!(filters.get(FilterField::CountryName), Some("US"));
    assert_eq!(filters.get(FilterField::Response), Some("yes"));

    let err = FilterSet::from_pairs([("salary", "high")]).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownFilterField(_)));
}

#[test]
fn record_matches_its_own_non_ascii_value() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    add_raw(&conn, "JÜRGEN Müller", "TU MÜNCHEN", "DE", "pending", "no");

    for (field, value) in [
        (FilterField::UniversityName, "TU MÜNCHEN"),
        (FilterField::UniversityName, "tu münchen"),
        (FilterField::ProfessorName, "jürgen"),
        (FilterField::ProfessorName, "MÜLLER"),
    ] {
        let found = repo
            .filter_applications(&FilterSet::new().with(field, value))
            .unwrap();
        assert_eq!(found.len(), 1, "{field}={value}");
    }
}

#[test]
fn blank_stored_enums_filter_as_their_defaults() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteApplicationRepository::try_new(&conn).unwrap();
    add_raw(&conn, "Ada", "Cambridge", "UK", "", "  ");
    conn.execute_batch(
        "INSERT INTO applications (
            professor_name, professor_email, university_name, program_name,
            country_name, application_last_date, status, response
        ) VALUES ('Alan', 'alan@princeton.edu', 'Princeton', 'PhD', 'US', '2025-04-30', NULL, NULL);",
    )
    .unwrap();

    let listed = repo.list_applications().unwrap();
    assert_eq!(listed.len(), 2);
    for record in &listed {
        assert_eq!(record.application.status, ApplicationStatus::Pending);
        assert_eq!(record.application.response, ApplicationResponse::No);
    }

    let pending = repo
        .filter_applications(&FilterSet::new().with(FilterField::Status, "pending"))
        .unwrap();
    assert_eq!(pending, listed);

    let no_reply = repo
        .filter_applications(&FilterSet::new().with(FilterField::Response, "no"))
        .unwrap();
    assert_eq!(no_reply, listed);

    let done = repo
        .filter_applications(&FilterSet::new().with(FilterField::Status, "done"))
        .unwrap();
    assert!(done.is_empty());
}
