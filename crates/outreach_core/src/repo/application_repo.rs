//! Application repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, filtered listing and id-based fetch over `applications`.
//! - Expose the `(id, professor_email)` projection scanned by fuzzy search.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Application::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it; only
//!   blank enum/date columns fall back to their defaults.
//! - Every listing is ordered by `id ASC`.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::application::{
    Application, ApplicationId, ApplicationRecord, ApplicationResponse, ApplicationStatus,
    IsoDate, ValidationError,
};
use crate::repo::stats::{self, CountryCount, ResponseStats};
use crate::search::filter::{canonical_enum_value, FilterSet};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const APPLICATION_SELECT_SQL: &str = "SELECT
    id,
    professor_name,
    professor_email,
    university_name,
    program_name,
    country_name,
    application_last_date,
    email_subject,
    email_body,
    email_send_date,
    status,
    response
FROM applications";

const REQUIRED_COLUMNS: [&str; 12] = [
    "id",
    "professor_name",
    "professor_email",
    "university_name",
    "program_name",
    "country_name",
    "application_last_date",
    "email_subject",
    "email_body",
    "email_send_date",
    "status",
    "response",
];

/// SQL function lowercasing text with Rust's Unicode rules. SQLite's own
/// `LOWER` folds ASCII only.
const FOLD_CASE_FN: &str = "fold_case";

/// Whitespace stripped from enum columns before the blank check.
const BLANK_CHARS_SQL: &str = "char(32, 9, 10, 13)";

/// Upper bound of bind variables per `IN (...)` chunk.
const FETCH_CHUNK_SIZE: usize = 500;

pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse classification of [`RepoError`] for presentation callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before touching storage.
    Validation,
    /// Referenced id does not exist.
    NotFound,
    /// Storage could not be opened, read or written.
    Persistence,
}

/// Repository error for application persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(ApplicationId),
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => ErrorKind::Persistence,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "application not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted application data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "application repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "application repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "application repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for application records.
pub trait ApplicationRepository {
    /// Inserts a record and returns its store-assigned id.
    fn create_application(&self, application: &Application) -> RepoResult<ApplicationId>;
    /// Replaces every field of record `id`.
    fn update_application(&self, id: ApplicationId, application: &Application)
        -> RepoResult<()>;
    /// Removes record `id`; unknown ids are a no-op.
    fn delete_application(&self, id: ApplicationId) -> RepoResult<()>;
    fn get_application(&self, id: ApplicationId) -> RepoResult<Option<ApplicationRecord>>;
    /// Every record, id ascending.
    fn list_applications(&self) -> RepoResult<Vec<ApplicationRecord>>;
    /// Records matching every predicate (contains for text, equality for enums).
    fn filter_applications(&self, filters: &FilterSet) -> RepoResult<Vec<ApplicationRecord>>;
    /// Records whose id is in `ids`, id ascending; unknown ids are skipped.
    fn fetch_by_ids(&self, ids: &[ApplicationId]) -> RepoResult<Vec<ApplicationRecord>>;
    /// `(id, professor_email)` pairs, id ascending.
    fn email_index(&self) -> RepoResult<Vec<(ApplicationId, String)>>;
    fn response_stats(&self) -> RepoResult<ResponseStats>;
    fn country_stats(&self) -> RepoResult<Vec<CountryCount>>;
}

/// SQLite-backed application repository.
pub struct SqliteApplicationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteApplicationRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        register_fold_case(conn)?;
        Ok(Self { conn })
    }
}

impl ApplicationRepository for SqliteApplicationRepository<'_> {
    fn create_application(&self, application: &Application) -> RepoResult<ApplicationId> {
        application.validate()?;

        self.conn.execute(
            "INSERT INTO applications (
                professor_name,
                professor_email,
                university_name,
                program_name,
                country_name,
                application_last_date,
                email_subject,
                email_body,
                email_send_date,
                status,
                response
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                application.professor_name.as_str(),
                application.professor_email.as_str(),
                application.university_name.as_str(),
                application.program_name.as_str(),
                application.country_name.as_str(),
                application.application_last_date.to_iso_string(),
                application.email_subject.as_deref(),
                application.email_body.as_deref(),
                application.email_send_date.map(IsoDate::to_iso_string),
                application.status.as_str(),
                application.response.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_application(
        &self,
        id: ApplicationId,
        application: &Application,
    ) -> RepoResult<()> {
        application.validate()?;

        let changed = self.conn.execute(
            "UPDATE applications
             SET
                professor_name = ?1,
                professor_email = ?2,
                university_name = ?3,
                program_name = ?4,
                country_name = ?5,
                application_last_date = ?6,
                email_subject = ?7,
                email_body = ?8,
                email_send_date = ?9,
                status = ?10,
                response = ?11
             WHERE id = ?12;",
            params![
                application.professor_name.as_str(),
                application.professor_email.as_str(),
                application.university_name.as_str(),
                application.program_name.as_str(),
                application.country_name.as_str(),
                application.application_last_date.to_iso_string(),
                application.email_subject.as_deref(),
                application.email_body.as_deref(),
                application.email_send_date.map(IsoDate::to_iso_string),
                application.status.as_str(),
                application.response.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_application(&self, id: ApplicationId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM applications WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn get_application(&self, id: ApplicationId) -> RepoResult<Option<ApplicationRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{APPLICATION_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_application_row(row)?));
        }

        Ok(None)
    }

    fn list_applications(&self) -> RepoResult<Vec<ApplicationRecord>> {
        self.filter_applications(&FilterSet::new())
    }

    fn filter_applications(&self, filters: &FilterSet) -> RepoResult<Vec<ApplicationRecord>> {
        filters.validate()?;

        let mut sql = format!("{APPLICATION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        for (field, value) in filters {
            if let Some(default) = field.enum_default() {
                // Blank values read back as the default, so they must filter as it too.
                sql.push_str(&format!(
                    " AND LOWER(COALESCE(NULLIF(TRIM({}, {BLANK_CHARS_SQL}), ''), '{default}')) = ?",
                    field.column()
                ));
                bind_values.push(Value::Text(
                    canonical_enum_value(field, value)?.to_string(),
                ));
            } else {
                sql.push_str(&format!(
                    " AND {FOLD_CASE_FN}({}) LIKE ? ESCAPE '\\'",
                    field.column()
                ));
                bind_values.push(Value::Text(contains_pattern(value)));
            }
        }

        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut applications = Vec::new();

        while let Some(row) = rows.next()? {
            applications.push(parse_application_row(row)?);
        }

        Ok(applications)
    }

    fn fetch_by_ids(&self, ids: &[ApplicationId]) -> RepoResult<Vec<ApplicationRecord>> {
        let unique: Vec<ApplicationId> = ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut applications = Vec::with_capacity(unique.len());

        // Chunks are id-ascending and disjoint, so concatenation keeps store order.
        for chunk in unique.chunks(FETCH_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = self.conn.prepare(&format!(
                "{APPLICATION_SELECT_SQL} WHERE id IN ({placeholders}) ORDER BY id ASC;"
            ))?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
            while let Some(row) = rows.next()? {
                applications.push(parse_application_row(row)?);
            }
        }

        Ok(applications)
    }

    fn email_index(&self) -> RepoResult<Vec<(ApplicationId, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, professor_email FROM applications ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut index = Vec::new();

        while let Some(row) = rows.next()? {
            let email: Option<String> = row.get("professor_email")?;
            index.push((row.get("id")?, email.unwrap_or_default()));
        }

        Ok(index)
    }

    fn response_stats(&self) -> RepoResult<ResponseStats> {
        stats::response_stats(self.conn)
    }

    fn country_stats(&self) -> RepoResult<Vec<CountryCount>> {
        stats::country_stats(self.conn)
    }
}

fn parse_application_row(row: &Row<'_>) -> RepoResult<ApplicationRecord> {
    let id: ApplicationId = row.get("id")?;

    let deadline_text: String = row.get("application_last_date")?;
    let application_last_date = IsoDate::parse(&deadline_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{deadline_text}` in applications.application_last_date (id {id})"
        ))
    })?;

    let email_send_date = match non_blank(row.get("email_send_date")?) {
        Some(value) => Some(IsoDate::parse(&value).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid date `{value}` in applications.email_send_date (id {id})"
            ))
        })?),
        None => None,
    };

    let status = match non_blank(row.get("status")?) {
        Some(value) => value.parse::<ApplicationStatus>().map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid status `{value}` in applications.status (id {id})"
            ))
        })?,
        None => ApplicationStatus::default(),
    };

    let response = match non_blank(row.get("response")?) {
        Some(value) => value.parse::<ApplicationResponse>().map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid response `{value}` in applications.response (id {id})"
            ))
        })?,
        None => ApplicationResponse::default(),
    };

    Ok(ApplicationRecord {
        id,
        application: Application {
            professor_name: row.get("professor_name")?,
            professor_email: row.get("professor_email")?,
            university_name: row.get("university_name")?,
            program_name: row.get("program_name")?,
            country_name: row.get("country_name")?,
            application_last_date,
            email_subject: row.get("email_subject")?,
            email_body: row.get("email_body")?,
            email_send_date,
            status,
            response,
        },
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Lowercased `%value%` LIKE pattern with `%`, `_` and `\` escaped.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn register_fold_case(conn: &Connection) -> RepoResult<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            Ok(match ctx.get_raw(0) {
                ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).to_lowercase()),
                _ => None,
            })
        },
    )?;
    Ok(())
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "applications")? {
        return Err(RepoError::MissingRequiredTable("applications"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "applications", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "applications",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
