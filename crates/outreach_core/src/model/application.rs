//! Application record model.
//!
//! # Responsibility
//! - Define the record a caller submits (`Application`) and the persisted
//!   form carrying its id (`ApplicationRecord`).
//! - Provide tagged types for `status`, `response` and calendar dates so no
//!   free text reaches storage in those columns.
//!
//! # Invariants
//! - Required text fields are non-blank after `validate()`.
//! - `IsoDate` always holds a real `YYYY-MM-DD` calendar date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned record identifier. Positive, never reused.
pub type ApplicationId = i64;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Boundary validation failure. Raised before any storage access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is missing or blank.
    MissingField(&'static str),
    /// Status text outside `pending|done`.
    InvalidStatus(String),
    /// Response text outside `no|yes|partial`.
    InvalidResponse(String),
    /// Date text is not a real `YYYY-MM-DD` calendar date.
    InvalidDate(String),
    /// Filter names a field that cannot be filtered on.
    UnknownFilterField(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is empty"),
            Self::InvalidStatus(value) => {
                write!(f, "invalid status `{value}`; expected pending|done")
            }
            Self::InvalidResponse(value) => {
                write!(f, "invalid response `{value}`; expected no|yes|partial")
            }
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; expected YYYY-MM-DD")
            }
            Self::UnknownFilterField(value) => write!(f, "unknown filter field `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Outreach lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Not sent yet or still being worked on.
    #[default]
    Pending,
    /// Outreach email sent.
    Done,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
        }
    }
}

impl Display for ApplicationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            _ => Err(ValidationError::InvalidStatus(value.to_string())),
        }
    }
}

/// Professor's answer to the outreach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationResponse {
    #[default]
    No,
    Yes,
    Partial,
}

impl ApplicationResponse {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Yes => "yes",
            Self::Partial => "partial",
        }
    }
}

impl Display for ApplicationResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationResponse {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "no" => Ok(Self::No),
            "yes" => Ok(Self::Yes),
            "partial" => Ok(Self::Partial),
            _ => Err(ValidationError::InvalidResponse(value.to_string())),
        }
    }
}

/// Calendar date persisted and rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IsoDate(NaiveDate);

impl IsoDate {
    /// Parses `YYYY-MM-DD`, rejecting impossible dates such as `2023-02-29`
    /// and non-padded forms such as `2025-1-5`.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let invalid = || ValidationError::InvalidDate(value.to_string());

        let date = NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT).map_err(|_| invalid())?;
        // chrono accepts single-digit months and days; storage needs the padded form.
        if date.format(ISO_DATE_FORMAT).to_string() != trimmed {
            return Err(invalid());
        }

        Ok(Self(date))
    }

    /// Builds a date from numeric parts.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// Storage form, `YYYY-MM-DD`.
    pub fn to_iso_string(self) -> String {
        self.0.format(ISO_DATE_FORMAT).to_string()
    }
}

impl Display for IsoDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(ISO_DATE_FORMAT))
    }
}

impl FromStr for IsoDate {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for IsoDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IsoDate> for String {
    fn from(value: IsoDate) -> Self {
        value.to_iso_string()
    }
}

impl From<NaiveDate> for IsoDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

/// One outreach attempt as submitted by a caller, without its id.
///
/// Used for both create and full-replace update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub professor_name: String,
    /// Target of free-text fuzzy search.
    pub professor_email: String,
    pub university_name: String,
    pub program_name: String,
    /// Grouping key for per-country aggregation.
    pub country_name: String,
    /// Application deadline.
    pub application_last_date: IsoDate,
    pub email_subject: Option<String>,
    pub email_body: Option<String>,
    pub email_send_date: Option<IsoDate>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub response: ApplicationResponse,
}

impl Application {
    /// Creates a record with required fields set and everything else defaulted.
    ///
    /// # Invariants
    /// - Optional email fields start as `None`.
    /// - `status = pending`, `response = no`.
    pub fn new(
        professor_name: impl Into<String>,
        professor_email: impl Into<String>,
        university_name: impl Into<String>,
        program_name: impl Into<String>,
        country_name: impl Into<String>,
        application_last_date: IsoDate,
    ) -> Self {
        Self {
            professor_name: professor_name.into(),
            professor_email: professor_email.into(),
            university_name: university_name.into(),
            program_name: program_name.into(),
            country_name: country_name.into(),
            application_last_date,
            email_subject: None,
            email_body: None,
            email_send_date: None,
            status: ApplicationStatus::default(),
            response: ApplicationResponse::default(),
        }
    }

    /// Checks that every required text field is non-blank.
    ///
    /// Enum and date fields are already valid by construction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("professor_name", self.professor_name.as_str()),
            ("professor_email", self.professor_email.as_str()),
            ("university_name", self.university_name.as_str()),
            ("program_name", self.program_name.as_str()),
            ("country_name", self.country_name.as_str()),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        Ok(())
    }
}

/// Persisted application with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    #[serde(flatten)]
    pub application: Application,
}
