//! Structured filter predicates over application fields.
//!
//! # Responsibility
//! - Name the filterable fields and map them to persisted columns.
//! - Hold one value per field, dropping blank values at insert time.
//! - Evaluate a filter set against an in-memory record, either with the
//!   store's contains semantics or with exact equality (refinement stage).
//!
//! # Invariants
//! - Stored values are trimmed and never blank.
//! - Enum field values must parse as their tagged type; `validate()` reports
//!   the first one that does not.

use crate::model::application::{
    Application, ApplicationRecord, ApplicationResponse, ApplicationStatus, ValidationError,
};
use std::borrow::Cow;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Field a structured filter can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    ProfessorName,
    ProfessorEmail,
    UniversityName,
    ProgramName,
    CountryName,
    ApplicationLastDate,
    EmailSendDate,
    Status,
    Response,
}

impl FilterField {
    pub const ALL: [FilterField; 9] = [
        Self::ProfessorName,
        Self::ProfessorEmail,
        Self::UniversityName,
        Self::ProgramName,
        Self::CountryName,
        Self::ApplicationLastDate,
        Self::EmailSendDate,
        Self::Status,
        Self::Response,
    ];

    /// Persisted column name; also the accepted textual field name.
    pub fn column(self) -> &'static str {
        match self {
            Self::ProfessorName => "professor_name",
            Self::ProfessorEmail => "professor_email",
            Self::UniversityName => "university_name",
            Self::ProgramName => "program_name",
            Self::CountryName => "country_name",
            Self::ApplicationLastDate => "application_last_date",
            Self::EmailSendDate => "email_send_date",
            Self::Status => "status",
            Self::Response => "response",
        }
    }

    /// Enum fields match by equality; all others by substring.
    pub fn is_enum(self) -> bool {
        matches!(self, Self::Status | Self::Response)
    }

    /// Value a blank persisted enum column reads back as.
    pub(crate) fn enum_default(self) -> Option<&'static str> {
        match self {
            Self::Status => Some(ApplicationStatus::default().as_str()),
            Self::Response => Some(ApplicationResponse::default().as_str()),
            _ => None,
        }
    }

    /// Field value in its persisted text form; `None` for an unset date.
    fn value_of(self, application: &Application) -> Option<Cow<'_, str>> {
        match self {
            Self::ProfessorName => Some(Cow::Borrowed(application.professor_name.as_str())),
            Self::ProfessorEmail => Some(Cow::Borrowed(application.professor_email.as_str())),
            Self::UniversityName => Some(Cow::Borrowed(application.university_name.as_str())),
            Self::ProgramName => Some(Cow::Borrowed(application.program_name.as_str())),
            Self::CountryName => Some(Cow::Borrowed(application.country_name.as_str())),
            Self::ApplicationLastDate => {
                Some(Cow::Owned(application.application_last_date.to_iso_string()))
            }
            Self::EmailSendDate => application
                .email_send_date
                .map(|date| Cow::Owned(date.to_iso_string())),
            Self::Status => Some(Cow::Borrowed(application.status.as_str())),
            Self::Response => Some(Cow::Borrowed(application.response.as_str())),
        }
    }
}

impl Display for FilterField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for FilterField {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.column() == normalized)
            .ok_or_else(|| ValidationError::UnknownFilterField(value.to_string()))
    }
}

/// How a filter value is compared against a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Case-insensitive substring for text, equality for enums.
    Contains,
    /// Field must equal the value exactly; enums compare by tagged value.
    Exact,
}

/// Set of structured predicates, at most one value per field.
///
/// An empty set constrains nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    values: BTreeMap<FilterField, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSet::insert`].
    pub fn with(mut self, field: FilterField, value: impl AsRef<str>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets the value for `field`.
    ///
    /// Blank values leave the field unconstrained (any earlier value is removed).
    pub fn insert(&mut self, field: FilterField, value: impl AsRef<str>) {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, trimmed.to_string());
        }
    }

    /// Builds a set from `(column name, value)` pairs, e.g. the search boxes
    /// of a table view.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            let field = name.as_ref().parse::<FilterField>()?;
            set.insert(field, value);
        }
        Ok(set)
    }

    pub fn get(&self, field: FilterField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Active predicates in field order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.values.iter(),
        }
    }

    /// Rejects enum filter values outside their enumerations.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in self.iter() {
            if field.is_enum() {
                canonical_enum_value(field, value)?;
            }
        }
        Ok(())
    }

    /// Returns whether `record` satisfies every predicate under `mode`.
    ///
    /// A record with no value for a constrained field never matches.
    pub fn matches(&self, record: &ApplicationRecord, mode: MatchMode) -> bool {
        self.iter().all(|(field, expected)| {
            let Some(actual) = field.value_of(&record.application) else {
                return false;
            };

            if field.is_enum() {
                return canonical_enum_value(field, expected)
                    .is_ok_and(|value| value == actual.as_ref());
            }

            match mode {
                MatchMode::Contains => actual.to_lowercase().contains(&expected.to_lowercase()),
                MatchMode::Exact => actual.as_ref() == expected,
            }
        })
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = (FilterField, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(field, value)` predicates of a [`FilterSet`].
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, FilterField, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (FilterField, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(field, value)| (*field, value.as_str()))
    }
}

/// Parses an enum filter value into its persisted lowercase form.
pub(crate) fn canonical_enum_value(
    field: FilterField,
    value: &str,
) -> Result<&'static str, ValidationError> {
    match field {
        FilterField::Status => value.parse::<ApplicationStatus>().map(ApplicationStatus::as_str),
        FilterField::Response => value
            .parse::<ApplicationResponse>()
            .map(ApplicationResponse::as_str),
        other => Err(ValidationError::UnknownFilterField(other.column().to_string())),
    }
}
