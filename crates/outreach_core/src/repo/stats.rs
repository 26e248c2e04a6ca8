//! Aggregate queries over `applications`.
//!
//! # Responsibility
//! - Count yes responses against all answered records.
//! - Count records per country for chart rendering.
//!
//! # Invariants
//! - Country counts are ordered by country name so repeated reads of the
//!   same data render identically.

use crate::repo::application_repo::RepoResult;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Response summary: `yes` answers out of all records with a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStats {
    pub yes_count: u64,
    /// Records whose `response` is non-empty.
    pub total_count: u64,
}

impl Display for ResponseStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.yes_count, self.total_count)
    }
}

/// Number of records sharing one `country_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country_name: String,
    pub count: u64,
}

impl CountryCount {
    /// Chart slice label, e.g. `Germany (3)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.country_name, self.count)
    }
}

pub(crate) fn response_stats(conn: &Connection) -> RepoResult<ResponseStats> {
    let (yes_count, total_count): (i64, i64) = conn.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN LOWER(response) = 'yes' THEN 1 ELSE 0 END), 0),
            COUNT(*)
         FROM applications
         WHERE response IS NOT NULL
           AND response != '';",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(ResponseStats {
        yes_count: u64::try_from(yes_count).unwrap_or_default(),
        total_count: u64::try_from(total_count).unwrap_or_default(),
    })
}

pub(crate) fn country_stats(conn: &Connection) -> RepoResult<Vec<CountryCount>> {
    let mut stmt = conn.prepare(
        "SELECT country_name, COUNT(*) AS total
         FROM applications
         GROUP BY country_name
         ORDER BY country_name ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut counts = Vec::new();

    while let Some(row) = rows.next()? {
        let total: i64 = row.get("total")?;
        counts.push(CountryCount {
            country_name: row.get("country_name")?,
            count: u64::try_from(total).unwrap_or_default(),
        });
    }

    Ok(counts)
}
