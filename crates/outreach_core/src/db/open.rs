//! Connection bootstrap.
//!
//! Every connection handed out here has its busy timeout set and the schema
//! migrated. A store operation opens one, uses it, and drops it.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{debug, error};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// How long a write waits on another process's file lock by default.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

enum Target<'a> {
    File(&'a Path),
    Memory,
}

impl Target<'_> {
    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        match self {
            Self::File(path) => Connection::open(path),
            Self::Memory => Connection::open_in_memory(),
        }
    }
}

/// Opens (creating if missing) the database file at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
}

/// [`open_db`] with an explicit lock wait.
pub fn open_db_with_timeout(
    path: impl AsRef<Path>,
    busy_timeout: Duration,
) -> DbResult<Connection> {
    open_target(Target::File(path.as_ref()), busy_timeout)
}

/// Fresh, private in-memory database; used by tests and throwaway tooling.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_target(Target::Memory, DEFAULT_BUSY_TIMEOUT)
}

fn open_target(target: Target<'_>, busy_timeout: Duration) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = target.mode();

    let result: DbResult<(Connection, usize)> =
        target.connect().map_err(Into::into).and_then(|mut conn| {
            conn.busy_timeout(busy_timeout)?;
            let applied = apply_migrations(&mut conn)?;
            Ok((conn, applied))
        });

    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok((conn, applied)) => {
            debug!(
                "event=db_open module=db status=ok mode={mode} migrations_applied={applied} duration_ms={duration_ms}"
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={duration_ms} error={err}"
            );
            Err(err)
        }
    }
}
