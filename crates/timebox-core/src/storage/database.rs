//! SQLite-based activity and session storage.
//!
//! Provides persistent storage for:
//! - The list of activity labels offered to the user
//! - Completed work sessions
//! - Per-activity totals

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{DatabaseError, Result, ValidationError};
use crate::session::{NewSession, SessionStore};

/// Seeded into an empty activities table.
pub const DEFAULT_ACTIVITIES: [&str; 6] = ["Work", "Study", "Reading", "Writing", "Exercise", "Rest"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub activity_type: String,
    pub duration_secs: u64,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTotal {
    pub activity_type: String,
    pub sessions: u64,
    pub total_secs: u64,
}

/// SQLite database for activities and sessions.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/timebox.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("timebox.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS activities (
                    id    INTEGER PRIMARY KEY AUTOINCREMENT,
                    name  TEXT NOT NULL UNIQUE
                );

                CREATE TABLE IF NOT EXISTS sessions (
                    id            INTEGER PRIMARY KEY AUTOINCREMENT,
                    activity_type TEXT NOT NULL,
                    duration_secs INTEGER NOT NULL,
                    comment       TEXT NOT NULL DEFAULT '',
                    timestamp     TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_activity_type ON sessions(activity_type);
                CREATE INDEX IF NOT EXISTS idx_sessions_timestamp ON sessions(timestamp);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))?;
        if count == 0 {
            let mut stmt = self.conn.prepare("INSERT INTO activities (name) VALUES (?1)")?;
            for name in DEFAULT_ACTIVITIES {
                stmt.execute(params![name])?;
            }
            tracing::debug!("seeded default activities");
        }
        Ok(())
    }

    // ── Activities ───────────────────────────────────────────────────

    pub fn list_activities(&self) -> Result<Vec<Activity>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM activities ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Activity {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Add an activity label. Empty and duplicate names are rejected.
    pub fn create_activity(&self, name: &str) -> Result<Activity> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required("name".into()).into());
        }
        self.conn
            .execute("INSERT INTO activities (name) VALUES (?1)", params![name])
            .map_err(|e| match DatabaseError::from(e) {
                DatabaseError::Duplicate(_) => DatabaseError::Duplicate(format!("activity '{name}'")),
                other => other,
            })?;
        Ok(Activity {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Returns `false` when no activity had that id.
    pub fn delete_activity(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    pub fn find_activity(&self, name: &str) -> Result<Option<Activity>> {
        let activity = self
            .conn
            .query_row(
                "SELECT id, name FROM activities WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Activity {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(activity)
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Record a completed session stamped with the current time.
    pub fn create_session(&self, session: &NewSession) -> Result<SessionRecord> {
        session.validate()?;
        let timestamp = Utc::now();
        self.conn.execute(
            "INSERT INTO sessions (activity_type, duration_secs, comment, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session.activity_type,
                session.duration_secs,
                session.comment,
                timestamp.to_rfc3339(),
            ],
        )?;
        Ok(SessionRecord {
            id: self.conn.last_insert_rowid(),
            activity_type: session.activity_type.clone(),
            duration_secs: session.duration_secs,
            comment: session.comment.clone(),
            timestamp,
        })
    }

    pub fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.query_sessions(
            "SELECT id, activity_type, duration_secs, comment, timestamp
             FROM sessions ORDER BY id",
            None,
        )
    }

    pub fn sessions_by_activity(&self, activity_type: &str) -> Result<Vec<SessionRecord>> {
        self.query_sessions(
            "SELECT id, activity_type, duration_secs, comment, timestamp
             FROM sessions WHERE activity_type = ?1 ORDER BY id",
            Some(activity_type),
        )
    }

    pub fn totals_by_activity(&self) -> Result<Vec<ActivityTotal>> {
        let mut stmt = self.conn.prepare(
            "SELECT activity_type, COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM sessions
             GROUP BY activity_type
             ORDER BY activity_type",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ActivityTotal {
                activity_type: row.get(0)?,
                sessions: row.get(1)?,
                total_secs: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn query_sessions(&self, sql: &str, activity: Option<&str>) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<SessionRecord> {
            let raw: String = row.get(4)?;
            let timestamp = DateTime::parse_from_rfc3339(&raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
                })?;
            Ok(SessionRecord {
                id: row.get(0)?,
                activity_type: row.get(1)?,
                duration_secs: row.get(2)?,
                comment: row.get(3)?,
                timestamp,
            })
        };
        let rows = match activity {
            Some(a) => stmt.query_map(params![a], map)?.collect::<Result<Vec<_>, _>>()?,
            None => stmt.query_map([], map)?.collect::<Result<Vec<_>, _>>()?,
        };
        Ok(rows)
    }
}

impl SessionStore for Database {
    fn create_session(&self, session: &NewSession) -> Result<SessionRecord> {
        Database::create_session(self, session)
    }
}
