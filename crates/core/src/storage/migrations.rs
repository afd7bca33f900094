//! Database migration system
//!
//! Tracks schema versions and applies migrations in order.

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info, instrument};

use super::parse::format_datetime;
use crate::error::Result;

/// A database migration
pub struct Migration {
    /// Version number (must be sequential starting from 1)
    pub version: u32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to run for this migration
    pub sql: &'static str,
}

/// All migrations in order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: r#"
            -- Attendance sessions
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                session_code TEXT NOT NULL,
                name TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                duration_minutes INTEGER NOT NULL,
                description TEXT,
                expires_at TEXT,
                created_at TEXT NOT NULL,
                qr_payload TEXT NOT NULL,
                created_by TEXT
            );

            -- Student roster
            CREATE TABLE IF NOT EXISTS students (
                id TEXT PRIMARY KEY,
                identifier TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                email TEXT,
                phone TEXT,
                department TEXT,
                year TEXT,
                created_at TEXT NOT NULL
            );

            -- Check-ins
            CREATE TABLE IF NOT EXISTS attendance (
                id TEXT PRIMARY KEY,
                student_id TEXT NOT NULL,
                session_id TEXT NOT NULL,
                scanned_at TEXT NOT NULL,
                FOREIGN KEY (student_id) REFERENCES students(id) ON DELETE CASCADE,
                FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
            );
        "#,
    },
    Migration {
        version: 2,
        description: "Add indexes for query performance",
        sql: r#"
            CREATE INDEX IF NOT EXISTS idx_sessions_code ON sessions(session_code);
            CREATE INDEX IF NOT EXISTS idx_sessions_created ON sessions(created_at);
            CREATE INDEX IF NOT EXISTS idx_sessions_payload ON sessions(qr_payload);

            CREATE INDEX IF NOT EXISTS idx_students_created ON students(created_at);

            CREATE INDEX IF NOT EXISTS idx_attendance_session ON attendance(session_id);
            CREATE INDEX IF NOT EXISTS idx_attendance_student ON attendance(student_id);
            CREATE INDEX IF NOT EXISTS idx_attendance_scanned ON attendance(scanned_at);
        "#,
    },
    Migration {
        version: 3,
        description: "Enforce one active session per code and one check-in per student",
        sql: r#"
            -- Backs the conditional insert used for QR issuance
            CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_active_code
                ON sessions(session_code) WHERE is_active = 1;

            CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_student_session
                ON attendance(student_id, session_id);
        "#,
    },
];

fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )?;
    Ok(())
}

/// Highest applied version, 0 for a fresh database
fn get_current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

/// Apply one migration and record it; both land or neither does
fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.description,
            format_datetime(Utc::now())
        ],
    )?;
    tx.commit()?;
    Ok(())
}

/// Run all pending migrations
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    init_migrations_table(conn)?;

    let current_version = get_current_version(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version)
        .collect();

    if pending.is_empty() {
        debug!(current_version, "Schema up to date");
        return Ok(());
    }

    for migration in pending {
        info!(
            version = migration.version,
            description = migration.description,
            "Applying migration"
        );
        apply(conn, migration)?;
    }

    info!(
        from = current_version,
        to = get_current_version(conn)?,
        "Database schema updated"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Get the latest migration version (test helper)
    fn latest_version() -> u32 {
        MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
    }

    #[test]
    fn test_migrations_run() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let version = get_current_version(&conn).unwrap();
        assert_eq!(version, latest_version());
    }

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Run twice
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version = get_current_version(&conn).unwrap();
        assert_eq!(version, latest_version());
    }

    #[test]
    fn test_active_code_index_is_partial() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let insert = "INSERT INTO sessions (id, session_code, name, is_active, duration_minutes, created_at, qr_payload)
                      VALUES (?1, 'CS-101', 'Intro', ?2, 60, '2024-01-15T09:00:00.000Z', 'payload')";

        // Any number of inactive rows may share a code
        conn.execute(insert, rusqlite::params!["a", 0]).unwrap();
        conn.execute(insert, rusqlite::params!["b", 0]).unwrap();

        // Only one active row per code
        conn.execute(insert, rusqlite::params!["c", 1]).unwrap();
        assert!(conn.execute(insert, rusqlite::params!["d", 1]).is_err());
    }

    #[test]
    fn test_migrations_sequential() {
        // Verify migrations are numbered sequentially
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(
                migration.version as usize,
                i + 1,
                "Migration {} should have version {}",
                migration.description,
                i + 1
            );
        }
    }
}
