//! SQLite storage layer for QR Attend

mod attendance;
mod migrations;
mod parse;
mod sessions;
mod students;
mod traits;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AttendanceRecord, ScanEntry, Session, SessionQuery, Student};
use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;

pub use attendance::AttendanceStore;
pub use sessions::SessionStore;
pub use students::StudentStore;
pub use traits::{
    AttendanceRepository, GuardedInsert, SessionRepository, Storage, StudentRepository,
};

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get session store
    pub fn sessions(&self) -> SessionStore<'_> {
        SessionStore::new(&self.conn)
    }

    /// Get student store
    pub fn students(&self) -> StudentStore<'_> {
        StudentStore::new(&self.conn)
    }

    /// Get attendance store
    pub fn attendance(&self) -> AttendanceStore<'_> {
        AttendanceStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl SessionRepository for Database {
    fn insert_session_guarded(&self, session: &Session) -> Result<GuardedInsert> {
        self.sessions().insert_guarded(session)
    }

    fn find_active_session_by_code(&self, code: &str) -> Result<Option<Session>> {
        self.sessions().find_active_by_code(code)
    }

    fn find_session_by_payload(&self, payload: &str) -> Result<Option<Session>> {
        self.sessions().find_by_payload(payload)
    }

    fn list_sessions(&self, query: &SessionQuery) -> Result<Vec<Session>> {
        self.sessions().list(query)
    }

    fn deactivate_session(&self, session_id: Uuid) -> Result<()> {
        self.sessions().deactivate(session_id)
    }

    fn count_sessions(&self) -> Result<u64> {
        self.sessions().count()
    }

    fn count_sessions_since(&self, since: DateTime<Utc>) -> Result<u64> {
        self.sessions().count_since(since)
    }
}

impl StudentRepository for Database {
    fn create_student(&self, student: &Student) -> Result<()> {
        self.students().create(student)
    }

    fn find_student_by_identifier(&self, identifier: &str) -> Result<Option<Student>> {
        self.students().find_by_identifier(identifier)
    }

    fn list_students(&self, limit: Option<u32>) -> Result<Vec<Student>> {
        self.students().list(limit)
    }

    fn count_students(&self) -> Result<u64> {
        self.students().count()
    }

    fn count_students_enrolled_by(&self, at: DateTime<Utc>) -> Result<u64> {
        self.students().count_enrolled_by(at)
    }
}

impl AttendanceRepository for Database {
    fn record_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        self.attendance().record(record)
    }

    fn has_attendance(&self, student_id: Uuid, session_id: Uuid) -> Result<bool> {
        self.attendance().exists(student_id, session_id)
    }

    fn count_attendance_for_session(&self, session_id: Uuid) -> Result<u64> {
        self.attendance().count_for_session(session_id)
    }

    fn count_attendance_for_student(&self, student_id: Uuid) -> Result<u64> {
        self.attendance().count_for_student(student_id)
    }

    fn list_recent_scans(&self, limit: u32) -> Result<Vec<ScanEntry>> {
        self.attendance().list_recent(limit)
    }
}
