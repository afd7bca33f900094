//! Storage repository traits
//!
//! These traits define the store interface the resolver, guard and pages
//! work against, allowing for different implementations (SQLite, mock,
//! future hosted backend).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AttendanceRecord, ScanEntry, Session, SessionQuery, Student};

/// Outcome of a conditional session insert
#[derive(Debug, Clone, PartialEq)]
pub enum GuardedInsert {
    /// The new row was written
    Inserted,
    /// An active session with the same code already existed; nothing was written
    Conflict(Session),
}

/// Session repository operations
pub trait SessionRepository {
    /// Insert the session unless an active session with its code exists.
    ///
    /// Check and insert happen atomically.
    fn insert_session_guarded(&self, session: &Session) -> Result<GuardedInsert>;

    /// Find the session whose stored active flag is set for this code
    fn find_active_session_by_code(&self, code: &str) -> Result<Option<Session>>;

    /// Find the session carrying exactly this QR payload
    fn find_session_by_payload(&self, payload: &str) -> Result<Option<Session>>;

    /// List sessions with filter, order and limit
    fn list_sessions(&self, query: &SessionQuery) -> Result<Vec<Session>>;

    /// Clear the stored active flag
    fn deactivate_session(&self, session_id: Uuid) -> Result<()>;

    /// Count all sessions
    fn count_sessions(&self) -> Result<u64>;

    /// Count sessions created at or after `since`
    fn count_sessions_since(&self, since: DateTime<Utc>) -> Result<u64>;
}

/// Student repository operations
pub trait StudentRepository {
    /// Create a new student
    fn create_student(&self, student: &Student) -> Result<()>;

    /// Find student by external identifier
    fn find_student_by_identifier(&self, identifier: &str) -> Result<Option<Student>>;

    /// List students ordered by name
    fn list_students(&self, limit: Option<u32>) -> Result<Vec<Student>>;

    /// Count all students
    fn count_students(&self) -> Result<u64>;

    /// Count students enrolled at or before `at`
    fn count_students_enrolled_by(&self, at: DateTime<Utc>) -> Result<u64>;
}

/// Attendance repository operations
pub trait AttendanceRepository {
    /// Record a check-in
    fn record_attendance(&self, record: &AttendanceRecord) -> Result<()>;

    /// Whether this student already checked into this session
    fn has_attendance(&self, student_id: Uuid, session_id: Uuid) -> Result<bool>;

    /// Count check-ins for a session
    fn count_attendance_for_session(&self, session_id: Uuid) -> Result<u64>;

    /// Count check-ins for a student
    fn count_attendance_for_student(&self, student_id: Uuid) -> Result<u64>;

    /// Most recent check-ins with student and session info
    fn list_recent_scans(&self, limit: u32) -> Result<Vec<ScanEntry>>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
/// Implementations may be backed by SQLite, mocks, or network.
pub trait Storage: SessionRepository + StudentRepository + AttendanceRepository {}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where T: SessionRepository + StudentRepository + AttendanceRepository {}
