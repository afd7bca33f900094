//! Attendance storage operations

use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{format_datetime, parse_datetime, parse_uuid};
use crate::error::Result;
use crate::models::{AttendanceRecord, ScanEntry};

pub struct AttendanceStore<'a> {
    conn: &'a Connection,
}

impl<'a> AttendanceStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Record a check-in
    #[instrument(
        skip(self, record),
        fields(session_id = %record.session_id, student_id = %record.student_id)
    )]
    pub fn record(&self, record: &AttendanceRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO attendance (id, student_id, session_id, scanned_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id.to_string(),
                record.student_id.to_string(),
                record.session_id.to_string(),
                format_datetime(record.scanned_at),
            ],
        )?;
        Ok(())
    }

    /// Check for an existing check-in
    pub fn exists(&self, student_id: Uuid, session_id: Uuid) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM attendance WHERE student_id = ?1 AND session_id = ?2)",
            params![student_id.to_string(), session_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Count check-ins for a session
    pub fn count_for_session(&self, session_id: Uuid) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM attendance WHERE session_id = ?1",
            params![session_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Count check-ins for a student
    pub fn count_for_student(&self, student_id: Uuid) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM attendance WHERE student_id = ?1",
            params![student_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// List most recent check-ins with display info
    #[instrument(skip(self))]
    pub fn list_recent(&self, limit: u32) -> Result<Vec<ScanEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, st.identifier, st.name, se.session_code, se.name, se.created_at, a.scanned_at
             FROM attendance a
             JOIN students st ON a.student_id = st.id
             JOIN sessions se ON a.session_id = se.id
             ORDER BY a.scanned_at DESC
             LIMIT ?1",
        )?;

        let entries = stmt
            .query_map(params![limit], |row| {
                Ok(ScanEntry {
                    record_id: parse_uuid(&row.get::<_, String>(0)?)?,
                    student_identifier: row.get(1)?,
                    student_name: row.get(2)?,
                    session_code: row.get(3)?,
                    session_name: row.get(4)?,
                    session_created_at: parse_datetime(&row.get::<_, String>(5)?)?,
                    scanned_at: parse_datetime(&row.get::<_, String>(6)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Session, Student};
    use crate::storage::Database;
    use chrono::{Duration, Utc};

    fn seed(db: &Database) -> (Student, Session) {
        let student = Student::new("STU001".into(), "John Doe".into());
        db.students().create(&student).unwrap();
        let session = Session::new("CS-101".into(), "Intro".into(), 60, None, Utc::now()).unwrap();
        db.sessions().insert_guarded(&session).unwrap();
        (student, session)
    }

    #[test]
    fn test_record_once_per_session() {
        let db = Database::open_in_memory().unwrap();
        let (student, session) = seed(&db);

        assert!(!db.attendance().exists(student.id, session.id).unwrap());
        db.attendance()
            .record(&AttendanceRecord::new(student.id, session.id, Utc::now()))
            .unwrap();
        assert!(db.attendance().exists(student.id, session.id).unwrap());

        // The unique index rejects a second check-in
        assert!(db
            .attendance()
            .record(&AttendanceRecord::new(student.id, session.id, Utc::now()))
            .is_err());

        assert_eq!(db.attendance().count_for_session(session.id).unwrap(), 1);
        assert_eq!(db.attendance().count_for_student(student.id).unwrap(), 1);
    }

    #[test]
    fn test_recent_scans_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let (john, session) = seed(&db);
        let jane = Student::new("STU002".into(), "Jane Smith".into());
        db.students().create(&jane).unwrap();

        let now = Utc::now();
        db.attendance()
            .record(&AttendanceRecord::new(john.id, session.id, now))
            .unwrap();
        db.attendance()
            .record(&AttendanceRecord::new(
                jane.id,
                session.id,
                now + Duration::minutes(2),
            ))
            .unwrap();

        let recent = db.attendance().list_recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].student_name, "Jane Smith");
        assert_eq!(recent[0].session_code, "CS-101");
        assert_eq!(recent[1].student_identifier, "STU001");
    }
}
