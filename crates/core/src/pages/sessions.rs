//! Session listing page

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{attendance_rate, search_matches};
use crate::error::Result;
use crate::models::{Session, SessionQuery, SessionStatus};
use crate::status::observe_status;
use crate::storage::Storage;

/// Follow-up offered for a session, depending on its status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Scan,
    Generate,
    Report,
}

impl SessionAction {
    pub fn for_status(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Active => SessionAction::Scan,
            SessionStatus::Upcoming => SessionAction::Generate,
            SessionStatus::Completed => SessionAction::Report,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionAction::Scan => "Scan QR",
            SessionAction::Generate => "Generate QR",
            SessionAction::Report => "View Report",
        }
    }
}

/// One session as listed on the dashboard and sessions page
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub attended: u64,
    /// Students enrolled when the session opened
    pub expected: u64,
    pub rate: Option<f64>,
    pub action: SessionAction,
}

/// Status counts over every session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub upcoming: usize,
}

impl SessionCounts {
    fn add(&mut self, status: SessionStatus) {
        self.total += 1;
        match status {
            SessionStatus::Active => self.active += 1,
            SessionStatus::Completed => self.completed += 1,
            SessionStatus::Upcoming => self.upcoming += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionsView {
    pub counts: SessionCounts,
    pub rows: Vec<SessionRow>,
}

/// Resolve status and attendance figures for one session
pub fn build_row<R>(repo: &R, mut session: Session, now: DateTime<Utc>) -> Result<SessionRow>
where
    R: Storage + ?Sized,
{
    let status = observe_status(repo, &mut session, now)?;
    let attended = repo.count_attendance_for_session(session.id)?;
    // Late enrollees may still have checked in
    let expected = repo
        .count_students_enrolled_by(session.created_at)?
        .max(attended);

    let rate = if status.is_held() {
        attendance_rate(attended, expected)
    } else {
        None
    };

    Ok(SessionRow {
        id: session.id,
        code: session.code,
        name: session.name,
        description: session.description,
        status,
        created_at: session.created_at,
        expires_at: session.expires_at,
        duration_minutes: session.duration_minutes,
        attended,
        expected,
        rate,
        action: SessionAction::for_status(status),
    })
}

/// Every session, newest first, filtered by a search over name, code and description
pub fn load<R>(repo: &R, search: &str, now: DateTime<Utc>) -> Result<SessionsView>
where
    R: Storage + ?Sized,
{
    let mut counts = SessionCounts::default();
    let mut rows = Vec::new();

    for session in repo.list_sessions(&SessionQuery::default())? {
        let row = build_row(repo, session, now)?;
        counts.add(row.status);

        let description = row.description.as_deref().unwrap_or_default();
        if search_matches(search, [row.name.as_str(), row.code.as_str(), description]) {
            rows.push(row);
        }
    }

    Ok(SessionsView { counts, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{issue_qr, GenerateRequest};
    use crate::models::{AttendanceRecord, Student};
    use crate::storage::Database;
    use chrono::Duration;

    fn issue(db: &Database, code: &str, name: &str, at: DateTime<Utc>) -> Session {
        let request = GenerateRequest {
            code: code.to_string(),
            name: name.to_string(),
            duration_minutes: 90,
            description: Some(format!("{name} in Room A-101")),
            ..GenerateRequest::default()
        };
        issue_qr(db, &request, at).unwrap().session().clone()
    }

    fn enroll(db: &Database, identifier: &str, at: DateTime<Utc>) -> Student {
        let mut student = Student::new(identifier.to_string(), format!("Student {identifier}"));
        student.created_at = at;
        db.students().create(&student).unwrap();
        student
    }

    #[test]
    fn test_rows_carry_status_and_attendance() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        let john = enroll(&db, "STU001", now - Duration::days(30));
        enroll(&db, "STU002", now - Duration::days(30));

        let past = issue(&db, "MATH-201", "Advanced Mathematics", now - Duration::hours(5));
        issue(&db, "CS-101", "Computer Science Fundamentals", now - Duration::minutes(10));

        db.attendance()
            .record(&AttendanceRecord::new(
                john.id,
                past.id,
                now - Duration::hours(5) + Duration::minutes(3),
            ))
            .unwrap();

        let view = load(&db, "", now).unwrap();
        assert_eq!(
            view.counts,
            SessionCounts {
                total: 2,
                active: 1,
                completed: 1,
                upcoming: 0
            }
        );

        // Newest first
        assert_eq!(view.rows[0].code, "CS-101");
        assert_eq!(view.rows[0].status, SessionStatus::Active);
        assert_eq!(view.rows[0].action, SessionAction::Scan);

        let math = &view.rows[1];
        assert_eq!(math.status, SessionStatus::Completed);
        assert_eq!(math.action, SessionAction::Report);
        assert_eq!((math.attended, math.expected), (1, 2));
        assert_eq!(math.rate, Some(50.0));
    }

    #[test]
    fn test_listing_corrects_expired_flags() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        let old = issue(&db, "PHY-151", "Physics Laboratory", now - Duration::hours(4));

        load(&db, "", now).unwrap();

        assert!(!db.sessions().find_by_id(old.id).unwrap().unwrap().is_active);
    }

    #[test]
    fn test_search_filters_rows_not_counts() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        issue(&db, "CS-101", "Computer Science Fundamentals", now);
        issue(&db, "ENG-101", "English Literature", now);

        let view = load(&db, "literature", now).unwrap();
        assert_eq!(view.counts.total, 2);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].code, "ENG-101");

        let by_description = load(&db, "room a-101", now).unwrap();
        assert_eq!(by_description.rows.len(), 2);
    }

    #[test]
    fn test_upcoming_session_has_no_rate() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        enroll(&db, "STU001", now - Duration::days(1));

        // Written by another tool: flag cleared, no expiry
        let mut session = Session::new("ENG-101".into(), "English".into(), 60, None, now).unwrap();
        session.is_active = false;
        session.expires_at = None;
        db.sessions().insert_guarded(&session).unwrap();

        let row = build_row(&db, session, now).unwrap();
        assert_eq!(row.status, SessionStatus::Upcoming);
        assert_eq!(row.action, SessionAction::Generate);
        assert_eq!(row.rate, None);
    }
}
