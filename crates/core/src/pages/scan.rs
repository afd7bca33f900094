//! QR scanning page
//!
//! A scan ties a raw QR payload and a student identifier to one check-in.
//! Only sessions whose observed status is `Active` accept scans.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::{
    AttendanceRecord, Punctuality, QrPayload, ScanEntry, Session, SessionStatus, Student,
};
use crate::status::observe_status;
use crate::storage::Storage;

/// A recorded check-in
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub record: AttendanceRecord,
    pub student: Student,
    pub session: Session,
    pub punctuality: Punctuality,
}

/// Record attendance for a scanned payload
#[instrument(skip(repo, raw_payload))]
pub fn record_scan<R>(
    repo: &R,
    raw_payload: &str,
    student_identifier: &str,
    now: DateTime<Utc>,
    late_after: Duration,
) -> Result<ScanOutcome>
where
    R: Storage + ?Sized,
{
    let raw_payload = raw_payload.trim();
    if raw_payload.is_empty() {
        return Err(Error::Validation("Please enter a valid QR code".to_string()));
    }
    let student_identifier = student_identifier.trim();
    if student_identifier.is_empty() {
        return Err(Error::Validation("Please enter a student ID".to_string()));
    }

    let payload = QrPayload::decode(raw_payload)
        .map_err(|_| Error::Validation("This is not an attendance QR code".to_string()))?;

    let mut session = repo.find_session_by_payload(raw_payload)?.ok_or_else(|| {
        Error::NotFound(format!(
            "No session issued this code ({})",
            payload.session_id
        ))
    })?;

    let status = observe_status(repo, &mut session, now)?;
    if status != SessionStatus::Active {
        warn!(session_id = %session.id, %status, "Refused scan for inactive session");
        return Err(Error::InvalidOperation(format!(
            "Session {} is {} and not accepting scans",
            session.code,
            status.display_name().to_lowercase()
        )));
    }

    let student = repo
        .find_student_by_identifier(student_identifier)?
        .ok_or_else(|| Error::NotFound(format!("Student {student_identifier}")))?;

    if repo.has_attendance(student.id, session.id)? {
        return Err(Error::InvalidOperation(format!(
            "{} is already checked into {}",
            student.name, session.code
        )));
    }

    let record = AttendanceRecord::new(student.id, session.id, now);
    repo.record_attendance(&record)?;

    let punctuality = Punctuality::classify(session.created_at, record.scanned_at, late_after);
    info!(
        session_id = %session.id,
        student_id = %student.id,
        punctuality = punctuality.display_name(),
        "Attendance recorded"
    );

    Ok(ScanOutcome {
        record,
        student,
        session,
        punctuality,
    })
}

/// Recent scans with their punctuality
pub fn history<R>(
    repo: &R,
    limit: u32,
    late_after: Duration,
) -> Result<Vec<(ScanEntry, Punctuality)>>
where
    R: Storage + ?Sized,
{
    Ok(repo
        .list_recent_scans(limit)?
        .into_iter()
        .map(|entry| {
            let punctuality = entry.punctuality(late_after);
            (entry, punctuality)
        })
        .collect())
}
