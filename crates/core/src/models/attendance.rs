//! Attendance record model

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student's check-in to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub session_id: Uuid,
    pub scanned_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(student_id: Uuid, session_id: Uuid, scanned_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            session_id,
            scanned_at: scanned_at.trunc_subsecs(3),
        }
    }
}

/// Attendance record joined with display info
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEntry {
    pub record_id: Uuid,
    pub student_identifier: String,
    pub student_name: String,
    pub session_code: String,
    pub session_name: String,
    pub session_created_at: DateTime<Utc>,
    pub scanned_at: DateTime<Utc>,
}

impl ScanEntry {
    pub fn punctuality(&self, late_after: Duration) -> Punctuality {
        Punctuality::classify(self.session_created_at, self.scanned_at, late_after)
    }
}

/// Whether a scan arrived within the grace period after the session opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Punctuality {
    OnTime,
    Late,
}

impl Punctuality {
    pub fn classify(
        opened_at: DateTime<Utc>,
        scanned_at: DateTime<Utc>,
        late_after: Duration,
    ) -> Self {
        if scanned_at - opened_at > late_after {
            Punctuality::Late
        } else {
            Punctuality::OnTime
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Punctuality::OnTime => "on time",
            Punctuality::Late => "late",
        }
    }
}
