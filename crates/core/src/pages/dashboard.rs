//! Dashboard page

use chrono::{DateTime, Duration, Utc};

use super::attendance_rate;
use super::sessions::{build_row, SessionRow};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::models::{Punctuality, ScanEntry, SessionQuery, SessionStatus};
use crate::storage::Storage;

/// Headline numbers
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_students: u64,
    pub active_sessions: u64,
    /// Every session row carries one QR code
    pub qr_codes_generated: u64,
    /// Across held sessions; `None` until some attendance is expected
    pub attendance_rate: Option<f64>,
}

/// A recent check-in
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityItem {
    pub entry: ScanEntry,
    pub punctuality: Punctuality,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub recent_sessions: Vec<SessionRow>,
    pub recent_activity: Vec<ActivityItem>,
}

/// Build the dashboard
pub fn load<R>(
    repo: &R,
    config: &DashboardConfig,
    late_after: Duration,
    now: DateTime<Utc>,
) -> Result<DashboardView>
where
    R: Storage + ?Sized,
{
    let mut active_sessions = 0;
    let mut attended = 0;
    let mut expected = 0;
    let mut recent_sessions = Vec::new();

    // Every session is observed so stale flags are corrected before counting
    for session in repo.list_sessions(&SessionQuery::default())? {
        let row = build_row(repo, session, now)?;

        if row.status == SessionStatus::Active {
            active_sessions += 1;
        }
        if row.status.is_held() {
            attended += row.attended;
            expected += row.expected;
        }
        if recent_sessions.len() < config.recent_sessions as usize {
            recent_sessions.push(row);
        }
    }

    let recent_activity = repo
        .list_recent_scans(config.recent_activity)?
        .into_iter()
        .map(|entry| ActivityItem {
            punctuality: entry.punctuality(late_after),
            entry,
        })
        .collect();

    Ok(DashboardView {
        stats: DashboardStats {
            total_students: repo.count_students()?,
            active_sessions,
            qr_codes_generated: repo.count_sessions()?,
            attendance_rate: attendance_rate(attended, expected),
        },
        recent_sessions,
        recent_activity,
    })
}
