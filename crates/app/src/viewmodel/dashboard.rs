//! Dashboard view model

use std::sync::Arc;

use chrono::{DateTime, Utc};
use qrattend_core::pages::dashboard::{self, DashboardStats};
use qrattend_core::pages::format_rate;
use qrattend_core::{Punctuality, ScanEntry};
use slint::ComponentHandle;

use super::sessions::session_item;
use super::{run_in_background, to_model};
use crate::format::relative_time;
use crate::state::AppState;
use crate::{MainWindow, ScanItem, StatItem};

pub fn setup_dashboard_bindings(window: &MainWindow, state: Arc<AppState>) {
    let window_weak = window.as_weak();
    window.on_load_dashboard(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };

        run_in_background(
            &state,
            &w,
            |db, config| {
                dashboard::load(db, &config.dashboard, config.sessions.late_after(), Utc::now())
            },
            |w, result| match result {
                Ok(view) => {
                    let now = Utc::now();
                    w.set_stats(to_model(stat_items(&view.stats)));
                    w.set_recent_sessions(to_model(
                        view.recent_sessions.iter().map(session_item).collect(),
                    ));
                    w.set_recent_activity(to_model(
                        view.recent_activity
                            .iter()
                            .map(|a| scan_item(&a.entry, a.punctuality, now))
                            .collect(),
                    ));
                    w.set_dashboard_notice("".into());
                }
                Err(e) => {
                    tracing::error!("Failed to load dashboard: {}", e);
                    w.set_dashboard_notice(format!("Could not load dashboard: {e}").into());
                }
            },
        );
    });
}

fn stat_items(stats: &DashboardStats) -> Vec<StatItem> {
    [
        ("Total Students", stats.total_students.to_string()),
        ("Active Sessions", stats.active_sessions.to_string()),
        ("QR Codes Generated", stats.qr_codes_generated.to_string()),
        ("Attendance Rate", format_rate(stats.attendance_rate)),
    ]
    .into_iter()
    .map(|(title, value)| StatItem {
        title: title.into(),
        value: value.into(),
    })
    .collect()
}

/// Activity row, with the scan time relative to `now`
pub(crate) fn scan_item(
    entry: &ScanEntry,
    punctuality: Punctuality,
    now: DateTime<Utc>,
) -> ScanItem {
    ScanItem {
        student: entry.student_name.clone().into(),
        student_id: entry.student_identifier.clone().into(),
        session: entry.session_name.clone().into(),
        time: relative_time(entry.scanned_at, now).into(),
        punctuality: punctuality.display_name().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    #[test]
    fn test_stat_items() {
        let items = stat_items(&DashboardStats {
            total_students: 1247,
            active_sessions: 3,
            qr_codes_generated: 156,
            attendance_rate: None,
        });

        assert_eq!(items.len(), 4);
        assert_eq!(items[0].value, "1247");
        assert_eq!(items[3].title, "Attendance Rate");
        assert_eq!(items[3].value, "N/A");
    }

    #[test]
    fn test_scan_item() {
        let now = Utc::now();
        let entry = ScanEntry {
            record_id: Uuid::new_v4(),
            student_identifier: "STU001".to_string(),
            student_name: "John Doe".to_string(),
            session_code: "CS-101".to_string(),
            session_name: "Computer Science 101".to_string(),
            session_created_at: now - Duration::minutes(10),
            scanned_at: now - Duration::minutes(2),
        };

        let item = scan_item(&entry, Punctuality::OnTime, now);
        assert_eq!(item.student, "John Doe");
        assert_eq!(item.student_id, "STU001");
        assert_eq!(item.time, "2 minutes ago");
        assert_eq!(item.punctuality, "on time");
    }
}
