//! Scan view model

use std::sync::Arc;

use chrono::Utc;
use qrattend_core::pages::scan::{self, ScanOutcome};
use qrattend_core::Error;
use slint::ComponentHandle;

use super::dashboard::scan_item;
use super::{refresh_all, run_in_background, to_model};
use crate::format::local_time;
use crate::state::AppState;
use crate::{MainWindow, ScanItem};

const HISTORY_LIMIT: u32 = 20;

pub fn setup_scan_bindings(window: &MainWindow, state: Arc<AppState>) {
    // Record attendance
    let state_scan = state.clone();
    let window_weak = window.as_weak();
    window.on_submit_scan(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        let payload = w.get_scan_code().to_string();
        let student = w.get_scan_student().to_string();

        run_in_background(
            &state_scan,
            &w,
            move |db, config| {
                scan::record_scan(db, &payload, &student, Utc::now(), config.sessions.late_after())
            },
            |w, result| match result {
                Ok(outcome) => {
                    w.set_scan_result(outcome_text(&outcome).into());
                    w.set_scan_notice("".into());
                    w.set_scan_student("".into());
                    refresh_all(w);
                }
                Err(e) => {
                    if matches!(e, Error::Database(_) | Error::Io(_)) {
                        tracing::error!("Failed to record scan: {}", e);
                    }
                    w.set_scan_notice(e.to_string().into());
                }
            },
        );
    });

    // Recent scans
    let window_weak = window.as_weak();
    window.on_load_scan_history(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };

        run_in_background(
            &state,
            &w,
            |db, config| scan::history(db, HISTORY_LIMIT, config.sessions.late_after()),
            |w, result| match result {
                Ok(entries) => {
                    let now = Utc::now();
                    let items: Vec<ScanItem> = entries
                        .iter()
                        .map(|(entry, punctuality)| scan_item(entry, *punctuality, now))
                        .collect();
                    w.set_scan_history(to_model(items));
                }
                Err(e) => {
                    tracing::error!("Failed to load scan history: {}", e);
                    w.set_scan_notice(format!("Could not load recent scans: {e}").into());
                }
            },
        );
    });
}

fn outcome_text(outcome: &ScanOutcome) -> String {
    format!(
        "{} ({}) checked into {} at {}, {}",
        outcome.student.name,
        outcome.student.identifier,
        outcome.session.name,
        local_time(outcome.record.scanned_at),
        outcome.punctuality.display_name()
    )
}
