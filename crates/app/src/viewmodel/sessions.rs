//! Sessions view model

use std::sync::Arc;

use chrono::Utc;
use qrattend_core::pages::format_rate;
use qrattend_core::pages::generate::duration_label;
use qrattend_core::pages::sessions::{self, SessionCounts, SessionRow};
use slint::ComponentHandle;

use super::{run_in_background, to_model};
use crate::format::time_window;
use crate::state::AppState;
use crate::MainWindow;
use crate::SessionItem;

pub fn setup_session_bindings(window: &MainWindow, state: Arc<AppState>) {
    let window_weak = window.as_weak();
    window.on_load_sessions(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        let search = w.get_session_search().to_string();

        run_in_background(
            &state,
            &w,
            move |db, _| sessions::load(db, &search, Utc::now()),
            |w, result| match result {
                Ok(view) => {
                    let items: Vec<SessionItem> = view.rows.iter().map(session_item).collect();
                    w.set_sessions(to_model(items));
                    w.set_session_counts(counts_summary(&view.counts).into());
                    w.set_sessions_notice("".into());
                }
                Err(e) => {
                    tracing::error!("Failed to load sessions: {}", e);
                    w.set_sessions_notice(format!("Could not load sessions: {e}").into());
                }
            },
        );
    });
}

pub(crate) fn session_item(row: &SessionRow) -> SessionItem {
    SessionItem {
        id: row.id.to_string().into(),
        code: row.code.clone().into(),
        name: row.name.clone().into(),
        status: row.status.display_name().into(),
        time_window: time_window(row.created_at, row.expires_at).into(),
        duration: duration_label(row.duration_minutes).into(),
        attendance: format!("{}/{} students", row.attended, row.expected).into(),
        rate: format_rate(row.rate).into(),
        action: row.action.label().into(),
    }
}

fn counts_summary(counts: &SessionCounts) -> String {
    format!(
        "Total: {}  Active: {}  Completed: {}  Upcoming: {}",
        counts.total, counts.active, counts.completed, counts.upcoming
    )
}
