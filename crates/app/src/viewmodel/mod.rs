//! View model bindings for Slint UI

mod dashboard;
mod generate;
mod scan;
mod sessions;
mod students;

use std::sync::Arc;

use qrattend_core::{AppConfig, Database, Result};
use slint::{ComponentHandle, ModelRc, VecModel};
use tracing::warn;

use crate::state::AppState;
use crate::MainWindow;

pub fn setup_bindings(window: &MainWindow, state: AppState) {
    let state = Arc::new(state);

    dashboard::setup_dashboard_bindings(window, state.clone());
    generate::setup_generate_bindings(window, state.clone());
    scan::setup_scan_bindings(window, state.clone());
    sessions::setup_session_bindings(window, state.clone());
    students::setup_student_bindings(window, state);

    refresh_all(window);
}

/// Refresh every page that shows sessions or attendance
pub(crate) fn refresh_all(window: &MainWindow) {
    window.invoke_load_dashboard();
    window.invoke_load_sessions();
    window.invoke_load_students();
    window.invoke_load_scan_history();
}

/// Run store work on the blocking pool and hand the result to the UI thread
pub(crate) fn run_in_background<T, W, D>(
    state: &Arc<AppState>,
    window: &MainWindow,
    work: W,
    done: D,
)
where
    T: Send + 'static,
    W: FnOnce(&Database, &AppConfig) -> Result<T> + Send + 'static,
    D: FnOnce(&MainWindow, Result<T>) + Send + 'static,
{
    let state = state.clone();
    let window_weak = window.as_weak();
    let runtime = state.runtime().clone();

    runtime.spawn_blocking(move || {
        let result = state.with_db(|db| work(db, &state.config));
        if let Err(e) = window_weak.upgrade_in_event_loop(move |w| done(&w, result)) {
            warn!("Window closed before update: {}", e);
        }
    });
}

pub(crate) fn to_model<T: Clone + 'static>(items: Vec<T>) -> ModelRc<T> {
    ModelRc::new(VecModel::from(items))
}
